use env_logger::Builder;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

/// Logs every record to stdout and appends it to `logs_path`.
/// `RUST_LOG` overrides the default Info level.
pub fn setup_logger(logs_path: &Path) -> std::io::Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(true)
        .open(logs_path)?;

    let log_file = Mutex::new(log_file);

    let mut builder = Builder::new();
    builder.filter(None, LevelFilter::Info);
    builder.parse_default_env();

    builder.format(move |buf, record| {
        if let Ok(mut log_file) = log_file.lock() {
            let _ = writeln!(log_file, "{} - {}", record.level(), record.args());
        }
        writeln!(buf, "{} - {}", record.level(), record.args())
    });

    // a second init (e.g. from tests) keeps the first logger
    let _ = builder.try_init();
    Ok(())
}
