mod artifact;
mod config;
mod controller;
mod fetch;
mod handoff;
mod progress;

use std::sync::Arc;

use log::{error, info, warn};
use shared::logs::setup_logger;
use shared::paths::get_logs_path;
use shared::utils::is_connect_error;

use config::build_config;
use config::runtime_config::BootstrapConfig;
use controller::{BootstrapController, BootstrapError, Outcome};
use fetch::fetcher::HttpFetcher;
use handoff::loader::ProcessLoader;
use progress::TerminalProgressBar;

const LOGS_FILENAME: &str = "bootstrap.log";

fn run(original_args: Vec<String>) -> Result<(), BootstrapError> {
    let config = BootstrapConfig::resolve(original_args)?;

    let logs_path = get_logs_path(&config.base_dir, LOGS_FILENAME).map_err(BootstrapError::Logging)?;
    setup_logger(&logs_path).map_err(BootstrapError::Logging)?;

    info!(
        "{} bootstrap {} (protocol {})",
        build_config::get_display_launcher_name(),
        build_config::get_version().unwrap_or_else(|| "dev".to_string()),
        config.bootstrap_version
    );
    info!(
        "Using {} (portable: {})",
        config.base_dir.display(),
        config.portable
    );

    let loader = ProcessLoader::new(config.entry_point.clone());
    let fetcher = HttpFetcher::new(&config, Arc::new(TerminalProgressBar::new()));
    let controller = BootstrapController::new(&config, &loader, &fetcher);

    match controller.run()? {
        Outcome::HandedOff(artifact) => {
            info!("Handed off to launcher {}", artifact.version);
        }
        Outcome::Fetching(handle) => {
            // the download thread dies with the process, so let it finish
            let path = handle.wait().map_err(|e| {
                if is_connect_error(&e) {
                    warn!("No connection to the update server");
                }
                e
            })?;
            info!(
                "Downloaded {}, it will be started next time",
                path.display()
            );
        }
    }
    Ok(())
}

/// Error displays already embed their causes.
fn report_fatal(e: &BootstrapError) {
    let message = format!("Failed to start the launcher: {}", e);
    if log::log_enabled!(log::Level::Error) {
        error!("{}", message);
    } else {
        eprintln!("{}", message);
    }
}

fn main() {
    let original_args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(original_args) {
        report_fatal(&e);
        std::process::exit(1);
    }
}
