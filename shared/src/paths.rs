use std::path::{Path, PathBuf};

const BINARIES_DIRNAME: &str = "launcher";
const LOGS_DIRNAME: &str = "logs";

pub fn get_binaries_dir(base_dir: &Path) -> PathBuf {
    base_dir.join(BINARIES_DIRNAME)
}

pub fn get_logs_dir(base_dir: &Path) -> std::io::Result<PathBuf> {
    let logs_dir = base_dir.join(LOGS_DIRNAME);
    if !logs_dir.exists() {
        std::fs::create_dir_all(&logs_dir)?;
    }
    Ok(logs_dir)
}

pub fn get_logs_path(base_dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
    Ok(get_logs_dir(base_dir)?.join(filename))
}
