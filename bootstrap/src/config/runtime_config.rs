use std::env;
use std::path::{Path, PathBuf};

use shared::paths::get_binaries_dir;

use super::build_config;
use crate::controller::BootstrapError;

/// Version of the argument contract between this bootstrap and the launcher.
/// Bump it whenever the handoff arguments change incompatibly.
pub const BOOTSTRAP_VERSION: u32 = 1;

const PORTABLE_MARKER: &str = "portable.txt";

/// Everything the controller needs, resolved once at startup.
#[derive(Clone, Debug)]
pub struct BootstrapConfig {
    pub base_dir: PathBuf,
    pub portable: bool,
    pub binaries_dir: PathBuf,
    pub launcher_name: String,
    pub edition: Option<String>,
    pub entry_point: Option<String>,
    pub latest_url: Option<String>,
    pub bootstrap_version: u32,
    pub original_args: Vec<String>,
}

impl BootstrapConfig {
    pub fn new(base_dir: PathBuf, portable: bool, original_args: Vec<String>) -> Self {
        let binaries_dir = get_binaries_dir(&base_dir);
        BootstrapConfig {
            base_dir,
            portable,
            binaries_dir,
            launcher_name: build_config::get_launcher_name(),
            edition: build_config::get_edition(),
            entry_point: build_config::get_entry_point(),
            latest_url: build_config::get_latest_url(),
            bootstrap_version: BOOTSTRAP_VERSION,
            original_args,
        }
    }

    /// Picks the portable directory when a marker sits next to the executable,
    /// the per-user data directory otherwise, and makes sure the binaries
    /// directory exists.
    pub fn resolve(original_args: Vec<String>) -> Result<Self, BootstrapError> {
        let current_exe = env::current_exe().map_err(BootstrapError::CurrentExe)?;
        let current_exe = current_exe.canonicalize().unwrap_or(current_exe);

        let portable_dir = current_exe.parent().and_then(find_portable_dir);
        let portable = portable_dir.is_some();
        let base_dir = match portable_dir {
            Some(dir) => dir,
            None => get_user_launcher_dir()?,
        };

        let config = Self::new(base_dir, portable, original_args);
        std::fs::create_dir_all(&config.binaries_dir).map_err(|source| {
            BootstrapError::CreateDir {
                path: config.binaries_dir.clone(),
                source,
            }
        })?;
        Ok(config)
    }
}

fn get_user_launcher_dir() -> Result<PathBuf, BootstrapError> {
    let data_dir = dirs::data_dir().ok_or(BootstrapError::NoDataDir)?;
    Ok(data_dir.join(build_config::get_home_folder()))
}

/// Looks for the portable marker next to the executable, or next to the
/// `.app` bundle when the executable lives in `X.app/Contents/<dir>/`.
pub fn find_portable_dir(exe_dir: &Path) -> Option<PathBuf> {
    if exe_dir.join(PORTABLE_MARKER).is_file() {
        return Some(exe_dir.to_path_buf());
    }

    let contents_dir = exe_dir.parent()?;
    if contents_dir.file_name()? != "Contents" {
        return None;
    }

    let app_dir = contents_dir.parent()?;
    let app_name = app_dir.file_name()?.to_string_lossy().to_lowercase();
    if !app_name.ends_with(".app") {
        return None;
    }

    let out_base_dir = app_dir.parent()?;
    if out_base_dir.join(PORTABLE_MARKER).is_file() {
        Some(out_base_dir.to_path_buf())
    } else {
        None
    }
}
