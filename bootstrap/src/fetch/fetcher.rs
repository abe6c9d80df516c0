use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::info;
use reqwest::Client;
use shared::files::{download_file, hash_file, with_temp_suffix};
use shared::progress::ProgressBar;
use shared::utils::BoxError;
use tokio::fs;

use super::release::LatestRelease;
use crate::artifact::descriptor::artifact_file_name;
use crate::config::runtime_config::BootstrapConfig;

#[derive(thiserror::Error, Debug)]
pub enum FetchStartError {
    #[error("No download location is configured for the launcher")]
    NotConfigured,
    #[error("Failed to create the download runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("Failed to start the download thread: {0}")]
    Spawn(#[source] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch the latest release: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid download URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("Failed to verify {path}: {source}")]
    Verify {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("Hash of {path} is {actual}, expected {expected}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
    #[error("Failed to install {path}: {source}")]
    Install {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Download thread panicked")]
    Panicked,
}

/// A download running on its own thread.
pub struct FetchHandle {
    handle: JoinHandle<Result<PathBuf, FetchError>>,
}

impl FetchHandle {
    pub fn spawn<F>(work: F) -> std::io::Result<Self>
    where
        F: FnOnce() -> Result<PathBuf, FetchError> + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("launcher-fetch".to_string())
            .spawn(work)?;
        Ok(FetchHandle { handle })
    }

    /// Blocks until the download finishes and returns the installed binary.
    pub fn wait(self) -> Result<PathBuf, FetchError> {
        self.handle.join().map_err(|_| FetchError::Panicked)?
    }
}

pub trait Fetcher {
    /// Starts fetching a fresh launcher binary without waiting for it.
    fn start(&self) -> Result<FetchHandle, FetchStartError>;
}

pub struct HttpFetcher {
    latest_url: Option<String>,
    binaries_dir: PathBuf,
    launcher_name: String,
    progress_bar: Arc<dyn ProgressBar<String> + Send + Sync>,
}

impl HttpFetcher {
    pub fn new(
        config: &BootstrapConfig,
        progress_bar: Arc<dyn ProgressBar<String> + Send + Sync>,
    ) -> Self {
        HttpFetcher {
            latest_url: config.latest_url.clone(),
            binaries_dir: config.binaries_dir.clone(),
            launcher_name: config.launcher_name.clone(),
            progress_bar,
        }
    }
}

impl Fetcher for HttpFetcher {
    fn start(&self) -> Result<FetchHandle, FetchStartError> {
        let latest_url = self
            .latest_url
            .clone()
            .ok_or(FetchStartError::NotConfigured)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(FetchStartError::Runtime)?;

        let binaries_dir = self.binaries_dir.clone();
        let launcher_name = self.launcher_name.clone();
        let progress_bar = self.progress_bar.clone();

        FetchHandle::spawn(move || {
            runtime.block_on(fetch_latest(
                &latest_url,
                &binaries_dir,
                &launcher_name,
                progress_bar,
            ))
        })
        .map_err(FetchStartError::Spawn)
    }
}

async fn fetch_latest(
    latest_url: &str,
    binaries_dir: &Path,
    launcher_name: &str,
    progress_bar: Arc<dyn ProgressBar<String> + Send + Sync>,
) -> Result<PathBuf, FetchError> {
    let client = Client::new();

    info!("Checking {} for the latest launcher...", latest_url);
    let release = LatestRelease::fetch(&client, latest_url).await?;
    let download_url = release.download_url(latest_url)?;

    let target = binaries_dir.join(artifact_file_name(launcher_name, &release.version));
    let temp_path = with_temp_suffix(&target);

    info!("Downloading launcher {} from {}...", release.version, download_url);
    progress_bar.set_message(format!("Downloading launcher {}", release.version));
    if let Err(source) =
        download_file(&client, download_url.as_str(), &temp_path, progress_bar).await
    {
        let _ = fs::remove_file(&temp_path).await;
        return Err(FetchError::Download {
            url: download_url.to_string(),
            source,
        });
    }

    install_download(&temp_path, &target, release.sha1.as_deref()).await?;
    info!("Installed {}", target.display());
    Ok(target)
}

#[cfg(unix)]
async fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path).await?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms).await
}

#[cfg(not(unix))]
async fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Verifies a finished download and moves it to its final name.
/// The temporary file is removed when the hash doesn't match.
pub async fn install_download(
    temp_path: &Path,
    target: &Path,
    expected_sha1: Option<&str>,
) -> Result<(), FetchError> {
    if let Some(expected) = expected_sha1 {
        let actual = hash_file(temp_path)
            .await
            .map_err(|source| FetchError::Verify {
                path: temp_path.to_path_buf(),
                source,
            })?;
        if !actual.eq_ignore_ascii_case(expected.trim()) {
            let _ = fs::remove_file(temp_path).await;
            return Err(FetchError::HashMismatch {
                path: temp_path.to_path_buf(),
                expected: expected.to_string(),
                actual,
            });
        }
    }

    let to_install_error = |source| FetchError::Install {
        path: target.to_path_buf(),
        source,
    };
    set_executable(temp_path).await.map_err(to_install_error)?;
    fs::rename(temp_path, target).await.map_err(to_install_error)?;
    Ok(())
}
