use std::path::PathBuf;

use log::{debug, info, warn};

use crate::artifact::descriptor::{sort_newest_first, ArtifactDescriptor};
use crate::artifact::store::ArtifactStore;
use crate::config::runtime_config::BootstrapConfig;
use crate::fetch::fetcher::{FetchError, FetchHandle, FetchStartError, Fetcher};
use crate::handoff::args::build_launcher_args;
use crate::handoff::loader::HandoffLoader;

#[derive(thiserror::Error, Debug)]
pub enum BootstrapError {
    #[error("Failed to locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("Failed to find the user data directory")]
    NoDataDir,
    #[error("Failed to create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to set up logging: {0}")]
    Logging(#[source] std::io::Error),
    #[error(transparent)]
    FetchStart(#[from] FetchStartError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// How a successful run ended.
pub enum Outcome {
    /// This cached launcher is running; every other one was removed.
    HandedOff(ArtifactDescriptor),
    /// Nothing could be loaded and a fresh download is running.
    Fetching(FetchHandle),
}

/// Picks the newest cached launcher that loads and hands off to it, or
/// starts a download when none does.
pub struct BootstrapController<'a> {
    config: &'a BootstrapConfig,
    store: ArtifactStore,
    loader: &'a dyn HandoffLoader,
    fetcher: &'a dyn Fetcher,
}

impl<'a> BootstrapController<'a> {
    pub fn new(
        config: &'a BootstrapConfig,
        loader: &'a dyn HandoffLoader,
        fetcher: &'a dyn Fetcher,
    ) -> Self {
        BootstrapController {
            config,
            store: ArtifactStore::new(&config.binaries_dir, &config.launcher_name),
            loader,
            fetcher,
        }
    }

    pub fn run(&self) -> Result<Outcome, BootstrapError> {
        let removed = self.store.purge_temp_files();
        if removed > 0 {
            debug!("Removed {} unfinished downloads", removed);
        }

        let mut candidates = self.store.list();
        if candidates.is_empty() {
            info!("No cached launcher in {}", self.store.dir().display());
            return self.fetch_fresh();
        }

        sort_newest_first(&mut candidates);
        match self.attempt(&candidates) {
            Some(index) => {
                let winner = candidates.remove(index);
                self.remove_others(&candidates);
                Ok(Outcome::HandedOff(winner))
            }
            None => {
                warn!("None of the {} cached launchers could be started", candidates.len());
                self.fetch_fresh()
            }
        }
    }

    /// Returns the index of the first candidate that loads and starts.
    /// Nothing is removed until a launcher is actually running.
    fn attempt(&self, candidates: &[ArtifactDescriptor]) -> Option<usize> {
        let args = build_launcher_args(self.config);
        for (index, candidate) in candidates.iter().enumerate() {
            info!("Trying {}...", candidate.path.display());
            let entry_point = match self.loader.load(candidate) {
                Ok(entry_point) => entry_point,
                Err(e) => {
                    warn!("Failed to load {}: {}", candidate.path.display(), e);
                    continue;
                }
            };

            info!("Launching {} with arguments {:?}", candidate.version, args);
            match entry_point.invoke(args.clone()) {
                Ok(()) => return Some(index),
                Err(e) => warn!("{}", e),
            }
        }
        None
    }

    fn remove_others(&self, losers: &[ArtifactDescriptor]) {
        for loser in losers {
            info!("Removing {}...", loser.path.display());
            if let Err(e) = loser.remove() {
                debug!("{}", e);
            }
        }
    }

    fn fetch_fresh(&self) -> Result<Outcome, BootstrapError> {
        info!("Downloading the launcher...");
        let handle = self.fetcher.start()?;
        Ok(Outcome::Fetching(handle))
    }
}
