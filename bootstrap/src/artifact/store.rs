use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use shared::files::is_temp_file;

use super::descriptor::ArtifactDescriptor;

/// The directory holding cached launcher binaries.
pub struct ArtifactStore {
    dir: PathBuf,
    launcher_name: String,
}

impl ArtifactStore {
    pub fn new(dir: &Path, launcher_name: &str) -> Self {
        ArtifactStore {
            dir: dir.to_path_buf(),
            launcher_name: launcher_name.to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entries(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = match fs::read_dir(&self.dir) {
            Ok(entries) => entries.flatten().map(|entry| entry.path()).collect(),
            Err(_) => Vec::new(),
        };
        paths.sort();
        paths
    }

    /// Removes leftovers of interrupted downloads. Failures are ignored.
    pub fn purge_temp_files(&self) -> usize {
        let mut removed = 0;
        for path in self.entries() {
            if !is_temp_file(&path) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => debug!("Failed to remove {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Candidates in discovery order. Never fails: an unreadable or missing
    /// directory simply has no candidates.
    pub fn list(&self) -> Vec<ArtifactDescriptor> {
        self.entries()
            .into_iter()
            .filter(|path| path.is_file() && !is_temp_file(path))
            .filter_map(|path| ArtifactDescriptor::from_path(&path, &self.launcher_name))
            .inspect(|artifact| info!("Found {}...", artifact.path.display()))
            .collect()
    }
}
