use std::cmp::Ordering;
use std::env::consts::EXE_SUFFIX;
use std::path::{Path, PathBuf};

use semver::Version;

#[derive(thiserror::Error, Debug)]
#[error("Failed to remove {path}: {source}")]
pub struct CleanupError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// A cached launcher binary, named `<launcher_name>-<version><EXE_SUFFIX>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub path: PathBuf,
    pub version: Version,
}

pub fn artifact_file_name(launcher_name: &str, version: &Version) -> String {
    format!("{}-{}{}", launcher_name, version, EXE_SUFFIX)
}

fn strip_suffix_ignore_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    if s.len() < suffix.len() || !s.is_char_boundary(s.len() - suffix.len()) {
        return None;
    }
    let (head, tail) = s.split_at(s.len() - suffix.len());
    if tail.eq_ignore_ascii_case(suffix) {
        Some(head)
    } else {
        None
    }
}

pub fn parse_artifact_version(file_name: &str, launcher_name: &str) -> Option<Version> {
    let stem = strip_suffix_ignore_case(file_name, EXE_SUFFIX)?;
    let version = stem.strip_prefix(launcher_name)?.strip_prefix('-')?;
    Version::parse(version).ok()
}

impl ArtifactDescriptor {
    pub fn new(path: PathBuf, version: Version) -> Self {
        ArtifactDescriptor { path, version }
    }

    /// Returns `None` when the file name doesn't follow the naming convention.
    pub fn from_path(path: &Path, launcher_name: &str) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let version = parse_artifact_version(file_name, launcher_name)?;
        Some(Self::new(path.to_path_buf(), version))
    }

    pub fn newer_first(&self, other: &Self) -> Ordering {
        other.version.cmp_precedence(&self.version)
    }

    pub fn remove(&self) -> Result<(), CleanupError> {
        std::fs::remove_file(&self.path).map_err(|source| CleanupError {
            path: self.path.clone(),
            source,
        })
    }
}

/// Stable, so artifacts with equal versions keep their discovery order.
pub fn sort_newest_first(artifacts: &mut [ArtifactDescriptor]) {
    artifacts.sort_by(|a, b| a.newer_first(b));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str, version: &str) -> ArtifactDescriptor {
        ArtifactDescriptor::new(PathBuf::from(name), Version::parse(version).unwrap())
    }

    fn names(artifacts: &[ArtifactDescriptor]) -> Vec<&str> {
        artifacts
            .iter()
            .map(|a| a.path.to_str().unwrap())
            .collect()
    }

    #[test]
    fn test_parse_artifact_version() {
        let name = artifact_file_name("launcher", &Version::new(1, 2, 3));
        assert_eq!(
            parse_artifact_version(&name, "launcher"),
            Some(Version::new(1, 2, 3))
        );

        let prerelease = format!("launcher-2.0.0-beta.1{}", EXE_SUFFIX);
        assert_eq!(
            parse_artifact_version(&prerelease, "launcher"),
            Some(Version::parse("2.0.0-beta.1").unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        let rejected = [
            format!("launcher-1.2.3{}.tmp", EXE_SUFFIX),
            format!("launcher-1.2{}", EXE_SUFFIX),
            format!("launcher1.2.3{}", EXE_SUFFIX),
            format!("other-1.2.3{}", EXE_SUFFIX),
            "launcher-".to_string(),
            "config.json".to_string(),
        ];
        for name in rejected.iter() {
            assert_eq!(parse_artifact_version(name, "launcher"), None, "{}", name);
        }
    }

    #[test]
    fn test_sort_descending_by_version() {
        let mut artifacts = vec![
            artifact("a", "1.0.0"),
            artifact("b", "3.0.0"),
            artifact("c", "2.10.0"),
            artifact("d", "2.9.1"),
            artifact("e", "3.0.0-rc.1"),
        ];
        sort_newest_first(&mut artifacts);

        assert_eq!(names(&artifacts), vec!["b", "e", "c", "d", "a"]);
    }

    #[test]
    fn test_sort_keeps_discovery_order_for_equal_versions() {
        let mut artifacts = vec![
            artifact("first", "1.0.0+build.2"),
            artifact("older", "0.9.0"),
            artifact("second", "1.0.0"),
            artifact("third", "1.0.0+build.1"),
        ];
        sort_newest_first(&mut artifacts);

        assert_eq!(names(&artifacts), vec!["first", "second", "third", "older"]);
    }
}
