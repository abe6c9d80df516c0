use std::env;
use std::path::PathBuf;

use crate::config::runtime_config::BootstrapConfig;

fn absolute_base_dir(config: &BootstrapConfig) -> PathBuf {
    if config.base_dir.is_absolute() {
        return config.base_dir.clone();
    }
    match env::current_dir() {
        Ok(current_dir) => current_dir.join(&config.base_dir),
        Err(_) => config.base_dir.clone(),
    }
}

/// Arguments passed to the launcher: bootstrap flags first, then the
/// original process arguments verbatim.
pub fn build_launcher_args(config: &BootstrapConfig) -> Vec<String> {
    let mut args = Vec::new();

    if config.portable {
        args.push("--portable".to_string());
    }
    args.push("--dir".to_string());
    args.push(absolute_base_dir(config).to_string_lossy().to_string());
    args.push("--bootstrap-version".to_string());
    args.push(config.bootstrap_version.to_string());
    if let Some(edition) = config.edition.as_ref().filter(|e| !e.is_empty()) {
        args.push("--edition".to_string());
        args.push(edition.clone());
    }
    args.extend(config.original_args.iter().cloned());

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_full_argument_vector() {
        let mut config = BootstrapConfig::new(PathBuf::from("/x/y"), true, vec!["--foo".to_string()]);
        config.bootstrap_version = 1;
        config.edition = Some("gold".to_string());

        assert_eq!(
            build_launcher_args(&config),
            vec![
                "--portable",
                "--dir",
                "/x/y",
                "--bootstrap-version",
                "1",
                "--edition",
                "gold",
                "--foo"
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_optional_flags_are_omitted() {
        let mut config = BootstrapConfig::new(
            PathBuf::from("/data/launcher"),
            false,
            vec!["--dir".to_string(), "b".to_string(), "a".to_string()],
        );
        config.edition = Some(String::new());

        assert_eq!(
            build_launcher_args(&config),
            vec![
                "--dir",
                "/data/launcher",
                "--bootstrap-version",
                "1",
                "--dir",
                "b",
                "a"
            ]
        );

        config.edition = None;
        assert_eq!(build_launcher_args(&config).len(), 7);
    }

    #[test]
    fn test_relative_base_dir_is_made_absolute() {
        let config = BootstrapConfig::new(PathBuf::from("relative"), false, vec![]);
        let args = build_launcher_args(&config);

        assert!(PathBuf::from(&args[1]).is_absolute());
        assert!(args[1].ends_with("relative"));
    }
}
