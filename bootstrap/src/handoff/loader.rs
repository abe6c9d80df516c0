use std::fs::{self, File};
use std::io::Read as _;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use log::info;

use super::format::{is_native_executable, is_script, HEADER_LEN};
use crate::artifact::descriptor::ArtifactDescriptor;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),
    #[error("{0} is not an executable for this platform")]
    UnknownFormat(PathBuf),
    #[error("{0} is not marked as executable")]
    NotExecutable(PathBuf),
}

#[derive(thiserror::Error, Debug)]
pub enum HandoffError {
    #[error("Failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A resolved launcher that can take over with the given arguments.
pub trait EntryPoint {
    fn invoke(&self, args: Vec<String>) -> Result<(), HandoffError>;
}

pub trait HandoffLoader {
    fn load(&self, artifact: &ArtifactDescriptor) -> Result<Box<dyn EntryPoint>, LoadError>;
}

/// Hands off by starting the cached binary as a separate process.
pub struct ProcessLoader {
    entry_point: Option<String>,
}

impl ProcessLoader {
    pub fn new(entry_point: Option<String>) -> Self {
        ProcessLoader { entry_point }
    }
}

fn read_header(path: &Path) -> Result<Vec<u8>, LoadError> {
    let to_load_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(to_load_error)?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64)
        .read_to_end(&mut header)
        .map_err(to_load_error)?;
    Ok(header)
}

#[cfg(unix)]
fn check_executable(path: &Path, metadata: &fs::Metadata) -> Result<(), LoadError> {
    use std::os::unix::fs::PermissionsExt;

    if metadata.permissions().mode() & 0o111 == 0 {
        return Err(LoadError::NotExecutable(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn check_executable(_path: &Path, _metadata: &fs::Metadata) -> Result<(), LoadError> {
    Ok(())
}

impl HandoffLoader for ProcessLoader {
    fn load(&self, artifact: &ArtifactDescriptor) -> Result<Box<dyn EntryPoint>, LoadError> {
        let path = &artifact.path;
        let metadata = fs::metadata(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        if !metadata.is_file() {
            return Err(LoadError::NotAFile(path.clone()));
        }

        let header = read_header(path)?;
        if !is_native_executable(&header, metadata.len()) && !is_script(&header) {
            return Err(LoadError::UnknownFormat(path.clone()));
        }
        check_executable(path, &metadata)?;

        Ok(Box::new(ProcessEntryPoint {
            program: path.clone(),
            entry_args: self.entry_point.iter().cloned().collect(),
        }))
    }
}

pub struct ProcessEntryPoint {
    program: PathBuf,
    entry_args: Vec<String>,
}

impl ProcessEntryPoint {
    fn spawn(&self, args: Vec<String>) -> Result<Child, HandoffError> {
        let mut command = Command::new(&self.program);
        command.args(&self.entry_args).args(args);
        if let Some(dir) = self.program.parent() {
            command.current_dir(dir);
        }
        command.spawn().map_err(|source| HandoffError::Spawn {
            path: self.program.clone(),
            source,
        })
    }
}

impl EntryPoint for ProcessEntryPoint {
    /// Returns as soon as the launcher process has started.
    fn invoke(&self, args: Vec<String>) -> Result<(), HandoffError> {
        let child = self.spawn(args)?;
        info!("Launcher started with pid {}", child.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use semver::Version;

    use super::*;

    fn setup_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn artifact(path: PathBuf) -> ArtifactDescriptor {
        ArtifactDescriptor::new(path, Version::new(1, 0, 0))
    }

    #[cfg(unix)]
    fn write_script(path: &Path, body: &str, mode: u32) {
        use std::os::unix::fs::PermissionsExt;

        fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_rejects_missing_file() {
        let loader = ProcessLoader::new(None);
        let missing = env::temp_dir().join("bootstrap_test_loader_missing_binary");

        let result = loader.load(&artifact(missing));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_rejects_directory_and_garbage() {
        let dir = setup_dir("bootstrap_test_loader_garbage");
        let garbage = dir.join("garbage");
        fs::write(&garbage, "PK\x03\x04 truncated download").unwrap();
        let empty = dir.join("empty");
        fs::write(&empty, "").unwrap();

        let loader = ProcessLoader::new(None);
        assert!(matches!(
            loader.load(&artifact(dir.clone())),
            Err(LoadError::NotAFile(_))
        ));
        assert!(matches!(
            loader.load(&artifact(garbage)),
            Err(LoadError::UnknownFormat(_))
        ));
        assert!(matches!(
            loader.load(&artifact(empty)),
            Err(LoadError::UnknownFormat(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_script_without_exec_bit() {
        let dir = setup_dir("bootstrap_test_loader_no_exec");
        let script = dir.join("launcher");
        write_script(&script, "exit 0", 0o644);

        let loader = ProcessLoader::new(None);
        assert!(matches!(
            loader.load(&artifact(script)),
            Err(LoadError::NotExecutable(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    fn write_binary(path: &Path, bytes: &[u8]) {
        use std::os::unix::fs::PermissionsExt;

        fs::write(path, bytes).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_rejects_truncated_executable() {
        let dir = setup_dir("bootstrap_test_loader_truncated");
        let truncated = dir.join("launcher");
        write_binary(&truncated, b"\x7fELF truncated");

        let loader = ProcessLoader::new(None);
        assert!(matches!(
            loader.load(&artifact(truncated)),
            Err(LoadError::UnknownFormat(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_native_elf_header_loads() {
        use crate::handoff::format::{native_elf_target, tests::elf_header};

        let dir = setup_dir("bootstrap_test_loader_native_elf");
        let binary = dir.join("launcher");
        write_binary(&binary, &elf_header(&native_elf_target()));

        let loader = ProcessLoader::new(None);
        assert!(loader.load(&artifact(binary)).is_ok());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_point_receives_arguments() {
        let dir = setup_dir("bootstrap_test_loader_spawn");
        let script = dir.join("launcher");
        let args_file = dir.join("args.txt");
        write_script(
            &script,
            &format!("printf '%s\\n' \"$@\" > '{}'", args_file.display()),
            0o755,
        );

        let loader = ProcessLoader::new(None);
        assert!(loader.load(&artifact(script.clone())).is_ok());

        let entry_point = ProcessEntryPoint {
            program: script,
            entry_args: vec!["gui".to_string()],
        };
        let mut child = entry_point
            .spawn(vec!["--dir".to_string(), "/x y".to_string()])
            .unwrap();
        assert!(child.wait().unwrap().success());

        let written = fs::read_to_string(&args_file).unwrap();
        assert_eq!(written, "gui\n--dir\n/x y\n");

        fs::remove_dir_all(&dir).unwrap();
    }
}
