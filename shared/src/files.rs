use futures::StreamExt as _;
use reqwest::Client;
use sha1::{Digest, Sha1};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};

use crate::progress::ProgressBar;
use crate::utils::BoxResult;

/// Suffix of files that are still being written.
pub const TEMP_SUFFIX: &str = ".tmp";

pub fn is_temp_file(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(TEMP_SUFFIX))
        .unwrap_or(false)
}

pub fn with_temp_suffix(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

pub async fn hash_file(path: &Path) -> BoxResult<String> {
    let mut file = fs::File::open(path).await?;
    let mut hasher = Sha1::new();
    let mut buffer = [0; 1024];

    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Streams `url` into `path`, creating parent directories. Returns the number of bytes written.
pub async fn download_file<M>(
    client: &Client,
    url: &str,
    path: &Path,
    progress_bar: Arc<dyn ProgressBar<M> + Send + Sync>,
) -> BoxResult<u64> {
    let response = client.get(url).send().await?.error_for_status()?;

    let total_size = response.content_length().unwrap_or(0);
    progress_bar.set_length(total_size);

    if let Some(parent_dir) = path.parent() {
        fs::create_dir_all(parent_dir).await?;
    }
    let mut file = fs::File::create(path).await?;

    let mut written = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        progress_bar.inc(chunk.len() as u64);
    }
    file.flush().await?;
    progress_bar.finish();

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn test_temp_suffix() {
        let path = Path::new("/data/launcher/launcher-1.2.0");
        let temp_path = with_temp_suffix(path);

        assert_eq!(temp_path, Path::new("/data/launcher/launcher-1.2.0.tmp"));
        assert!(is_temp_file(&temp_path));
        assert!(!is_temp_file(path));
        assert!(!is_temp_file(Path::new("/")));
    }

    #[tokio::test]
    async fn test_hash_file() {
        let path = env::temp_dir().join("shared_files_test_hash");
        fs::write(&path, "hello").await.unwrap();

        let hash = hash_file(&path).await.unwrap();
        assert_eq!(hash, "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");

        fs::remove_file(&path).await.unwrap();
    }
}
