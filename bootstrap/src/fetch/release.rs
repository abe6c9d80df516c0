use reqwest::{Client, Url};
use semver::Version;
use serde::Deserialize;

use super::fetcher::FetchError;

/// Document served at the configured latest-release URL.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct LatestRelease {
    pub version: Version,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
}

impl LatestRelease {
    pub async fn fetch(client: &Client, latest_url: &str) -> Result<Self, FetchError> {
        let release = client
            .get(latest_url)
            .send()
            .await?
            .error_for_status()?
            .json::<LatestRelease>()
            .await?;
        Ok(release)
    }

    /// The download URL may be relative to the document it came from.
    pub fn download_url(&self, latest_url: &str) -> Result<Url, FetchError> {
        let base = Url::parse(latest_url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        base.join(&self.url)
            .map_err(|e| FetchError::InvalidUrl(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_release() {
        let release: LatestRelease = serde_json::from_str(
            r#"{"version": "1.4.0", "url": "https://example.com/launcher-1.4.0", "sha1": "abc"}"#,
        )
        .unwrap();

        assert_eq!(release.version, Version::new(1, 4, 0));
        assert_eq!(release.sha1.as_deref(), Some("abc"));

        let without_hash: LatestRelease =
            serde_json::from_str(r#"{"version": "2.0.0-rc.1", "url": "x"}"#).unwrap();
        assert_eq!(without_hash.sha1, None);
    }

    #[test]
    fn test_rejects_non_semver_version() {
        let result = serde_json::from_str::<LatestRelease>(r#"{"version": "1.4", "url": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_download_url_resolution() {
        let release = LatestRelease {
            version: Version::new(1, 0, 0),
            url: "bin/launcher-1.0.0".to_string(),
            sha1: None,
        };
        let url = release
            .download_url("https://example.com/launcher/latest.json")
            .unwrap();
        assert_eq!(url.as_str(), "https://example.com/launcher/bin/launcher-1.0.0");

        let absolute = LatestRelease {
            url: "https://cdn.example.org/launcher-1.0.0".to_string(),
            ..release
        };
        let url = absolute
            .download_url("https://example.com/launcher/latest.json")
            .unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/launcher-1.0.0");

        assert!(matches!(
            absolute.download_url("not a url"),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
