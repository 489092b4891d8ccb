//! Photo retrieval

use crate::types::{CardError, PhotoRef, Result};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Resolves a photo reference to its bytes.
pub trait PhotoFetcher {
    fn fetch(&self, photo: &PhotoRef) -> Result<Vec<u8>>;
}

/// Fetches `http(s)://` URLs over the network, anything else from disk.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl PhotoFetcher for HttpFetcher {
    fn fetch(&self, photo: &PhotoRef) -> Result<Vec<u8>> {
        let url = photo.url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .agent
                .get(url)
                .call()
                .map_err(|e| CardError::Fetch(format!("{url}: {e}")))?;
            let mut bytes = Vec::new();
            response
                .into_reader()
                .read_to_end(&mut bytes)
                .map_err(|e| CardError::Fetch(format!("{url}: {e}")))?;
            Ok(bytes)
        } else {
            let path = url.strip_prefix("file://").unwrap_or(url);
            read_local(Path::new(path))
        }
    }
}

fn read_local(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| CardError::Fetch(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, b"abc").unwrap();

        let fetcher = HttpFetcher::new(Duration::from_secs(1));
        let plain = PhotoRef {
            url: path.display().to_string(),
        };
        let prefixed = PhotoRef {
            url: format!("file://{}", path.display()),
        };
        assert_eq!(fetcher.fetch(&plain).unwrap(), b"abc");
        assert_eq!(fetcher.fetch(&prefixed).unwrap(), b"abc");
    }

    #[test]
    fn test_missing_file_is_fetch_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(1));
        let photo = PhotoRef {
            url: "/definitely/not/here.jpg".to_string(),
        };
        assert!(matches!(fetcher.fetch(&photo), Err(CardError::Fetch(_))));
    }
}
