use crate::error::{FetchError, SnapshotError};
use crate::snapshot::write_atomically;
use async_trait::async_trait;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use url::Url;

#[async_trait]
pub trait DocumentSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError>;
}

pub struct HttpFeedSource {
    client: Client,
    url: Url,
}

impl HttpFeedSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let url = Url::parse(url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    pub fn with_client(url: &str, client: Client) -> Result<Self, FetchError> {
        let url = Url::parse(url)?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl DocumentSource for HttpFeedSource {
    async fn fetch(&self) -> Result<Vec<u8>, FetchError> {
        info!(url = %self.url, "downloading sdn feed");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?.to_vec();
        ensure_xml_declaration(&bytes)?;
        info!(bytes = bytes.len(), "sdn feed downloaded");
        Ok(bytes)
    }
}

pub fn ensure_xml_declaration(bytes: &[u8]) -> Result<(), FetchError> {
    let start = bytes
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(bytes.len());

    if bytes[start..].starts_with(b"<?xml") {
        Ok(())
    } else {
        Err(FetchError::NotXml)
    }
}

#[derive(Debug, Clone)]
pub struct FeedArchive {
    path: PathBuf,
}

impl FeedArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, bytes: &[u8]) -> Result<String, FetchError> {
        write_atomically(&self.path, bytes).map_err(|error| match error {
            SnapshotError::Io(error) => FetchError::Io(error),
            other => FetchError::Io(std::io::Error::other(other.to_string())),
        })?;
        Ok(digest(bytes))
    }
}

pub fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
