use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("sdn document not found: {}", .0.display())]
    DocumentMissing(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document is not valid utf-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("xml parse error: {0}")]
    Xml(String),

    #[error("document has no root element")]
    MissingRoot,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("no snapshot has been written")]
    Missing,

    #[error("snapshot path has no parent directory: {}", .0.display())]
    InvalidPath(PathBuf),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("download request timed out")]
    Timeout,

    #[error("failed to download: {0}")]
    Http(reqwest::Error),

    #[error("failed to download: upstream returned {0}")]
    Status(u16),

    #[error("downloaded content is not valid XML")]
    NotXml,

    #[error("downloaded content is malformed: {0}")]
    Malformed(#[from] TransformError),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to store document: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if let Some(status) = error.status() {
            Self::Status(status.as_u16())
        } else {
            Self::Http(error)
        }
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("failed to reset sanctions cache: {0}")]
    CacheReset(SnapshotError),

    #[error("sdn feed unavailable: {0}")]
    FeedUnavailable(#[from] TransformError),
}

impl ServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Fetch(FetchError::Timeout) => 504,
            Self::Fetch(FetchError::Http(_) | FetchError::Status(_) | FetchError::NotXml) => 502,
            Self::Fetch(FetchError::Malformed(_)) => 502,
            _ => 500,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let message = match self {
            Self::Fetch(_) | Self::CacheReset(_) => self.to_string(),
            Self::Snapshot(_) | Self::FeedUnavailable(_) => {
                "failed to load sanctions records".to_string()
            }
        };

        ErrorBody {
            status: "error",
            message,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

pub type Result<T, E = ServiceError> = std::result::Result<T, E>;
