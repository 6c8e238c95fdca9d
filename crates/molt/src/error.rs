use molt_apply::{ApplyError, DIGEST_LEN};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP {status} from {url}")]
    Transport {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed version manifest: {reason}")]
    Manifest { reason: String },

    #[error("manifest digest is {got} bytes, expected {DIGEST_LEN}")]
    DigestLength { got: usize },

    #[error("payload is not in gzip format: {reason}")]
    Decompression { reason: String },

    #[error(transparent)]
    Apply(#[from] ApplyError),
}

impl UpdateError {
    pub(crate) fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.into(),
            source,
        }
    }

    pub(crate) fn transport(url: impl Into<String>, status: reqwest::StatusCode) -> Self {
        Self::Transport {
            url: url.into(),
            status,
        }
    }

    pub(crate) fn manifest(reason: impl Into<String>) -> Self {
        Self::Manifest {
            reason: reason.into(),
        }
    }

    pub(crate) fn decompression(reason: impl Into<String>) -> Self {
        Self::Decompression {
            reason: reason.into(),
        }
    }
}
