use std::fmt;
use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport) while
/// retrieving a URL or reading its body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("{0}")]
    Other(String),
}

/// Per-asset failure. Swallowed by the rewriter, never fatal to a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to download asset {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to save asset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Stage of the page pipeline an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Parse,
    CreateDir,
    Serialize,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fetch => "fetch page",
            Stage::Parse => "parse HTML",
            Stage::CreateDir => "create directory",
            Stage::Serialize => "generate HTML",
            Stage::Persist => "save mirrored HTML",
        };
        f.write_str(name)
    }
}

/// Per-page failure. Reported by the batch driver, which then moves on to the
/// next URL.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("failed to fetch {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("failed to parse HTML from {url}: {source}")]
    Parse {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to {stage} for {url} ({}): {source}", path.display())]
    Io {
        url: String,
        stage: Stage,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PageError {
    pub fn stage(&self) -> Stage {
        match self {
            PageError::Network { .. } => Stage::Fetch,
            PageError::Parse { .. } => Stage::Parse,
            PageError::Io { stage, .. } => *stage,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            PageError::Network { url, .. } | PageError::Parse { url, .. } | PageError::Io { url, .. } => url,
        }
    }
}
