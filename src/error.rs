use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {locator}: {message}")]
    Transport {
        locator: String,
        status: Option<u16>,
        message: String,
    },

    #[error("failed to write {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("worker for {locator} crashed: {message}")]
    WorkerCrashed { locator: String, message: String },

    #[error("failed to start worker pool: {0}")]
    PoolStartup(#[from] rayon::ThreadPoolBuildError),

    #[error("cannot locate worker program: {0}")]
    WorkerProgram(#[source] io::Error),
}

impl FetchError {
    pub(crate) fn transport(locator: &str, err: reqwest::Error) -> Self {
        FetchError::Transport {
            locator: locator.to_string(),
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }

    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }

    pub fn is_filesystem(&self) -> bool {
        matches!(self, FetchError::Filesystem { .. })
    }

    /// HTTP status of a rejected response, if that is what failed.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}
