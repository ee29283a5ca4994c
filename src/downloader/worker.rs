//! One-shot fetch run inside a child process, and the report it hands back
//! to the parent on stdout.

use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::fetch::fetch_one;
use crate::error::FetchError;
use crate::locator::Locator;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transport,
    Filesystem,
    Crashed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WorkerReport {
    Fetched {
        filename: String,
    },
    Failed {
        kind: FailureKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
}

impl WorkerReport {
    pub fn from_outcome(outcome: &Result<String, FetchError>) -> Self {
        match outcome {
            Ok(filename) => WorkerReport::Fetched {
                filename: filename.clone(),
            },
            Err(FetchError::Transport {
                status, message, ..
            }) => WorkerReport::Failed {
                kind: FailureKind::Transport,
                message: message.clone(),
                status: *status,
            },
            Err(FetchError::Filesystem { source, .. }) => WorkerReport::Failed {
                kind: FailureKind::Filesystem,
                message: source.to_string(),
                status: None,
            },
            Err(other) => WorkerReport::Failed {
                kind: FailureKind::Crashed,
                message: other.to_string(),
                status: None,
            },
        }
    }

    /// Reads the report from the last non-empty line of a worker's stdout.
    pub fn parse(stdout: &[u8]) -> Option<Self> {
        let line = stdout
            .split(|b| *b == b'\n')
            .rev()
            .find(|line| !line.trim_ascii().is_empty())?;
        serde_json::from_slice(line).ok()
    }

    /// Rebuilds the outcome on the parent side of the process boundary.
    pub fn into_result(self, locator: &Locator, output_dir: &Path) -> Result<String, FetchError> {
        match self {
            WorkerReport::Fetched { filename } => Ok(filename),
            WorkerReport::Failed {
                kind: FailureKind::Transport,
                message,
                status,
            } => Err(FetchError::Transport {
                locator: locator.to_string(),
                status,
                message,
            }),
            WorkerReport::Failed {
                kind: FailureKind::Filesystem,
                message,
                ..
            } => Err(FetchError::Filesystem {
                path: output_dir.join(locator.filename()),
                source: io::Error::other(message),
            }),
            WorkerReport::Failed {
                kind: FailureKind::Crashed,
                message,
                ..
            } => Err(FetchError::WorkerCrashed {
                locator: locator.to_string(),
                message,
            }),
        }
    }
}

/// Fetches one locator and writes the report as a single JSON line to `out`.
/// Returns whether the fetch succeeded.
pub async fn serve<W: Write>(
    transport: &dyn Transport,
    locator: &Locator,
    output_dir: &Path,
    mut out: W,
) -> io::Result<bool> {
    let outcome = fetch_one(transport, locator, output_dir).await;
    let report = WorkerReport::from_outcome(&outcome);
    serde_json::to_writer(&mut out, &report)?;
    writeln!(out)?;
    out.flush()?;
    Ok(outcome.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::StaticTransport;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_serve_reports_filename() {
        let dir = TempDir::new().unwrap();
        let transport = StaticTransport::new().content("http://host/a.png", 0, b"png");
        let locator = Locator::parse("http://host/a.png").unwrap();
        let mut out = Vec::new();

        let ok = serve(&transport, &locator, dir.path(), &mut out).await.unwrap();

        assert!(ok);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"outcome\":\"fetched\",\"filename\":\"a.png\"}\n"
        );
    }

    #[tokio::test]
    async fn test_rejected_status_survives_the_boundary() {
        let dir = TempDir::new().unwrap();
        let transport = StaticTransport::new().status("http://host/gone.png", 0, 404);
        let locator = Locator::parse("http://host/gone.png").unwrap();
        let mut out = Vec::new();

        let ok = serve(&transport, &locator, dir.path(), &mut out).await.unwrap();
        assert!(!ok);

        let err = WorkerReport::parse(&out)
            .unwrap()
            .into_result(&locator, dir.path())
            .unwrap_err();
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_filesystem_failure_points_at_target_path() {
        let locator = Locator::parse("http://host/x/f.jpg").unwrap();
        let report = WorkerReport::Failed {
            kind: FailureKind::Filesystem,
            message: "Permission denied".to_string(),
            status: None,
        };

        match report.into_result(&locator, Path::new("out")) {
            Err(FetchError::Filesystem { path, source }) => {
                assert_eq!(path, Path::new("out").join("f.jpg"));
                assert_eq!(source.to_string(), "Permission denied");
            }
            other => panic!("expected filesystem error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ignores_noise_before_report() {
        let stdout = b"some stray line\n{\"outcome\":\"fetched\",\"filename\":\"b.png\"}\n\n";
        assert_eq!(
            WorkerReport::parse(stdout),
            Some(WorkerReport::Fetched {
                filename: "b.png".to_string()
            })
        );
        assert_eq!(WorkerReport::parse(b"Segmentation fault"), None);
    }
}
