use std::path::Path;
use std::process::Stdio;

use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use tokio::process::Command;
use tracing::{debug, warn};

use super::Completions;
use super::worker::WorkerReport;
use crate::config::BatchConfig;
use crate::error::FetchError;
use crate::locator::Locator;
use crate::utils::limited_spawner::LimitedSpawner;

/// Name of the subcommand the worker program answers to.
pub const WORKER_COMMAND: &str = "worker";

/// Runs each fetch in its own child process, at most `config.workers` at a
/// time. Children are not killed if the batch stops collecting early.
pub(crate) fn dispatch(
    locators: &[Locator],
    config: &BatchConfig,
) -> Result<Completions, FetchError> {
    let program = config
        .resolve_worker_program()
        .map_err(FetchError::WorkerProgram)?;
    let spawner = LimitedSpawner::new(config.workers);

    let running = FuturesUnordered::new();
    for locator in locators.iter().cloned() {
        let program = program.clone();
        let output_dir = config.output_dir.clone();
        let owner = locator.to_string();

        let handle = spawner.spawn(async move { run_child(&program, &locator, &output_dir).await });
        running.push(handle.map(move |joined| {
            joined.unwrap_or_else(|err| {
                Err(FetchError::WorkerCrashed {
                    locator: owner,
                    message: err.to_string(),
                })
            })
        }));
    }

    Ok(running.boxed())
}

async fn run_child(
    program: &Path,
    locator: &Locator,
    output_dir: &Path,
) -> Result<String, FetchError> {
    debug!(%locator, program = %program.display(), "launching worker");
    let output = Command::new(program)
        .arg(WORKER_COMMAND)
        .arg("--output-dir")
        .arg(output_dir)
        .arg(locator.as_str())
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|err| FetchError::WorkerCrashed {
            locator: locator.to_string(),
            message: format!("failed to launch {}: {}", program.display(), err),
        })?;

    match WorkerReport::parse(&output.stdout) {
        Some(report) => report.into_result(locator, output_dir),
        None => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(%locator, status = %output.status, "worker exited without a report");
            Err(FetchError::WorkerCrashed {
                locator: locator.to_string(),
                message: format!("{} without a report: {}", output.status, stderr.trim()),
            })
        }
    }
}
