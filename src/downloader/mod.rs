mod cooperative;
mod fetch;
mod process;
mod threaded;
pub mod worker;

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::debug;

use crate::config::BatchConfig;
use crate::error::FetchError;
use crate::locator::Locator;
use crate::transport::{HttpTransport, Transport};

pub use fetch::fetch_one;
pub use process::WORKER_COMMAND;

/// Derived file names in the order their fetches finish.
pub(crate) type Completions = BoxStream<'static, Result<String, FetchError>>;

/// How the fetches of one batch are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Strategy {
    /// A bounded pool of OS threads, one blocking fetch per thread.
    #[value(name = "thread")]
    Threaded,
    /// A bounded pool of child processes, one fetch per process.
    #[value(name = "process")]
    Process,
    /// Every fetch multiplexed on the calling task.
    #[value(name = "async")]
    Cooperative,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Threaded, Strategy::Process, Strategy::Cooperative];

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Threaded => "threads",
            Strategy::Process => "processes",
            Strategy::Cooperative => "async tasks",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub filename: String,
    /// Time from batch start until this completion was collected.
    pub elapsed: Duration,
}

pub struct BatchFetcher {
    transport: Arc<dyn Transport>,
    config: BatchConfig,
}

impl BatchFetcher {
    pub fn new(config: BatchConfig) -> Self {
        Self::with_transport(Arc::new(HttpTransport::new()), config)
    }

    /// The process strategy ignores `transport`: its children always speak HTTP.
    pub fn with_transport(transport: Arc<dyn Transport>, config: BatchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Fetches every locator under `strategy`, calling `on_complete` as each
    /// one finishes. Completions come back in finish order.
    ///
    /// The first failure collected is returned at once. Work still in flight
    /// is left to run to completion.
    pub async fn run_batch<F>(
        &self,
        locators: &[Locator],
        strategy: Strategy,
        mut on_complete: F,
    ) -> Result<Vec<Completion>, FetchError>
    where
        F: FnMut(&Completion),
    {
        let started = Instant::now();
        let mut completions = self.dispatch(locators, strategy)?;

        let mut results = Vec::with_capacity(locators.len());
        while let Some(outcome) = completions.next().await {
            let completion = Completion {
                filename: outcome?,
                elapsed: started.elapsed(),
            };
            on_complete(&completion);
            results.push(completion);
        }

        debug!(%strategy, fetched = results.len(), "batch finished");
        Ok(results)
    }

    fn dispatch(&self, locators: &[Locator], strategy: Strategy) -> Result<Completions, FetchError> {
        match strategy {
            Strategy::Threaded => {
                threaded::dispatch(Arc::clone(&self.transport), locators, &self.config)
            }
            Strategy::Process => process::dispatch(locators, &self.config),
            Strategy::Cooperative => Ok(cooperative::dispatch(
                Arc::clone(&self.transport),
                locators,
                &self.config,
            )),
        }
    }
}
