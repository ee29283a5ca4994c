use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::mpsc::{self, UnboundedReceiver};
use futures::{Stream, StreamExt};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::runtime::Handle;

use super::Completions;
use super::fetch::fetch_one;
use crate::config::BatchConfig;
use crate::error::FetchError;
use crate::locator::Locator;
use crate::transport::Transport;

/// Completion channel that keeps its pool alive. Dropping a rayon pool
/// discards jobs that have not started yet.
struct PoolCompletions {
    _pool: ThreadPool,
    rx: UnboundedReceiver<Result<String, FetchError>>,
}

impl Stream for PoolCompletions {
    type Item = Result<String, FetchError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}

/// Submits every locator to a fresh pool of `config.workers` threads. Each
/// job occupies its thread until the fetch is done.
pub(crate) fn dispatch(
    transport: Arc<dyn Transport>,
    locators: &[Locator],
    config: &BatchConfig,
) -> Result<Completions, FetchError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.workers.get())
        .thread_name(|i| format!("fetch-thread-{}", i))
        .build()?;
    let handle = Handle::current();
    let (tx, rx) = mpsc::unbounded();

    for locator in locators.iter().cloned() {
        let tx = tx.clone();
        let transport = Arc::clone(&transport);
        let handle = handle.clone();
        let output_dir = config.output_dir.clone();

        pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                handle.block_on(fetch_one(transport.as_ref(), &locator, &output_dir))
            }))
            .unwrap_or_else(|payload| {
                Err(FetchError::WorkerCrashed {
                    locator: locator.to_string(),
                    message: panic_message(payload.as_ref()),
                })
            });
            // receiver is gone when the batch stopped collecting early
            let _ = tx.unbounded_send(outcome);
        });
    }

    Ok(PoolCompletions { _pool: pool, rx }.boxed())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "thread panicked".to_string()
    }
}
