use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;

use super::Completions;
use super::fetch::fetch_one;
use crate::config::BatchConfig;
use crate::locator::Locator;
use crate::transport::Transport;

/// Builds one fetch future per locator. They are polled only by whoever
/// drains the returned stream, so they interleave at I/O waits but never
/// run in parallel.
pub(crate) fn dispatch(
    transport: Arc<dyn Transport>,
    locators: &[Locator],
    config: &BatchConfig,
) -> Completions {
    locators
        .iter()
        .cloned()
        .map(|locator| {
            let transport = Arc::clone(&transport);
            let output_dir = config.output_dir.clone();
            async move { fetch_one(transport.as_ref(), &locator, &output_dir).await }
        })
        .collect::<FuturesUnordered<_>>()
        .boxed()
}
