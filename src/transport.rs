use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::debug;

use crate::error::FetchError;
use crate::locator::Locator;

/// Response body as a stream of chunks.
pub type Body = BoxStream<'static, Result<Bytes, FetchError>>;

/// Retrieves the content behind a locator.
///
/// Only successful responses yield a body; a rejected status is a
/// [`FetchError::Transport`] carrying that status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, locator: &Locator) -> Result<Body, FetchError>;
}

/// Transport over a single shared `reqwest::Client` and its connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, locator: &Locator) -> Result<Body, FetchError> {
        let response = self
            .client
            .get(locator.as_str())
            .send()
            .await
            .map_err(|err| FetchError::transport(locator.as_str(), err))?;

        let status = response.status();
        debug!(%locator, %status, "response received");
        if !status.is_success() {
            return Err(FetchError::Transport {
                locator: locator.to_string(),
                status: Some(status.as_u16()),
                message: format!("server answered {}", status),
            });
        }

        let owner = locator.to_string();
        Ok(response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|err| FetchError::transport(&owner, err)))
            .boxed())
    }
}
