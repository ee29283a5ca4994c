use std::io;
use std::path::Path;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::FetchError;
use crate::locator::Locator;
use crate::transport::Transport;

/// Retrieves `locator` and stores its body verbatim in `output_dir` under
/// the derived file name, which is returned.
///
/// Nothing is created when the request itself fails. A body that breaks
/// off mid-stream leaves the partially written file behind.
pub async fn fetch_one(
    transport: &dyn Transport,
    locator: &Locator,
    output_dir: &Path,
) -> Result<String, FetchError> {
    let filename = locator.filename();
    let path = output_dir.join(filename);
    if filename.is_empty() {
        return Err(FetchError::filesystem(
            path,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no final path segment", locator),
            ),
        ));
    }

    debug!(%locator, "fetch started");
    let mut body = transport.get(locator).await?;

    let mut file = File::create(&path)
        .await
        .map_err(|err| FetchError::filesystem(&path, err))?;
    let mut written = 0usize;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|err| FetchError::filesystem(&path, err))?;
        written += chunk.len();
    }
    file.flush()
        .await
        .map_err(|err| FetchError::filesystem(&path, err))?;

    debug!(%locator, filename, written, "fetch finished");
    Ok(filename.to_string())
}
