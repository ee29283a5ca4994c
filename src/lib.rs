//! Fetches a batch of URLs into local files, scheduling the work on a
//! thread pool, a process pool or a single cooperative task.

pub mod config;
pub mod downloader;
pub mod error;
pub mod locator;
pub mod telemetry;
pub mod transport;
pub mod utils;

pub use config::BatchConfig;
pub use downloader::{BatchFetcher, Completion, Strategy, fetch_one};
pub use error::FetchError;
pub use locator::{Locator, derive_filename};
pub use transport::{HttpTransport, Transport};
