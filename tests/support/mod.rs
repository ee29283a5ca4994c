#![allow(dead_code)]

use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;

use axum::Router;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;

use batchfetch::{BatchConfig, Locator};

pub const LARGE_SIZE: usize = 1024 * 1024;

/// Serves `content of <path>` for any path, with a few special cases.
async fn serve_path(uri: Uri) -> Response {
    match uri.path() {
        "/missing.png" => StatusCode::NOT_FOUND.into_response(),
        "/broken.png" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "/y/f.jpg" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            "from y".into_response()
        }
        "/slow.png" => {
            tokio::time::sleep(Duration::from_millis(300)).await;
            "content of /slow.png".into_response()
        }
        "/large.bin" => {
            let body: Vec<u8> = (0..LARGE_SIZE).map(|i| (i % 251) as u8).collect();
            body.into_response()
        }
        path => format!("content of {}", path).into_response(),
    }
}

pub async fn start_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new().fallback(serve_path);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

pub fn locators(addr: SocketAddr, paths: &[&str]) -> Vec<Locator> {
    paths
        .iter()
        .map(|p| Locator::parse(&format!("http://{}{}", addr, p)).unwrap())
        .collect()
}

pub fn config(workers: usize, dir: &Path) -> BatchConfig {
    BatchConfig::new(NonZeroUsize::new(workers).unwrap())
        .with_output_dir(dir)
        .with_worker_program(env!("CARGO_BIN_EXE_batchfetch"))
}
