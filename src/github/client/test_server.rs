//! A throwaway HTTP server answering every request with the same canned response.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::github::client::pool::{build_connection_pool, GitHubConnectionPoolManager};

/// Serves `status` (e.g. `"403 Forbidden"`) with a JSON `body` on a random local port. Returns the server's
/// base URL and the amount of requests it has answered so far.
pub async fn serve(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 8192];
            let _ = socket.read(&mut request).await;
            counter.fetch_add(1, Ordering::SeqCst);

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", address), hits)
}

/// Runs a request against a server answering `status` with `body`, returning the resulting upstream error.
pub async fn failed_request(status: &'static str, body: &'static str) -> octocrab::Error {
    let (base_url, _) = serve(status, body).await;
    let pool = build_connection_pool(GitHubConnectionPoolManager::new(None), 1).unwrap();
    let client = pool.get().await.unwrap();

    let result: Result<serde_json::Value, octocrab::Error> =
        client.get(format!("{}/repos/zchee/ghctl", base_url), None::<&()>).await;
    result.unwrap_err()
}
