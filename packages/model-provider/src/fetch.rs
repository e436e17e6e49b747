//! Remote archive download

use crate::error::{ModelError, ModelResult};
use crate::progress::Progress;
use fruitscan_types::futures::StreamExt;
use fruitscan_types::tokio::fs;
use fruitscan_types::tokio::io::{AsyncWriteExt, BufWriter};
use fruitscan_types::tokio::time::Instant;
use fruitscan_types::{async_trait, reqwest};
use std::path::Path;
use std::time::Duration;

/// Source of the model archive
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Downloads `url` into `dest` and returns the number of bytes written.
    async fn fetch(&self, url: &str, dest: &Path, progress: &Progress) -> ModelResult<u64>;
}

/// Streams the archive over HTTP(S) straight to disk
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path, progress: &Progress) -> ModelResult<u64> {
        tracing::info!("Downloading: {} to {}", url, dest.display());

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ModelError::download_with_source(url, "request failed", e))?;

        if !res.status().is_success() {
            return Err(ModelError::download(
                url,
                format!("server responded with {}", res.status()),
            ));
        }

        let total = res.content_length();

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = fs::File::create(dest).await?;
        let mut file = BufWriter::with_capacity(1 << 20, file);

        let mut stream = res.bytes_stream();
        let mut downloaded = 0u64;
        let mut last_emit = Instant::now();

        while let Some(item) = stream.next().await {
            let chunk = item
                .map_err(|e| ModelError::download_with_source(url, "connection interrupted", e))?;
            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if last_emit.elapsed() >= Duration::from_millis(150) {
                progress.download(downloaded, total);
                last_emit = Instant::now();
            }
        }

        file.flush().await?;
        file.get_mut().sync_all().await?;
        progress.download(downloaded, total);

        tracing::info!("Downloaded {} bytes from {}", downloaded, url);
        Ok(downloaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ProvisionEvent;
    use std::sync::{Arc, Mutex};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    const BODY: &[u8] = b"PK\x03\x04not really a model";

    /// Minimal HTTP/1.1 server: `/model.zip` gets `BODY`, anything else a 404.
    async fn serve() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let response = if request.starts_with(b"GET /model.zip ") {
                        let mut response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            BODY.len()
                        )
                        .into_bytes();
                        response.extend_from_slice(BODY);
                        response
                    } else {
                        b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                            .to_vec()
                    };
                    socket.write_all(&response).await.ok();
                    socket.shutdown().await.ok();
                });
            }
        });
        format!("http://{addr}")
    }

    fn local_fetcher() -> HttpFetcher {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpFetcher::with_client(client)
    }

    #[tokio::test]
    async fn streams_body_to_disk_with_progress() {
        let base = serve().await;
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("cache").join("model.zip");

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let progress = Progress::new(Arc::new(move |event: ProvisionEvent| {
            sink.lock().unwrap().push(event)
        }));

        let written = local_fetcher()
            .fetch(&format!("{base}/model.zip"), &dest, &progress)
            .await
            .unwrap();

        assert_eq!(written, BODY.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), BODY.to_vec());
        let len = BODY.len() as u64;
        assert_eq!(
            events.lock().unwrap().last(),
            Some(&ProvisionEvent::Download {
                downloaded: len,
                total: Some(len),
            })
        );
    }

    #[tokio::test]
    async fn error_status_is_a_download_error() {
        let base = serve().await;
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("model.zip");
        let url = format!("{base}/missing.zip");

        let err = local_fetcher()
            .fetch(&url, &dest, &Progress::none())
            .await
            .unwrap_err();

        match err {
            ModelError::Download {
                url: failed,
                message,
                ..
            } => {
                assert_eq!(failed, url);
                assert!(message.contains("404"), "{message}");
            }
            other => panic!("expected a download error, got {other:?}"),
        }
        assert!(!dest.exists());
    }
}
