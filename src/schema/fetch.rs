//! Remote document fetching for cross-document `$ref` resolution.
//!
//! - [`SchemaFetcher`] - the capability the dereferencer calls through
//! - [`HttpFetcher`] - `reqwest` implementation
//!
//! The dereferencer only calls a fetcher when remote resolution is enabled;
//! holding one is not permission to use it.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::DerefConfig;
use crate::error::{AppError, DerefError};

/// Fetches a whole schema document by address.
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Fetches and parses the document at `address`.
    ///
    /// Network failures and non-success responses are errors, never panics.
    async fn fetch(&self, address: &str) -> Result<Value, DerefError>;
}

/// HTTP(S) fetcher backed by a shared `reqwest` client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_document_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, max_document_bytes: u64) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        Ok(Self::with_client(client, max_document_bytes))
    }

    /// Wrap a preconfigured client.
    pub fn with_client(client: reqwest::Client, max_document_bytes: u64) -> Self {
        Self {
            client,
            max_document_bytes,
        }
    }

    pub fn from_config(config: &DerefConfig) -> Result<Self, AppError> {
        Self::new(config.timeout(), config.max_document_bytes)
    }
}

#[async_trait]
impl SchemaFetcher for HttpFetcher {
    async fn fetch(&self, address: &str) -> Result<Value, DerefError> {
        tracing::debug!(address, "Fetching remote schema");

        let fetch_err = |message: String| DerefError::Fetch {
            address: address.to_string(),
            message,
        };

        let response = self
            .client
            .get(address)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DerefError::Status {
                address: address.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_document_bytes {
                return Err(fetch_err(too_large(len, self.max_document_bytes)));
            }
        }

        let body = read_body_with_limit(response, self.max_document_bytes)
            .await
            .map_err(fetch_err)?;

        serde_json::from_slice(&body).map_err(|e| fetch_err(e.to_string()))
    }
}

/// Read a response body chunk by chunk, failing as soon as it grows past
/// `limit`. A missing or lying `Content-Length` cannot bypass the cap.
async fn read_body_with_limit(mut response: reqwest::Response, limit: u64) -> Result<Vec<u8>, String> {
    let mut body = Vec::new();
    let mut total: u64 = 0;

    while let Some(chunk) = response.chunk().await.map_err(|e| e.to_string())? {
        total = total.saturating_add(chunk.len() as u64);
        if total > limit {
            return Err(too_large(total, limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(body)
}

fn too_large(size: u64, limit: u64) -> String {
    format!("document exceeds {limit} bytes (read {size})")
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one connection with the given raw response parts.
    async fn serve_once(parts: Vec<Vec<u8>>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = vec![0u8; 4096];
            let _ = socket.read(&mut request).await;
            for part in parts {
                // The client hangs up early when it rejects a body
                if socket.write_all(&part).await.is_err() {
                    return;
                }
            }
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}/schema.json")
    }

    fn fetcher(limit: u64) -> HttpFetcher {
        let client = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpFetcher::with_client(client, limit)
    }

    fn response(status: &str, body: &str) -> Vec<Vec<u8>> {
        vec![format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .into_bytes()]
    }

    #[tokio::test]
    async fn test_fetch_parses_document() {
        let address = serve_once(response("200 OK", r#"{"title": "Remote"}"#)).await;
        let document = fetcher(1024).fetch(&address).await.unwrap();
        assert_eq!(document, serde_json::json!({"title": "Remote"}));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let address = serve_once(response("404 Not Found", "")).await;
        let err = fetcher(1024).fetch(&address).await.unwrap_err();
        assert_eq!(
            err,
            DerefError::Status {
                address,
                status: 404,
                reason: "Not Found".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_declared_length_over_limit() {
        let address = serve_once(vec![
            b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\nConnection: close\r\n\r\n".to_vec(),
        ])
        .await;
        let err = fetcher(1024).fetch(&address).await.unwrap_err();
        assert!(matches!(err, DerefError::Fetch { ref message, .. } if message.contains("exceeds 1024")));
    }

    #[tokio::test]
    async fn test_chunked_body_over_limit() {
        let mut parts =
            vec![b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\n".to_vec()];
        for _ in 0..64 {
            let mut chunk = b"400\r\n".to_vec();
            chunk.extend(std::iter::repeat(b' ').take(0x400));
            chunk.extend_from_slice(b"\r\n");
            parts.push(chunk);
        }
        parts.push(b"0\r\n\r\n".to_vec());

        let address = serve_once(parts).await;
        let err = fetcher(4096).fetch(&address).await.unwrap_err();
        assert!(matches!(err, DerefError::Fetch { ref message, .. } if message.contains("exceeds 4096")));
    }

    #[tokio::test]
    async fn test_invalid_json_is_fetch_error() {
        let address = serve_once(response("200 OK", "{not json")).await;
        let err = fetcher(1024).fetch(&address).await.unwrap_err();
        assert!(matches!(err, DerefError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(1024)
            .fetch(&format!("http://{addr}/schema.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, DerefError::Fetch { .. }));
    }
}
