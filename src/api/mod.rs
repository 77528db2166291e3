use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public endpoint serving a random dog image URL
pub const DEFAULT_ENDPOINT: &str = "https://dog.ceo/api/breeds/image/random";

const USER_AGENT: &str = concat!("doggo/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("endpoint returned an error status")]
    Upstream,
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// The payload returned by the dog API.
/// `message` carries the image URL; no validation of its shape is done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub message: String,
    pub status: String,
}

/// Thin client around the dog API. Cheap to clone (reqwest clients share
/// their connection pool), so spawned fetch tasks each take a copy.
#[derive(Debug, Clone)]
pub struct DogApi {
    client: reqwest::Client,
    endpoint: String,
}

impl DogApi {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Fetch one random image descriptor.
    pub async fn random_image(&self) -> Result<ImageDescriptor, ApiError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Request(format!("timeout: {}", e))
                } else if e.is_connect() {
                    ApiError::Request(format!("connect: {}", e))
                } else {
                    ApiError::Request(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream);
        }

        let descriptor: ImageDescriptor = response
            .json()
            .await
            .map_err(|e| ApiError::Malformed(e.to_string()))?;

        // The API reports "success" alongside the URL; the swap does not
        // depend on it, so only log when something looks off.
        if descriptor.status != "success" {
            tracing::warn!("dog API status was {:?}", descriptor.status);
        }

        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a local port.
    async fn stub_server(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn fetches_and_parses_descriptor() {
        let endpoint = stub_server(
            "HTTP/1.1 200 OK",
            r#"{"message":"https://x/a.png","status":"success"}"#,
        )
        .await;

        let api = DogApi::new(endpoint).unwrap();
        let descriptor = api.random_image().await.unwrap();
        assert_eq!(descriptor.message, "https://x/a.png");
        assert_eq!(descriptor.status, "success");
    }

    #[tokio::test]
    async fn non_ok_status_is_upstream_error() {
        let endpoint = stub_server("HTTP/1.1 500 Internal Server Error", "{}").await;

        let api = DogApi::new(endpoint).unwrap();
        let err = api.random_image().await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream));
    }

    #[tokio::test]
    async fn bad_json_is_malformed_error() {
        let endpoint = stub_server("HTTP/1.1 200 OK", "not json at all").await;

        let api = DogApi::new(endpoint).unwrap();
        let err = api.random_image().await.unwrap_err();
        assert!(matches!(err, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = DogApi::new(format!("http://{}", addr)).unwrap();
        let err = api.random_image().await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)));
    }
}
