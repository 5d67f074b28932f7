use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::{Result, WriterError};
use crate::models::GenerateRequest;
use crate::provider::{ChunkStream, GenerationBackend, StreamFuture};

/// Streams generations from the HTTP endpoint
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                WriterError::InternalError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    pub fn endpoint_url(&self) -> String {
        self.config.endpoint_url()
    }
}

impl GenerationBackend for HttpBackend {
    fn stream_generate(&self, request: &GenerateRequest) -> StreamFuture {
        let url = self.config.endpoint_url();
        let client = self.client.clone();
        let body = serde_json::to_vec(request).map(Bytes::from);

        Box::pin(async move { Self::stream_generate_impl(url, body?, client).await })
    }

    fn name(&self) -> &str {
        "HTTP"
    }
}

impl HttpBackend {
    async fn stream_generate_impl(url: String, body: Bytes, client: Client) -> Result<ChunkStream> {
        info!("Sending {} bytes to: {}", body.len(), url);

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        info!("Backend responded with status: {}", status);

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            debug!(body = %error_body, "Backend error body");

            return Err(WriterError::UpstreamError(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_body.trim()
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(WriterError::from));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_from_config() {
        let config = BackendConfig {
            base_url: "https://writer.example.com".to_string(),
            endpoint_path: "/api/generate-combined".to_string(),
            timeout_secs: 30,
        };
        let backend = HttpBackend::new(config).unwrap();

        assert_eq!(
            backend.endpoint_url(),
            "https://writer.example.com/api/generate-combined"
        );
        assert_eq!(backend.name(), "HTTP");
    }
}
