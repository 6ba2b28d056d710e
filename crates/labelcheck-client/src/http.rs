//! reqwest implementation of [`LabelBackend`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

use labelcheck_core::{defaults, logging};
use labelcheck_core::{Endpoint, Error, LabelBackend, Result, UploadedDocument};

use crate::config::ApiConfig;

/// HTTP client for the document-processing backend.
pub struct HttpBackend {
    client: Client,
    config: ApiConfig,
}

impl HttpBackend {
    /// Create a backend from validated API settings.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        debug!(
            base_url = %config.base_url,
            verify_endpoint = %config.verify_endpoint,
            top_k = ?config.top_k,
            "Initialized HTTP backend"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Send a request and fail on transport errors or non-success status.
    async fn send(&self, endpoint: Endpoint, request: RequestBuilder) -> Result<Response> {
        let start = Instant::now();

        let response = request.send().await.map_err(|e| {
            warn!(
                { logging::ENDPOINT } = %endpoint,
                { logging::ERROR_MSG } = %e,
                "Backend request failed"
            );
            Error::remote_transport(endpoint, format!("Request failed: {}", e))
        })?;

        let status = response.status();
        let elapsed = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                { logging::ENDPOINT } = %endpoint,
                { logging::STATUS } = status.as_u16(),
                { logging::DURATION_MS } = elapsed,
                "Backend returned error status"
            );
            return Err(Error::remote_status(endpoint, status.as_u16(), body));
        }

        debug!(
            { logging::ENDPOINT } = %endpoint,
            { logging::STATUS } = status.as_u16(),
            { logging::DURATION_MS } = elapsed,
            "Backend call complete"
        );
        if elapsed > defaults::SLOW_CALL_MS {
            warn!(
                { logging::ENDPOINT } = %endpoint,
                { logging::DURATION_MS } = elapsed,
                { logging::SLOW } = true,
                "Slow backend call"
            );
        }
        Ok(response)
    }

    async fn send_json<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<T> {
        self.send(endpoint, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| {
                Error::remote_transport(endpoint, format!("Failed to parse response: {}", e))
            })
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    key: String,
}

#[derive(Serialize)]
struct KeyRequest<'a> {
    key: &'a str,
}

#[derive(Deserialize)]
struct ProcessResponse {
    processed_key: String,
}

#[derive(Serialize)]
struct IndexRequest<'a> {
    md_key: &'a str,
    collection: &'a str,
}

#[derive(Serialize)]
struct SecondaryRequest<'a> {
    key: &'a str,
    start_page: u32,
    end_page: u32,
}

#[derive(Serialize)]
struct VerifyRequest<'a> {
    claim_sentence: &'a str,
    collection: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
}

#[async_trait]
impl LabelBackend for HttpBackend {
    #[instrument(skip(self, document), fields(subsystem = "client", component = "http", op = "upload", document = %document.filename()))]
    async fn upload(&self, document: &UploadedDocument) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(document.bytes().to_vec())
            .file_name(document.filename().to_string())
            .mime_str(document.media_type())
            .map_err(|e| Error::Internal(format!("Failed to create multipart: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let request = self
            .client
            .post(self.config.url(defaults::PATH_UPLOAD))
            .multipart(form);

        let response: UploadResponse = self.send_json(Endpoint::Upload, request).await?;
        Ok(response.key)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "extract_primary"))]
    async fn extract_primary(&self, key: &str) -> Result<String> {
        let request = self
            .client
            .post(self.config.url(defaults::PATH_EXTRACT_PRIMARY))
            .json(&KeyRequest { key });

        let response: ProcessResponse = self.send_json(Endpoint::ExtractPrimary, request).await?;
        Ok(response.processed_key)
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "render_markdown"))]
    async fn render_markdown(&self, processed_key: &str) -> Result<String> {
        let request = self
            .client
            .get(self.config.url(defaults::PATH_RENDER_MARKDOWN))
            .query(&[("key", processed_key)]);

        // The markdown key comes back as the raw body, not JSON.
        self.send(Endpoint::RenderMarkdown, request)
            .await?
            .text()
            .await
            .map_err(|e| {
                Error::remote_transport(
                    Endpoint::RenderMarkdown,
                    format!("Failed to read response: {}", e),
                )
            })
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "index_embeddings"))]
    async fn index_embeddings(&self, markdown_key: &str, collection: &str) -> Result<()> {
        let request = self
            .client
            .post(self.config.url(defaults::PATH_INDEX_EMBEDDINGS))
            .json(&IndexRequest {
                md_key: markdown_key,
                collection,
            });

        self.send(Endpoint::IndexEmbeddings, request).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "http", op = "extract_secondary"))]
    async fn extract_secondary(&self, key: &str, start_page: u32, end_page: u32) -> Result<()> {
        let request = self
            .client
            .post(self.config.url(defaults::PATH_EXTRACT_SECONDARY))
            .json(&SecondaryRequest {
                key,
                start_page,
                end_page,
            });

        self.send(Endpoint::ExtractSecondary, request).await?;
        Ok(())
    }

    #[instrument(skip(self, sentence), fields(subsystem = "client", component = "http", op = "verify_claim", endpoint = %self.config.verify_endpoint))]
    async fn verify_claim(&self, sentence: &str, collection: &str) -> Result<JsonValue> {
        let request = self
            .client
            .post(self.config.url(self.config.verify_endpoint.path()))
            .timeout(Duration::from_secs(self.config.verify_timeout_secs))
            .json(&VerifyRequest {
                claim_sentence: sentence,
                collection,
                top_k: self.config.top_k,
            });

        self.send_json(Endpoint::VerifyClaim, request).await
    }
}
