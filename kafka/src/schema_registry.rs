//! Caching client for a Confluent-compatible schema registry.

use crate::error::{KafkaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

const CONTENT_TYPE: &str = "application/vnd.schemaregistry.v1+json";

/// Configuration for the schema registry client and the serializer built on it.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Base URL of the registry, e.g. `http://localhost:8081`.
    pub url: String,

    /// Maximum number of registrations kept in the in-process cache.
    pub max_cached_schemas: usize,

    /// Timeout applied to every registry request.
    pub request_timeout: Duration,

    /// Initial capacity of the serializer's output buffer.
    pub buffer_bytes: usize,
}

impl RegistryConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_cached_schemas: 1000,
            request_timeout: Duration::from_secs(30),
            buffer_bytes: 100,
        }
    }

    pub fn with_max_cached_schemas(mut self, max: usize) -> Self {
        self.max_cached_schemas = max;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_buffer_bytes(mut self, bytes: usize) -> Self {
        self.buffer_bytes = bytes;
        self
    }
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    #[serde(rename = "schemaType")]
    schema_type: &'a str,
    schema: &'a str,
}

#[derive(Deserialize)]
struct RegisterResponse {
    id: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error_code: i32,
    message: String,
}

/// Schema registry client that caches registrations for the lifetime of the process.
///
/// The cache is bounded by `max_cached_schemas`; once full, new results are still
/// returned but not remembered.
pub struct SchemaRegistryClient {
    http: reqwest::Client,
    base_url: String,
    max_cached_schemas: usize,
    ids: RwLock<HashMap<(String, String), u32>>,
}

impl SchemaRegistryClient {
    /// Creates a client for the registry at `config.url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or the HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let base_url = config.url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(KafkaError::Config("schema registry url must not be empty".into()));
        }
        info!("Creating schema registry client for {}", base_url);

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            max_cached_schemas: config.max_cached_schemas,
            ids: RwLock::new(HashMap::new()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers a JSON schema under `subject` and returns its id.
    ///
    /// The registry returns the existing id when the schema is already registered.
    /// Results are cached per subject and schema text.
    pub async fn register_schema(&self, subject: &str, schema: &str) -> Result<u32> {
        let cache_key = (subject.to_string(), schema.to_string());
        if let Some(id) = self.ids.read().await.get(&cache_key) {
            debug!("Schema id {} for subject '{}' served from cache", id, subject);
            return Ok(*id);
        }

        let url = format!("{}/subjects/{}/versions", self.base_url, subject);
        debug!("Registering schema for subject '{}' at {}", subject, url);

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE)
            .json(&RegisterRequest {
                schema_type: "JSON",
                schema,
            })
            .send()
            .await?;
        let body: RegisterResponse = Self::parse(response).await?;

        info!("Schema for subject '{}' registered with id {}", subject, body.id);
        let mut ids = self.ids.write().await;
        if ids.len() < self.max_cached_schemas {
            ids.insert(cache_key, body.id);
        }
        Ok(body.id)
    }

    async fn parse<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let reason = match serde_json::from_slice::<ErrorResponse>(&bytes) {
                Ok(err) => format!("{} (error code {})", err.message, err.error_code),
                Err(_) => format!("HTTP {}", status),
            };
            warn!("Schema registry request failed: {}", reason);
            return Err(KafkaError::SchemaRegistry(reason));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| KafkaError::SchemaRegistry(format!("unexpected response: {}", e)))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal HTTP endpoint answering every request with the same status and body.
    /// Returns its base URL and a counter of requests served.
    pub(crate) async fn stub_registry(status: u16, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        request.extend_from_slice(&buf[..n]);
                        if request_complete(&request) {
                            break;
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);
                    let response = format!(
                        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    #[test]
    fn empty_url_is_rejected() {
        let result = SchemaRegistryClient::new(&RegistryConfig::new(""));
        assert!(matches!(result, Err(KafkaError::Config(_))));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = SchemaRegistryClient::new(&RegistryConfig::new("http://registry:8081/")).unwrap();
        assert_eq!(client.base_url(), "http://registry:8081");
    }

    #[tokio::test]
    async fn registration_is_cached() {
        let (url, hits) = stub_registry(200, r#"{"id": 42}"#).await;
        let client = SchemaRegistryClient::new(&RegistryConfig::new(url)).unwrap();

        assert_eq!(client.register_schema("test-topic-value", "{}").await.unwrap(), 42);
        assert_eq!(client.register_schema("test-topic-value", "{}").await.unwrap(), 42);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn full_cache_still_returns_results() {
        let (url, hits) = stub_registry(200, r#"{"id": 7}"#).await;
        let client =
            SchemaRegistryClient::new(&RegistryConfig::new(url).with_max_cached_schemas(0)).unwrap();

        assert_eq!(client.register_schema("s-value", "{}").await.unwrap(), 7);
        assert_eq!(client.register_schema("s-value", "{}").await.unwrap(), 7);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn registry_errors_carry_message() {
        let (url, _) = stub_registry(
            409,
            r#"{"error_code": 409, "message": "Schema being registered is incompatible"}"#,
        )
        .await;
        let client = SchemaRegistryClient::new(&RegistryConfig::new(url)).unwrap();

        let err = client.register_schema("s-value", "{}").await.unwrap_err();
        match err {
            KafkaError::SchemaRegistry(reason) => {
                assert!(reason.contains("incompatible"));
                assert!(reason.contains("409"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_registry_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let client = SchemaRegistryClient::new(
            &RegistryConfig::new(url).with_request_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        assert!(matches!(
            client.register_schema("s-value", "{}").await,
            Err(KafkaError::SchemaRegistry(_))
        ));
    }
}
