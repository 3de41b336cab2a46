//! Kestrel KG API client: canonicalization and name search.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

use crate::error::{MapperError, Result};

use super::service::{CanonicalMap, KgService, SearchHit, SearchRequest, SearchResults, SearchService};

/// Default Kestrel API base URL.
pub const DEFAULT_KESTREL_URL: &str = "https://kestrel.nathanpricelab.com/api";

const SERVICE: &str = "kestrel";

/// Connection and batching settings for [`KestrelClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct KestrelConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Value of the `X-API-Key` header.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries after the first attempt for transient faults.
    pub max_retries: u32,
    /// Base delay before the first retry; doubles on every attempt.
    pub retry_backoff: Duration,
    /// Maximum search texts per request.
    pub search_batch_size: usize,
    /// Maximum curies per canonicalize request.
    pub canonicalize_batch_size: usize,
    /// Split oversized requests into chunks.
    pub batching_enabled: bool,
    /// Keep successful responses in memory for the life of the client.
    pub cache_responses: bool,
}

impl Default for KestrelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_KESTREL_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(120),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            search_batch_size: 1000,
            canonicalize_batch_size: 2000,
            batching_enabled: true,
            cache_responses: true,
        }
    }
}

impl KestrelConfig {
    /// Load from `KESTREL_API_URL` (optional) and `KESTREL_API_KEY` (required).
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("KESTREL_API_KEY").map_err(|_| {
            MapperError::Config("KESTREL_API_KEY environment variable not set".to_string())
        })?;
        let base_url = std::env::var("KESTREL_API_URL")
            .unwrap_or_else(|_| DEFAULT_KESTREL_URL.to_string());

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            ..Default::default()
        })
    }

    /// Batch size for the request field of an endpoint, if it is batched.
    fn batch_for(&self, endpoint: &str) -> Option<(&'static str, usize)> {
        match endpoint {
            "canonicalize" => Some(("curies", self.canonicalize_batch_size)),
            "text-search" | "vector-search" | "hybrid-search" => {
                Some(("search_text", self.search_batch_size))
            }
            _ => None,
        }
    }
}

/// Blocking client for the Kestrel API.
///
/// Implements both [`KgService`] and [`SearchService`]. Oversized requests
/// are split into chunks and their object responses merged, so callers
/// always see a single logical round trip.
pub struct KestrelClient {
    client: Client,
    config: KestrelConfig,
    cache: RwLock<HashMap<String, Value>>,
}

impl KestrelClient {
    /// Create a client with the given configuration.
    pub fn new(config: KestrelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MapperError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(KestrelConfig::from_env()?)
    }

    /// The configuration in use.
    pub fn config(&self) -> &KestrelConfig {
        &self.config
    }

    /// Number of cached responses.
    pub fn cached_responses(&self) -> usize {
        self.cache.read().len()
    }

    /// Build headers for API requests.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-API-Key",
            HeaderValue::from_str(&self.config.api_key)
                .map_err(|e| MapperError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }

    /// POST a JSON body to an endpoint, chunking the batch field if needed.
    ///
    /// Every chunk must answer with a JSON object; the objects are merged.
    pub fn post(&self, endpoint: &str, body: Value) -> Result<Map<String, Value>> {
        let chunks = match self.config.batch_for(endpoint) {
            Some((field, size)) if self.config.batching_enabled => {
                chunk_request(&body, field, size)
            }
            _ => vec![body],
        };

        let mut merged = Map::new();
        for chunk in chunks {
            match self.send_cached(endpoint, &chunk)? {
                Value::Object(object) => merged.extend(object),
                other => {
                    return Err(MapperError::service(
                        SERVICE,
                        format!("Expected a JSON object from /{}, got {}", endpoint, other),
                    ));
                }
            }
        }
        Ok(merged)
    }

    fn send_cached(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let key = format!("{}:{}", endpoint, body);
        if self.config.cache_responses {
            if let Some(cached) = self.cache.read().get(&key) {
                debug!("Kestrel cache hit for /{}", endpoint);
                return Ok(cached.clone());
            }
        }

        let response = self.send_with_retry(endpoint, body)?;
        if self.config.cache_responses {
            self.cache.write().insert(key, response.clone());
        }
        Ok(response)
    }

    fn send_with_retry(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let headers = self.build_headers()?;
        let mut attempt = 0;

        loop {
            let can_retry = attempt < self.config.max_retries;
            let result = self.client.post(&url).headers(headers.clone()).json(body).send();

            match result {
                Ok(response) if response.status().is_success() => {
                    return response.json().map_err(|e| {
                        error!("Failed to parse Kestrel response from /{}: {}", endpoint, e);
                        MapperError::service(SERVICE, format!("Failed to parse response: {}", e))
                    });
                }
                Ok(response) if is_transient(response.status()) && can_retry => {
                    warn!(
                        "Kestrel /{} returned {}, retrying (attempt {}/{})",
                        endpoint,
                        response.status(),
                        attempt + 1,
                        self.config.max_retries
                    );
                }
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().unwrap_or_default();
                    error!("Kestrel /{} failed ({}): {}", endpoint, status, text);
                    return Err(MapperError::service(
                        SERVICE,
                        format!("API error ({}): {}", status, text),
                    ));
                }
                Err(e) if (e.is_timeout() || e.is_connect()) && can_retry => {
                    warn!(
                        "Kestrel /{} request failed: {}, retrying (attempt {}/{})",
                        endpoint,
                        e,
                        attempt + 1,
                        self.config.max_retries
                    );
                }
                Err(e) => {
                    error!("Kestrel /{} request failed: {}", endpoint, e);
                    return Err(MapperError::service(SERVICE, format!("API request failed: {}", e)));
                }
            }

            thread::sleep(backoff_delay(self.config.retry_backoff, attempt));
            attempt += 1;
        }
    }
}

impl KgService for KestrelClient {
    fn canonicalize(&self, curies: &[String]) -> Result<CanonicalMap> {
        if curies.is_empty() {
            return Ok(CanonicalMap::new());
        }
        let response = self.post("canonicalize", json!({ "curies": curies }))?;

        // Unknown curies come back null or missing
        Ok(response
            .into_iter()
            .filter_map(|(curie, node)| match node {
                Value::String(node) => Some((curie, node)),
                _ => None,
            })
            .collect())
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

impl SearchService for KestrelClient {
    fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        if request.search_text.is_empty() {
            return Ok(SearchResults::new());
        }

        let mut request = request.clone();
        request.search_text.sort();
        request.search_text.dedup();

        let response = self.post(request.kind.endpoint(), serde_json::to_value(&request)?)?;

        let mut results = SearchResults::new();
        for (text, hits) in response {
            if hits.is_null() {
                continue;
            }
            let hits: Vec<SearchHit> = serde_json::from_value(hits).map_err(|e| {
                MapperError::service(SERVICE, format!("Malformed hits for '{}': {}", text, e))
            })?;
            results.insert(text, hits);
        }
        Ok(results)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Exponential backoff with up to 50% random jitter.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let delay = base.saturating_mul(2u32.saturating_pow(attempt));
    let jitter_ms = (delay.as_millis() as u64) / 2;
    delay + Duration::from_millis(fastrand::u64(0..=jitter_ms))
}

/// Split a request body into several bodies whose `field` array holds at
/// most `size` items. Bodies without an oversized array pass through.
fn chunk_request(body: &Value, field: &str, size: usize) -> Vec<Value> {
    let Some(items) = body.get(field).and_then(Value::as_array) else {
        return vec![body.clone()];
    };
    if size == 0 || items.len() <= size {
        return vec![body.clone()];
    }

    let chunk_count = items.len().div_ceil(size);
    info!("Batching {} items into {} chunks", items.len(), chunk_count);

    items
        .chunks(size)
        .map(|chunk| {
            let mut chunk_body = body.clone();
            chunk_body[field] = Value::Array(chunk.to_vec());
            chunk_body
        })
        .collect()
}
