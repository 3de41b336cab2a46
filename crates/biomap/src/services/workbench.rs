//! Metabolomics Workbench RefMet client.

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::entity::is_dash;
use crate::error::{MapperError, Result};

use super::service::{RefMetRecord, RefMetService};

/// Default RefMet REST base URL.
pub const DEFAULT_WORKBENCH_URL: &str = "https://www.metabolomicsworkbench.org/rest/refmet";

const SERVICE: &str = "metabolomics-workbench";

/// Settings for [`WorkbenchClient`] and the annotator that wraps it.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbenchConfig {
    /// RefMet REST base URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Consecutive failures before lookups are skipped.
    pub failure_threshold: u32,
    /// How long lookups stay skipped once the threshold is reached.
    pub cooldown: Duration,
}

impl Default for WorkbenchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WORKBENCH_URL.to_string(),
            timeout: Duration::from_secs(30),
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Blocking client for the RefMet name-match endpoint.
pub struct WorkbenchClient {
    client: Client,
    config: WorkbenchConfig,
}

impl WorkbenchClient {
    /// Create a client with the given configuration.
    pub fn new(config: WorkbenchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MapperError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &WorkbenchConfig {
        &self.config
    }

    /// URL of the match endpoint for a name, with the name percent-encoded.
    pub fn match_url(&self, name: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| MapperError::Config(format!("Invalid RefMet base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| MapperError::Config("RefMet base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("match")
            .push(name);
        Ok(url)
    }
}

impl RefMetService for WorkbenchClient {
    fn lookup(&self, name: &str) -> Result<Option<RefMetRecord>> {
        let url = self.match_url(name)?;
        debug!("RefMet lookup: {}", url);

        let response = self.client.get(url).send().map_err(|e| {
            error!("RefMet request for '{}' failed: {}", name, e);
            MapperError::service(SERVICE, format!("API request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(MapperError::service(
                SERVICE,
                format!("API error ({}): {}", status, text),
            ));
        }

        let body: Value = response
            .json()
            .map_err(|e| MapperError::service(SERVICE, format!("Failed to parse response: {}", e)))?;
        Ok(parse_match(&body))
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

/// Interpret a match response body.
///
/// The endpoint answers with an empty list (or a `"-"` refmet id) when the
/// name is unknown.
pub fn parse_match(body: &Value) -> Option<RefMetRecord> {
    let object = body.as_object()?;
    let record = RefMetRecord {
        refmet_id: field_text(object, "refmet_id"),
        pubchem_cid: field_text(object, "pubchem_cid"),
        inchi_key: field_text(object, "inchi_key"),
        smiles: field_text(object, "smiles"),
    };
    record.refmet_id.as_ref()?;
    Some(record)
}

fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match object.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() || is_dash(&text) {
        return None;
    }
    Some(text)
}
