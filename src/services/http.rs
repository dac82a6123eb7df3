//! HTTP clients for the extraction service and agent directory

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, info};

use super::{AgentDirectory, ExtractionService, ServiceError, UploadBatch};
use crate::config::ServicesConfig;
use crate::types::{RawFields, Specialist};

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client, ServiceError> {
    let mut builder = reqwest::Client::builder();
    if let Some(t) = timeout {
        builder = builder.timeout(t);
    }
    Ok(builder.build()?)
}

/// Accepts a bare field map or one wrapped as `{ "extracted_data": { ... } }`.
pub fn parse_extraction_response(body: serde_json::Value) -> Result<RawFields, ServiceError> {
    let fields = match body {
        serde_json::Value::Object(mut map) => match map.remove("extracted_data") {
            Some(inner @ serde_json::Value::Object(_)) => inner,
            Some(_) => {
                return Err(ServiceError::Malformed(
                    "extracted_data is not an object".to_string(),
                ))
            }
            None => serde_json::Value::Object(map),
        },
        other => {
            return Err(ServiceError::Malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            )))
        }
    };
    serde_json::from_value(fields).map_err(|e| ServiceError::Malformed(e.to_string()))
}

/// Accepts a bare list or one wrapped as `{ "agents": [ ... ] }`.
pub fn parse_directory_response(body: serde_json::Value) -> Result<Vec<Specialist>, ServiceError> {
    let list = match body {
        serde_json::Value::Object(mut map) => map
            .remove("agents")
            .ok_or_else(|| ServiceError::Malformed("missing 'agents' list".to_string()))?,
        other => other,
    };
    serde_json::from_value(list).map_err(|e| ServiceError::Malformed(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

// ============================================================================
// Extraction
// ============================================================================

#[derive(Clone)]
pub struct HttpExtractionClient {
    http: reqwest::Client,
    url: String,
}

impl HttpExtractionClient {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        Ok(Self { http: build_client(timeout)?, url: url.to_string() })
    }

    pub fn from_config(services: &ServicesConfig) -> Result<Self, ServiceError> {
        Self::new(&services.extraction_url, services.timeout_secs.map(Duration::from_secs))
    }
}

#[async_trait]
impl ExtractionService for HttpExtractionClient {
    async fn extract(&self, batch: &UploadBatch) -> Result<RawFields, ServiceError> {
        let mut form = Form::new();
        for doc in batch.documents() {
            let mut part = Part::bytes(doc.bytes.clone()).file_name(doc.name.clone());
            if let Some(ct) = &doc.content_type {
                part = part.mime_str(ct)?;
            }
            form = form.part("files", part);
        }

        info!(url = %self.url, files = batch.len(), bytes = batch.total_bytes(), "Sending extraction request");
        let resp = self.http.post(&self.url).multipart(form).send().await?;
        if !resp.status().is_success() {
            return Err(ServiceError::ServerError(resp.status()));
        }

        let body: serde_json::Value = resp.json().await?;
        let fields = parse_extraction_response(body)?;
        debug!(fields = fields.len(), "Extraction response parsed");
        Ok(fields)
    }
}

// ============================================================================
// Agent directory
// ============================================================================

#[derive(Clone)]
pub struct HttpAgentDirectory {
    http: reqwest::Client,
    url: String,
}

impl HttpAgentDirectory {
    pub fn new(url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        Ok(Self { http: build_client(timeout)?, url: url.to_string() })
    }

    pub fn from_config(services: &ServicesConfig) -> Result<Self, ServiceError> {
        Self::new(&services.directory_url, services.timeout_secs.map(Duration::from_secs))
    }
}

#[async_trait]
impl AgentDirectory for HttpAgentDirectory {
    async fn list_specialists(&self) -> Result<Vec<Specialist>, ServiceError> {
        let resp = self.http.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(ServiceError::ServerError(resp.status()));
        }
        let body: serde_json::Value = resp.json().await?;
        let specialists = parse_directory_response(body)?;
        info!(count = specialists.len(), "Agent directory loaded");
        Ok(specialists)
    }
}
