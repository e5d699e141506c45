//! Shared HTTP transport for hosted inference models.
//!
//! `HubClient` wraps a `reqwest::Client` with pre-built auth headers and the
//! two roots every hosted model is reached through: the inference endpoint
//! and the hub API used for availability probes.

use crate::config::HubConfig;
use anyhow::{Context, Result, bail};
use bytes::Bytes;
use reqwest::{
    Client, Method, Response,
    header::{self, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Shared HTTP transport for hosted models.
#[derive(Clone)]
pub struct HubClient {
    client: Client,
    headers: HeaderMap,
    inference_url: String,
    hub_url: String,
    probe: bool,
    probe_timeout: Duration,
}

impl HubClient {
    /// Build from config. An empty key sends no `Authorization` header.
    pub fn new(client: Client, config: &HubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if !config.api_key.is_empty() {
            let mut auth: HeaderValue = format!("Bearer {}", config.api_key)
                .parse()
                .context("invalid hub api key")?;
            auth.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, auth);
        }
        Ok(Self {
            client,
            headers,
            inference_url: config.inference_url.trim_end_matches('/').to_owned(),
            hub_url: config.hub_url.trim_end_matches('/').to_owned(),
            probe: config.probe,
            probe_timeout: config.probe_timeout(),
        })
    }

    /// Inference endpoint of `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/{model}", self.inference_url)
    }

    /// Check that `model` exists on the hub. A no-op when probing is off.
    pub async fn probe(&self, model: &str) -> Result<()> {
        if model.trim().is_empty() {
            bail!("model name is empty");
        }
        if !self.probe {
            return Ok(());
        }

        let url = format!("{}/api/models/{model}", self.hub_url);
        tracing::debug!(%url, "probing model");
        let response = self
            .client
            .request(Method::GET, &url)
            .headers(self.headers.clone())
            .timeout(self.probe_timeout)
            .send()
            .await
            .with_context(|| format!("probing {model}"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{model} is not available on the hub ({status})");
        }
        Ok(())
    }

    /// POST a JSON body to `model` and decode the JSON response.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        model: &str,
        body: &impl Serialize,
    ) -> Result<T> {
        tracing::trace!("request: {}", serde_json::to_string(body)?);
        let response = self
            .client
            .request(Method::POST, self.endpoint(model))
            .headers(self.headers.clone())
            .json(body)
            .send()
            .await
            .with_context(|| format!("calling {model}"))?;
        decode(model, response).await
    }

    /// POST raw bytes with their content type to `model` and decode the
    /// JSON response.
    pub async fn send_bytes<T: DeserializeOwned>(
        &self,
        model: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<T> {
        tracing::trace!("request: {} bytes of {content_type}", bytes.len());
        let response = self
            .client
            .request(Method::POST, self.endpoint(model))
            .headers(self.headers.clone())
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("calling {model}"))?;
        decode(model, response).await
    }
}

/// Decode a model response. Failures carry the hosted `error` message when
/// the body has one.
async fn decode<T: DeserializeOwned>(model: &str, response: Response) -> Result<T> {
    let status = response.status();
    let text = response
        .text()
        .await
        .with_context(|| format!("reading response from {model}"))?;
    tracing::trace!("response: {text}");

    if !status.is_success() {
        bail!("{model} returned {status}: {}", error_message(&text));
    }
    serde_json::from_str(&text).with_context(|| format!("unexpected response from {model}"))
}

fn error_message(body: &str) -> String {
    let error = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error").cloned());
    match error {
        Some(serde_json::Value::String(message)) => message,
        Some(other) => other.to_string(),
        None => body.trim().to_owned(),
    }
}
