use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::{error::TransportError, model::Payload, query::Endpoint};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch(&self, endpoint: &Endpoint) -> Result<Payload, TransportError> {
        let res = self
            .http
            .get(endpoint.url.clone())
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            TransportError::Transient(format!(
                "Failed to read OpenWeather response body: {}",
                e.without_url()
            ))
        })?;

        tracing::debug!(%status, bytes = body.len(), "OpenWeather responded");
        classify_response(status, &body)
    }
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        return TransportError::Fatal(format!("Invalid OpenWeather request: {}", err.without_url()));
    }

    let what = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "could not connect"
    } else {
        "failed"
    };

    TransportError::Transient(format!(
        "Request to OpenWeather {what}: {}",
        err.without_url()
    ))
}

/// Decides whether an HTTP exchange delivered a payload.
///
/// Only 2xx and 404 bodies reach the interpreter: OpenWeather reports unknown
/// cities as `404 {"cod":"404",...}`. Rate limiting and server errors are
/// transient whatever the body. Any other status is fatal and carries the
/// provider's `message` when it sent one.
fn classify_response(status: StatusCode, body: &str) -> Result<Payload, TransportError> {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(TransportError::Transient(status_failure(status, body)));
    }

    if !status.is_success() && status != StatusCode::NOT_FOUND {
        return Err(TransportError::Fatal(status_failure(status, body)));
    }

    if body.trim().is_empty() {
        return Err(TransportError::Fatal(format!(
            "OpenWeather returned an empty body with status {status}"
        )));
    }

    match serde_json::from_str::<Payload>(body) {
        Ok(payload) => Ok(payload),
        Err(e) if status.is_success() => Err(TransportError::Fatal(format!(
            "Failed to parse OpenWeather JSON: {e}"
        ))),
        Err(_) => Err(TransportError::Fatal(status_failure(status, body))),
    }
}

fn status_failure(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Payload>(body)
        .ok()
        .and_then(|payload| {
            payload
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate_body(body.trim()));

    if detail.is_empty() {
        format!("OpenWeather request failed with status {status}")
    } else {
        format!("OpenWeather request failed with status {status}: {detail}")
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
