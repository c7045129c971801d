use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::model::{PayloadRecord, Section};

/// A single endpoint request gone wrong. Retry policy lives with the
/// caller, not here.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{section} request failed with status {status}: {body}")]
    Status {
        section: Section,
        status: StatusCode,
        /// Truncated body excerpt for diagnostics.
        body: String,
    },

    #[error("failed to send {section} request")]
    Transport {
        section: Section,
        source: reqwest::Error,
    },

    #[error("failed to parse {section} response")]
    Malformed {
        section: Section,
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Endpoint the failed request was addressed to.
    pub fn section(&self) -> Section {
        match self {
            FetchError::Status { section, .. }
            | FetchError::Transport { section, .. }
            | FetchError::Malformed { section, .. } => *section,
        }
    }

    /// HTTP status of the failed request, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Read access to the weather API, one request per endpoint.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn fetch(&self, section: Section) -> Result<PayloadRecord, FetchError>;
}

fn endpoint_path(section: Section) -> &'static str {
    match section {
        Section::Conditions => "conditions",
        Section::AirQuality => "airquality",
        Section::ForecastHourly | Section::ForecastDaily => "forecasts",
    }
}

/// Query parameters that distinguish the two forecast variants.
fn endpoint_params(section: Section) -> &'static [(&'static str, &'static str)] {
    match section {
        Section::Conditions | Section::AirQuality => &[],
        Section::ForecastHourly => &[("filter", "1hr"), ("limit", "24")],
        Section::ForecastDaily => &[("filter", "day"), ("limit", "7")],
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Vec<PayloadRecord>,
}

/// HTTP client for the Xweather data API.
///
/// One reqwest session is shared across endpoints and refresh cycles;
/// request timeouts are whatever the session defaults to.
#[derive(Debug, Clone)]
pub struct XweatherClient {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    latitude: f64,
    longitude: f64,
}

impl XweatherClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            latitude: config.latitude,
            longitude: config.longitude,
        }
    }

    fn url(&self, section: Section) -> String {
        format!(
            "{}/{}/{},{}",
            self.base_url,
            endpoint_path(section),
            self.latitude,
            self.longitude
        )
    }
}

#[async_trait]
impl WeatherApi for XweatherClient {
    async fn fetch(&self, section: Section) -> Result<PayloadRecord, FetchError> {
        let url = self.url(section);
        debug!(%url, endpoint = %section, "fetching endpoint");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("format", "json"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .query(endpoint_params(section))
            .send()
            .await
            .map_err(|source| FetchError::Transport { section, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Transport { section, source })?;

        if status != StatusCode::OK {
            return Err(FetchError::Status {
                section,
                status,
                body: truncate_body(&body),
            });
        }

        let envelope: Envelope = serde_json::from_str(&body)
            .map_err(|source| FetchError::Malformed { section, source })?;

        // The envelope carries a single record; an empty array reads as an
        // empty record, not an error.
        Ok(envelope.response.into_iter().next().unwrap_or_default())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
