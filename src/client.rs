//! Prometheus HTTP API range queries.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Deserialize;

use crate::store::{Point, QueryResult, SampleStream};
use crate::timeframe::ReportWindow;

const QUERY_RANGE_PATH: &str = "/api/v1/query_range";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("prometheus returned {error_type}: {message}")]
    Api { error_type: String, message: String },
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    status: String,
    #[serde(default)]
    data: Option<ApiData>,
    #[serde(default, rename = "errorType")]
    error_type: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(rename = "resultType")]
    result_type: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RawStream {
    #[serde(default)]
    metric: BTreeMap<String, String>,
    #[serde(default)]
    values: Vec<(f64, String)>,
}

impl RawStream {
    fn into_stream(self) -> SampleStream {
        let mut points = Vec::with_capacity(self.values.len());
        for (ts, raw) in self.values {
            match parse_sample_value(&raw) {
                Some(value) => points.push(Point { ts, value }),
                None => debug!("Skipping unparsable sample {raw:?} at {ts}"),
            }
        }
        SampleStream {
            labels: self.metric,
            points,
        }
    }
}

/// Prometheus encodes sample values as strings, including `+Inf`/`NaN`.
fn parse_sample_value(raw: &str) -> Option<f64> {
    match raw {
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

/// Decodes a `/api/v1/query_range` response body.
pub fn parse_response(body: &str) -> Result<QueryResult, ClientError> {
    let response: ApiResponse = serde_json::from_str(body)?;
    for warning in &response.warnings {
        warn!("Prometheus warning: {warning}");
    }
    if response.status != "success" {
        return Err(ClientError::Api {
            error_type: response.error_type.unwrap_or_else(|| response.status.clone()),
            message: response.error.unwrap_or_default(),
        });
    }
    let Some(data) = response.data else {
        return Ok(QueryResult::Unsupported("none".to_string()));
    };
    if data.result_type != "matrix" {
        return Ok(QueryResult::Unsupported(data.result_type));
    }
    let raw: Vec<RawStream> = serde_json::from_value(data.result)?;
    Ok(QueryResult::Matrix(
        raw.into_iter().map(RawStream::into_stream).collect(),
    ))
}

fn unix_seconds(ts: DateTime<Utc>) -> String {
    ts.timestamp().to_string()
}

/// Blocking client bound to one Prometheus base URL.
pub struct PrometheusClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl PrometheusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(PrometheusClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn query_range_url(&self) -> String {
        format!("{}{}", self.base_url, QUERY_RANGE_PATH)
    }

    pub fn query_range(&self, query: &str, window: &ReportWindow) -> Result<QueryResult, ClientError> {
        let url = self.query_range_url();
        let start = unix_seconds(window.start);
        let end = unix_seconds(window.end);
        let step = window.step.as_secs().to_string();
        debug!("GET {url} query={query} start={start} end={end} step={step}s");
        let body = self
            .http
            .get(&url)
            .query(&[
                ("query", query),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("step", step.as_str()),
            ])
            .send()?
            .text()?;
        parse_response(&body)
    }
}
