use async_trait::async_trait;
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use crate::models::{Granularity, RawPoint, SourceKind};

pub mod bcb;
pub mod envelope;
pub mod ibge;
pub mod ipea;

pub const DEFAULT_USER_AGENT: &str = "BrMacroDashboard/1.0";

/// One upstream statistics service. Implementations only build the request and
/// unwrap the response envelope; bucketing is left to the aggregator.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> SourceKind;
    async fn fetch_data(&self, series_id: &str, granularity: Granularity) -> Result<Vec<RawPoint>>;
}

pub(crate) fn build_client(user_agent: &str) -> Client {
    let mut headers = HeaderMap::new();
    let agent = HeaderValue::from_str(user_agent)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(USER_AGENT, agent);

    Client::builder()
        .default_headers(headers)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Parses an upstream value string. Unparsable input becomes 0.0.
///
/// Accepts both "10.75" and the comma-decimal "10,75" some series use.
pub fn parse_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        if v.is_finite() {
            return v;
        }
    }
    if let Ok(v) = trimmed.replace(',', ".").parse::<f64>() {
        if v.is_finite() {
            return v;
        }
    }
    tracing::warn!(value = raw, "unparsable upstream value, using 0.0");
    0.0
}
