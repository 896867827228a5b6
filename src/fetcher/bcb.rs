use async_trait::async_trait;
use crate::models::{Granularity, RawPoint, SourceKind};
use super::envelope::UpstreamResponse;
use super::{build_client, DataSource};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://api.bcb.gov.br/dados/serie";

/// Banco Central do Brasil SGS series (Selic = 11, CDI = 12, USD/BRL = 1, ...).
pub struct BcbFetcher {
    base_url: String,
    client: Client,
}

impl BcbFetcher {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(user_agent),
        }
    }

    /// Compact `YYYYMMDD` start and end dates of the lookback window.
    pub fn date_range(granularity: Granularity, today: NaiveDate) -> (String, String) {
        let (start, end) = granularity.window(today);
        (
            start.format("%Y%m%d").to_string(),
            end.format("%Y%m%d").to_string(),
        )
    }

    fn series_url(&self, series_id: &str) -> String {
        format!("{}/bcdata.sgs.{}/dados", self.base_url, series_id)
    }
}

#[async_trait]
impl DataSource for BcbFetcher {
    fn name(&self) -> &str {
        "bcb"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Bcb
    }

    async fn fetch_data(&self, series_id: &str, granularity: Granularity) -> Result<Vec<RawPoint>> {
        let today = chrono::Local::now().date_naive();
        let (start, end) = Self::date_range(granularity, today);
        let url = self.series_url(series_id);

        tracing::debug!(series_id, %granularity, %start, %end, "fetching BCB series");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("formato", "json"),
                ("dataInicial", start.as_str()),
                ("dataFinal", end.as_str()),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("BCB API Error: {} - Body: {}", status, error_text));
        }

        let json: Value = resp.json().await?;
        let points = UpstreamResponse::decode(SourceKind::Bcb, json)?.into_raw_points();

        tracing::debug!(series_id, count = points.len(), "BCB series received");
        Ok(points)
    }
}
