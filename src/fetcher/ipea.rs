use async_trait::async_trait;
use crate::core::aggregator::parse_iso_date;
use crate::models::{Granularity, RawPoint, SourceKind};
use super::envelope::UpstreamResponse;
use super::{build_client, DataSource};
use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "http://www.ipeadata.gov.br/api/odata4";

/// Ipeadata OData series (e.g. "BM12_TJOVER12"). The service has no date
/// filter we rely on, so the full history is trimmed locally.
pub struct IpeaFetcher {
    base_url: String,
    client: Client,
}

impl IpeaFetcher {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(user_agent),
        }
    }

    fn values_url(&self, series_id: &str) -> String {
        format!("{}/ValoresSerie(SERCODIGO='{}')", self.base_url, series_id)
    }

    /// Keeps observations inside the lookback window. Points whose date
    /// cannot be read are kept and left for the aggregator to report.
    fn trim_to_window(points: Vec<RawPoint>, granularity: Granularity, today: NaiveDate) -> Vec<RawPoint> {
        let (start, end) = granularity.window(today);
        points
            .into_iter()
            .filter(|p| match parse_iso_date(&p.label) {
                Some(date) => date >= start && date <= end,
                None => true,
            })
            .collect()
    }
}

#[async_trait]
impl DataSource for IpeaFetcher {
    fn name(&self) -> &str {
        "ipea"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Ipea
    }

    async fn fetch_data(&self, series_id: &str, granularity: Granularity) -> Result<Vec<RawPoint>> {
        let url = self.values_url(series_id);

        tracing::debug!(series_id, %granularity, "fetching Ipeadata series");

        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(anyhow!("Ipeadata API Error: {}", resp.status()));
        }

        let json: Value = resp.json().await?;
        let points = UpstreamResponse::decode(SourceKind::Ipea, json)?.into_raw_points();
        let today = chrono::Local::now().date_naive();

        Ok(Self::trim_to_window(points, granularity, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url() {
        let fetcher = IpeaFetcher::new(DEFAULT_BASE_URL, "test");
        assert_eq!(
            fetcher.values_url("BM12_TJOVER12"),
            "http://www.ipeadata.gov.br/api/odata4/ValoresSerie(SERCODIGO='BM12_TJOVER12')"
        );
    }

    #[test]
    fn test_trim_to_window() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let points = vec![
            RawPoint::new("2022-12-01T00:00:00-02:00", 1.0),
            RawPoint::new("2023-07-01T00:00:00-03:00", 2.0),
            RawPoint::new("2024-06-01T00:00:00-03:00", 3.0),
        ];

        let kept = IpeaFetcher::trim_to_window(points.clone(), Granularity::Monthly, today);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].value, 2.0);

        let kept = IpeaFetcher::trim_to_window(points, Granularity::Quarterly, today);
        assert_eq!(kept.len(), 3);
    }
}
