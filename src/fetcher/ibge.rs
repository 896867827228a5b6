use async_trait::async_trait;
use crate::models::{Granularity, RawPoint, SourceKind};
use super::envelope::UpstreamResponse;
use super::{build_client, DataSource};
use anyhow::{Result, anyhow};
use reqwest::Client;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str = "https://servicodados.ibge.gov.br/api/v3";

/// SIDRA variable requested from every aggregate (the percentage change series).
const VARIABLE_ID: &str = "63";
/// National-level locality filter.
const LOCALITIES: &str = "N1[all]";

/// IBGE SIDRA aggregates (IPCA = 1737, INPC = 1736, PIB = 1207, ...).
pub struct IbgeFetcher {
    base_url: String,
    client: Client,
}

impl IbgeFetcher {
    pub fn new(base_url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(user_agent),
        }
    }

    fn aggregate_url(&self, series_id: &str, granularity: Granularity) -> String {
        format!(
            "{}/agregados/{}/periodos/{}/variaveis/{}",
            self.base_url,
            series_id,
            granularity.relative_periods(),
            VARIABLE_ID
        )
    }
}

#[async_trait]
impl DataSource for IbgeFetcher {
    fn name(&self) -> &str {
        "ibge"
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Ibge
    }

    async fn fetch_data(&self, series_id: &str, granularity: Granularity) -> Result<Vec<RawPoint>> {
        let url = self.aggregate_url(series_id, granularity);

        tracing::debug!(series_id, %granularity, %url, "fetching IBGE aggregate");

        let resp = self
            .client
            .get(&url)
            .query(&[("localidades", LOCALITIES)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(anyhow!("IBGE API Error: {}", resp.status()));
        }

        let json: Value = resp.json().await?;
        let points = UpstreamResponse::decode(SourceKind::Ibge, json)?.into_raw_points();

        if points.is_empty() {
            tracing::info!(series_id, "IBGE returned no observations");
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_url() {
        let fetcher = IbgeFetcher::new(DEFAULT_BASE_URL, "test");
        assert_eq!(
            fetcher.aggregate_url("1737", Granularity::Monthly),
            "https://servicodados.ibge.gov.br/api/v3/agregados/1737/periodos/-12/variaveis/63"
        );
        assert_eq!(
            fetcher.aggregate_url("1207", Granularity::Quarterly),
            "https://servicodados.ibge.gov.br/api/v3/agregados/1207/periodos/-8/variaveis/63"
        );
        assert_eq!(
            fetcher.aggregate_url("1207", Granularity::Annual),
            "https://servicodados.ibge.gov.br/api/v3/agregados/1207/periodos/-10/variaveis/63"
        );
    }
}
