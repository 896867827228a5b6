use std::collections::HashMap;

use futures::future::join_all;

use crate::config::AppConfig;
use crate::core::aggregator::aggregate;
use crate::core::fallback::FallbackTable;
use crate::fetcher::bcb::BcbFetcher;
use crate::fetcher::ibge::IbgeFetcher;
use crate::fetcher::ipea::IpeaFetcher;
use crate::fetcher::DataSource;
use crate::models::{CanonicalSeries, Granularity, LoadedSeries, SeriesOrigin, SeriesRequest, SourceKind};

/// Resolves series requests against the registered sources.
///
/// Every request either ends with a live aggregate or with a synthetic series
/// of the same shape; callers never observe a fetch error.
pub struct SeriesService {
    sources: HashMap<SourceKind, Box<dyn DataSource>>,
    fallback: FallbackTable,
}

impl SeriesService {
    /// Service backed by the real BCB, IBGE and Ipeadata endpoints.
    pub fn new(config: &AppConfig) -> Self {
        let sources: Vec<Box<dyn DataSource>> = vec![
            Box::new(BcbFetcher::new(config.bcb_base_url.clone(), &config.user_agent)),
            Box::new(IbgeFetcher::new(config.ibge_base_url.clone(), &config.user_agent)),
            Box::new(IpeaFetcher::new(config.ipea_base_url.clone(), &config.user_agent)),
        ];
        Self::with_sources(sources, config.fallback.clone())
    }

    pub fn with_sources(sources: Vec<Box<dyn DataSource>>, fallback: FallbackTable) -> Self {
        let sources = sources.into_iter().map(|s| (s.kind(), s)).collect();
        Self { sources, fallback }
    }

    pub fn fallback_table(&self) -> &FallbackTable {
        &self.fallback
    }

    /// The canonical series alone, live or synthetic.
    pub async fn fetch_series(&self, source: SourceKind, indicator_id: &str, granularity: Granularity) -> CanonicalSeries {
        self.load_series(source, indicator_id, granularity).await.points
    }

    pub async fn load_series(&self, source: SourceKind, indicator_id: &str, granularity: Granularity) -> LoadedSeries {
        let live = match self.sources.get(&source) {
            Some(fetcher) => match fetcher.fetch_data(indicator_id, granularity).await {
                Ok(raw) => {
                    let series = keep_trailing_buckets(aggregate(&raw, granularity, source), granularity);
                    if series.is_empty() {
                        tracing::info!(%source, indicator_id, %granularity, "no usable data, substituting synthetic series");
                        None
                    } else {
                        Some(series)
                    }
                }
                Err(e) => {
                    tracing::warn!(%source, indicator_id, %granularity, error = %e, "fetch failed, substituting synthetic series");
                    None
                }
            },
            None => {
                tracing::warn!(%source, indicator_id, "no data source registered, substituting synthetic series");
                None
            }
        };

        let (origin, points) = match live {
            Some(points) => (SeriesOrigin::Live, points),
            None => (SeriesOrigin::Synthetic, self.fallback.generate(indicator_id, granularity)),
        };

        tracing::debug!(%source, indicator_id, %granularity, ?origin, count = points.len(), "series ready");

        LoadedSeries {
            indicator_id: indicator_id.to_string(),
            source,
            granularity,
            origin,
            points,
        }
    }

    /// Loads all requests concurrently. Results come back in request order.
    pub async fn load_many(&self, requests: &[SeriesRequest]) -> Vec<LoadedSeries> {
        join_all(
            requests
                .iter()
                .map(|req| self.load_series(req.source, &req.indicator_id, req.granularity)),
        )
        .await
    }
}

/// Quarterly and annual aggregates never carry more buckets than a synthetic
/// series of the same granularity. Monthly data passes through untouched.
fn keep_trailing_buckets(mut series: CanonicalSeries, granularity: Granularity) -> CanonicalSeries {
    if granularity != Granularity::Monthly && series.len() > granularity.bucket_count() {
        let excess = series.len() - granularity.bucket_count();
        tracing::debug!(%granularity, excess, "dropping buckets older than the lookback window");
        series.drain(..excess);
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPoint;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    struct FixedSource {
        kind: SourceKind,
        points: Vec<RawPoint>,
    }

    #[async_trait]
    impl DataSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        fn kind(&self) -> SourceKind {
            self.kind
        }

        async fn fetch_data(&self, _series_id: &str, _granularity: Granularity) -> Result<Vec<RawPoint>> {
            Ok(self.points.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl DataSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Bcb
        }

        async fn fetch_data(&self, series_id: &str, _granularity: Granularity) -> Result<Vec<RawPoint>> {
            Err(anyhow!("connection refused for {}", series_id))
        }
    }

    fn monthly_bcb_points() -> Vec<RawPoint> {
        (1..=12)
            .map(|m| RawPoint::new(format!("01/{:02}/2023", m), m as f64))
            .collect()
    }

    #[tokio::test]
    async fn test_live_series_is_aggregated() {
        let service = SeriesService::with_sources(
            vec![Box::new(FixedSource { kind: SourceKind::Bcb, points: monthly_bcb_points() })],
            FallbackTable::default(),
        );

        let loaded = service.load_series(SourceKind::Bcb, "11", Granularity::Quarterly).await;
        assert_eq!(loaded.origin, SeriesOrigin::Live);
        assert_eq!(loaded.points.len(), 4);
        assert_eq!(loaded.points[0].period_key, "2023-Q1");
        assert_eq!(loaded.points[0].value, 2.0);
    }

    #[tokio::test]
    async fn test_live_quarters_capped_at_bucket_count() {
        let three_years: Vec<RawPoint> = (2021..=2023)
            .flat_map(|y| (1..=12).map(move |m| RawPoint::new(format!("01/{:02}/{}", m, y), 1.0)))
            .collect();
        let service = SeriesService::with_sources(
            vec![Box::new(FixedSource { kind: SourceKind::Bcb, points: three_years })],
            FallbackTable::default(),
        );

        let quarterly = service.fetch_series(SourceKind::Bcb, "11", Granularity::Quarterly).await;
        assert_eq!(quarterly.len(), 8);
        assert_eq!(quarterly[0].period_key, "2022-Q1");
        assert_eq!(quarterly[7].period_key, "2023-Q4");

        // Monthly pass-through is never truncated.
        let monthly = service.fetch_series(SourceKind::Bcb, "11", Granularity::Monthly).await;
        assert_eq!(monthly.len(), 36);
    }

    #[tokio::test]
    async fn test_failure_falls_back_with_same_shape() {
        let service = SeriesService::with_sources(vec![Box::new(FailingSource)], FallbackTable::default());

        for g in Granularity::ALL {
            let loaded = service.load_series(SourceKind::Bcb, "11", g).await;
            assert!(loaded.is_synthetic());
            assert_eq!(loaded.points.len(), g.bucket_count());
        }
    }

    #[tokio::test]
    async fn test_empty_live_result_falls_back() {
        let service = SeriesService::with_sources(
            vec![Box::new(FixedSource { kind: SourceKind::Ibge, points: vec![] })],
            FallbackTable::default(),
        );

        let series = service.fetch_series(SourceKind::Ibge, "1737", Granularity::Annual).await;
        assert_eq!(series.len(), 10);
    }

    #[tokio::test]
    async fn test_unregistered_source_falls_back() {
        let service = SeriesService::with_sources(vec![], FallbackTable::default());
        let loaded = service.load_series(SourceKind::Ipea, "BM12_TJOVER12", Granularity::Monthly).await;
        assert!(loaded.is_synthetic());
        assert_eq!(loaded.points.len(), 12);
    }

    #[tokio::test]
    async fn test_load_many_keeps_request_order() {
        let service = SeriesService::with_sources(
            vec![
                Box::new(FixedSource { kind: SourceKind::Ibge, points: vec![RawPoint::new("202401", 0.42)] }),
                Box::new(FailingSource),
            ],
            FallbackTable::default(),
        );

        let requests = vec![
            SeriesRequest::new(SourceKind::Bcb, "11", Granularity::Monthly),
            SeriesRequest::new(SourceKind::Ibge, "1737", Granularity::Monthly),
            SeriesRequest::new(SourceKind::Bcb, "1", Granularity::Monthly),
        ];
        let results = service.load_many(&requests).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].indicator_id, "11");
        assert!(results[0].is_synthetic());
        assert_eq!(results[1].origin, SeriesOrigin::Live);
        assert_eq!(results[1].points[0].period_key, "2024-01-01");
        assert_eq!(results[2].indicator_id, "1");
    }
}
