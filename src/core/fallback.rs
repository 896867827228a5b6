use crate::core::aggregator::bucket_key;
use crate::models::{CanonicalSeries, Granularity, SeriesPoint};
use chrono::NaiveDate;
use rand::Rng;
use std::collections::HashMap;

pub const DEFAULT_BASELINE: f64 = 5.0;

/// Baseline values for synthetic series, keyed by indicator id.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTable {
    pub baselines: HashMap<String, f64>,
    pub default_baseline: f64,
}

impl Default for FallbackTable {
    fn default() -> Self {
        let baselines = [
            ("11", 10.75),  // Selic
            ("1737", 4.5),  // IPCA
            ("1", 5.0),     // USD/BRL
            ("1207", 2.9),  // PIB
            ("pib", 2.9),
        ]
        .into_iter()
        .map(|(id, v)| (id.to_string(), v))
        .collect();

        Self {
            baselines,
            default_baseline: DEFAULT_BASELINE,
        }
    }
}

impl FallbackTable {
    pub fn baseline(&self, indicator_id: &str) -> f64 {
        self.baselines
            .get(indicator_id)
            .copied()
            .unwrap_or(self.default_baseline)
    }

    /// Synthetic series ending at the current local date.
    pub fn generate(&self, indicator_id: &str, granularity: Granularity) -> CanonicalSeries {
        let today = chrono::Local::now().date_naive();
        self.generate_at(indicator_id, granularity, today, &mut rand::thread_rng())
    }

    /// Synthetic series shaped like a live aggregate: 12 trailing months,
    /// 8 trailing quarters or 10 trailing years up to and including `today`'s
    /// period, each valued at baseline ± the granularity's spread.
    pub fn generate_at<R: Rng + ?Sized>(
        &self,
        indicator_id: &str,
        granularity: Granularity,
        today: NaiveDate,
        rng: &mut R,
    ) -> CanonicalSeries {
        let baseline = self.baseline(indicator_id);
        let spread = granularity.fallback_spread();

        granularity
            .trailing_periods(today)
            .into_iter()
            .map(|date| {
                let noise = if spread > 0.0 { rng.gen_range(-spread..spread) } else { 0.0 };
                SeriesPoint::new(bucket_key(date, granularity), baseline + noise)
            })
            .collect()
    }
}

/// Convenience wrapper over the default table.
pub fn generate_fallback(indicator_id: &str, granularity: Granularity) -> CanonicalSeries {
    FallbackTable::default().generate(indicator_id, granularity)
}
