use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One observation as the upstream source labels it ("DD/MM/YYYY", "202403", ...).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RawPoint {
    pub label: String,
    pub value: f64,
}

impl RawPoint {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub period_key: String,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(period_key: impl Into<String>, value: f64) -> Self {
        Self {
            period_key: period_key.into(),
            value,
        }
    }
}

/// Sorted ascending by `period_key`, one entry per key for quarterly/annual data.
pub type CanonicalSeries = Vec<SeriesPoint>;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Monthly,
    Quarterly,
    Annual,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Monthly, Granularity::Quarterly, Granularity::Annual];

    /// Number of periods a full series carries (12 months, 8 quarters, 10 years).
    pub fn bucket_count(self) -> usize {
        match self {
            Granularity::Monthly => 12,
            Granularity::Quarterly => 8,
            Granularity::Annual => 10,
        }
    }

    /// Length of one bucket in months.
    pub fn step_months(self) -> u32 {
        match self {
            Granularity::Monthly => 1,
            Granularity::Quarterly => 3,
            Granularity::Annual => 12,
        }
    }

    /// First day of the bucket containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        let month = match self {
            Granularity::Monthly => date.month(),
            Granularity::Quarterly => (date.month0() / 3) * 3 + 1,
            Granularity::Annual => 1,
        };
        NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
    }

    /// First day of each of the `bucket_count` trailing buckets ending with
    /// the one containing `today`, oldest first.
    pub fn trailing_periods(self, today: NaiveDate) -> Vec<NaiveDate> {
        let anchor = self.period_start(today);
        let step = self.step_months();
        (0..self.bucket_count() as u32)
            .rev()
            .filter_map(|back| anchor.checked_sub_months(Months::new(back * step)))
            .collect()
    }

    /// `(start, end)` of the lookback window ending at `today`. The start is
    /// the first day of the oldest trailing bucket, so data inside the window
    /// never spans more than `bucket_count` buckets.
    pub fn window(self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let anchor = self.period_start(today);
        let back = (self.bucket_count() as u32 - 1) * self.step_months();
        let start = anchor
            .checked_sub_months(Months::new(back))
            .unwrap_or(NaiveDate::MIN);
        (start, today)
    }

    /// Relative period count understood by the IBGE aggregates API.
    pub fn relative_periods(self) -> i32 {
        -(self.bucket_count() as i32)
    }

    /// Half-width of the uniform noise applied to synthetic values.
    pub fn fallback_spread(self) -> f64 {
        match self {
            Granularity::Monthly => 1.0,
            Granularity::Quarterly => 1.5,
            Granularity::Annual => 2.0,
        }
    }

    /// Portuguese label used on the dashboard ("Mensal", "Trimestral", "Anual").
    pub fn display_name(self) -> &'static str {
        match self {
            Granularity::Monthly => "Mensal",
            Granularity::Quarterly => "Trimestral",
            Granularity::Annual => "Anual",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::Annual => "annual",
        };
        f.pad(s)
    }
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensal" | "m" => Ok(Granularity::Monthly),
            "quarterly" | "trimestral" | "q" => Ok(Granularity::Quarterly),
            "annual" | "anual" | "yearly" | "y" => Ok(Granularity::Annual),
            other => Err(anyhow!("Unknown period '{}' (expected monthly, quarterly or annual)", other)),
        }
    }
}

/// Upstream the series is requested from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Banco Central do Brasil, SGS time-series service.
    Bcb,
    /// IBGE SIDRA aggregates service.
    Ibge,
    /// Ipeadata OData service.
    Ipea,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Bcb => "bcb",
            SourceKind::Ibge => "ibge",
            SourceKind::Ipea => "ipea",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "bcb" => Ok(SourceKind::Bcb),
            "ibge" => Ok(SourceKind::Ibge),
            "ipea" | "ipeadata" => Ok(SourceKind::Ipea),
            other => Err(anyhow!("Unknown source '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeriesOrigin {
    Live,
    Synthetic,
}

/// A canonical series plus where it came from. `points` has the same shape
/// whether the data is live or synthetic.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LoadedSeries {
    pub indicator_id: String,
    pub source: SourceKind,
    pub granularity: Granularity,
    pub origin: SeriesOrigin,
    pub points: CanonicalSeries,
}

impl LoadedSeries {
    pub fn is_synthetic(&self) -> bool {
        self.origin == SeriesOrigin::Synthetic
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub source: SourceKind,
    pub indicator_id: String,
    pub granularity: Granularity,
}

impl SeriesRequest {
    pub fn new(source: SourceKind, indicator_id: impl Into<String>, granularity: Granularity) -> Self {
        Self {
            source,
            indicator_id: indicator_id.into(),
            granularity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("Mensal".parse::<Granularity>().unwrap(), Granularity::Monthly);
        assert_eq!("quarterly".parse::<Granularity>().unwrap(), Granularity::Quarterly);
        assert_eq!(" anual ".parse::<Granularity>().unwrap(), Granularity::Annual);
        assert!("weekly".parse::<Granularity>().is_err());
    }

    #[test]
    fn test_lookback_window_starts_on_bucket_boundary() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();
        let (start, end) = Granularity::Monthly.window(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        assert_eq!(end, today);

        let (start, _) = Granularity::Quarterly.window(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2022, 7, 1).unwrap());

        let (start, _) = Granularity::Annual.window(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    }

    #[test]
    fn test_window_on_first_of_month_keeps_twelve_months() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let (start, _) = Granularity::Monthly.window(today);
        assert_eq!(start, NaiveDate::from_ymd_opt(2023, 4, 1).unwrap());
    }

    #[test]
    fn test_trailing_periods_match_window() {
        let today = NaiveDate::from_ymd_opt(2024, 8, 14).unwrap();
        for g in Granularity::ALL {
            let periods = g.trailing_periods(today);
            assert_eq!(periods.len(), g.bucket_count());
            assert_eq!(periods[0], g.window(today).0);
            assert_eq!(*periods.last().unwrap(), g.period_start(today));
        }
    }

    #[test]
    fn test_relative_periods() {
        assert_eq!(Granularity::Monthly.relative_periods(), -12);
        assert_eq!(Granularity::Quarterly.relative_periods(), -8);
        assert_eq!(Granularity::Annual.relative_periods(), -10);
    }

    #[test]
    fn test_series_point_serializes_camel_case() {
        let json = serde_json::to_value(SeriesPoint::new("2024-Q1", 20.0)).unwrap();
        assert_eq!(json["periodKey"], "2024-Q1");
        assert_eq!(json["value"], 20.0);
    }
}
