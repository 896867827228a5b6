use serde::Serialize;
use crate::models::SeriesPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Flat,
}

/// Headline numbers of a series, as shown on a metric card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    /// Last value, 0.0 for an empty series.
    pub latest: f64,
    /// Last minus previous value, 0.0 with fewer than two points.
    pub trend: f64,
    pub direction: TrendDirection,
    /// Mean over the whole series, 0.0 for an empty series.
    pub average: f64,
}

impl MetricSummary {
    pub fn from_series(points: &[SeriesPoint]) -> Self {
        let latest = points.last().map(|p| p.value).unwrap_or(0.0);
        let trend = match points {
            [.., prev, last] => last.value - prev.value,
            _ => 0.0,
        };
        let average = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64
        };

        Self {
            latest,
            trend,
            direction: direction_of(trend),
            average,
        }
    }
}

fn direction_of(trend: f64) -> TrendDirection {
    if trend > 0.0 {
        TrendDirection::Up
    } else if trend < 0.0 {
        TrendDirection::Down
    } else {
        TrendDirection::Flat
    }
}
