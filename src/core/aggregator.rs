use crate::models::{CanonicalSeries, Granularity, RawPoint, SeriesPoint, SourceKind};
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Buckets raw upstream points into `granularity`.
///
/// Monthly data passes through one point per observation with its label
/// normalized to `YYYY-MM-DD`. Quarterly (`YYYY-Qn`) and annual (`YYYY`)
/// buckets hold the arithmetic mean of every point that falls into them.
/// The result is sorted ascending by period key; since every key of a given
/// granularity has the same fixed width, string order is chronological.
pub fn aggregate(raw: &[RawPoint], granularity: Granularity, source: SourceKind) -> CanonicalSeries {
    if raw.is_empty() {
        return Vec::new();
    }

    match granularity {
        Granularity::Monthly => pass_through(raw, source),
        Granularity::Quarterly | Granularity::Annual => group_mean(raw, granularity, source),
    }
}

fn pass_through(raw: &[RawPoint], source: SourceKind) -> CanonicalSeries {
    let mut series: CanonicalSeries = raw
        .iter()
        .map(|point| {
            let key = match parse_period(&point.label, source) {
                Some(date) => bucket_key(date, Granularity::Monthly),
                None => {
                    tracing::warn!(%source, label = %point.label, "unrecognised period label, keeping it verbatim");
                    point.label.clone()
                }
            };
            SeriesPoint::new(key, point.value)
        })
        .collect();

    // Stable: observations sharing a date keep upstream order.
    series.sort_by(|a, b| a.period_key.cmp(&b.period_key));
    series
}

fn group_mean(raw: &[RawPoint], granularity: Granularity, source: SourceKind) -> CanonicalSeries {
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();

    for point in raw {
        let Some(date) = parse_period(&point.label, source) else {
            tracing::warn!(%source, label = %point.label, %granularity, "unrecognised period label, skipping point");
            continue;
        };

        let entry = buckets.entry(bucket_key(date, granularity)).or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    // BTreeMap iteration is already ascending by key.
    buckets
        .into_iter()
        .map(|(key, (sum, count))| SeriesPoint::new(key, sum / count as f64))
        .collect()
}

/// Canonical key of the bucket `date` falls into.
pub fn bucket_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Monthly => date.format("%Y-%m-%d").to_string(),
        Granularity::Quarterly => format!("{:04}-Q{}", date.year(), quarter_of(date.month())),
        Granularity::Annual => format!("{:04}", date.year()),
    }
}

/// 1..=4, i.e. ceil(month / 3).
pub fn quarter_of(month: u32) -> u32 {
    (month + 2) / 3
}

/// Reads a period label into the first day it covers.
///
/// Canonical keys are understood for every source, so aggregating an already
/// aggregated series is a no-op. Otherwise the source-native rule applies:
/// BCB uses `DD/MM/YYYY`, IBGE uses `YYYYMM`, Ipeadata uses ISO timestamps.
pub fn parse_period(label: &str, source: SourceKind) -> Option<NaiveDate> {
    let label = label.trim();

    if let Some(date) = parse_canonical(label) {
        return Some(date);
    }

    match source {
        SourceKind::Bcb => NaiveDate::parse_from_str(label, "%d/%m/%Y").ok(),
        SourceKind::Ibge => parse_year_month_code(label),
        SourceKind::Ipea => parse_iso_date(label),
    }
}

fn parse_canonical(label: &str) -> Option<NaiveDate> {
    let bytes = label.as_bytes();
    match bytes.len() {
        // YYYY
        4 if all_digits(bytes) => NaiveDate::from_ymd_opt(label.parse().ok()?, 1, 1),
        // YYYY-Qn
        7 if bytes[4] == b'-' && bytes[5] == b'Q' && all_digits(&bytes[..4]) => {
            let quarter = (bytes[6] as char).to_digit(10)?;
            if !(1..=4).contains(&quarter) {
                return None;
            }
            NaiveDate::from_ymd_opt(label[..4].parse().ok()?, (quarter - 1) * 3 + 1, 1)
        }
        _ => parse_iso_date(label),
    }
}

/// `YYYYMM` period codes as used by SIDRA.
fn parse_year_month_code(label: &str) -> Option<NaiveDate> {
    let bytes = label.as_bytes();
    if bytes.len() != 6 || !all_digits(bytes) {
        return None;
    }
    let year: i32 = label[..4].parse().ok()?;
    let month: u32 = label[4..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Date part of `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ss...`.
pub fn parse_iso_date(label: &str) -> Option<NaiveDate> {
    let date_part = label.trim().get(..10)?;
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn all_digits(bytes: &[u8]) -> bool {
    bytes.iter().all(u8::is_ascii_digit)
}
