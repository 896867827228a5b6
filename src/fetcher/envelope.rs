//! Response envelopes of the upstream services.
//!
//! Each adapter decodes its body into one [`UpstreamResponse`] variant at the
//! boundary. Optional nesting is modelled with `#[serde(default)]`, so a
//! response that lacks the expected fields decodes to an empty series instead
//! of failing halfway through a chain of lookups.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::Value;

use super::parse_value;
use crate::models::{RawPoint, SourceKind};

/// `{"data": "31/01/2024", "valor": "11.25"}`
#[derive(Debug, Clone, Deserialize)]
pub struct BcbObservation {
    pub data: String,
    #[serde(default)]
    pub valor: Value,
}

/// One element of the SIDRA aggregates payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IbgeAggregate {
    #[serde(default)]
    pub resultados: Vec<IbgeResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IbgeResult {
    #[serde(default)]
    pub series: Vec<IbgeSeries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IbgeSeries {
    /// Period code ("202403") to value string.
    #[serde(default)]
    pub serie: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpeaValues {
    #[serde(default)]
    pub value: Vec<IpeaObservation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpeaObservation {
    #[serde(rename = "VALDATA", default)]
    pub date: Option<String>,
    #[serde(rename = "VALVALOR", default)]
    pub value: Value,
}

#[derive(Debug, Clone)]
pub enum UpstreamResponse {
    Bcb(Vec<BcbObservation>),
    Ibge(Vec<IbgeAggregate>),
    Ipea(IpeaValues),
}

impl UpstreamResponse {
    /// Validates a decoded JSON body against the envelope of `kind`.
    ///
    /// BCB bodies must be an array of observations. IBGE and Ipea bodies with
    /// an unexpected shape are treated as carrying no data.
    pub fn decode(kind: SourceKind, json: Value) -> Result<Self> {
        match kind {
            SourceKind::Bcb => serde_json::from_value::<Vec<BcbObservation>>(json)
                .map(UpstreamResponse::Bcb)
                .map_err(|e| anyhow!("Invalid BCB response format: {}", e)),
            SourceKind::Ibge => match serde_json::from_value::<Vec<IbgeAggregate>>(json) {
                Ok(aggregates) => Ok(UpstreamResponse::Ibge(aggregates)),
                Err(e) => {
                    tracing::debug!(error = %e, "IBGE payload has unexpected shape, treating as empty");
                    Ok(UpstreamResponse::Ibge(Vec::new()))
                }
            },
            SourceKind::Ipea => match serde_json::from_value::<IpeaValues>(json) {
                Ok(values) => Ok(UpstreamResponse::Ipea(values)),
                Err(e) => {
                    tracing::debug!(error = %e, "Ipea payload has unexpected shape, treating as empty");
                    Ok(UpstreamResponse::Ipea(IpeaValues::default()))
                }
            },
        }
    }

    pub fn into_raw_points(self) -> Vec<RawPoint> {
        match self {
            UpstreamResponse::Bcb(observations) => observations
                .into_iter()
                .map(|obs| RawPoint::new(obs.data, value_to_f64(&obs.valor)))
                .collect(),
            UpstreamResponse::Ibge(aggregates) => {
                // payload[0].resultados[0].series[0].serie
                let serie = aggregates
                    .into_iter()
                    .next()
                    .and_then(|agg| agg.resultados.into_iter().next())
                    .and_then(|res| res.series.into_iter().next())
                    .and_then(|series| series.serie);

                match serie {
                    Some(map) => map
                        .into_iter()
                        .map(|(period, value)| RawPoint::new(period, value_to_f64(&value)))
                        .collect(),
                    None => {
                        tracing::debug!("IBGE payload carries no serie, treating as empty");
                        Vec::new()
                    }
                }
            }
            UpstreamResponse::Ipea(values) => values
                .value
                .into_iter()
                .filter_map(|obs| {
                    let date = obs.date?;
                    Some(RawPoint::new(date, value_to_f64(&obs.value)))
                })
                .collect(),
        }
    }
}

/// Upstream values arrive as strings, numbers or null; everything that is not
/// a finite number coerces to 0.0.
fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::String(s) => parse_value(s),
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        other => {
            tracing::warn!(value = %other, "missing upstream value, using 0.0");
            0.0
        }
    }
}
