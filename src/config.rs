use crate::core::fallback::FallbackTable;
use crate::fetcher::{bcb, ibge, ipea, DEFAULT_USER_AGENT};

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bcb_base_url: String,
    pub ibge_base_url: String,
    pub ipea_base_url: String,
    pub user_agent: String,
    pub fallback: FallbackTable,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bcb_base_url: bcb::DEFAULT_BASE_URL.to_string(),
            ibge_base_url: ibge::DEFAULT_BASE_URL.to_string(),
            ipea_base_url: ipea::DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback: FallbackTable::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset or malformed values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(url) = non_empty("BCB_BASE_URL") {
            config.bcb_base_url = url;
        }
        if let Some(url) = non_empty("IBGE_BASE_URL") {
            config.ibge_base_url = url;
        }
        if let Some(url) = non_empty("IPEA_BASE_URL") {
            config.ipea_base_url = url;
        }
        if let Some(agent) = non_empty("MACRO_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = non_empty("MACRO_DEFAULT_BASELINE") {
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => config.fallback.default_baseline = v,
                _ => tracing::warn!(value = %raw, "ignoring invalid MACRO_DEFAULT_BASELINE"),
            }
        }
        if let Some(raw) = non_empty("MACRO_FALLBACK_BASELINES") {
            config.fallback.baselines.extend(parse_baselines(&raw));
        }

        config
    }
}

/// Parses `"11=10.75, 1737=4.5"`. Malformed pairs are skipped.
fn parse_baselines(raw: &str) -> Vec<(String, f64)> {
    raw.split(',')
        .filter(|pair| !pair.trim().is_empty())
        .filter_map(|pair| {
            let parsed = pair.split_once('=').and_then(|(id, value)| {
                let id = id.trim();
                let value = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
                (!id.is_empty()).then(|| (id.to_string(), value))
            });
            if parsed.is_none() {
                tracing::warn!(entry = pair, "ignoring malformed fallback baseline");
            }
            parsed
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.bcb_base_url, bcb::DEFAULT_BASE_URL);
        assert_eq!(config.ibge_base_url, ibge::DEFAULT_BASE_URL);
        assert_eq!(config.fallback, FallbackTable::default());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("BCB_BASE_URL", "http://127.0.0.1:9000"),
            ("MACRO_DEFAULT_BASELINE", "3.0"),
            ("MACRO_FALLBACK_BASELINES", "11=12.25, 21619=5.45,broken,=1,x=abc"),
        ]));

        assert_eq!(config.bcb_base_url, "http://127.0.0.1:9000");
        assert_eq!(config.fallback.default_baseline, 3.0);
        assert_eq!(config.fallback.baseline("11"), 12.25);
        assert_eq!(config.fallback.baseline("21619"), 5.45);
        assert_eq!(config.fallback.baseline("1737"), 4.5);
        assert_eq!(config.fallback.baseline("x"), 3.0);
    }

    #[test]
    fn test_invalid_default_baseline_is_ignored() {
        let config = AppConfig::from_lookup(lookup_from(&[("MACRO_DEFAULT_BASELINE", "lots")]));
        assert_eq!(config.fallback.default_baseline, crate::core::fallback::DEFAULT_BASELINE);
    }
}
