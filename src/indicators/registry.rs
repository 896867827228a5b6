use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::SourceKind;

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    InterestRates, // Juros
    Inflation,     // Inflação
    Gdp,           // PIB
    ExchangeRates, // Câmbio
}

/// Defines how the indicator value should be formatted/displayed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UnitType {
    /// Percentage (e.g., 10.75 -> "10.75%")
    Percent,
    /// Price in reais (e.g., 5.12 -> "R$ 5.12")
    BrlPrice,
    /// Raw value as-is
    Index,
}

// ============================================================================
// METADATA STRUCT
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorMetadata {
    pub slug: String,
    pub name: String,
    pub source: SourceKind,
    pub category: Category,
    pub description: Option<String>,
    /// Series code sent to the source (SGS code, SIDRA aggregate, Ipea code).
    pub series_id: String,
    pub unit: UnitType,
    /// Shown on the overview page.
    pub headline: bool,
}

macro_rules! ind {
    ($slug:expr, $name:expr, $source:expr, $cat:expr, $desc:expr, $id:expr, $unit:expr, $headline:expr) => {
        IndicatorMetadata {
            slug: $slug.to_string(),
            name: $name.to_string(),
            source: $source,
            category: $cat,
            description: Some($desc.to_string()),
            series_id: $id.to_string(),
            unit: $unit,
            headline: $headline,
        }
    };
    ($slug:expr, $name:expr, $source:expr, $cat:expr, $desc:expr, $id:expr, $unit:expr) => {
        ind!($slug, $name, $source, $cat, $desc, $id, $unit, false)
    };
}

// ============================================================================
// STATIC INDICATOR REGISTRY
// ============================================================================

static INDICATORS: Lazy<Vec<IndicatorMetadata>> = Lazy::new(|| {
    vec![
        // Juros
        ind!("selic", "Taxa Selic", SourceKind::Bcb, Category::InterestRates,
             "Policy rate set by Copom", "11", UnitType::Percent, true),
        ind!("cdi", "CDI", SourceKind::Bcb, Category::InterestRates,
             "Interbank deposit rate", "12", UnitType::Percent),

        // Inflação
        ind!("ipca", "IPCA", SourceKind::Ibge, Category::Inflation,
             "Official consumer price index (monthly change)", "1737", UnitType::Percent, true),
        ind!("igpm", "IGP-M", SourceKind::Bcb, Category::Inflation,
             "General market price index (monthly change)", "189", UnitType::Percent),
        ind!("inpc", "INPC", SourceKind::Ibge, Category::Inflation,
             "National consumer price index (monthly change)", "1736", UnitType::Percent),

        // PIB
        ind!("pib", "PIB", SourceKind::Ibge, Category::Gdp,
             "Gross domestic product at current prices", "1207", UnitType::Percent, true),

        // Câmbio
        ind!("usd_brl", "USD/BRL", SourceKind::Bcb, Category::ExchangeRates,
             "US dollar, sell rate", "1", UnitType::BrlPrice, true),
        ind!("eur_brl", "EUR/BRL", SourceKind::Bcb, Category::ExchangeRates,
             "Euro, sell rate", "21619", UnitType::BrlPrice),
    ]
});

static INDICATOR_MAP: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    INDICATORS
        .iter()
        .enumerate()
        .map(|(idx, ind)| (ind.slug.clone(), idx))
        .collect()
});

// ============================================================================
// REGISTRY STRUCT & IMPL
// ============================================================================

pub struct Registry;

impl Registry {
    pub fn get_all_indicators() -> &'static Vec<IndicatorMetadata> {
        &INDICATORS
    }

    /// Indicators shown on the overview page, in display order
    pub fn get_headline() -> Vec<IndicatorMetadata> {
        INDICATORS.iter().filter(|i| i.headline).cloned().collect()
    }

    pub fn get_by_category(category: Category) -> Vec<IndicatorMetadata> {
        INDICATORS
            .iter()
            .filter(|i| i.category == category)
            .cloned()
            .collect()
    }

    pub fn get_by_source(source: SourceKind) -> Vec<IndicatorMetadata> {
        INDICATORS
            .iter()
            .filter(|i| i.source == source)
            .cloned()
            .collect()
    }

    /// O(1) lookup by slug
    pub fn get_metadata(slug: &str) -> Option<IndicatorMetadata> {
        INDICATOR_MAP
            .get(slug)
            .and_then(|&idx| INDICATORS.get(idx))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_slugs_are_unique_and_resolvable() {
        let all = Registry::get_all_indicators();
        let slugs: HashSet<&str> = all.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs.len(), all.len());

        for ind in all {
            let found = Registry::get_metadata(&ind.slug).unwrap();
            assert_eq!(found.series_id, ind.series_id);
        }
        assert!(Registry::get_metadata("unknown").is_none());
    }

    #[test]
    fn test_lookups() {
        let selic = Registry::get_metadata("selic").unwrap();
        assert_eq!(selic.source, SourceKind::Bcb);
        assert_eq!(selic.series_id, "11");

        let headline: Vec<String> = Registry::get_headline().into_iter().map(|i| i.slug).collect();
        assert_eq!(headline, vec!["selic", "ipca", "pib", "usd_brl"]);

        assert_eq!(Registry::get_by_category(Category::Inflation).len(), 3);
        assert_eq!(Registry::get_by_source(SourceKind::Ibge).len(), 3);
    }
}
