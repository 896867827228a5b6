use std::fmt::Write as _;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::Serialize;

use crate::analysis::metrics::{MetricSummary, TrendDirection};
use crate::core::labels::{format_label, format_trend, format_value};
use crate::core::orchestrator::SeriesService;
use crate::indicators::registry::{Category, IndicatorMetadata, Registry};
use crate::models::{Granularity, LoadedSeries, SeriesOrigin, SeriesRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    InterestRates,
    Inflation,
    Gdp,
    ExchangeRates,
}

impl Page {
    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard Macroeconômico",
            Page::InterestRates => "Taxas de Juros",
            Page::Inflation => "Inflação",
            Page::Gdp => "PIB",
            Page::ExchangeRates => "Taxas de Câmbio",
        }
    }

    pub fn indicators(self) -> Vec<IndicatorMetadata> {
        match self {
            Page::Dashboard => Registry::get_headline(),
            Page::InterestRates => Registry::get_by_category(Category::InterestRates),
            Page::Inflation => Registry::get_by_category(Category::Inflation),
            Page::Gdp => Registry::get_by_category(Category::Gdp),
            Page::ExchangeRates => Registry::get_by_category(Category::ExchangeRates),
        }
    }
}

impl FromStr for Page {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "dashboard" | "overview" => Ok(Page::Dashboard),
            "interest_rates" | "interest" | "juros" => Ok(Page::InterestRates),
            "inflation" | "inflacao" => Ok(Page::Inflation),
            "gdp" | "pib" => Ok(Page::Gdp),
            "exchange_rates" | "exchange" | "cambio" => Ok(Page::ExchangeRates),
            other => Err(anyhow!("Unknown page '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricCard {
    pub slug: String,
    pub title: String,
    pub value: String,
    pub trend: String,
    pub direction: TrendDirection,
    pub origin: SeriesOrigin,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelledPoint {
    pub period_key: String,
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndicatorSeries {
    pub slug: String,
    pub name: String,
    pub origin: SeriesOrigin,
    pub points: Vec<LabelledPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub page: Page,
    pub title: String,
    pub period: Granularity,
    pub cards: Vec<MetricCard>,
    pub series: Vec<IndicatorSeries>,
}

/// Loads every indicator of `page` concurrently and shapes the cards and
/// labelled series a renderer needs.
pub async fn build_page(service: &SeriesService, page: Page, granularity: Granularity) -> PageReport {
    let indicators = page.indicators();
    let requests: Vec<SeriesRequest> = indicators
        .iter()
        .map(|ind| SeriesRequest::new(ind.source, ind.series_id.clone(), granularity))
        .collect();

    let loaded = service.load_many(&requests).await;

    let mut cards = Vec::with_capacity(indicators.len());
    let mut series = Vec::with_capacity(indicators.len());
    for (ind, data) in indicators.iter().zip(loaded) {
        cards.push(metric_card(ind, &data));
        if page == Page::Gdp {
            cards.push(average_card(ind, &data));
        }
        series.push(labelled_series(ind, data));
    }

    PageReport {
        page,
        title: page.title().to_string(),
        period: granularity,
        cards,
        series,
    }
}

fn metric_card(ind: &IndicatorMetadata, data: &LoadedSeries) -> MetricCard {
    let summary = MetricSummary::from_series(&data.points);
    MetricCard {
        slug: ind.slug.clone(),
        title: ind.name.clone(),
        value: format_value(summary.latest, &ind.unit),
        trend: format_trend(summary.trend),
        direction: summary.direction,
        origin: data.origin,
    }
}

/// Mean over the loaded period, shown next to the latest GDP reading.
fn average_card(ind: &IndicatorMetadata, data: &LoadedSeries) -> MetricCard {
    let summary = MetricSummary::from_series(&data.points);
    MetricCard {
        slug: format!("{}_avg", ind.slug),
        title: format!("{} (média)", ind.name),
        value: format_value(summary.average, &ind.unit),
        trend: format!("{} períodos", data.points.len()),
        direction: TrendDirection::Flat,
        origin: data.origin,
    }
}

fn labelled_series(ind: &IndicatorMetadata, data: LoadedSeries) -> IndicatorSeries {
    let granularity = data.granularity;
    IndicatorSeries {
        slug: ind.slug.clone(),
        name: ind.name.clone(),
        origin: data.origin,
        points: data
            .points
            .into_iter()
            .map(|p| LabelledPoint {
                label: format_label(&p.period_key, granularity),
                period_key: p.period_key,
                value: p.value,
            })
            .collect(),
    }
}

impl PageReport {
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} - Período: {}", self.title, self.period.display_name());
        let _ = writeln!(out, "{}", "=".repeat(60));

        for card in &self.cards {
            let marker = match card.origin {
                SeriesOrigin::Live => "",
                SeriesOrigin::Synthetic => "  (simulado)",
            };
            let arrow = match card.direction {
                TrendDirection::Up => "↑",
                TrendDirection::Down => "↓",
                TrendDirection::Flat => "→",
            };
            let _ = writeln!(
                out,
                "{:<12} {:>12}  {} {}{}",
                card.title, card.value, arrow, card.trend, marker
            );
        }

        for s in &self.series {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", s.name);
            for p in &s.points {
                let _ = writeln!(out, "  {:<10} {:>10.2}", p.label, p.value);
            }
        }
        out
    }
}
