use br_macro_lib::config::AppConfig;
use br_macro_lib::core::orchestrator::SeriesService;
use br_macro_lib::indicators::registry::{IndicatorMetadata, Registry};
use br_macro_lib::models::{Granularity, SeriesOrigin, SeriesRequest, SourceKind};

/// Probes every registered indicator once, grouped by source, and reports
/// whether live data came back.
#[tokio::main]
async fn main() {
    br_macro_lib::init_tracing();

    let config = AppConfig::from_env();
    println!("BCB:  {}", config.bcb_base_url);
    println!("IBGE: {}", config.ibge_base_url);
    println!("Ipea: {}", config.ipea_base_url);

    let service = SeriesService::new(&config);
    let mut live = 0;
    let mut total = 0;

    for source in [SourceKind::Bcb, SourceKind::Ibge, SourceKind::Ipea] {
        let indicators: Vec<IndicatorMetadata> = Registry::get_by_source(source);
        if indicators.is_empty() {
            continue;
        }

        let requests: Vec<SeriesRequest> = indicators
            .iter()
            .map(|ind| SeriesRequest::new(ind.source, ind.series_id.clone(), Granularity::Monthly))
            .collect();
        let results = service.load_many(&requests).await;

        println!("\n[{}]", source.as_str().to_uppercase());
        println!("{:<10} | {:<8} | {:<10} | {:<12} | {:<10}", "Slug", "Series", "Origin", "Latest Key", "Latest Val");
        println!("{}", "-".repeat(64));

        for (ind, loaded) in indicators.iter().zip(&results) {
            total += 1;
            let origin = match loaded.origin {
                SeriesOrigin::Live => {
                    live += 1;
                    "live".to_string()
                }
                SeriesOrigin::Synthetic => format!(
                    "SYNTH~{:.2}",
                    service.fallback_table().baseline(&ind.series_id)
                ),
            };
            match loaded.points.last() {
                Some(p) => println!(
                    "{:<10} | {:<8} | {:<10} | {:<12} | {:.4}",
                    ind.slug, ind.series_id, origin, p.period_key, p.value
                ),
                None => println!("{:<10} | {:<8} | {:<10} | {:<12} | -", ind.slug, ind.series_id, origin, "NO DATA"),
            }
        }
    }

    println!("\n{}/{} indicators returned live data.", live, total);
}
