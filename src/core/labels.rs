use crate::core::aggregator::parse_iso_date;
use crate::indicators::registry::UnitType;
use crate::models::Granularity;
use chrono::Datelike;

const MONTHS_PT_BR: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Display label for a period key.
///
/// Quarterly and annual keys are already display-ready. Monthly ISO dates
/// become an abbreviated pt-BR month plus two-digit year ("Mar/24"); any other
/// monthly key is returned as-is.
pub fn format_label(period_key: &str, granularity: Granularity) -> String {
    match granularity {
        Granularity::Quarterly | Granularity::Annual => period_key.to_string(),
        Granularity::Monthly => match parse_iso_date(period_key) {
            Some(date) => format!(
                "{}/{:02}",
                MONTHS_PT_BR[date.month0() as usize],
                date.year().rem_euclid(100)
            ),
            None => period_key.to_string(),
        },
    }
}

/// Card value in the indicator's unit, e.g. "10.75%" or "R$ 5.12".
pub fn format_value(value: f64, unit: &UnitType) -> String {
    match unit {
        UnitType::Percent => format!("{:.2}%", value),
        // Quotes below ten centavos keep four decimals of precision.
        UnitType::BrlPrice if value.abs() < 0.1 => format!("R$ {:.4}", value),
        UnitType::BrlPrice => format!("R$ {:.2}", value),
        UnitType::Index => format!("{:.2}", value),
    }
}

/// Signed change, e.g. "+0.25" / "-0.10" / "0.00".
pub fn format_trend(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{:.2}", delta)
    } else if delta < 0.0 {
        format!("{:.2}", delta)
    } else {
        "0.00".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_iso_label() {
        assert_eq!(format_label("2024-03-15", Granularity::Monthly), "Mar/24");
        assert_eq!(format_label("2023-12-01", Granularity::Monthly), "Dez/23");
        assert_eq!(format_label("2000-02-01", Granularity::Monthly), "Fev/00");
    }

    #[test]
    fn test_aggregated_keys_pass_through() {
        assert_eq!(format_label("2024-Q1", Granularity::Quarterly), "2024-Q1");
        assert_eq!(format_label("2024", Granularity::Annual), "2024");
    }

    #[test]
    fn test_unparsable_monthly_passes_through() {
        assert_eq!(format_label("2024-13-40", Granularity::Monthly), "2024-13-40");
        assert_eq!(format_label("01/03/2024", Granularity::Monthly), "01/03/2024");
        assert_eq!(format_label("", Granularity::Monthly), "");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(10.75, &UnitType::Percent), "10.75%");
        assert_eq!(format_value(5.1234, &UnitType::BrlPrice), "R$ 5.12");
        assert_eq!(format_value(0.0052, &UnitType::BrlPrice), "R$ 0.0052");
        assert_eq!(format_value(101.5, &UnitType::Index), "101.50");
    }

    #[test]
    fn test_format_trend() {
        assert_eq!(format_trend(0.25), "+0.25");
        assert_eq!(format_trend(-0.1), "-0.10");
        assert_eq!(format_trend(0.0), "0.00");
    }
}
