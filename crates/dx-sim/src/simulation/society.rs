//! Society-wide impact of the chosen modes: processed volume, staff hours,
//! monthly cost and the resulting ROI projection.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dataset::catalog::{Catalog, ADMINISTRATION_DOMAIN_ID};

use super::dependency::{adjust_for_dependencies, catalog_metrics, AdjustedRates};
use super::mode::{DomainModes, Mode, ModeTable};
use super::roi::{project_roi, RoiProjection};

pub const DEFAULT_COST_PER_HOUR: f64 = 3_000.0;
pub const WORKING_DAYS_PER_MONTH: f64 = 21.0;
pub const WORKING_DAYS_PER_YEAR: f64 = 250.0;
pub const HOURS_PER_WORKDAY: f64 = 8.0;
/// Dependency above which a domain is named in the administration message.
pub const HIGH_DEPENDENCY_THRESHOLD: f64 = 0.5;

/// Configured value first, then the dataset's, then the default.
pub fn resolve_cost_per_hour(configured: Option<f64>, catalog: &Catalog) -> f64 {
    configured
        .or(catalog.meta.cost_per_hour)
        .filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(DEFAULT_COST_PER_HOUR)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainImpact {
    pub domain_id: String,
    pub name: String,
    pub emoji: String,
    pub mode: Mode,
    pub daily_volume: f64,
    pub processed_before: u64,
    pub processed_after: u64,
    pub time_before_hours: u64,
    pub time_after_hours: u64,
    pub monthly_cost_before: u64,
    pub monthly_cost_after: u64,
    pub administrative_dependency: f64,
    pub rates: AdjustedRates,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminImpact {
    pub admin_mode: Mode,
    pub high_dependency_domains: Vec<String>,
    pub message: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocietyAnalysis {
    pub domain_modes: DomainModes,
    pub cost_per_hour: f64,
    pub total_daily_volume: f64,
    pub total_processed_after: u64,
    pub total_reduction_rate: f64,
    pub total_time_before: u64,
    pub total_time_after: u64,
    pub total_time_saving: u64,
    pub total_cost_before: u64,
    pub total_cost_after: u64,
    pub monthly_cost_saving: u64,
    pub annual_cost_saving: u64,
    pub annual_time_saving_days: u64,
    pub implementation_cost: f64,
    pub annual_maintenance_cost: f64,
    pub domains: Vec<DomainImpact>,
    pub admin_impact: AdminImpact,
    pub roi: RoiProjection,
}

pub fn analyze_society(
    catalog: &Catalog,
    domain_modes: &DomainModes,
    cost_per_hour: f64,
    horizon_years: u32,
) -> SocietyAnalysis {
    let all_metrics = catalog_metrics(catalog);
    let mut domains = Vec::new();
    let mut implementation_cost = 0.0;
    let mut annual_maintenance_cost = 0.0;

    for domain in &catalog.domains {
        let Some(metrics) = domain.demo_metrics.as_ref() else {
            continue;
        };
        let rates =
            adjust_for_dependencies(&domain.id, metrics, all_metrics.clone(), domain_modes);
        let mode = rates.mode;
        implementation_cost += *metrics.implementation_cost.get(mode);
        annual_maintenance_cost += *metrics.annual_maintenance_cost.get(mode);

        let daily = metrics.daily_volume;
        let case_minutes = metrics.average_time_per_case * daily;
        let time_before_hours = whole(case_minutes / 60.0);
        let time_after_hours = whole(case_minutes * (1.0 - rates.adjusted.time_reduction) / 60.0);

        domains.push(DomainImpact {
            domain_id: domain.id.clone(),
            name: domain.name.clone(),
            emoji: domain.emoji.clone(),
            mode,
            daily_volume: daily,
            processed_before: whole(daily),
            processed_after: whole(daily * (1.0 - rates.adjusted.reduction)),
            time_before_hours,
            time_after_hours,
            monthly_cost_before: monthly_cost(time_before_hours, cost_per_hour),
            monthly_cost_after: monthly_cost(time_after_hours, cost_per_hour),
            administrative_dependency: metrics.administrative_dependency,
            rates,
        });
    }

    let total_daily_volume: f64 = domains.iter().map(|impact| impact.daily_volume).sum();
    let total_processed_after: u64 = domains.iter().map(|impact| impact.processed_after).sum();
    let total_time_before: u64 = domains.iter().map(|impact| impact.time_before_hours).sum();
    let total_time_after: u64 = domains.iter().map(|impact| impact.time_after_hours).sum();
    let total_cost_before: u64 = domains.iter().map(|impact| impact.monthly_cost_before).sum();
    let total_cost_after: u64 = domains.iter().map(|impact| impact.monthly_cost_after).sum();

    let total_reduction_rate = if total_daily_volume > 0.0 {
        1.0 - total_processed_after as f64 / total_daily_volume
    } else {
        0.0
    };
    let total_time_saving = total_time_before.saturating_sub(total_time_after);
    let monthly_cost_saving = total_cost_before.saturating_sub(total_cost_after);
    let annual_cost_saving = monthly_cost_saving * 12;
    let annual_time_saving_days =
        whole(total_time_saving as f64 * WORKING_DAYS_PER_YEAR / HOURS_PER_WORKDAY);

    let admin_impact = admin_impact(&domains, domain_modes.mode_of(ADMINISTRATION_DOMAIN_ID));
    let roi = project_roi(
        annual_cost_saving as f64,
        implementation_cost,
        annual_maintenance_cost,
        horizon_years,
    );

    SocietyAnalysis {
        domain_modes: domain_modes.clone(),
        cost_per_hour,
        total_daily_volume,
        total_processed_after,
        total_reduction_rate,
        total_time_before,
        total_time_after,
        total_time_saving,
        total_cost_before,
        total_cost_after,
        monthly_cost_saving,
        annual_cost_saving,
        annual_time_saving_days,
        implementation_cost,
        annual_maintenance_cost,
        domains,
        admin_impact,
        roi,
    }
}

fn whole(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

/// Staff hours per day over a working month, rounded to the nearest thousand.
fn monthly_cost(hours_per_day: u64, cost_per_hour: f64) -> u64 {
    whole(hours_per_day as f64 * cost_per_hour * WORKING_DAYS_PER_MONTH / 1_000.0) * 1_000
}

fn admin_impact(domains: &[DomainImpact], admin_mode: Mode) -> AdminImpact {
    let dependents: Vec<&DomainImpact> = domains
        .iter()
        .filter(|impact| impact.domain_id != ADMINISTRATION_DOMAIN_ID)
        .collect();

    let high_dependency_domains: Vec<String> = dependents
        .iter()
        .filter(|impact| impact.administrative_dependency > HIGH_DEPENDENCY_THRESHOLD)
        .map(|impact| impact.name.clone())
        .collect();
    let names = high_dependency_domains.join(", ");

    let message = match admin_mode {
        Mode::Ai => format!("Administration runs in AI mode: {names} reach full efficiency"),
        Mode::Plain => format!("Administration runs in Plain mode: {names} are held back"),
        Mode::Smart => {
            "Administration runs in Smart mode: dependent domains are partially held back"
                .to_string()
        }
    };

    let details = dependents
        .iter()
        .filter(|impact| impact.administrative_dependency > 0.0)
        .map(|impact| {
            let dependency = (impact.administrative_dependency * 100.0).round();
            let held_back = (impact.rates.breakdown.admin_adjustment * 100.0).round();
            match admin_mode {
                Mode::Ai => format!(
                    "{} runs smoothly (administrative dependency {dependency}%)",
                    impact.name
                ),
                Mode::Plain => format!(
                    "{} is held back by {held_back}% (administrative dependency {dependency}%)",
                    impact.name
                ),
                Mode::Smart => format!(
                    "{} is partially supported, held back by {held_back}% (administrative dependency {dependency}%)",
                    impact.name
                ),
            }
        })
        .collect();

    AdminImpact {
        admin_mode,
        high_dependency_domains,
        message,
        details,
    }
}

/// Uniform-mode analyses for all three modes, as served to static pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecomputedAnalysis {
    pub generated_at: DateTime<Utc>,
    pub version: Option<String>,
    pub default_mode: Mode,
    pub modes: ModeTable<SocietyAnalysis>,
}

pub fn precompute(
    catalog: &Catalog,
    cost_per_hour: f64,
    horizon_years: u32,
    generated_at: DateTime<Utc>,
) -> PrecomputedAnalysis {
    let ids: Vec<&str> = catalog.domains.iter().map(|domain| domain.id.as_str()).collect();
    PrecomputedAnalysis {
        generated_at,
        version: catalog.meta.version.clone(),
        default_mode: catalog.meta.default_mode,
        modes: ModeTable::from_fn(|mode| {
            let modes = DomainModes::uniform(ids.iter().copied(), mode);
            analyze_society(catalog, &modes, cost_per_hour, horizon_years)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::catalog::{DemoMetrics, Domain};
    use std::collections::BTreeMap;

    fn domain(id: &str, metrics: DemoMetrics) -> Domain {
        Domain {
            id: id.to_string(),
            name: id.to_string(),
            emoji: String::new(),
            description: String::new(),
            documents: Vec::new(),
            modes: ModeTable::default(),
            demo_metrics: Some(metrics),
        }
    }

    fn catalog() -> Catalog {
        let admin = DemoMetrics {
            daily_volume: 1_000.0,
            average_time_per_case: 12.0,
            reduction_rates: ModeTable::new(0.1, 0.4, 0.7),
            time_reduction_rates: ModeTable::new(0.1, 0.4, 0.7),
            cost_reduction_rates: ModeTable::new(0.1, 0.4, 0.7),
            implementation_cost: ModeTable::new(0.0, 10_000_000.0, 30_000_000.0),
            annual_maintenance_cost: ModeTable::new(0.0, 1_000_000.0, 3_000_000.0),
            ..DemoMetrics::default()
        };
        let medical = DemoMetrics {
            daily_volume: 500.0,
            average_time_per_case: 30.0,
            reduction_rates: ModeTable::new(0.1, 0.3, 0.6),
            time_reduction_rates: ModeTable::new(0.1, 0.3, 0.6),
            cost_reduction_rates: ModeTable::new(0.1, 0.3, 0.6),
            administrative_dependency: 0.8,
            implementation_cost: ModeTable::new(0.0, 5_000_000.0, 20_000_000.0),
            annual_maintenance_cost: ModeTable::new(0.0, 500_000.0, 2_000_000.0),
            impact_on_other_domains: BTreeMap::new(),
            ..DemoMetrics::default()
        };
        Catalog {
            domains: vec![domain(ADMINISTRATION_DOMAIN_ID, admin), domain("medical", medical)],
            ..Catalog::default()
        }
    }

    #[test]
    fn ai_everywhere_uses_unadjusted_rates() {
        let modes = DomainModes::uniform(["administration", "medical"], Mode::Ai);
        let analysis = analyze_society(&catalog(), &modes, DEFAULT_COST_PER_HOUR, 5);

        let admin = &analysis.domains[0];
        assert_eq!(admin.processed_after, 300);
        assert_eq!((admin.time_before_hours, admin.time_after_hours), (200, 60));
        // 200 h * 3000 * 21 = 12.6M
        assert_eq!(admin.monthly_cost_before, 12_600_000);
        assert_eq!(admin.monthly_cost_after, 3_780_000);

        let medical = &analysis.domains[1];
        assert_eq!(medical.processed_after, 200);
        assert_eq!((medical.time_before_hours, medical.time_after_hours), (250, 100));

        assert_eq!(analysis.total_time_saving, 290);
        assert_eq!(analysis.annual_time_saving_days, 9_063);
        assert_eq!(analysis.annual_cost_saving, analysis.monthly_cost_saving * 12);
        assert!((analysis.total_reduction_rate - (1.0 - 500.0 / 1_500.0)).abs() < 1e-9);
        assert_eq!(analysis.implementation_cost, 50_000_000.0);
        assert_eq!(analysis.roi.years.len(), 6);
        assert!(analysis.admin_impact.message.contains("medical"));
    }

    #[test]
    fn plain_administration_holds_back_dependents() {
        let modes = DomainModes::new().with("medical", Mode::Ai);
        let analysis = analyze_society(&catalog(), &modes, DEFAULT_COST_PER_HOUR, 5);
        let medical = &analysis.domains[1];
        // 0.6 * (1 - 0.8) = 0.12
        assert!((medical.rates.adjusted.reduction - 0.12).abs() < 1e-9);
        assert_eq!(medical.processed_after, 440);
        assert_eq!(analysis.admin_impact.details.len(), 1);
        assert!(analysis.admin_impact.details[0].contains("80%"));
    }

    #[test]
    fn empty_catalog_yields_zeroes() {
        let analysis = analyze_society(&Catalog::default(), &DomainModes::new(), 3_000.0, 5);
        assert_eq!(analysis.total_reduction_rate, 0.0);
        assert_eq!(analysis.annual_cost_saving, 0);
        assert!(analysis.domains.is_empty());
    }

    #[test]
    fn cost_per_hour_prefers_configuration() {
        let mut catalog = catalog();
        catalog.meta.cost_per_hour = Some(2_500.0);
        assert_eq!(resolve_cost_per_hour(Some(4_200.0), &catalog), 4_200.0);
        assert_eq!(resolve_cost_per_hour(None, &catalog), 2_500.0);
        assert_eq!(
            resolve_cost_per_hour(None, &Catalog::default()),
            DEFAULT_COST_PER_HOUR
        );
    }

    #[test]
    fn precompute_covers_every_mode() {
        let generated_at = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("timestamp parses")
            .with_timezone(&Utc);
        let precomputed = precompute(&catalog(), DEFAULT_COST_PER_HOUR, 5, generated_at);
        assert_eq!(precomputed.modes.plain.domain_modes.mode_of("medical"), Mode::Plain);
        assert_eq!(precomputed.modes.ai.domain_modes.mode_of("medical"), Mode::Ai);
        assert!(precomputed.modes.ai.annual_cost_saving > precomputed.modes.plain.annual_cost_saving);
    }
}
