use serde::Serialize;

/// Projection length used unless configured otherwise.
pub const DEFAULT_HORIZON_YEARS: u32 = 5;
/// Horizon of the long-view report.
pub const LONG_HORIZON_YEARS: u32 = 10;
pub const MAX_HORIZON_YEARS: u32 = 30;

/// Share of the full annual saving realized in each year since rollout.
/// Years past the end of the ramp realize the full saving.
pub const EFFECT_RAMP: [f64; 4] = [0.0, 0.35, 0.85, 1.0];

pub fn effect_rate(year: u32) -> f64 {
    EFFECT_RAMP
        .get(year as usize)
        .copied()
        .unwrap_or(EFFECT_RAMP[EFFECT_RAMP.len() - 1])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiProjection {
    pub years: Vec<u32>,
    pub cumulative_costs: Vec<f64>,
    pub cumulative_savings: Vec<f64>,
    pub cumulative_net_benefit: Vec<f64>,
    /// First year whose net benefit is non-negative within the horizon.
    pub payback_year: Option<u32>,
}

/// Year-by-year cumulative cost and saving from year 0 (rollout) through `horizon_years`.
pub fn project_roi(
    annual_saving: f64,
    implementation_cost: f64,
    annual_maintenance: f64,
    horizon_years: u32,
) -> RoiProjection {
    let capacity = horizon_years as usize + 1;
    let mut projection = RoiProjection {
        years: Vec::with_capacity(capacity),
        cumulative_costs: Vec::with_capacity(capacity),
        cumulative_savings: Vec::with_capacity(capacity),
        cumulative_net_benefit: Vec::with_capacity(capacity),
        payback_year: None,
    };

    let mut cumulative_saving = 0.0;
    for year in 0..=horizon_years {
        cumulative_saving += annual_saving * effect_rate(year);
        let cumulative_cost = implementation_cost + annual_maintenance * f64::from(year);
        let net = cumulative_saving - cumulative_cost;

        if projection.payback_year.is_none() && net >= 0.0 {
            projection.payback_year = Some(year);
        }

        projection.years.push(year);
        projection.cumulative_costs.push(cumulative_cost);
        projection.cumulative_savings.push(cumulative_saving);
        projection.cumulative_net_benefit.push(net);
    }

    projection
}
