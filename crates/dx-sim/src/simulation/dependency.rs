//! Cross-domain dependency adjustment of the demo rates.
//!
//! A domain's realized efficiency is held back by an immature administration
//! domain and by immature peers that declare a weight on it. Both reductions
//! are multiplicative, so rates stay within `[0, base]`.

use serde::Serialize;

use crate::dataset::catalog::{Catalog, DemoMetrics, ADMINISTRATION_DOMAIN_ID};

use super::mode::{DomainModes, Mode};

/// Ceiling on the summed peer penalty.
pub const MAX_PEER_PENALTY: f64 = 0.8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSet {
    pub reduction: f64,
    pub time_reduction: f64,
    pub cost_reduction: f64,
}

impl RateSet {
    pub fn for_mode(metrics: &DemoMetrics, mode: Mode) -> Self {
        Self {
            reduction: *metrics.reduction_rates.get(mode),
            time_reduction: *metrics.time_reduction_rates.get(mode),
            cost_reduction: *metrics.cost_reduction_rates.get(mode),
        }
    }

    /// Applies `rate * (1 - adjustment)` to every rate, floored at zero.
    pub fn reduced_by(self, adjustment: f64) -> Self {
        let factor = 1.0 - adjustment;
        let scale = |rate: f64| (rate * factor).max(0.0);
        Self {
            reduction: scale(self.reduction),
            time_reduction: scale(self.time_reduction),
            cost_reduction: scale(self.cost_reduction),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerPenalty {
    pub domain_id: String,
    pub mode: Mode,
    pub weight: f64,
    pub penalty: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyBreakdown {
    pub admin_mode: Mode,
    /// Zero for the administration domain itself.
    pub admin_adjustment: f64,
    pub peers: Vec<PeerPenalty>,
    pub cumulative_peer_penalty: f64,
    pub applied_peer_penalty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedRates {
    pub domain_id: String,
    pub mode: Mode,
    pub base: RateSet,
    pub adjusted: RateSet,
    pub breakdown: DependencyBreakdown,
}

pub fn adjust_for_dependencies<'a, I>(
    domain_id: &str,
    metrics: &DemoMetrics,
    all_metrics: I,
    domain_modes: &DomainModes,
) -> AdjustedRates
where
    I: IntoIterator<Item = (&'a str, &'a DemoMetrics)>,
{
    let mode = domain_modes.mode_of(domain_id);
    let admin_mode = domain_modes.mode_of(ADMINISTRATION_DOMAIN_ID);
    let base = RateSet::for_mode(metrics, mode);

    let admin_adjustment = if domain_id == ADMINISTRATION_DOMAIN_ID {
        0.0
    } else {
        (1.0 - admin_mode.efficiency()) * metrics.administrative_dependency
    };
    let after_admin = base.reduced_by(admin_adjustment);

    let peers: Vec<PeerPenalty> = all_metrics
        .into_iter()
        .filter(|(peer_id, _)| *peer_id != domain_id)
        .filter_map(|(peer_id, peer_metrics)| {
            let weight = *peer_metrics.impact_on_other_domains.get(domain_id)?;
            let peer_mode = domain_modes.mode_of(peer_id);
            Some(PeerPenalty {
                domain_id: peer_id.to_string(),
                mode: peer_mode,
                weight,
                penalty: (1.0 - peer_mode.efficiency()) * weight,
            })
        })
        .collect();

    let cumulative_peer_penalty: f64 = peers.iter().map(|peer| peer.penalty).sum();
    let applied_peer_penalty = cumulative_peer_penalty.min(MAX_PEER_PENALTY);
    let adjusted = after_admin.reduced_by(applied_peer_penalty);

    AdjustedRates {
        domain_id: domain_id.to_string(),
        mode,
        base,
        adjusted,
        breakdown: DependencyBreakdown {
            admin_mode,
            admin_adjustment,
            peers,
            cumulative_peer_penalty,
            applied_peer_penalty,
        },
    }
}

/// `(domain id, metrics)` for every domain that carries demo metrics.
pub fn catalog_metrics(catalog: &Catalog) -> impl Iterator<Item = (&str, &DemoMetrics)> + Clone {
    catalog.domains.iter().filter_map(|domain| {
        domain
            .demo_metrics
            .as_ref()
            .map(|metrics| (domain.id.as_str(), metrics))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::mode::ModeTable;
    use std::collections::BTreeMap;

    fn metrics(rate: f64, admin_dependency: f64, impact: &[(&str, f64)]) -> DemoMetrics {
        DemoMetrics {
            reduction_rates: ModeTable::new(rate, rate, rate),
            time_reduction_rates: ModeTable::new(rate, rate, rate),
            cost_reduction_rates: ModeTable::new(rate, rate, rate),
            administrative_dependency: admin_dependency,
            impact_on_other_domains: impact
                .iter()
                .map(|(id, weight)| (id.to_string(), *weight))
                .collect::<BTreeMap<_, _>>(),
            ..DemoMetrics::default()
        }
    }

    #[test]
    fn plain_administration_scales_dependent_domain() {
        let medical = metrics(0.5, 0.8, &[]);
        let modes = DomainModes::new()
            .with(ADMINISTRATION_DOMAIN_ID, Mode::Plain)
            .with("medical", Mode::Smart);

        let adjusted = adjust_for_dependencies("medical", &medical, [("medical", &medical)], &modes);
        assert!((adjusted.adjusted.reduction - 0.1).abs() < 1e-9);
        assert!((adjusted.breakdown.admin_adjustment - 0.8).abs() < 1e-9);
        assert_eq!(adjusted.base.reduction, 0.5);
    }

    #[test]
    fn administration_skips_its_own_adjustment() {
        let admin = metrics(0.4, 0.9, &[]);
        let adjusted = adjust_for_dependencies(
            ADMINISTRATION_DOMAIN_ID,
            &admin,
            [(ADMINISTRATION_DOMAIN_ID, &admin)],
            &DomainModes::new(),
        );
        assert_eq!(adjusted.adjusted, adjusted.base);
        assert_eq!(adjusted.breakdown.admin_adjustment, 0.0);
    }

    #[test]
    fn peer_penalty_is_capped() {
        let target = metrics(0.6, 0.0, &[]);
        let peers: Vec<(String, DemoMetrics)> = (0..5)
            .map(|index| (format!("peer-{index}"), metrics(0.3, 0.0, &[("target", 0.5)])))
            .collect();
        let all = peers
            .iter()
            .map(|(id, metrics)| (id.as_str(), metrics))
            .chain([("target", &target)]);

        let adjusted = adjust_for_dependencies("target", &target, all, &DomainModes::new());
        assert_eq!(adjusted.breakdown.peers.len(), 5);
        assert!((adjusted.breakdown.cumulative_peer_penalty - 2.5).abs() < 1e-9);
        assert_eq!(adjusted.breakdown.applied_peer_penalty, MAX_PEER_PENALTY);
        assert!((adjusted.adjusted.reduction - 0.6 * 0.2).abs() < 1e-9);
    }

    #[test]
    fn administration_weights_count_as_a_peer() {
        let medical = metrics(0.5, 0.0, &[]);
        let admin = metrics(0.4, 0.0, &[("medical", 0.3)]);
        let modes = DomainModes::new()
            .with(ADMINISTRATION_DOMAIN_ID, Mode::Plain)
            .with("medical", Mode::Plain);

        let adjusted = adjust_for_dependencies(
            "medical",
            &medical,
            [(ADMINISTRATION_DOMAIN_ID, &admin), ("medical", &medical)],
            &modes,
        );
        assert_eq!(adjusted.breakdown.peers.len(), 1);
        assert_eq!(adjusted.breakdown.peers[0].domain_id, ADMINISTRATION_DOMAIN_ID);
        assert!((adjusted.breakdown.cumulative_peer_penalty - 0.3).abs() < 1e-9);
        assert!((adjusted.adjusted.reduction - 0.5 * 0.7).abs() < 1e-9);
    }

    #[test]
    fn mature_peers_cost_nothing() {
        let target = metrics(0.6, 0.5, &[]);
        let peer = metrics(0.3, 0.0, &[("target", 0.7)]);
        let modes = DomainModes::new()
            .with(ADMINISTRATION_DOMAIN_ID, Mode::Ai)
            .with("peer", Mode::Ai);

        let adjusted = adjust_for_dependencies(
            "target",
            &target,
            [("peer", &peer), ("target", &target)],
            &modes,
        );
        assert_eq!(adjusted.adjusted, adjusted.base);
    }

    #[test]
    fn adjusted_rates_stay_within_base() {
        let weights = [0.0, 0.3, 0.8, 1.0];
        for admin_dependency in weights {
            for weight in weights {
                for admin_mode in Mode::ordered() {
                    let target = metrics(0.7, admin_dependency, &[]);
                    let peer = metrics(0.2, 0.0, &[("target", weight)]);
                    let modes = DomainModes::new().with(ADMINISTRATION_DOMAIN_ID, admin_mode);
                    let adjusted = adjust_for_dependencies(
                        "target",
                        &target,
                        [("peer", &peer)],
                        &modes,
                    );
                    for rate in [
                        adjusted.adjusted.reduction,
                        adjusted.adjusted.time_reduction,
                        adjusted.adjusted.cost_reduction,
                    ] {
                        assert!((0.0..=0.7).contains(&rate), "rate {rate} out of range");
                    }
                    assert!(adjusted.breakdown.applied_peer_penalty <= MAX_PEER_PENALTY);
                }
            }
        }
    }
}
