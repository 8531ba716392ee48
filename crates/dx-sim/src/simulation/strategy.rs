//! Point-budget strategy board: spend a limited budget on per-domain modes
//! and an optional national-ID system, then compare citizen time saved.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::catalog::Catalog;

use super::aggregate::{aggregate, applicable_documents};
use super::flags::EvaluationContext;
use super::mode::{DomainModes, Mode, View};

pub const INITIAL_POINTS: u32 = 6;
pub const MAX_POINTS: u32 = 12;
pub const NATIONAL_ID_SYSTEM_COST: u32 = 5;
pub const COMPLETION_BONUS_KEY: &str = "complete";

const STRATEGY_SECONDS_PER_FIELD: f64 = 20.0;

pub const fn mode_cost(mode: Mode) -> u32 {
    match mode {
        Mode::Plain => 0,
        Mode::Smart => 1,
        Mode::Ai => 2,
    }
}

/// Share of input fields a mode removes on the board.
pub fn board_reduction_rate(mode: Mode, national_id_system: bool) -> f64 {
    match mode {
        Mode::Plain => 0.0,
        Mode::Smart => 0.35,
        Mode::Ai if national_id_system => 0.93,
        Mode::Ai => 0.60,
    }
}

/// Views a user must open in a domain to earn its hidden point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HiddenPointChallenge {
    pub domain_id: &'static str,
    pub required_views: &'static [View],
    pub description: &'static str,
}

pub const CHALLENGES: [HiddenPointChallenge; 5] = [
    HiddenPointChallenge {
        domain_id: "administration",
        required_views: &[View::Plain, View::Smart, View::Ai, View::Summary],
        description: "Open every view, including the summary",
    },
    HiddenPointChallenge {
        domain_id: "medical",
        required_views: &[View::Plain, View::Smart, View::Ai],
        description: "Open the Plain, Smart and AI views",
    },
    HiddenPointChallenge {
        domain_id: "education",
        required_views: &[View::Ai, View::Summary],
        description: "Open both the AI view and the summary",
    },
    HiddenPointChallenge {
        domain_id: "logistics",
        required_views: &[View::Smart, View::Ai],
        description: "Compare the Smart and AI views",
    },
    HiddenPointChallenge {
        domain_id: "disaster",
        required_views: &[View::Summary],
        description: "Compare all modes on the summary view",
    },
];

pub type ViewHistory = BTreeMap<String, BTreeSet<View>>;

/// Hidden points earned from a view history, plus the completion bonus once
/// every challenge is met.
pub fn earned_hidden_points(history: &ViewHistory) -> BTreeSet<String> {
    let mut earned: BTreeSet<String> = CHALLENGES
        .iter()
        .filter(|challenge| {
            history.get(challenge.domain_id).is_some_and(|seen| {
                challenge
                    .required_views
                    .iter()
                    .all(|view| seen.contains(view))
            })
        })
        .map(|challenge| challenge.domain_id.to_string())
        .collect();

    if earned.len() == CHALLENGES.len() {
        earned.insert(COMPLETION_BONUS_KEY.to_string());
    }
    earned
}

pub fn available_points(hidden_points: &BTreeSet<String>) -> u32 {
    (INITIAL_POINTS + hidden_points.len() as u32).min(MAX_POINTS)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyPlan {
    #[serde(default)]
    pub domain_modes: DomainModes,
    #[serde(default)]
    pub national_id_system: bool,
    #[serde(default)]
    pub hidden_points: BTreeSet<String>,
}

/// Plain-mode field count and paper time of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainBaseline {
    pub domain_id: String,
    pub name: String,
    pub total_fields: u32,
    pub paper_minutes: u32,
}

pub fn baselines(catalog: &Catalog) -> Vec<DomainBaseline> {
    let context = EvaluationContext::default();
    catalog
        .domains
        .iter()
        .map(|domain| {
            let applicable = applicable_documents(&domain.documents, &context);
            let stats = aggregate(applicable, Mode::Plain, &context);
            DomainBaseline {
                domain_id: domain.id.clone(),
                name: domain.name.clone(),
                total_fields: stats.required_fields(),
                paper_minutes: stats.paper_time_minutes,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEffect {
    pub domain_id: String,
    pub name: String,
    pub mode: Mode,
    pub reduction_rate: f64,
    pub manual_fields: u32,
    pub electronic_minutes: u32,
    pub paper_minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBudget {
    pub available: u32,
    pub used: u32,
    pub remaining: i64,
    pub over_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    OverBudget,
    ConsiderNationalId,
    SpareCapacity,
    ExploreHiddenPoints,
    Excellent,
    Good,
}

impl Recommendation {
    pub const fn message(self) -> &'static str {
        match self {
            Self::OverBudget => {
                "Over budget: move some domains back to Plain or Smart."
            }
            Self::ConsiderNationalId => {
                "Five or more points left: consider the national ID system, it boosts every AI domain."
            }
            Self::SpareCapacity => {
                "Points left over: move more domains to Smart or AI to save more time."
            }
            Self::ExploreHiddenPoints => {
                "Explore each domain's views to earn hidden points and invest more."
            }
            Self::Excellent => "Excellent strategy: citizens save a great deal of time.",
            Self::Good => "Good strategy: earn more hidden points to improve further.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyOutcome {
    pub points: PointBudget,
    pub domains: Vec<DomainEffect>,
    pub total_inputs: u32,
    pub time_saved_minutes: i64,
    pub minutes_per_point: i64,
    pub recommendation: Recommendation,
    pub message: &'static str,
}

pub fn evaluate_strategy(baselines: &[DomainBaseline], plan: &StrategyPlan) -> StrategyOutcome {
    let available = available_points(&plan.hidden_points);
    let mut used: u32 = baselines
        .iter()
        .map(|baseline| mode_cost(plan.domain_modes.mode_of(&baseline.domain_id)))
        .sum();
    if plan.national_id_system {
        used += NATIONAL_ID_SYSTEM_COST;
    }
    let remaining = i64::from(available) - i64::from(used);

    let domains: Vec<DomainEffect> = baselines
        .iter()
        .map(|baseline| {
            let mode = plan.domain_modes.mode_of(&baseline.domain_id);
            let reduction_rate = board_reduction_rate(mode, plan.national_id_system);
            let manual_fields =
                (f64::from(baseline.total_fields) * (1.0 - reduction_rate)).round() as u32;
            let electronic_minutes =
                (f64::from(manual_fields) * STRATEGY_SECONDS_PER_FIELD / 60.0).round() as u32;
            DomainEffect {
                domain_id: baseline.domain_id.clone(),
                name: baseline.name.clone(),
                mode,
                reduction_rate,
                manual_fields,
                electronic_minutes,
                paper_minutes: baseline.paper_minutes,
            }
        })
        .collect();

    let total_inputs = domains.iter().map(|effect| effect.manual_fields).sum();
    let paper: i64 = domains.iter().map(|effect| i64::from(effect.paper_minutes)).sum();
    let electronic: i64 = domains
        .iter()
        .map(|effect| i64::from(effect.electronic_minutes))
        .sum();
    let time_saved_minutes = paper - electronic;
    let minutes_per_point = if used > 0 {
        (time_saved_minutes as f64 / f64::from(used)).round() as i64
    } else {
        0
    };

    let recommendation = recommend(remaining, plan.national_id_system, time_saved_minutes);

    StrategyOutcome {
        points: PointBudget {
            available,
            used,
            remaining,
            over_budget: remaining < 0,
        },
        domains,
        total_inputs,
        time_saved_minutes,
        minutes_per_point,
        recommendation,
        message: recommendation.message(),
    }
}

fn recommend(remaining: i64, national_id_system: bool, time_saved: i64) -> Recommendation {
    if remaining < 0 {
        Recommendation::OverBudget
    } else if remaining >= 5 && !national_id_system {
        Recommendation::ConsiderNationalId
    } else if remaining >= 3 {
        Recommendation::SpareCapacity
    } else if time_saved < 200 {
        Recommendation::ExploreHiddenPoints
    } else if time_saved >= 400 {
        Recommendation::Excellent
    } else {
        Recommendation::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Vec<DomainBaseline> {
        [
            ("administration", 135, 101),
            ("medical", 140, 105),
            ("education", 140, 105),
            ("logistics", 130, 98),
            ("disaster", 145, 109),
        ]
        .into_iter()
        .map(|(id, fields, paper)| DomainBaseline {
            domain_id: id.to_string(),
            name: id.to_string(),
            total_fields: fields,
            paper_minutes: paper,
        })
        .collect()
    }

    #[test]
    fn untouched_board_suggests_national_id() {
        let outcome = evaluate_strategy(&board(), &StrategyPlan::default());
        assert_eq!(outcome.points.available, INITIAL_POINTS);
        assert_eq!(outcome.points.used, 0);
        assert_eq!(outcome.minutes_per_point, 0);
        assert_eq!(outcome.recommendation, Recommendation::ConsiderNationalId);
        // electronic time of 135 fields is 45 min against 101 on paper
        assert_eq!(outcome.domains[0].electronic_minutes, 45);
    }

    #[test]
    fn overspending_is_flagged() {
        let plan = StrategyPlan {
            domain_modes: DomainModes::new().with("medical", Mode::Ai).with("education", Mode::Ai),
            national_id_system: true,
            hidden_points: BTreeSet::new(),
        };
        let outcome = evaluate_strategy(&board(), &plan);
        assert_eq!(outcome.points.used, 9);
        assert_eq!(outcome.points.remaining, -3);
        assert!(outcome.points.over_budget);
        assert_eq!(outcome.recommendation, Recommendation::OverBudget);
    }

    #[test]
    fn national_id_lifts_ai_reduction() {
        let plan = StrategyPlan {
            domain_modes: DomainModes::new().with("medical", Mode::Ai),
            national_id_system: true,
            hidden_points: ["administration", "medical"]
                .into_iter()
                .map(String::from)
                .collect(),
        };
        let outcome = evaluate_strategy(&board(), &plan);
        let medical = &outcome.domains[1];
        assert_eq!(medical.reduction_rate, 0.93);
        // round(140 * 0.07) = 10 fields, round(10 * 20 / 60) = 3 min
        assert_eq!((medical.manual_fields, medical.electronic_minutes), (10, 3));
        assert_eq!(outcome.points.available, 8);
        assert_eq!(outcome.points.remaining, 1);
    }

    #[test]
    fn completion_bonus_requires_every_challenge() {
        let mut history = ViewHistory::new();
        for challenge in &CHALLENGES[..4] {
            history.insert(
                challenge.domain_id.to_string(),
                challenge.required_views.iter().copied().collect(),
            );
        }
        assert_eq!(earned_hidden_points(&history).len(), 4);

        history.insert("disaster".to_string(), [View::Summary].into_iter().collect());
        let earned = earned_hidden_points(&history);
        assert!(earned.contains(COMPLETION_BONUS_KEY));
        assert_eq!(available_points(&earned), MAX_POINTS);
    }
}
