use crate::infra::{
    load_datasets, parse_domain_mode, parse_domain_view, parse_flag, parse_mode, parse_view,
};
use chrono::Utc;
use clap::{Args, ValueEnum};
use dx_sim::config::AppConfig;
use dx_sim::error::AppError;
use dx_sim::report::{read_answers_csv, write_analysis_csv, write_roi_csv};
use dx_sim::service::{
    AnalysisRequest, ComparisonRequest, DomainComparison, FlowSelection, FlowSelectionRequest,
    RoiRequest, SimulationService,
};
use dx_sim::simulation::aggregate::ModeStats;
use dx_sim::simulation::classifier::AutomationChannel;
use dx_sim::simulation::society::{precompute, resolve_cost_per_hour, SocietyAnalysis};
use dx_sim::simulation::strategy::{earned_hidden_points, StrategyOutcome, ViewHistory};
use dx_sim::simulation::{DomainModes, FlagSet, Mode, RoiProjection, StrategyPlan, View};
use dx_sim::state::{InMemorySnapshotStore, ProfileOverrides};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ProfileArgs {
    /// The citizen has linked their national ID card
    #[arg(long)]
    pub(crate) myna: bool,
    /// The citizen can complete procedures online
    #[arg(long)]
    pub(crate) online: bool,
}

impl ProfileArgs {
    fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            myna: Some(self.myna),
            online: Some(self.online),
            ..ProfileOverrides::default()
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct AnswerArgs {
    /// Checklist answer as `flag` or `flag=false`; repeatable
    #[arg(long = "flag", value_parser = parse_flag)]
    pub(crate) flags: Vec<(String, bool)>,
    /// CSV file with `flag,value` rows, applied before --flag
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
}

impl AnswerArgs {
    fn flag_set(&self) -> Result<FlagSet, AppError> {
        let mut flags = match &self.answers {
            Some(path) => read_answers_csv(File::open(path)?)?,
            None => FlagSet::new(),
        };
        for (flag, value) in &self.flags {
            flags.set(flag.clone(), *value);
        }
        Ok(flags)
    }
}

#[derive(Args, Debug)]
pub(crate) struct DomainArgs {
    /// Domain id, e.g. `medical`
    pub(crate) domain: String,
    #[command(flatten)]
    pub(crate) answers: AnswerArgs,
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    /// Use the shortened game variant of the domain
    #[arg(long)]
    pub(crate) simplified: bool,
    /// View to break down per document (plain, smart, ai or summary)
    #[arg(long, value_parser = parse_view, default_value = "summary")]
    pub(crate) view: View,
}

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Mode for every domain not set with --set
    #[arg(long, value_parser = parse_mode)]
    pub(crate) mode: Option<Mode>,
    /// Per-domain mode as `domain=mode`; repeatable
    #[arg(long = "set", value_parser = parse_domain_mode)]
    pub(crate) domain_modes: Vec<(String, Mode)>,
    /// Hourly labor cost in yen
    #[arg(long)]
    pub(crate) cost_per_hour: Option<f64>,
    /// ROI horizon in years
    #[arg(long)]
    pub(crate) horizon: Option<u32>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct RoiArgs {
    /// Full annual saving once the effect has ramped up
    #[arg(long)]
    pub(crate) annual_saving: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) implementation_cost: f64,
    #[arg(long, default_value_t = 0.0)]
    pub(crate) annual_maintenance: f64,
    #[arg(long)]
    pub(crate) horizon: Option<u32>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug, Default)]
pub(crate) struct PrecomputeArgs {
    /// Output file; stdout when omitted
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct FlowsArgs {
    #[command(flatten)]
    pub(crate) answers: AnswerArgs,
    #[command(flatten)]
    pub(crate) profile: ProfileArgs,
    #[arg(long, value_parser = parse_mode, default_value = "ai")]
    pub(crate) mode: Mode,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StrategyArgs {
    /// Per-domain mode as `domain=mode`; repeatable
    #[arg(long = "set", value_parser = parse_domain_mode)]
    pub(crate) domain_modes: Vec<(String, Mode)>,
    /// Invest in the national ID system
    #[arg(long)]
    pub(crate) national_id: bool,
    /// Views already opened, as `domain=view`; repeatable
    #[arg(long = "viewed", value_parser = parse_domain_view)]
    pub(crate) viewed: Vec<(String, View)>,
}

type CliService = SimulationService<InMemorySnapshotStore>;

fn cli_service() -> Result<(CliService, AppConfig), AppError> {
    let config = AppConfig::load()?;
    let datasets = load_datasets(&config.data);
    datasets.print_banner();
    let service = SimulationService::new(
        datasets.catalog.clone(),
        datasets.flows.clone(),
        Arc::new(InMemorySnapshotStore::new()),
        config.simulation.clone(),
    )
    .with_warnings(datasets.warnings.clone());
    Ok((service, config))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) fn run_domain(args: DomainArgs) -> Result<(), AppError> {
    let (service, _) = cli_service()?;
    let request = ComparisonRequest {
        checklist: args.answers.flag_set()?,
        profile: args.profile.overrides(),
        simplified: args.simplified,
        ..ComparisonRequest::default()
    };
    let comparison = service.domain_comparison(&args.domain, &request)?;
    render_domain(&comparison, args.view);
    Ok(())
}

pub(crate) fn render_domain(comparison: &DomainComparison, view: View) {
    println!("{} ({})", comparison.name, comparison.domain_id);
    println!(
        "Profile: national ID {}, online {}",
        yes_no(comparison.profile.myna),
        yes_no(comparison.profile.online)
    );
    println!(
        "\n{:<6} {:>5} {:>7} {:>5} {:>8} {:>11} {:>16} {:>11} {:>10}",
        "Mode", "Docs", "Manual", "Auto", "Removed", "Paper(min)", "Electronic(min)", "Saved(min)",
        "Reduction"
    );
    for mode in Mode::ordered() {
        print_mode_row(comparison.modes.get(mode));
    }

    let Some(mode) = view.mode() else {
        println!("\nApplicable documents: {}", comparison.applicable_documents.join(", "));
        return;
    };

    println!("\n{} view by document", mode.label());
    for document in comparison.documents.get(mode) {
        println!(
            "- {} ({}): manual {}, auto {}, removed {}",
            document.name, document.id, document.manual, document.auto, document.removed
        );
    }
}

fn print_mode_row(stats: &ModeStats) {
    println!(
        "{:<6} {:>5} {:>7} {:>5} {:>8} {:>11} {:>16} {:>11} {:>9}%",
        stats.mode.key(),
        stats.total_docs,
        stats.manual,
        stats.auto,
        stats.removed,
        stats.paper_time_minutes,
        stats.electronic_time_minutes,
        stats.time_saved_minutes,
        stats.reduction_rate_percent
    );
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let (service, _) = cli_service()?;
    let request = AnalysisRequest {
        domain_modes: args.domain_modes.into_iter().collect(),
        default_mode: args.mode,
        cost_per_hour: args.cost_per_hour,
        horizon_years: args.horizon,
    };
    let analysis = service.analysis(&request)?;

    match args.format {
        OutputFormat::Json => print_json(&analysis),
        OutputFormat::Csv => Ok(write_analysis_csv(&analysis, std::io::stdout().lock())?),
        OutputFormat::Text => {
            render_analysis(&analysis);
            Ok(())
        }
    }
}

pub(crate) fn render_analysis(analysis: &SocietyAnalysis) {
    println!(
        "Society-wide analysis (labor cost {} yen/hour)",
        group_digits(analysis.cost_per_hour.round() as u64)
    );
    println!(
        "\n{:<16} {:<6} {:>10} {:>10} {:>12} {:>12} {:>9}",
        "Domain", "Mode", "Daily", "After", "Hours/day", "Hours after", "Adjusted"
    );
    for domain in &analysis.domains {
        println!(
            "{:<16} {:<6} {:>10} {:>10} {:>12} {:>12} {:>8.1}%",
            domain.name,
            domain.mode.key(),
            domain.processed_before,
            domain.processed_after,
            domain.time_before_hours,
            domain.time_after_hours,
            domain.rates.adjusted.reduction * 100.0
        );
    }

    println!(
        "\nCases needing staff: {} of {} per day ({:.1}% fewer)",
        analysis.total_processed_after,
        analysis.total_daily_volume.round() as u64,
        analysis.total_reduction_rate * 100.0
    );
    println!(
        "Staff hours per day: {} -> {} (saves {})",
        analysis.total_time_before, analysis.total_time_after, analysis.total_time_saving
    );
    println!(
        "Monthly cost: {} -> {} yen; annual saving {} yen, {} staff-days",
        group_digits(analysis.total_cost_before),
        group_digits(analysis.total_cost_after),
        group_digits(analysis.annual_cost_saving),
        group_digits(analysis.annual_time_saving_days)
    );

    println!("\nAdministration: {}", analysis.admin_impact.message);
    for detail in &analysis.admin_impact.details {
        println!("- {detail}");
    }

    println!(
        "\nInvestment: {} yen up front, {} yen per year",
        group_digits(analysis.implementation_cost.round() as u64),
        group_digits(analysis.annual_maintenance_cost.round() as u64)
    );
    render_roi(&analysis.roi);
}

pub(crate) fn run_roi(args: RoiArgs) -> Result<(), AppError> {
    let (service, _) = cli_service()?;
    let projection = service.roi(&RoiRequest {
        annual_saving: args.annual_saving,
        implementation_cost: args.implementation_cost,
        annual_maintenance: args.annual_maintenance,
        horizon_years: args.horizon,
    })?;

    match args.format {
        OutputFormat::Json => print_json(&projection),
        OutputFormat::Csv => Ok(write_roi_csv(&projection, std::io::stdout().lock())?),
        OutputFormat::Text => {
            render_roi(&projection);
            Ok(())
        }
    }
}

pub(crate) fn render_roi(projection: &RoiProjection) {
    println!("\n{:<5} {:>16} {:>16} {:>16}", "Year", "Cost", "Saving", "Net");
    let rows = projection
        .years
        .iter()
        .zip(&projection.cumulative_costs)
        .zip(&projection.cumulative_savings)
        .zip(&projection.cumulative_net_benefit);
    for (((year, cost), saving), net) in rows {
        println!(
            "{:<5} {:>16} {:>16} {:>16}",
            year,
            signed_digits(*cost),
            signed_digits(*saving),
            signed_digits(*net)
        );
    }
    match projection.payback_year {
        Some(year) => println!("Payback in year {year}"),
        None => println!("No payback within {} years", projection.years.len().saturating_sub(1)),
    }
}

pub(crate) fn run_precompute(args: PrecomputeArgs) -> Result<(), AppError> {
    let (service, config) = cli_service()?;
    let catalog = service.catalog();
    let cost_per_hour = resolve_cost_per_hour(config.simulation.cost_per_hour, catalog);
    let analysis = precompute(
        catalog,
        cost_per_hour,
        config.simulation.roi_horizon_years,
        Utc::now(),
    );

    match args.output {
        Some(path) => {
            let mut file = File::create(&path)?;
            serde_json::to_writer_pretty(&mut file, &analysis)?;
            file.write_all(b"\n")?;
            println!("Precomputed analysis written to {}", path.display());
            Ok(())
        }
        None => print_json(&analysis),
    }
}

pub(crate) fn run_flows(args: FlowsArgs) -> Result<(), AppError> {
    let (service, _) = cli_service()?;
    let request = FlowSelectionRequest {
        flags: args.answers.flag_set()?,
        profile: args.profile.overrides(),
        mode: args.mode,
    };
    let selection = service.flow_selection(&request);
    render_flows(&selection);
    Ok(())
}

pub(crate) fn render_flows(selection: &FlowSelection<'_>) {
    println!("Hospital admission, {} mode", selection.mode.label());
    for document in &selection.documents {
        println!("- {} ({})", document.name, document.group);
    }

    let metrics = &selection.metrics;
    println!(
        "\nDocuments: plain {}, smart {}, ai {}",
        metrics.documents.plain, metrics.documents.smart, metrics.documents.ai
    );
    println!(
        "Inputs: plain {}, smart {}, ai {}",
        metrics.inputs.plain, metrics.inputs.smart, metrics.inputs.ai
    );

    if !selection.smart.warnings.is_empty() {
        println!("\nStill to decide in Smart mode:");
        for warning in &selection.smart.warnings {
            println!("- {warning}");
        }
    }

    println!("\nAI judgment:");
    for line in &selection.judgment {
        println!("- {line}");
    }

    let comparison = &selection.comparison;
    println!(
        "\nManual fields: plain {} -> ai {} ({}% fewer)",
        comparison.summaries.plain.manual,
        comparison.summaries.ai.manual,
        comparison.manual_reduction_percent
    );
    println!(
        "Estimated time: plain {}s -> ai {}s ({}% faster)",
        comparison.seconds.plain, comparison.seconds.ai, comparison.time_reduction_percent
    );
    for channel in AutomationChannel::ordered() {
        let count = comparison.channels.get(channel);
        if count > 0 {
            println!("- {}: {count}", channel.label());
        }
    }
}

pub(crate) fn run_strategy(args: StrategyArgs) -> Result<(), AppError> {
    let (service, _) = cli_service()?;
    let plan = strategy_plan(args);
    let outcome = service.strategy(&plan);
    render_strategy(&outcome);
    Ok(())
}

fn strategy_plan(args: StrategyArgs) -> StrategyPlan {
    let mut history = ViewHistory::new();
    for (domain, view) in args.viewed {
        history.entry(domain).or_default().insert(view);
    }
    StrategyPlan {
        domain_modes: args.domain_modes.into_iter().collect::<DomainModes>(),
        national_id_system: args.national_id,
        hidden_points: earned_hidden_points(&history),
    }
}

pub(crate) fn render_strategy(outcome: &StrategyOutcome) {
    let points = &outcome.points;
    println!(
        "Points: {} used of {} ({} left{})",
        points.used,
        points.available,
        points.remaining,
        if points.over_budget { ", over budget" } else { "" }
    );
    for domain in &outcome.domains {
        println!(
            "- {:<16} {:<6} manual {:>3}  {} -> {} min",
            domain.name,
            domain.mode.key(),
            domain.manual_fields,
            domain.paper_minutes,
            domain.electronic_minutes
        );
    }
    println!(
        "\nTotal inputs {}, time saved {} min, {} min per point",
        outcome.total_inputs, outcome.time_saved_minutes, outcome.minutes_per_point
    );
    println!("{}", outcome.message);
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub(crate) fn group_digits(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

fn signed_digits(value: f64) -> String {
    let magnitude = group_digits(value.abs().round() as u64);
    if value < -0.5 {
        format!("-{magnitude}")
    } else {
        magnitude
    }
}
