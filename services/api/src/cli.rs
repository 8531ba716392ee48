use crate::demo::{
    run_analyze, run_domain, run_flows, run_precompute, run_roi, run_strategy, AnalyzeArgs,
    DomainArgs, FlowsArgs, PrecomputeArgs, RoiArgs, StrategyArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use dx_sim::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "dx-sim",
    about = "Compare Plain, Smart and AI digitalization of civic paperwork",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Per-mode field counts and time estimates for one domain
    Domain(DomainArgs),
    /// Society-wide analysis across every domain
    Analyze(AnalyzeArgs),
    /// Standalone ROI projection
    Roi(RoiArgs),
    /// Write uniform plain/smart/ai analyses as JSON
    Precompute(PrecomputeArgs),
    /// Hospital admission flow selection and summary
    Flows(FlowsArgs),
    /// Evaluate a strategy-board allocation
    Strategy(StrategyArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Domain(args) => run_domain(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Roi(args) => run_roi(args),
        Command::Precompute(args) => run_precompute(args),
        Command::Flows(args) => run_flows(args),
        Command::Strategy(args) => run_strategy(args),
    }
}
