use anyhow::Context;
use api_client::ApplicationClient;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use configuration::{init_tracing, load_config, load_fixtures, Config, Dataset, Fixtures};
use indicatif::{ProgressBar, ProgressStyle};
use scenarios::{run_scenario, Outcome, QueryModule, ScenarioKind, ScenarioReport};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

/// The main entry point for the gridcheck verification suite.
#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env is fine; the token may come from the environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    let _guard = init_tracing(&config.logging)?;
    let fixtures = load_fixtures(&cli.fixtures)
        .with_context(|| format!("failed to load {}", cli.fixtures.display()))?;

    match cli.command {
        Commands::List => {
            print_scenarios(&fixtures);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run(args) => handle_run(args, config, fixtures).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Verifies grid queries and WMM recalculations of a financial data service.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Service, verification and logging settings.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Datasets, tree orders and mnemonics the scenarios use.
    #[arg(long, global = true, default_value = "fixtures.toml")]
    fixtures: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario, or `all` of them.
    Run(RunArgs),
    /// List the scenarios and the datasets each one covers.
    List,
}

#[derive(Parser)]
struct RunArgs {
    /// A scenario name (see `list`) or `all`.
    #[arg(value_parser = parse_selection)]
    scenario: Selection,

    /// Restrict the run to one dataset instead of every dataset with fixtures.
    #[arg(long, value_enum)]
    dataset: Option<Dataset>,
}

#[derive(Clone)]
enum Selection {
    All,
    One(ScenarioKind),
}

fn parse_selection(raw: &str) -> Result<Selection, String> {
    if raw.eq_ignore_ascii_case("all") {
        return Ok(Selection::All);
    }
    ScenarioKind::from_str(raw, true).map(Selection::One)
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

/// Runs the selected scenarios sequentially and prints a summary.
async fn handle_run(args: RunArgs, config: Config, fixtures: Fixtures) -> anyhow::Result<ExitCode> {
    let client = ApplicationClient::new(&config.service).context("failed to build the HTTP client")?;
    let module = QueryModule::new(Arc::new(client), &fixtures, config.verification.clone());

    let kinds: Vec<ScenarioKind> = match args.scenario {
        Selection::All => ScenarioKind::all().to_vec(),
        Selection::One(kind) => vec![kind],
    };
    let plan: Vec<(ScenarioKind, Dataset)> = kinds
        .into_iter()
        .flat_map(|kind| {
            let datasets = match args.dataset {
                Some(dataset) => vec![dataset],
                None => kind.datasets(&fixtures),
            };
            datasets.into_iter().map(move |dataset| (kind, dataset))
        })
        .collect();

    if plan.is_empty() {
        warn!("No dataset has fixtures for the selected scenarios");
        return Ok(ExitCode::SUCCESS);
    }
    info!(runs = plan.len(), base_url = %config.service.base_url, "Starting verification run");

    let progress_bar = ProgressBar::new(plan.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut reports = Vec::with_capacity(plan.len());
    for (kind, dataset) in plan {
        progress_bar.set_message(format!("{kind} on {dataset}"));
        reports.push(run_scenario(&module, &fixtures, kind, dataset).await);
        progress_bar.inc(1);
    }
    progress_bar.finish_with_message("Verification complete");

    println!("{}", summary_table(&reports));

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed > 0 {
        warn!(failed, total = reports.len(), "Some scenarios failed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn summary_table(reports: &[ScenarioReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Scenario", "Dataset", "Checks", "Result", "Details", "Run id"]);

    for report in reports {
        let (color, details) = match &report.outcome {
            Outcome::Passed => (Color::Green, String::new()),
            Outcome::Failed(message) => (Color::Red, message.clone()),
        };
        table.add_row(vec![
            Cell::new(&report.scenario),
            Cell::new(report.dataset),
            Cell::new(report.checks),
            Cell::new(&report.outcome).fg(color),
            Cell::new(details),
            Cell::new(report.run_id),
        ]);
    }
    table
}

fn print_scenarios(fixtures: &Fixtures) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Scenario", "Datasets"]);
    for kind in ScenarioKind::all() {
        let datasets: Vec<String> = kind.datasets(fixtures).iter().map(Dataset::to_string).collect();
        table.add_row(vec![kind.as_str().to_string(), datasets.join(", ")]);
    }
    println!("{table}");
}
