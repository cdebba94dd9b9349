mod api;
mod server;

use clap::{Args, Parser, Subcommand};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use influence_index::account::{parse_records, AccountRecord};
use influence_index::business::BatchAnalysis;
use influence_index::config::{AnalysisConfig, AnalysisMode, Settings};
use influence_index::metrics::{BaseMetrics, MetricSet};
use influence_index::scenarios::{OptimalityMode, ProbabilityContext};
use influence_index::synthetic::generate_synthetic_accounts;
use influence_index::{
    analyze, format_float, format_number, format_percent, scenario_probability_for_key,
    AccountAnalysis, Analysis, AnalysisRequest,
};

#[derive(Parser)]
#[command(name = "influence-index", about = "Influencer account scoring and scenario planner")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Score one account and rank improvement scenarios for it.
    Analyze(AnalyzeArgs),
    /// Score several accounts against each other.
    Batch(BatchArgs),
    /// Print the success probability of a scenario key.
    Probability(ProbabilityArgs),
    /// Run a batch and a single-account analysis on synthetic accounts.
    Demo(DemoArgs),
    /// Write the default configuration file.
    InitConfig(InitConfigArgs),
    Serve(ServeArgs),
}

#[derive(Args, Debug, Clone)]
struct AnalyzeArgs {
    /// JSON file with one account record. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Optimality mode override: normalized or raw.
    #[arg(long)]
    mode: Option<String>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct BatchArgs {
    /// JSON file with an array of account records. Reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ProbabilityArgs {
    key: String,
    /// Account record to derive the probability from instead of the defaults.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct DemoArgs {
    #[arg(long, default_value_t = 5)]
    count: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long)]
    json: bool,
}

impl Default for DemoArgs {
    fn default() -> Self {
        Self {
            count: 5,
            seed: 42,
            json: false,
        }
    }
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long, default_value = "config/influence.toml")]
    path: PathBuf,
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "webapp/dist")]
    web_root: String,
    /// JSON file holding settings and catalog edits made through the API.
    #[arg(long, default_value = "data/settings.json")]
    store: String,
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Demo(DemoArgs::default()));

    match command {
        Command::Analyze(args) => run_analyze(args),
        Command::Batch(args) => run_batch(args),
        Command::Probability(args) => run_probability(args),
        Command::Demo(args) => run_demo(args),
        Command::InitConfig(args) => run_init_config(args),
        Command::Serve(args) => {
            let config = load_config(args.config.clone())?;
            server::serve(args, config).await
        }
    }
}

fn run_analyze(args: AnalyzeArgs) -> Result<(), String> {
    let config = load_config(args.config)?;
    let mut settings = config.creator.clone();
    if let Some(mode) = args.mode.as_deref() {
        settings.optimality_mode = mode.parse::<OptimalityMode>()?;
    }

    let settings = Settings::Creator(settings);
    report_weight_issues(&settings);
    let records = read_records(args.input.as_deref())?;
    let request = AnalysisRequest::new(settings, records, config.scenarios.clone())
        .map_err(|err| err.to_string())?;
    let analysis = match analyze(&request).map_err(|err| err.to_string())? {
        Analysis::Creator(analysis) => analysis,
        Analysis::Business(_) => return Err("expected a creator analysis".to_string()),
    };

    if args.json {
        return print_json(&analysis);
    }
    print_account(&analysis);
    Ok(())
}

fn run_batch(args: BatchArgs) -> Result<(), String> {
    let config = load_config(args.config)?;
    let settings = config.settings(AnalysisMode::Business);
    report_weight_issues(&settings);
    let records = read_records(args.input.as_deref())?;
    let request =
        AnalysisRequest::new(settings, records, Vec::new()).map_err(|err| err.to_string())?;
    let analysis = match analyze(&request).map_err(|err| err.to_string())? {
        Analysis::Business(analysis) => analysis,
        Analysis::Creator(_) => return Err("expected a business analysis".to_string()),
    };

    if args.json {
        return print_json(&analysis);
    }
    print_batch(&analysis);
    Ok(())
}

fn run_probability(args: ProbabilityArgs) -> Result<(), String> {
    let probability = match args.input.as_deref() {
        Some(path) => {
            let record = single_record(read_records(Some(path))?)?;
            let base = BaseMetrics::from_record(&record);
            let context = ProbabilityContext::new(&base, &record);
            scenario_probability_for_key(&args.key, Some(&context))
        }
        None => scenario_probability_for_key(&args.key, None),
    };
    println!("{}: {}", args.key, format_percent(probability));
    Ok(())
}

fn run_demo(args: DemoArgs) -> Result<(), String> {
    let config = load_config(None)?;
    let records = generate_synthetic_accounts(args.count, args.seed);
    debug!(count = records.len(), seed = args.seed, "synthetic accounts generated");

    let batch_request =
        AnalysisRequest::new(config.settings(AnalysisMode::Business), records.clone(), Vec::new())
            .map_err(|err| err.to_string())?;
    let batch = analyze(&batch_request).map_err(|err| err.to_string())?;

    let Some(first) = records.into_iter().next() else {
        return Err("demo needs at least one account (--count)".to_string());
    };
    let account_request = AnalysisRequest::new(
        config.settings(AnalysisMode::Creator),
        vec![first],
        config.scenarios.clone(),
    )
    .map_err(|err| err.to_string())?;
    let account = analyze(&account_request).map_err(|err| err.to_string())?;

    if args.json {
        return print_json(&serde_json::json!({ "batch": batch, "account": account }));
    }
    if let Analysis::Business(batch) = &batch {
        print_batch(batch);
    }
    if let Analysis::Creator(account) = &account {
        println!();
        print_account(account);
    }
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    if args.path.exists() && !args.force {
        return Err(format!(
            "config already exists at {} (pass --force to overwrite)",
            args.path.display()
        ));
    }
    AnalysisConfig::default()
        .write(&args.path)
        .map_err(|err| err.to_string())?;
    println!("Wrote default config to {}", args.path.display());
    Ok(())
}

fn print_account(analysis: &AccountAnalysis) {
    println!("Account: {} ({})", analysis.record.label(), analysis.account_id);
    print_metrics(&analysis.metrics);
    println!(
        "\nScenarios ({} optimality):",
        analysis.optimality_mode.label()
    );
    for outcome in &analysis.scenarios.outcomes {
        let scenario = &outcome.descriptor;
        let status = if scenario.active { "" } else { " [inactive]" };
        println!(
            "- {}{}: dII {} | dSI {} | cost {} | probability {}",
            scenario.name,
            status,
            format_float(scenario.delta_ii, 4),
            format_float(scenario.delta_si, 4),
            format_float(scenario.cost, 2),
            format_percent(scenario.probability)
        );
    }

    let rankings = &analysis.scenarios.rankings;
    println!("\nBy suitability: {}", rankings.suitability_ranking.join(", "));
    println!("By superiority: {}", rankings.superiority_ranking.join(", "));
    println!("By optimality: {}", rankings.optimality_ranking.join(", "));
    match analysis.scenarios.recommended() {
        Some(scenario) => println!("Recommended: {}", scenario.name),
        None => println!("Recommended: none (no active scenarios)"),
    }
}

fn print_batch(analysis: &BatchAnalysis) {
    println!("Accounts analyzed: {}", analysis.accounts.len());
    println!(
        "Batch averages: II {} | SI {} | ER {} | reach {}",
        format_float(analysis.averages.influence_index, 4),
        format_float(analysis.averages.sustainability_index, 4),
        format_float(analysis.averages.engagement_rate, 2),
        format_number(analysis.averages.avg_reach)
    );

    println!("\nRanking by influence:");
    for (position, account_id) in analysis.ranking_by_ii.iter().enumerate() {
        if let Some(account) = analysis.account(account_id) {
            println!(
                "{}. {} II {}",
                position + 1,
                account.record.label(),
                format_float(account.metrics.influence_index(), 4)
            );
        }
    }

    println!("\nRanking by sustainability:");
    for (position, account_id) in analysis.ranking_by_si.iter().enumerate() {
        if let Some(account) = analysis.account(account_id) {
            println!(
                "{}. {} SI {}",
                position + 1,
                account.record.label(),
                format_float(account.metrics.sustainability_index(), 4)
            );
        }
    }
}

fn print_metrics(metrics: &MetricSet) {
    let base = metrics.base();
    println!(
        "Followers ratio {} | growth {} | engagement {}",
        format_float(base.followers_ratio, 2),
        format_percent(base.growth_rate),
        format_percent(base.engagement_rate)
    );
    println!(
        "Activity stability {} | posts/week {} | reach {} | mentions {}",
        format_float(base.activity_stability, 2),
        format_float(base.post_frequency, 1),
        format_number(base.avg_reach),
        format_number(base.mentions)
    );
    println!(
        "Influence index {} | sustainability index {}",
        format_float(metrics.influence_index(), 4),
        format_float(metrics.sustainability_index(), 4)
    );
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let payload = serde_json::to_string_pretty(value)
        .map_err(|err| format!("failed to serialize output: {}", err))?;
    println!("{}", payload);
    Ok(())
}

fn report_weight_issues(settings: &Settings) {
    for issue in settings.weight_issues() {
        warn!(group = issue.group, sum = issue.sum, "{}", issue);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<AnalysisConfig, String> {
    let (config, path) = AnalysisConfig::load(path).map_err(|err| err.to_string())?;
    debug!(path = ?path, "config loaded");
    Ok(config)
}

fn read_records(path: Option<&Path>) -> Result<Vec<AccountRecord>, String> {
    let payload = match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("failed reading {}: {}", path.display(), err))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|err| format!("failed reading stdin: {}", err))?;
            buffer
        }
    };
    if payload.trim().is_empty() {
        return Err("missing account data: pass --input or pipe JSON to stdin".to_string());
    }
    parse_records(&payload).map_err(|err| format!("invalid account data: {}", err))
}

fn single_record(mut records: Vec<AccountRecord>) -> Result<AccountRecord, String> {
    if records.len() != 1 {
        return Err(format!("expected exactly one account, got {}", records.len()));
    }
    Ok(records.remove(0))
}

fn init_tracing() {
    let filter = std::env::var("INFLUENCE_LOG")
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("influence_index=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}
