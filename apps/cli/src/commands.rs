//! CLI command definitions, routing, and tracing setup.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use leadcollector_core::pipeline::{LeadReport, LeadRequest, run_leads};
use leadcollector_core::progress::{DONE_PERCENT, ProgressReporter, Step};
use leadcollector_shared::{
    AppConfig, CandidatePost, GeminiModel, HIGH_INTENT_SCORE, RunConfig, config_file_path,
    init_config, load_config, load_config_from, resolve_api_key,
};
use tracing::info;

const LOWER_THRESHOLD_HINT: &str = "No posts met AI threshold. Try lowering to 35–40.";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// LeadCollector — find LinkedIn posts with buying intent.
#[derive(Parser)]
#[command(
    name = "leadcollector",
    version,
    about = "Search LinkedIn posts similar to an example and score them for B2B buying intent.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Find, score and export leads similar to an example post.
    Run(RunArgs),

    /// List supported Gemini models.
    Models,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `leadcollector run`.
#[derive(Args)]
pub(crate) struct RunArgs {
    /// LinkedIn post to use as the reference.
    #[arg(long)]
    pub example_url: String,

    /// Target phrase or theme, e.g. "CRM integration".
    #[arg(long)]
    pub phrase: String,

    /// SerpAPI key (falls back to the env var named in the config file).
    #[arg(long)]
    pub serpapi_key: Option<String>,

    /// Gemini API key (falls back to the env var named in the config file).
    #[arg(long)]
    pub gemini_key: Option<String>,

    /// Gemini model, e.g. models/gemini-2.0-flash.
    #[arg(long)]
    pub model: Option<GeminiModel>,

    /// Minimum relevance score for a qualified lead (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub min_score: Option<u8>,

    /// Number of search results to score (10-50).
    #[arg(long, value_parser = clap::value_parser!(u32).range(10..=50))]
    pub max_results: Option<u32>,

    /// Directory for the CSV export.
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Skip writing the CSV export.
    #[arg(long)]
    pub no_export: bool,

    /// Report format on stdout.
    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// Config file (defaults to ~/.leadcollector/leadcollector.toml).
    #[arg(long, env = "LEADCOLLECTOR_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "leadcollector=info",
        1 => "leadcollector=debug",
        _ => "leadcollector=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => cmd_run(args).await,
        Command::Models => cmd_models(),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

async fn cmd_run(args: RunArgs) -> Result<()> {
    let app_config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let run_config = build_run_config(&app_config, &args);
    let request = LeadRequest {
        example_url: args.example_url.clone(),
        phrase: args.phrase.clone(),
    };

    info!(config = ?run_config, "resolved run configuration");

    let progress = CliProgress::new()?;
    let outcome = run_leads(&run_config, &request, &progress).await;
    progress.clear();
    let report = outcome?;

    let export_path = match &report.export {
        Some(export) if !args.no_export => Some(export.write_to(&args.out_dir)?),
        _ => None,
    };

    match args.format {
        OutputFormat::Text => print!("{}", render_text(&report, export_path.as_deref())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Merge config file values with CLI flags and env-provided credentials.
fn build_run_config(config: &AppConfig, args: &RunArgs) -> RunConfig {
    let mut run = RunConfig::from(config);
    run.serpapi_key = resolve_api_key(args.serpapi_key.as_deref(), &config.serpapi.api_key_env);
    run.gemini_key = resolve_api_key(args.gemini_key.as_deref(), &config.gemini.api_key_env);
    if let Some(model) = args.model {
        run.model = model;
    }
    if let Some(min_score) = args.min_score {
        run.min_score = min_score;
    }
    if let Some(max_results) = args.max_results {
        run.max_results = max_results;
    }
    run
}

fn cmd_models() -> Result<()> {
    let default = GeminiModel::default();
    for model in GeminiModel::ALL {
        if model == default {
            println!("{model} (default)");
        } else {
            println!("{model}");
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("# {}", config_file_path()?.display());
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Report rendering
// ---------------------------------------------------------------------------

fn render_text(report: &LeadReport, export_path: Option<&Path>) -> String {
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "  Posts found:  {}", report.found);
    let _ = writeln!(
        out,
        "  Qualified:    {} (score >= {})",
        report.qualified_count(),
        report.min_score
    );
    let _ = writeln!(
        out,
        "  High intent:  {} ({HIGH_INTENT_SCORE}+)",
        report.high_intent_count()
    );
    let _ = writeln!(out, "  Time:         {:.1}s", report.elapsed.as_secs_f64());

    if !report.scored.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  All posts");
        for post in &report.scored {
            let _ = writeln!(out, "    AI {:>3} → {}", post.ai_score, post.url);
        }
    }

    if report.qualified.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  {LOWER_THRESHOLD_HINT}");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Qualified leads");
    for post in &report.qualified {
        render_lead(&mut out, post);
    }

    let _ = writeln!(out);
    match export_path {
        Some(path) => {
            let _ = writeln!(
                out,
                "  Exported {} leads to {}",
                report.qualified_count(),
                path.display()
            );
        }
        None => {
            let _ = writeln!(out, "  Export skipped");
        }
    }

    out
}

fn render_lead(out: &mut String, post: &CandidatePost) {
    let _ = writeln!(out, "    [{:>3}] {}", post.ai_score, post.url);
    if !post.reason.is_empty() {
        let _ = writeln!(out, "          Reason: {}", post.reason);
    }
    if !post.key_match.is_empty() {
        let _ = writeln!(out, "          Signal: {}", post.key_match);
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif percentage bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let bar = ProgressBar::new(u64::from(DONE_PERCENT));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos:>3}% {msg}")?
                .progress_chars("=> ")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { bar })
    }

    fn clear(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str, percent: u8) {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(name.to_string());
    }

    fn candidate_scored(&self, post: &CandidatePost, step: Step) {
        self.bar.set_position(u64::from(step.percent()));
        self.bar.set_message(format!(
            "Scored [{}/{}] AI {} {}",
            step.index + 1,
            step.total,
            post.ai_score,
            post.url
        ));
    }

    fn done(&self, _report: &LeadReport) {
        self.bar.finish_and_clear();
    }
}
