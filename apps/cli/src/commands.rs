//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docintel_core::pipeline::{ProgressReporter, RunConfig, RunSummary, run_job};
use docintel_pdf::{DocumentProcessor, LopdfProcessor};
use docintel_shared::{
    AppConfig, clamp_max_results, init_config, load_config, load_config_from, resolve_run_paths,
    resolve_working_dir,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docintel: rank the document sections that matter for a persona's task.
#[derive(Parser)]
#[command(
    name = "docintel",
    version,
    about = "Rank the sections of a PDF collection by relevance to a persona and task.",
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

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyze a collection and write the ranked sections.
    Run {
        /// Collection directory holding the input JSON and a PDFs/ folder.
        /// Defaults to the container data directory, then the current directory.
        #[arg(short, long, env = "DOCINTEL_DIR")]
        dir: Option<PathBuf>,

        /// Config file (defaults to ~/.docintel/docintel.toml).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Maximum number of ranked sections. Zero or negative yields none.
        #[arg(long, allow_negative_numbers = true)]
        max_results: Option<i64>,

        /// Number of PDFs processed at once.
        #[arg(long)]
        concurrency: Option<u32>,

        /// Output file (defaults to the configured name next to the input).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the extracted title, outline and page text of one PDF as JSON.
    Outline {
        /// PDF file to inspect.
        pdf: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docintel=info",
        1 => "docintel=debug",
        _ => "docintel=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
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
        Command::Run {
            dir,
            config,
            max_results,
            concurrency,
            output,
        } => {
            let overrides = RunOverrides {
                max_results,
                concurrency,
                output,
            };
            cmd_run(dir.as_deref(), config.as_deref(), overrides).await
        }
        Command::Outline { pdf } => cmd_outline(&pdf).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Flags that take precedence over the config file.
struct RunOverrides {
    max_results: Option<i64>,
    concurrency: Option<u32>,
    output: Option<PathBuf>,
}

fn load_app_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

async fn cmd_run(dir: Option<&Path>, config: Option<&Path>, overrides: RunOverrides) -> Result<()> {
    let app_config = load_app_config(config)?;

    let working_dir = resolve_working_dir(dir, &app_config.paths)?;
    let paths = resolve_run_paths(&working_dir, &app_config.paths)?;

    let mut run_config = RunConfig::new(&app_config, paths);
    if let Some(n) = overrides.max_results {
        run_config.max_results = clamp_max_results(n);
    }
    if let Some(n) = overrides.concurrency {
        if n == 0 {
            return Err(eyre!("--concurrency must be at least 1"));
        }
        run_config.concurrency = n as usize;
    }
    if let Some(out) = overrides.output {
        run_config.paths.output_json = out;
    }

    info!(
        dir = %run_config.paths.working_dir.display(),
        input = %run_config.paths.input_json.display(),
        max_results = run_config.max_results,
        "starting analysis"
    );

    let processor: Arc<dyn DocumentProcessor> = Arc::new(LopdfProcessor::new());
    let reporter = CliProgress::new()?;

    let summary = run_job(&run_config, processor, &reporter).await?;

    // Print summary
    println!();
    println!("  Analysis complete!");
    println!("  Documents: {}", summary.documents_loaded);
    if summary.documents_failed > 0 {
        println!("  Skipped:   {}", summary.documents_failed);
    }
    println!("  Sections:  {}", summary.sections_ranked);
    println!("  Output:    {}", summary.output_path.display());
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_outline(pdf: &Path) -> Result<()> {
    if !pdf.is_file() {
        return Err(eyre!("'{}' is not a file", pdf.display()));
    }

    let path = pdf.to_path_buf();
    let record = tokio::task::spawn_blocking(move || LopdfProcessor::new().process(&path))
        .await
        .map_err(|e| eyre!("outline extraction failed: {e}"))??;

    info!(
        filename = %record.filename,
        headings = record.outline.len(),
        pages = record.page_count(),
        "outline extracted"
    );

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Result<Self> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")?
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { spinner })
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn document_loaded(&self, filename: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Processing [{current}/{total}] {filename}"));
    }

    fn done(&self, _summary: &RunSummary) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    /// Clear the spinner on every exit path, including errors from `run_job`.
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}
