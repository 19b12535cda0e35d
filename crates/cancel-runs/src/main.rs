//! cancel-runs - cancel superseded GitHub Actions runs of the current workflow.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cancel_runs::github::GITHUB_API_URL;
use cancel_runs::{CancelOptions, GitHubClient, Inputs, Target};

/// Token input name used when running as a GitHub Action.
const ENV_ACTION_TOKEN: &str = "INPUT_TOKEN";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Cancel older queued or in-progress runs of this workflow on the same branch.
#[derive(Parser, Debug)]
#[command(name = "cancel-runs", version)]
#[command(about = "Cancel superseded workflow runs for the current branch")]
struct Cli {
    /// API token (or set `GITHUB_TOKEN` / `INPUT_TOKEN`).
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository slug, owner/repo.
    #[arg(long, env = "GITHUB_REPOSITORY", default_value = "")]
    repository: String,

    /// Id of the current run.
    #[arg(long, env = "GITHUB_RUN_ID", default_value = "")]
    run_id: String,

    /// Event that triggered the current run.
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "")]
    event_name: String,

    /// Ref of the current run (refs/heads/... or refs/tags/...).
    #[arg(long, env = "GITHUB_REF")]
    git_ref: Option<String>,

    /// Source branch of a pull request run.
    #[arg(long, env = "GITHUB_HEAD_REF")]
    head_ref: Option<String>,

    /// API root URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = GITHUB_API_URL)]
    api_url: String,

    /// Log the runs that would be cancelled without cancelling them.
    #[arg(long, env = "CANCEL_RUNS_DRY_RUN", default_value = "false")]
    dry_run: bool,

    /// Maximum number of cancel requests in flight.
    #[arg(long, env = "CANCEL_RUNS_MAX_CONCURRENT", default_value = "1")]
    max_concurrent: usize,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    /// Log output format.
    #[arg(long, env = "CANCEL_RUNS_LOG_FORMAT", value_enum, default_value = "text")]
    log_format: LogFormat,
}

impl Cli {
    fn inputs(&self) -> Inputs {
        Inputs {
            repository: self.repository.clone(),
            run_id: self.run_id.clone(),
            event_name: self.event_name.clone(),
            git_ref: self.git_ref.clone(),
            head_ref: self.head_ref.clone(),
        }
    }

    fn token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(ENV_ACTION_TOKEN).ok())
            .filter(|t| !t.trim().is_empty())
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_format);

    let ctx = match cli.inputs().resolve_target()? {
        Target::Dedupe(ctx) => ctx,
        Target::Skip(reason) => {
            info!(reason = %reason, "Nothing to deduplicate");
            return Ok(());
        }
    };

    let token = cli
        .token()
        .context("Missing API token, set GITHUB_TOKEN or INPUT_TOKEN")?;
    let client =
        GitHubClient::with_base_url(&token, &cli.api_url).context("Failed to create API client")?;

    let options = CancelOptions {
        dry_run: cli.dry_run,
        max_concurrent: cli.max_concurrent,
    };
    let report = cancel_runs::run(&client, &ctx, options)
        .await
        .with_context(|| format!("Failed to deduplicate runs for {}", ctx.repository))?;

    info!(
        cancelled = report.cancelled(),
        failed = report.failed(),
        dry_run = report.dry_run(),
        "Done"
    );
    Ok(())
}
