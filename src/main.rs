use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_train::cli::{run_release, ReleaseOptions, ReleaseReport};
use release_train::config::{self, ReleaseContext};
use release_train::host::GitHubHost;
use release_train::publish::PublishOutcome;
use release_train::ui;

#[derive(clap::Parser)]
#[command(
    name = "release-train",
    version,
    about = "Cut a release from a pull request: bump versions, write the changelog, commit once"
)]
struct Args {
    #[arg(long, env = "INPUT_OWNER", help = "Repository owner")]
    owner: Option<String>,

    #[arg(long, env = "INPUT_REPO", help = "Repository name")]
    repo: Option<String>,

    #[arg(long, env = "INPUT_PR_NUMBER", help = "Pull request whose branch names the release")]
    pr_number: Option<u64>,

    #[arg(long, env = "INPUT_TOKEN", hide_env_values = true, help = "API token")]
    token: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Use this branch name instead of the pull request's")]
    branch: Option<String>,

    #[arg(long, help = "Bump the major version")]
    major: bool,

    #[arg(long, help = "Preview the release without writing to the host")]
    dry_run: bool,

    #[arg(short, long, help = "Print debug diagnostics")]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "release_train=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    let ctx = ReleaseContext::from_inputs(args.owner, args.repo, args.pr_number, args.token)?;

    let host = match &config.host.api_url {
        Some(url) => GitHubHost::with_base_uri(&ctx.token, url)?,
        None => GitHubHost::new(&ctx.token)?,
    };

    let mut options = ReleaseOptions::today();
    options.dry_run = args.dry_run;
    options.major = args.major;
    options.branch = args.branch;

    ui::display_status(&format!(
        "Preparing release for {}/{} from pull request #{}",
        ctx.owner, ctx.repo, ctx.pr_number
    ));
    let report = run_release(&host, &ctx, &config, &options).await?;
    report_outcome(&report);
    Ok(())
}

fn report_outcome(report: &ReleaseReport) {
    for warning in &report.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_release_plan(report);

    match &report.outcome {
        None => ui::display_status("Dry run: nothing was written"),
        Some(PublishOutcome::Committed { commit_sha, .. }) => {
            ui::display_success(&format!(
                "Published {} as commit {}",
                report.dataset.version, commit_sha
            ));
        }
        Some(PublishOutcome::Unchanged { commit_sha }) => {
            ui::display_success(&format!(
                "{} already published at {}",
                report.dataset.version, commit_sha
            ));
        }
    }

    if report.tag_created {
        ui::display_success(&format!("Created tag {}", report.dataset.version));
    }
}
