use air_core::trees;
use air_core::{
    format_status_line, poll_until_terminal, render_reviews, AirClient, AirError, PatchSource,
    PollOutcome, ReviewFormat, ReviewId, ReviewState, ReviewStatus, StatusSource, SubmissionInput,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// CLI tool for submitting patches to AIR and monitoring review status
#[derive(Parser, Debug)]
#[command(name = "air-submit", version)]
#[command(about = "Submit patches to AIR for review or check existing review status", long_about = None)]
#[command(after_help = help_epilog())]
struct Cli {
    /// AIR service URL (e.g., https://example.com/air)
    #[arg(long)]
    url: String,

    /// API authentication token
    #[arg(long)]
    token: String,

    /// Git tree name (e.g., netdev/net-next) [required for submission]
    #[arg(long)]
    tree: Option<String>,

    /// Git branch name (optional)
    #[arg(long)]
    branch: Option<String>,

    /// Review output format
    #[arg(long, default_value = "inline", value_parser = ["json", "markup", "inline"])]
    format: String,

    /// Status polling interval in seconds
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Do not wait for review completion (submit or check once and exit)
    #[arg(long)]
    no_wait: bool,

    /// Patchwork series ID to review
    #[arg(long, value_name = "SERIES_ID")]
    pw_series: Option<u64>,

    /// Existing review ID to check (skip submission)
    #[arg(long, value_name = "ID")]
    review_id: Option<String>,

    /// Patch files to submit
    #[arg(value_name = "PATCH_FILE")]
    patches: Vec<PathBuf>,
}

fn help_epilog() -> String {
    format!(
        "\
Examples:
  # Submit patch files
  air-submit --url https://example.com/air --token mytoken --tree netdev/net-next 0001-fix.patch 0002-feat.patch

  # Submit patchwork series
  air-submit --url https://example.com/air --token mytoken --tree netdev/net-next --pw-series 1026553

  # Check existing review
  air-submit --url https://example.com/air --token mytoken --review-id abc-123-def

  # Submit and exit without polling
  air-submit --url https://example.com/air --token mytoken --tree netdev/net-next --no-wait 0001-fix.patch

  # Check once and get results if done
  air-submit --url https://example.com/air --token mytoken --review-id abc-123-def --no-wait --format markup

Known trees: {}",
        trees::known_tree_names().join(", ")
    )
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

/// Check if colors should be disabled based on NO_COLOR env var.
fn colors_disabled() -> bool {
    std::env::var("NO_COLOR")
        .map(|v| !v.is_empty() && v != "0" && v.to_lowercase() != "false")
        .unwrap_or(false)
}

fn require_tree(tree: Option<&str>) -> air_core::Result<&str> {
    tree.ok_or_else(|| {
        AirError::Usage(format!(
            "--tree is required when submitting new review (known trees: {})",
            trees::known_tree_names().join(", ")
        ))
    })
}

/// Read every patch file up front so a bad path fails before anything is
/// submitted.
fn read_patch_files(paths: &[PathBuf]) -> air_core::Result<Vec<String>> {
    paths
        .iter()
        .map(|path| {
            fs::read_to_string(path).map_err(|source| AirError::File {
                path: path.clone(),
                source,
            })
        })
        .collect()
}

/// Print the final results and surface a failed review as an error.
fn report_results<W: Write>(status: &ReviewStatus, out: &mut W, color: bool) -> Result<()> {
    let reviews = status.reviews.as_deref().unwrap_or_default();
    if reviews.is_empty() {
        writeln!(out, "No reviews available")?;
    } else {
        render_reviews(out, reviews, status.patch_count, color)?;
    }

    if let ReviewState::Error = status.state {
        let message = status.message.as_deref().unwrap_or("Unknown error");
        return Err(AirError::Review(message.to_string()).into());
    }

    Ok(())
}

/// Fetch the status once, and fetch results too if the review already
/// reached a terminal state.
fn check_once<S: StatusSource, W: Write>(
    source: &S,
    review_id: &ReviewId,
    format: ReviewFormat,
    out: &mut W,
    color: bool,
) -> Result<()> {
    let status = source.fetch_status(review_id, None)?;
    writeln!(out, "{}", format_status_line(&status, color))?;

    if !status.state.is_terminal() {
        return Ok(());
    }

    writeln!(out, "\nFetching review results...")?;
    let final_status = source
        .fetch_status(review_id, Some(format))
        .context("failed to fetch review results")?;
    report_results(&final_status, out, color)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        url,
        token,
        tree,
        branch,
        format,
        poll_interval,
        no_wait,
        pw_series,
        review_id,
        patches,
    } = cli;

    let format: ReviewFormat = format.parse()?;
    let input = SubmissionInput::select(patches, pw_series, review_id)?;

    let client = AirClient::new(&url, &token)?;
    let color = io::stdout().is_terminal() && !colors_disabled();

    let (review_id, is_new_submission) = match input {
        SubmissionInput::PatchFiles(paths) => {
            let tree = require_tree(tree.as_deref())?;
            println!("Reading {} patch file(s)...", paths.len());
            let patches = read_patch_files(&paths)?;
            println!("Submitting to {}...", tree);
            let id = client
                .submit(tree, branch.as_deref(), PatchSource::Patches(patches))
                .context("failed to submit review")?;
            (id, true)
        }
        SubmissionInput::Series(series) => {
            let tree = require_tree(tree.as_deref())?;
            println!("Submitting patchwork series {} to {}...", series, tree);
            let id = client
                .submit(tree, branch.as_deref(), PatchSource::Series(series))
                .context("failed to submit review")?;
            (id, true)
        }
        SubmissionInput::Existing(id) => {
            println!("Checking review: {}", id);
            (id, false)
        }
    };

    if is_new_submission {
        println!("Review ID: {}", review_id);

        if no_wait {
            println!("Submission complete (--no-wait specified)");
            return Ok(());
        }

        println!("Monitoring status (polling every {}s)...\n", poll_interval);
    }

    if no_wait {
        return check_once(&client, &review_id, format, &mut io::stdout(), color);
    }

    // SIGINT is only diverted while the polling loop runs. Outside of it the
    // default handler terminates the process as usual.
    let interrupted = Arc::new(AtomicBool::new(false));
    let sig = signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))
        .context("failed to install SIGINT handler")?;

    debug!("monitoring review {} every {}s", review_id, poll_interval);
    let outcome = poll_until_terminal(
        &client,
        &review_id,
        Duration::from_secs(poll_interval),
        &interrupted,
        &mut io::stdout(),
        color,
    )?;
    signal_hook::low_level::unregister(sig);

    if let PollOutcome::Interrupted = outcome {
        println!("\n\nInterrupted by user. Review ID: {}", review_id);
        process::exit(1);
    }

    println!("\nFetching review results...");
    let final_status = client
        .status(&review_id, Some(format))
        .context("failed to fetch review results")?;
    report_results(&final_status, &mut io::stdout(), color)
}

fn main() {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        // Help and version requests land here too; only genuine usage
        // errors exit nonzero.
        let code = if err.use_stderr() { 1 } else { 0 };
        let _ = err.print();
        process::exit(code);
    });

    init_logging();

    if let Err(err) = run(cli) {
        eprintln!("Error: {:#}", err);
        process::exit(1);
    }
}
