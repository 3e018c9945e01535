use clap::Args;
use serde::Serialize;

use stalesweep::cleanup::{CleanupOutcome, CleanupRun, CleanupStep, RunSummary, ScriptExecutor};
use stalesweep::stale;

use super::{CmdResult, ConfigArgs};
use crate::tty;

#[derive(Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Report what would be cleaned without invoking the cleanup script
    #[arg(long, visible_alias = "dryrun")]
    pub dry_run: bool,

    /// Comma separated PR list to clean directly, bypassing stale resolution
    /// (e.g. --prs=481,392,123)
    #[arg(long)]
    pub prs: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrCleanResult {
    pub pr: u64,
    pub status: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanOutput {
    pub command: &'static str,
    pub app: String,
    pub namespaces: String,
    pub dry_run: bool,
    pub stale_prs: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub results: Vec<PrCleanResult>,
    pub summary: RunSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

pub fn run(args: CleanArgs, _global: &super::GlobalArgs) -> CmdResult<CleanOutput> {
    let config = args.config.resolve(args.dry_run, args.prs.clone())?;
    let stale_prs = stale::stale_set(&config)?;
    let namespaces = config.namespaces();

    if stale_prs.is_empty() {
        tty::status("No stale pull requests found. Nothing to clean.");
        return Ok((
            CleanOutput {
                command: "clean",
                app: config.app,
                namespaces,
                dry_run: config.dry_run,
                stale_prs,
                results: Vec::new(),
                summary: RunSummary::default(),
                hints: vec!["No stale pull requests found. Nothing to clean.".to_string()],
            },
            0,
        ));
    }

    let executor = ScriptExecutor::new(config.script.clone());
    let cleanup = CleanupRun::new(&executor, &namespaces, &config.app, &stale_prs, config.dry_run);

    let mut summary = RunSummary::default();
    let mut results = Vec::with_capacity(stale_prs.len());

    // Pull one step at a time so progress stays interleaved with execution.
    for step in cleanup {
        summary.record(&step);
        surface_step(&step, config.dry_run);
        results.push(to_result(step, config.dry_run));
    }

    tty::status(&format!(
        "{} cleaned, {} failed",
        summary.cleaned, summary.failed
    ));

    let mut hints = Vec::new();
    if config.dry_run {
        hints.push(format!(
            "Dry run: {} PR environment(s) would be cleaned.",
            summary.total
        ));
    }
    if !summary.failed_prs.is_empty() {
        hints.push(format!(
            "Failed PRs can be retried directly: stalesweep clean --prs={}",
            summary
                .failed_prs
                .iter()
                .map(|pr| pr.to_string())
                .collect::<Vec<_>>()
                .join(",")
        ));
    }

    Ok((
        CleanOutput {
            command: "clean",
            app: config.app,
            namespaces,
            dry_run: config.dry_run,
            stale_prs,
            results,
            summary,
            hints,
        },
        0,
    ))
}

/// Echo the cleanup script's output between steps. Stderr only, and only
/// when attached to a terminal, so the stdout JSON envelope stays clean.
fn surface_step(step: &CleanupStep, dry_run: bool) {
    match &step.outcome {
        CleanupOutcome::Cleaned(output) if !dry_run && !output.is_empty() => {
            if !output.stdout.trim().is_empty() {
                tty::status(output.stdout.trim_end());
            }
            if !output.stderr.trim().is_empty() {
                tty::status(output.stderr.trim_end());
            }
        }
        CleanupOutcome::Failed(message) => {
            tty::status(&format!("PR {} failed: {}", step.pr, message));
        }
        CleanupOutcome::Cleaned(_) => {}
    }
}

fn to_result(step: CleanupStep, dry_run: bool) -> PrCleanResult {
    match step.outcome {
        CleanupOutcome::Cleaned(output) => PrCleanResult {
            pr: step.pr,
            status: if dry_run { "would clean" } else { "cleaned" },
            stdout: output.stdout,
            stderr: output.stderr,
            error: None,
        },
        CleanupOutcome::Failed(message) => PrCleanResult {
            pr: step.pr,
            status: "failed",
            stdout: String::new(),
            stderr: String::new(),
            error: Some(message),
        },
    }
}
