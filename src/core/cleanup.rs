//! Fault-tolerant batch cleanup over a resolved stale PR list.
//!
//! `CleanupRun` is a pull-based iterator: each `next()` performs exactly one
//! cleanup (or synthesizes one in dry-run mode) and returns its outcome, so
//! the caller can interleave progress reporting and result accounting with
//! execution. Cleanups run strictly sequentially — the platform API makes no
//! concurrency-safety promise for simultaneous deletes — and one PR's
//! failure never blocks the remaining environments.

use std::process::Command;

use serde::Serialize;

use crate::command::{self, CapturedOutput};
use crate::error::{Error, Result};

/// Performs the actual deletion of one PR's environments. The trait seam
/// keeps the orchestrator testable without spawning processes.
pub trait CleanupExecutor {
    fn clean(&self, namespaces: &str, app: &str, pr: u64) -> Result<CapturedOutput>;
}

/// Runs the cleanup shell script for one PR across the joined namespace
/// list, capturing its output. Timeouts are the script's own business.
pub struct ScriptExecutor {
    script: String,
}

impl ScriptExecutor {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl CleanupExecutor for ScriptExecutor {
    fn clean(&self, namespaces: &str, app: &str, pr: u64) -> Result<CapturedOutput> {
        let output = Command::new(&self.script)
            .arg(format!("--namespaces={}", namespaces))
            .arg(format!("--app={}", app))
            .arg(format!("--pr={}", pr))
            .output()
            .map_err(|e| {
                Error::cleanup_script_failed(
                    pr,
                    format!("Failed to run {}: {}", self.script, e),
                )
            })?;

        if !output.status.success() {
            return Err(Error::cleanup_script_failed(
                pr,
                command::error_text(&output),
            ));
        }

        Ok(CapturedOutput::from(&output))
    }
}

/// What happened to a single PR. Produced exactly once per stale id, in
/// processing order. `Failed` is data, not an error: the run continues.
#[derive(Debug, Clone)]
pub enum CleanupOutcome {
    Cleaned(CapturedOutput),
    Failed(String),
}

/// One advanced step of a cleanup run.
#[derive(Debug, Clone)]
pub struct CleanupStep {
    pub pr: u64,
    pub outcome: CleanupOutcome,
}

/// Aggregate accounting over a run's steps.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub cleaned: usize,
    pub failed: usize,
    pub failed_prs: Vec<u64>,
}

impl RunSummary {
    pub fn record(&mut self, step: &CleanupStep) {
        self.total += 1;
        match step.outcome {
            CleanupOutcome::Cleaned(_) => self.cleaned += 1,
            CleanupOutcome::Failed(_) => {
                self.failed += 1;
                self.failed_prs.push(step.pr);
            }
        }
    }
}

/// Lazily-advanced cleanup sequence. Each identifier is attempted exactly
/// once; no retries, no mid-run cancellation.
pub struct CleanupRun<'a, E: CleanupExecutor> {
    executor: &'a E,
    namespaces: &'a str,
    app: &'a str,
    prs: &'a [u64],
    dry_run: bool,
    cursor: usize,
}

impl<'a, E: CleanupExecutor> CleanupRun<'a, E> {
    pub fn new(
        executor: &'a E,
        namespaces: &'a str,
        app: &'a str,
        prs: &'a [u64],
        dry_run: bool,
    ) -> Self {
        Self {
            executor,
            namespaces,
            app,
            prs,
            dry_run,
            cursor: 0,
        }
    }

    /// Identifiers not yet attempted.
    pub fn remaining(&self) -> usize {
        self.prs.len() - self.cursor
    }
}

impl<E: CleanupExecutor> Iterator for CleanupRun<'_, E> {
    type Item = CleanupStep;

    fn next(&mut self) -> Option<CleanupStep> {
        let pr = *self.prs.get(self.cursor)?;
        self.cursor += 1;

        log_status!("clean", "Cleaning PR {} for app {}", pr, self.app);

        let outcome = if self.dry_run {
            CleanupOutcome::Cleaned(CapturedOutput::default())
        } else {
            match self.executor.clean(self.namespaces, self.app, pr) {
                Ok(output) => CleanupOutcome::Cleaned(output),
                Err(err) => CleanupOutcome::Failed(err.message),
            }
        };

        Some(CleanupStep { pr, outcome })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}
