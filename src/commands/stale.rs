use clap::Args;
use serde::Serialize;

use stalesweep::stale;

use super::{CmdResult, ConfigArgs};

#[derive(Args)]
pub struct StaleArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaleOutput {
    pub command: &'static str,
    pub app: String,
    pub stale_prs: Vec<u64>,
    pub total: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

/// Resolve and report the stale set without touching anything. Unlike
/// `clean --dry-run` this never constructs an executor at all.
pub fn run(args: StaleArgs, _global: &super::GlobalArgs) -> CmdResult<StaleOutput> {
    let config = args.config.resolve(false, None)?;
    let stale_prs = stale::stale_set(&config)?;
    let total = stale_prs.len();

    let hints = if stale_prs.is_empty() {
        vec!["No stale pull requests found.".to_string()]
    } else {
        vec![format!(
            "Clean these environments with: stalesweep clean --app={} --dev={} --test={} --prod={} --repo={} --owner={}",
            config.app, config.dev, config.test, config.prod, config.repo, config.owner
        )]
    };

    Ok((
        StaleOutput {
            command: "stale",
            app: config.app,
            stale_prs,
            total,
            hints,
        },
        0,
    ))
}
