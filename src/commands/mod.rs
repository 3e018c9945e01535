use clap::Args;

use stalesweep::config::{self, CleanConfig, ConfigOverlay};

pub type CmdResult<T> = stalesweep::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

pub mod clean;
pub mod stale;

/// Configuration flags shared by every command that resolves the stale set.
/// Each flag overrides the matching key in the JSON config file, which in
/// turn overrides the environment default token.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// App label fragment as found in metadata.labels.app on the deployment config
    #[arg(long)]
    pub app: Option<String>,

    /// Development namespace (the reclaim target)
    #[arg(long)]
    pub dev: Option<String>,

    /// Test namespace (exclusion source, never reclaimed)
    #[arg(long)]
    pub test: Option<String>,

    /// Production namespace (exclusion source, never reclaimed)
    #[arg(long)]
    pub prod: Option<String>,

    /// GitHub repository tied to the pipeline
    #[arg(long)]
    pub repo: Option<String>,

    /// Owner of the GitHub repository
    #[arg(long)]
    pub owner: Option<String>,

    /// Platform auth token (defaults to $OC_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Platform API base URL
    #[arg(long)]
    pub server: Option<String>,

    /// Path to the cleanup script
    #[arg(long)]
    pub script: Option<String>,

    /// Path to a JSON config file providing any of the above keys
    #[arg(long)]
    pub file: Option<String>,
}

impl ConfigArgs {
    /// Assemble the run configuration from CLI flags, the optional config
    /// file, and the environment default token.
    pub fn resolve(&self, dry_run: bool, prs: Option<String>) -> stalesweep::Result<CleanConfig> {
        let file = match &self.file {
            Some(path) => Some(config::load_file(path)?),
            None => None,
        };

        let cli = ConfigOverlay {
            app: self.app.clone(),
            dev: self.dev.clone(),
            test: self.test.clone(),
            prod: self.prod.clone(),
            repo: self.repo.clone(),
            owner: self.owner.clone(),
            token: self.token.clone(),
            server: self.server.clone(),
            script: self.script.clone(),
            // A false flag must not mask a dryrun=true config key.
            dryrun: dry_run.then_some(true),
            prs,
        };

        config::resolve(cli, file, std::env::var(config::TOKEN_ENV_VAR).ok())
    }
}

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (stalesweep::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::Clean(args) => dispatch!(args, global, clean),
        crate::Commands::Stale(args) => dispatch!(args, global, stale),
    }
}
