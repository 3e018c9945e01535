//! Run configuration assembly.
//!
//! Three sources merge key-by-key, in increasing precedence: the
//! environment default token (`OC_TOKEN`), an optional JSON config file
//! (`--file`), and CLI flags. The environment is read once in `main` and
//! passed down; nothing below this layer touches ambient state.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::io;
use crate::platform;

pub const TOKEN_ENV_VAR: &str = "OC_TOKEN";
pub const DEFAULT_SCRIPT: &str = "./clean.sh";

/// One source's worth of options. Every source (env, file, CLI) produces an
/// overlay; later overlays win key-by-key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigOverlay {
    pub app: Option<String>,
    pub dev: Option<String>,
    pub test: Option<String>,
    pub prod: Option<String>,
    pub repo: Option<String>,
    pub owner: Option<String>,
    pub token: Option<String>,
    pub server: Option<String>,
    pub script: Option<String>,
    pub dryrun: Option<bool>,
    pub prs: Option<String>,
}

impl ConfigOverlay {
    /// Overlay `self` on top of `base`: keys present in `self` win.
    pub fn merged_over(self, base: ConfigOverlay) -> ConfigOverlay {
        ConfigOverlay {
            app: self.app.or(base.app),
            dev: self.dev.or(base.dev),
            test: self.test.or(base.test),
            prod: self.prod.or(base.prod),
            repo: self.repo.or(base.repo),
            owner: self.owner.or(base.owner),
            token: self.token.or(base.token),
            server: self.server.or(base.server),
            script: self.script.or(base.script),
            dryrun: self.dryrun.or(base.dryrun),
            prs: self.prs.or(base.prs),
        }
    }
}

/// Fully-resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub app: String,
    pub dev: String,
    pub test: String,
    pub prod: String,
    pub repo: String,
    pub owner: String,
    pub token: Option<String>,
    pub server: String,
    pub script: String,
    pub dry_run: bool,
    pub prs: Option<String>,
}

impl CleanConfig {
    /// Namespace list as the cleanup script expects it.
    pub fn namespaces(&self) -> String {
        format!("{},{},{}", self.dev, self.test, self.prod)
    }

    /// The platform token is only required when deployments must actually
    /// be fetched, so it is checked at use, not at assembly.
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(|| {
            Error::config_missing_key("token", None)
                .with_hint(format!("Set {} in the environment", TOKEN_ENV_VAR))
                .with_hint("Or pass --token / a \"token\" key in the config file")
        })
    }
}

/// Load a JSON config file, tilde-expanding the path.
pub fn load_file(path: &str) -> Result<ConfigOverlay> {
    let expanded = shellexpand::tilde(path).to_string();
    let raw = io::read_file(Path::new(&expanded), "read config file")?;

    serde_json::from_str(&raw).map_err(|e| {
        Error::config_invalid_json(format!("Invalid config file: {}", e), Some(expanded))
            .with_hint("Expected a JSON object with keys like app, dev, test, prod, repo, owner")
    })
}

/// Merge all sources and validate. Missing required keys are reported
/// together in a single error rather than one at a time.
pub fn resolve(
    cli: ConfigOverlay,
    file: Option<ConfigOverlay>,
    env_token: Option<String>,
) -> Result<CleanConfig> {
    let env = ConfigOverlay {
        token: env_token,
        ..ConfigOverlay::default()
    };

    let merged = match file {
        Some(file) => cli.merged_over(file.merged_over(env)),
        None => cli.merged_over(env),
    };

    let mut missing = Vec::new();
    let mut take = |value: Option<String>, key: &str| -> String {
        match value {
            Some(value) => value,
            None => {
                missing.push(key.to_string());
                String::new()
            }
        }
    };

    let config = CleanConfig {
        app: take(merged.app, "app"),
        dev: take(merged.dev, "dev"),
        test: take(merged.test, "test"),
        prod: take(merged.prod, "prod"),
        repo: take(merged.repo, "repo"),
        owner: take(merged.owner, "owner"),
        token: merged.token,
        server: merged
            .server
            .unwrap_or_else(|| platform::DEFAULT_SERVER.to_string()),
        script: shellexpand::tilde(merged.script.as_deref().unwrap_or(DEFAULT_SCRIPT))
            .to_string(),
        dry_run: merged.dryrun.unwrap_or(false),
        prs: merged.prs,
    };

    if !missing.is_empty() {
        return Err(Error::validation_missing_argument(missing)
            .with_hint("Run with --help for flag descriptions")
            .with_hint("Or point --file at a JSON config providing the missing keys"));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn full_cli() -> ConfigOverlay {
        ConfigOverlay {
            app: Some("myapp".to_string()),
            dev: Some("myapp-dev".to_string()),
            test: Some("myapp-test".to_string()),
            prod: Some("myapp-prod".to_string()),
            repo: Some("myapp".to_string()),
            owner: Some("acme".to_string()),
            ..ConfigOverlay::default()
        }
    }

    #[test]
    fn resolves_with_all_required_keys() {
        let config = resolve(full_cli(), None, None).unwrap();
        assert_eq!(config.app, "myapp");
        assert_eq!(config.namespaces(), "myapp-dev,myapp-test,myapp-prod");
        assert_eq!(config.server, platform::DEFAULT_SERVER);
        assert_eq!(config.script, DEFAULT_SCRIPT);
        assert!(!config.dry_run);
    }

    #[test]
    fn missing_keys_are_reported_together() {
        let err = resolve(ConfigOverlay::default(), None, None).unwrap_err();
        assert_eq!(err.code.as_str(), "validation.missing_argument");
        for key in ["app", "dev", "test", "prod", "repo", "owner"] {
            assert!(err.message.contains(key), "missing {} in message", key);
        }
    }

    #[test]
    fn cli_overrides_file_overrides_env() {
        let file = ConfigOverlay {
            app: Some("from-file".to_string()),
            dev: Some("file-dev".to_string()),
            test: Some("file-test".to_string()),
            prod: Some("file-prod".to_string()),
            repo: Some("file-repo".to_string()),
            owner: Some("file-owner".to_string()),
            token: Some("file-token".to_string()),
            ..ConfigOverlay::default()
        };
        let cli = ConfigOverlay {
            app: Some("from-cli".to_string()),
            ..ConfigOverlay::default()
        };

        let config = resolve(cli, Some(file), Some("env-token".to_string())).unwrap();

        assert_eq!(config.app, "from-cli");
        assert_eq!(config.dev, "file-dev");
        assert_eq!(config.token.as_deref(), Some("file-token"));
    }

    #[test]
    fn env_token_is_the_default() {
        let config = resolve(full_cli(), None, Some("env-token".to_string())).unwrap();
        assert_eq!(config.require_token().unwrap(), "env-token");
    }

    #[test]
    fn require_token_fails_when_absent() {
        let config = resolve(full_cli(), None, None).unwrap();
        let err = config.require_token().unwrap_err();
        assert_eq!(err.code.as_str(), "config.missing_key");
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn file_dryrun_and_prs_are_honored() {
        let file = ConfigOverlay {
            dryrun: Some(true),
            prs: Some("1,2".to_string()),
            ..full_cli()
        };
        let config = resolve(ConfigOverlay::default(), Some(file), None).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.prs.as_deref(), Some("1,2"));
    }

    #[test]
    fn load_file_parses_json_config() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        write!(
            temp,
            r#"{{"app": "myapp", "dev": "myapp-dev", "dryrun": true}}"#
        )
        .unwrap();

        let overlay = load_file(&temp.path().to_string_lossy()).unwrap();
        assert_eq!(overlay.app.as_deref(), Some("myapp"));
        assert_eq!(overlay.dryrun, Some(true));
        assert!(overlay.repo.is_none());
    }

    #[test]
    fn load_file_rejects_invalid_json() {
        let mut temp = tempfile::NamedTempFile::new().unwrap();
        write!(temp, "not json").unwrap();

        let err = load_file(&temp.path().to_string_lossy()).unwrap_err();
        assert_eq!(err.code.as_str(), "config.invalid_json");
    }

    #[test]
    fn load_file_errors_for_missing_file() {
        let err = load_file("/nonexistent/config.json").unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }
}
