//! Open pull-request listing for the repository tied to the pipeline.
//!
//! Unauthenticated: only the PR numbers of a public repository are needed,
//! and the platform token is never sent to GitHub.

use serde::Deserialize;

use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
}

fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("stalesweep/{}", VERSION))
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))
}

/// List the numbers of all currently open pull requests of `owner/repo`.
pub fn get_open_prs(owner: &str, repo: &str) -> Result<Vec<u64>> {
    let url = format!(
        "{}/repos/{}/{}/pulls?state=open&per_page=100",
        GITHUB_API, owner, repo
    );

    log_status!("fetch", "Listing open pull requests for {}/{}", owner, repo);

    let response = http_client()?
        .get(&url)
        .send()
        .map_err(|e| Error::github_request_failed(e.to_string(), owner, repo))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::github_request_failed(
            format!("GitHub returned {} for {}/{}", status, owner, repo),
            owner,
            repo,
        )
        .with_hint("Check the --repo and --owner values"));
    }

    let prs: Vec<PullRequestSummary> = response.json().map_err(|e| {
        Error::internal_json(
            e.to_string(),
            Some(format!("parse pull requests for {}/{}", owner, repo)),
        )
    })?;

    Ok(prs.iter().map(|pr| pr.number).collect())
}
