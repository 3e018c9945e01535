//! Label extraction: deployment record to PR identifier.

use crate::platform::DeploymentRecord;

pub const APP_LABEL: &str = "app";
pub const ENV_ID_LABEL: &str = "env-id";
const PR_PREFIX: &str = "pr-";

/// Extract the PR number from a deployment record's labels.
///
/// A record matches when its `app` label CONTAINS the target fragment,
/// not when it equals it: the pipeline labels PR environments with values
/// like `myapp-pr-123`. The looser match means an app of `foo` also picks
/// up `foobar` deployments; the open-PR and promotion exclusions bound the
/// blast radius, so the historical matching rule is kept.
///
/// Malformed records (missing labels, no `pr-` prefix, non-numeric suffix)
/// yield `None` and are skipped silently.
pub fn extract_pr_id(record: &DeploymentRecord, app: &str) -> Option<u64> {
    let labels = &record.metadata.labels;

    if !labels.get(APP_LABEL)?.contains(app) {
        return None;
    }

    labels
        .get(ENV_ID_LABEL)?
        .strip_prefix(PR_PREFIX)?
        .parse()
        .ok()
}

/// Extract PR numbers from a namespace listing, preserving encounter order.
/// Duplicate ids are NOT collapsed: each matching record stands on its own.
pub fn extract_pr_ids(records: &[DeploymentRecord], app: &str) -> Vec<u64> {
    records
        .iter()
        .filter_map(|record| extract_pr_id(record, app))
        .collect()
}
