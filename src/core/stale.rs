//! Stale set resolution.
//!
//! A dev deployment is stale when its PR is no longer open AND the PR's
//! environment is absent from both the test and prod namespaces. Promoted
//! environments are never reclaimed, even after their PR closes.

use std::collections::HashSet;

use crate::config::CleanConfig;
use crate::error::{Error, Result};
use crate::labels;
use crate::github;
use crate::platform::{self, DeploymentRecord};

/// Compute the PR ids to reclaim from three namespace snapshots and the
/// open-PR list.
///
/// The result is a stable filter over the dev candidates: encounter order
/// is preserved and duplicate candidates stay duplicated, so a namespace
/// that somehow lists the same environment twice gets two cleanup attempts.
pub fn resolve_stale(
    dev: &[DeploymentRecord],
    test: &[DeploymentRecord],
    prod: &[DeploymentRecord],
    open_prs: &[u64],
    app: &str,
) -> Vec<u64> {
    let candidates = labels::extract_pr_ids(dev, app);

    let mut excluded: HashSet<u64> = open_prs.iter().copied().collect();
    excluded.extend(labels::extract_pr_ids(test, app));
    excluded.extend(labels::extract_pr_ids(prod, app));

    candidates
        .into_iter()
        .filter(|pr| !excluded.contains(pr))
        .collect()
}

/// Parse a manual `--prs` override ("481,392,123") into PR numbers.
/// Any non-numeric token is a hard input error, not a partial parse.
pub fn parse_pr_list(prs: &str) -> Result<Vec<u64>> {
    prs.split(',')
        .map(str::trim)
        .map(|token| {
            token.parse::<u64>().map_err(|_| {
                Error::validation_invalid_argument(
                    "prs",
                    format!(
                        "--prs must be a comma separated list of PR numbers, received '{}'",
                        prs
                    ),
                    Some(token.to_string()),
                    None,
                )
            })
        })
        .collect()
}

/// Produce the stale set for a run: either the manual `--prs` override, or
/// a full resolution against the platform and the PR source.
pub fn stale_set(config: &CleanConfig) -> Result<Vec<u64>> {
    if let Some(prs) = &config.prs {
        return parse_pr_list(prs);
    }

    let token = config.require_token()?;

    let dev = platform::get_deployments(&config.server, token, &config.dev)?;
    let test = platform::get_deployments(&config.server, token, &config.test)?;
    let prod = platform::get_deployments(&config.server, token, &config.prod)?;
    let open_prs = github::get_open_prs(&config.owner, &config.repo)?;

    Ok(resolve_stale(&dev, &test, &prod, &open_prs, &config.app))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::DeploymentMetadata;

    fn record(app: &str, env_id: &str) -> DeploymentRecord {
        DeploymentRecord {
            metadata: DeploymentMetadata {
                labels: [
                    ("app".to_string(), app.to_string()),
                    ("env-id".to_string(), env_id.to_string()),
                ]
                .into_iter()
                .collect(),
            },
        }
    }

    fn dev_records(prs: &[u64]) -> Vec<DeploymentRecord> {
        prs.iter()
            .map(|pr| record(&format!("myapp-pr-{}", pr), &format!("pr-{}", pr)))
            .collect()
    }

    #[test]
    fn open_and_promoted_prs_are_excluded() {
        // dev {10, 11, 12}, open {11}, test {12}, prod {} => stale {10}
        let dev = dev_records(&[10, 11, 12]);
        let test = dev_records(&[12]);
        let prod = Vec::new();

        assert_eq!(resolve_stale(&dev, &test, &prod, &[11], "myapp"), vec![10]);
    }

    #[test]
    fn prod_exclusion_survives_closed_pr() {
        let dev = dev_records(&[7]);
        let prod = dev_records(&[7]);

        // PR 7 is closed but still deployed to prod: never reclaimed.
        assert_eq!(resolve_stale(&dev, &[], &prod, &[], "myapp"), Vec::<u64>::new());
    }

    #[test]
    fn empty_dev_namespace_yields_empty_set() {
        assert_eq!(
            resolve_stale(&[], &dev_records(&[1]), &[], &[2], "myapp"),
            Vec::<u64>::new()
        );
    }

    #[test]
    fn preserves_dev_encounter_order() {
        let dev = dev_records(&[42, 3, 17]);
        assert_eq!(resolve_stale(&dev, &[], &[], &[], "myapp"), vec![42, 3, 17]);
    }

    #[test]
    fn duplicate_candidates_are_kept() {
        // Historical behavior: each matching record is its own candidate.
        let dev = dev_records(&[5, 5, 6]);
        assert_eq!(resolve_stale(&dev, &[], &[], &[6], "myapp"), vec![5, 5]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let dev = dev_records(&[1, 2, 3, 4]);
        let test = dev_records(&[2]);
        let prod = dev_records(&[3]);
        let open = vec![4];

        let first = resolve_stale(&dev, &test, &prod, &open, "myapp");
        let second = resolve_stale(&dev, &test, &prod, &open, "myapp");
        assert_eq!(first, second);
    }

    #[test]
    fn result_is_subset_of_dev_and_disjoint_from_exclusions() {
        let dev = dev_records(&[1, 2, 3, 8, 9]);
        let test = dev_records(&[2, 8]);
        let prod = dev_records(&[9]);
        let open = vec![3, 100];

        let stale = resolve_stale(&dev, &test, &prod, &open, "myapp");

        let candidates: Vec<u64> = crate::labels::extract_pr_ids(&dev, "myapp");
        for pr in &stale {
            assert!(candidates.contains(pr));
            assert!(!open.contains(pr));
            assert!(!crate::labels::extract_pr_ids(&test, "myapp").contains(pr));
            assert!(!crate::labels::extract_pr_ids(&prod, "myapp").contains(pr));
        }
        assert_eq!(stale, vec![1]);
    }

    #[test]
    fn parse_pr_list_accepts_numbers_and_whitespace() {
        assert_eq!(parse_pr_list("5,6,7").unwrap(), vec![5, 6, 7]);
        assert_eq!(parse_pr_list(" 481 , 392 ").unwrap(), vec![481, 392]);
        assert_eq!(parse_pr_list("12").unwrap(), vec![12]);
    }

    #[test]
    fn parse_pr_list_rejects_non_numeric_tokens() {
        assert!(parse_pr_list("5,abc,7").is_err());
        assert!(parse_pr_list("").is_err());
        assert!(parse_pr_list("5,,7").is_err());
        assert!(parse_pr_list("-3").is_err());
    }

    #[test]
    fn parse_pr_list_error_names_the_bad_token() {
        let err = parse_pr_list("5,abc").unwrap_err();
        assert_eq!(err.code.as_str(), "validation.invalid_argument");
        assert_eq!(err.details["value"], "abc");
    }
}
