//! Deployment-platform API client.
//!
//! Lists the deployment configs of a namespace so the resolver can match
//! their labels against open pull requests. A failure here aborts the whole
//! run: without a complete namespace listing there is no safe stale set.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{Error, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform console URL of the OCP-CD pipeline cluster. Overridable via
/// the `server` config key.
pub const DEFAULT_SERVER: &str = "https://console.pathfinder.gov.bc.ca:8443";

/// One deployment config as reported by the platform. Only the labels are
/// relevant; records with absent metadata or labels still deserialize so
/// that malformed entries can be skipped during extraction instead of
/// failing the fetch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentRecord {
    #[serde(default)]
    pub metadata: DeploymentMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentMetadata {
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

#[derive(Deserialize)]
struct DeploymentList {
    #[serde(default)]
    items: Vec<DeploymentRecord>,
}

fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("stalesweep/{}", VERSION))
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .map_err(|e| Error::internal_io(e.to_string(), Some("create HTTP client".to_string())))
}

/// List all deployment records in a namespace, bearer-token authenticated.
pub fn get_deployments(
    server: &str,
    token: &str,
    namespace: &str,
) -> Result<Vec<DeploymentRecord>> {
    let url = format!(
        "{}/apis/apps.openshift.io/v1/namespaces/{}/deploymentconfigs",
        server.trim_end_matches('/'),
        namespace
    );

    log_status!("fetch", "Listing deployments in {}", namespace);

    let response = http_client()?
        .get(&url)
        .bearer_auth(token)
        .send()
        .map_err(|e| Error::platform_request_failed(e.to_string(), namespace))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::platform_request_failed(
            format!("Platform returned {} for namespace {}", status, namespace),
            namespace,
        )
        .with_hint("Check that the token is current: oc whoami -t"));
    }

    let list: DeploymentList = response.json().map_err(|e| {
        Error::internal_json(
            e.to_string(),
            Some(format!("parse deployment list for {}", namespace)),
        )
    })?;

    Ok(list.items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_deserializes_without_metadata() {
        let record: DeploymentRecord = serde_json::from_str("{}").unwrap();
        assert!(record.metadata.labels.is_empty());
    }

    #[test]
    fn record_deserializes_without_labels() {
        let record: DeploymentRecord =
            serde_json::from_str(r#"{"metadata": {"name": "myapp-pr-12"}}"#).unwrap();
        assert!(record.metadata.labels.is_empty());
    }

    #[test]
    fn list_deserializes_items() {
        let json = r#"{
            "kind": "DeploymentConfigList",
            "items": [
                {"metadata": {"labels": {"app": "myapp-pr-12", "env-id": "pr-12"}}},
                {"metadata": {}}
            ]
        }"#;
        let list: DeploymentList = serde_json::from_str(json).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(
            list.items[0].metadata.labels.get("env-id"),
            Some(&"pr-12".to_string())
        );
    }
}
