use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde_json::json;

use crate::models::NotificationRequest;

/// Trigger a master build of `project` that tests against core `branch`
pub fn build_request(
    host: &str,
    token: &str,
    project: &str,
    branch: &str,
) -> Result<NotificationRequest> {
    let mut url = Url::parse(host).with_context(|| format!("Invalid Circle host: {}", host))?;

    url.path_segments_mut()
        .map_err(|_| anyhow!("Circle host cannot take a path: {}", host))?
        .pop_if_empty()
        .extend(["api", "v1.1", "project", "github"])
        .extend(project.split('/'))
        .extend(["tree", "master"]);
    url.query_pairs_mut().append_pair("circle-token", token);

    Ok(NotificationRequest {
        url: url.into(),
        headers: vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ],
        body: json!({ "build_parameters": { "RELEASE_BUILD": branch } }),
    })
}
