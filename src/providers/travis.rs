use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::models::{NotificationRequest, ProjectOverride, MASTER_BRANCH};

const API_VERSION: &str = "3";
const USER_AGENT: &str = "addon-nightlies";

#[derive(Debug, Serialize)]
struct RequestEnvelope<'a> {
    request: BuildRequest<'a>,
}

#[derive(Debug, Serialize)]
struct BuildRequest<'a> {
    branch: &'a str,
    message: &'a str,
    config: &'a Map<String, Value>,
}

/// `POST /repo/{slug}/requests` endpoint, with the slug percent-encoded as one segment
pub fn requests_url(host: &str, repository: &str) -> Result<String> {
    let mut url =
        Url::parse(host).with_context(|| format!("Invalid Travis host: {}", host))?;

    url.path_segments_mut()
        .map_err(|_| anyhow!("Travis host cannot take a path: {}", host))?
        .pop_if_empty()
        .push("repo")
        .push(repository)
        .push("requests");

    Ok(url.into())
}

pub fn headers(token: &str) -> Vec<(String, String)> {
    vec![
        ("Travis-API-Version".to_string(), API_VERSION.to_string()),
        ("Authorization".to_string(), format!("token {}", token)),
        ("User-Agent".to_string(), USER_AGENT.to_string()),
        ("Accept".to_string(), "application/json".to_string()),
        ("Content-Type".to_string(), "application/json".to_string()),
    ]
}

/// Build config deep-merged into the repository's `.travis.yml`
pub fn default_config(global_env: Vec<String>) -> Map<String, Value> {
    let mut config = Map::new();
    config.insert("merge_mode".to_string(), json!("deep_merge"));
    config.insert("env".to_string(), json!({ "global": global_env }));
    config
}

/// Lay the override's extra keys over the top level of `config`; the override wins
pub fn merge_override(config: &mut Map<String, Value>, record: &ProjectOverride) {
    for (key, value) in &record.extra_config {
        config.insert(key.clone(), value.clone());
    }
}

/// Request a master build of `repository` with the given message and config
pub fn build_request(
    host: &str,
    token: &str,
    repository: &str,
    message: &str,
    config: &Map<String, Value>,
) -> Result<NotificationRequest> {
    let envelope = RequestEnvelope {
        request: BuildRequest {
            branch: MASTER_BRANCH,
            message,
            config,
        },
    };

    Ok(NotificationRequest {
        url: requests_url(host, repository)?,
        headers: headers(token),
        body: serde_json::to_value(&envelope).context("Failed to encode Travis request")?,
    })
}

/// Nightly build of an add-on against core `branch`
pub fn nightly_request(
    host: &str,
    token: &str,
    project: &str,
    branch: &str,
    record: Option<&ProjectOverride>,
) -> Result<NotificationRequest> {
    let mut config = default_config(vec![format!("EE_VERSION={}", branch)]);
    let mut message = format!("Nightly Build against EE core {}", branch);

    if let Some(record) = record {
        if let Some(custom) = &record.message {
            message = custom.clone();
        }
        merge_override(&mut config, record);
    }

    build_request(host, token, project, &message, &config)
}
