use anyhow::Result;

use super::travis;
use crate::models::{NotificationRequest, ProjectOverride, CORE_PROJECT, MASTER_BRANCH};

/// Global environment for an acceptance run of `project` against core `branch`
pub fn global_env(project: &str, branch: &str) -> Vec<String> {
    let mut env = Vec::with_capacity(3);

    if branch == MASTER_BRANCH {
        env.push(format!("EE_BRANCH={}", branch));
    } else {
        env.push(format!("EE_TAG={}", branch));
    }
    env.push("HAS_MAILCATCHER=1".to_string());

    if project != CORE_PROJECT {
        env.push(format!("ADDON_PACKAGE={}", project));
    }

    env
}

pub fn message(project: &str, branch: &str) -> String {
    if project == CORE_PROJECT {
        format!("Nightly acceptance tests for EE core {}", branch)
    } else {
        format!(
            "Nightly acceptance tests for {} against EE core {}",
            project, branch
        )
    }
}

/// Acceptance run queued on the harness `repository`
pub fn build_request(
    host: &str,
    token: &str,
    repository: &str,
    project: &str,
    branch: &str,
    record: Option<&ProjectOverride>,
) -> Result<NotificationRequest> {
    let mut config = travis::default_config(global_env(project, branch));
    if let Some(record) = record {
        travis::merge_override(&mut config, record);
    }

    travis::build_request(host, token, repository, &message(project, branch), &config)
}
