use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::models::ProjectOverride;

/// Run configuration read from the JSON config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project slugs triggered on CircleCI
    pub projects_to_notify: Vec<String>,
    /// Project slugs triggered on Travis
    pub projects_to_notify_travis: Vec<String>,
    pub github_token: String,
    /// Owner of the main project
    pub github_user: String,
    /// Project whose latest tag is the release branch for every nightly
    pub github_main_project: String,
    pub circle_token: String,
    pub travis_token: String,
    /// Add-ons that get acceptance runs against core master and the latest release
    pub acceptance_tests_projects: Vec<String>,
    /// Travis slug of the acceptance test harness
    pub acceptance_tests_repository: String,
    pub travis_project_overrides: BTreeMap<String, ProjectOverride>,
    pub circle_host: String,
    pub travis_host: String,
    pub github_api_url: String,
    /// Projects processed between pauses
    pub batch_size: usize,
    pub batch_pause_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_to_notify: Vec::new(),
            projects_to_notify_travis: Vec::new(),
            github_token: String::new(),
            github_user: String::new(),
            github_main_project: String::new(),
            circle_token: String::new(),
            travis_token: String::new(),
            acceptance_tests_projects: Vec::new(),
            acceptance_tests_repository: String::new(),
            travis_project_overrides: BTreeMap::new(),
            circle_host: "https://circleci.com".to_string(),
            travis_host: "https://api.travis-ci.org".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            batch_size: 3,
            batch_pause_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        let config = Self::from_value(value)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Build a config from a decoded JSON object. Empty values keep their default.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut entries) = value else {
            anyhow::bail!("Config root must be a JSON object");
        };

        entries.retain(|key, value| {
            let keep = !is_empty(value);
            if !keep {
                debug!(key = %key, "Empty config value, keeping default");
            }
            keep
        });

        serde_json::from_value(Value::Object(entries)).context("Invalid config values")
    }

    pub fn override_for(&self, project: &str) -> Option<&ProjectOverride> {
        self.travis_project_overrides.get(project)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_secs(self.batch_pause_secs)
    }
}

/// Values treated as unset: null, false, 0, "", "0", [] and {}
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.projects_to_notify.is_empty());
        assert_eq!(config.travis_host, "https://api.travis-ci.org");
        assert_eq!(config.batch_size, 3);
        assert_eq!(config.batch_pause(), Duration::from_secs(10));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = Config::from_value(json!({
            "circle_host": "",
            "batch_size": 0,
            "batch_pause_secs": null,
            "projects_to_notify": [],
            "travis_project_overrides": {},
            "travis_token": "0"
        }))
        .unwrap();

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = Config::from_value(json!({
            "redis_host": "10.0.0.1",
            "redis_port": 6380,
            "travis_token": "abc"
        }))
        .unwrap();

        assert_eq!(config.travis_token, "abc");
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::from_value(json!({
            "projects_to_notify_travis": ["org/event-espresso-core"],
            "travis_project_overrides": {
                "org/event-espresso-core": {
                    "message": "Core nightly",
                    "is_main_project": true,
                    "dist": "xenial"
                }
            }
        }))
        .unwrap();

        let record = config.override_for("org/event-espresso-core").unwrap();
        assert!(record.is_main_project);
        assert_eq!(record.extra_config.get("dist"), Some(&json!("xenial")));
        assert!(config.override_for("org/other").is_none());
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let result = Config::from_value(json!({"projects_to_notify": "org/addon"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_non_object_root() {
        assert!(Config::from_value(json!(["a"])).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"github_user": "eventespresso", "github_main_project": "event-espresso-core", "batch_pause_secs": 2}}"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.github_user, "eventespresso");
        assert_eq!(config.github_main_project, "event-espresso-core");
        assert_eq!(config.batch_pause(), Duration::from_secs(2));
    }

    #[test]
    fn test_load_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path().join("src.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
