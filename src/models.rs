use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Branch every add-on is always built against
pub const MASTER_BRANCH: &str = "master";

/// Pseudo-project used for the unconditional acceptance run of core itself
pub const CORE_PROJECT: &str = "core";

/// Travis responses that mean the build request was rejected
pub const TRAVIS_ERROR_STATUSES: [u16; 9] = [400, 403, 404, 405, 409, 422, 429, 500, 501];

/// Per-project customisation of the Travis and acceptance payloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectOverride {
    /// Replaces the default build request message
    #[serde(default)]
    pub message: Option<String>,
    /// The project is core itself, so it gets no release-tag rebuild
    #[serde(default)]
    pub is_main_project: bool,
    /// Every other key of the record, merged over the default build config
    #[serde(flatten)]
    pub extra_config: Map<String, Value>,
}

/// One outbound build trigger, built fresh for every call
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl NotificationRequest {
    /// URL without its query string, safe to log (Circle carries its token there)
    pub fn display_url(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body of a provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Circle answers a queued build with 200 or 201
    pub fn is_circle_success(&self) -> bool {
        matches!(self.status, 200 | 201)
    }

    pub fn is_travis_failure(&self) -> bool {
        TRAVIS_ERROR_STATUSES.contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_override_strips_known_keys() {
        let record: ProjectOverride = serde_json::from_value(json!({
            "message": "Custom",
            "is_main_project": true,
            "dist": "trusty",
            "env": {"global": ["FOO=1"]}
        }))
        .unwrap();

        assert_eq!(record.message.as_deref(), Some("Custom"));
        assert!(record.is_main_project);
        assert_eq!(record.extra_config.len(), 2);
        assert!(!record.extra_config.contains_key("message"));
        assert!(!record.extra_config.contains_key("is_main_project"));
    }

    #[test]
    fn test_override_defaults() {
        let record: ProjectOverride = serde_json::from_value(json!({"sudo": false})).unwrap();
        assert!(record.message.is_none());
        assert!(!record.is_main_project);
        assert_eq!(record.extra_config.get("sudo"), Some(&json!(false)));
    }

    #[test]
    fn test_status_checks() {
        assert!(TransportResponse::new(200, "").is_circle_success());
        assert!(TransportResponse::new(201, "").is_circle_success());
        assert!(!TransportResponse::new(400, "").is_circle_success());

        assert!(TransportResponse::new(429, "").is_travis_failure());
        assert!(TransportResponse::new(501, "").is_travis_failure());
        assert!(!TransportResponse::new(202, "").is_travis_failure());
        // 502 is outside the rejection set and counts as accepted
        assert!(!TransportResponse::new(502, "").is_travis_failure());
    }

    #[test]
    fn test_display_url_hides_query() {
        let request = NotificationRequest {
            url: "https://circleci.com/api/x?circle-token=secret".to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            body: json!({}),
        };
        assert_eq!(request.display_url(), "https://circleci.com/api/x");
        assert_eq!(request.header("accept"), Some("application/json"));
    }
}
