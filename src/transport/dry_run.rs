use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::Transport;
use crate::models::{NotificationRequest, TransportResponse};

/// Logs requests instead of sending them and reports every one as accepted
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunTransport;

#[async_trait]
impl Transport for DryRunTransport {
    async fn send(&self, request: &NotificationRequest) -> Result<TransportResponse> {
        info!(
            url = %request.display_url(),
            body = %request.body,
            "Dry run, build request not sent"
        );
        Ok(TransportResponse::new(200, ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_dry_run_reports_success() {
        let request = NotificationRequest {
            url: "https://api.travis-ci.org/repo/org%2Faddon/requests".to_string(),
            headers: Vec::new(),
            body: json!({"request": {"branch": "master"}}),
        };

        let response = DryRunTransport.send(&request).await.unwrap();
        assert_eq!(response.status, 200);
        assert!(response.is_circle_success());
        assert!(!response.is_travis_failure());
    }
}
