pub mod dry_run;
pub mod http;

pub use dry_run::DryRunTransport;
pub use http::HttpTransport;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{NotificationRequest, TransportResponse};

/// Sends build trigger requests to a CI provider
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one request. Errors mean the call never produced a response.
    async fn send(&self, request: &NotificationRequest) -> Result<TransportResponse>;
}
