pub mod config;
pub mod dispatcher;
pub mod github;
pub mod models;
pub mod providers;
pub mod throttle;
pub mod transport;

pub use config::Config;
pub use dispatcher::{run, Dispatcher};
pub use github::{GitHubClient, TagError};
pub use models::*;
pub use throttle::Throttle;
pub use transport::{DryRunTransport, HttpTransport, Transport};
