pub mod client;

pub use client::{GitHubClient, TagError};
