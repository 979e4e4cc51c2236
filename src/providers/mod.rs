//! Request builders for each CI provider.
//!
//! Builders are pure: they turn a project, a branch and the relevant config into a
//! [`NotificationRequest`](crate::models::NotificationRequest) without touching the network.

pub mod acceptance;
pub mod circle;
pub mod travis;
