use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::github::GitHubClient;
use crate::models::{NotificationRequest, CORE_PROJECT, MASTER_BRANCH};
use crate::providers::{acceptance, circle, travis};
use crate::throttle::Throttle;
use crate::transport::Transport;

/// Triggers the nightly builds of every registered project
pub struct Dispatcher<T: Transport> {
    config: Config,
    release_tag: String,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(config: Config, release_tag: impl Into<String>, transport: T) -> Self {
        Self {
            config,
            release_tag: release_tag.into(),
            transport,
        }
    }

    /// Run the Circle, Travis and acceptance passes in order.
    ///
    /// Rejected build requests are logged and skipped. A request that gets no response at
    /// all aborts the run.
    #[instrument(skip(self), fields(release_tag = %self.release_tag))]
    pub async fn trigger_nightlies(&self) -> Result<()> {
        info!("Triggering nightly builds");

        if !self.config.projects_to_notify.is_empty() {
            self.notify_circle().await?;
        }

        if !self.config.projects_to_notify_travis.is_empty() {
            self.notify_travis().await?;
        }

        if !self.config.acceptance_tests_repository.is_empty() {
            self.notify_acceptance().await?;
        }

        info!("Nightly builds triggered");

        Ok(())
    }

    pub fn release_tag(&self) -> &str {
        &self.release_tag
    }

    /// Get the transport for direct access
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn branches(&self) -> [&str; 2] {
        [MASTER_BRANCH, &self.release_tag]
    }

    fn throttle(&self) -> Throttle {
        Throttle::new(self.config.batch_size, self.config.batch_pause())
    }

    async fn notify_circle(&self) -> Result<()> {
        if self.config.circle_token.is_empty() {
            warn!("No Circle token configured, skipping Circle nightlies");
            return Ok(());
        }

        let mut throttle = self.throttle();

        for project in &self.config.projects_to_notify {
            throttle.tick().await;

            for branch in self.branches() {
                let request = circle::build_request(
                    &self.config.circle_host,
                    &self.config.circle_token,
                    project,
                    branch,
                )?;
                let response = self.transport.send(&request).await?;

                // Deliberate change: the old `status != 200 || status != 201` check held for
                // every status and never detected success. `TransportResponse::is_circle_success`
                // treats exactly 200 and 201 as queued; anything else is logged as a failure.
                if !response.is_circle_success() {
                    warn!(
                        provider = "circle",
                        project = %project,
                        branch,
                        status = response.status,
                        body = %response.body,
                        "Nightly build request failed"
                    );
                }
            }
        }

        info!(projects = throttle.processed(), "Circle nightlies done");

        Ok(())
    }

    async fn notify_travis(&self) -> Result<()> {
        if self.config.travis_token.is_empty() {
            warn!("No Travis token configured, skipping Travis nightlies");
            return Ok(());
        }

        let mut throttle = self.throttle();

        for project in &self.config.projects_to_notify_travis {
            throttle.tick().await;

            let record = self.config.override_for(project);
            let is_main_project = record.is_some_and(|r| r.is_main_project);

            for branch in self.branches() {
                // Core itself needs no rebuild against its own latest release
                if branch != MASTER_BRANCH && is_main_project {
                    continue;
                }

                let request = travis::nightly_request(
                    &self.config.travis_host,
                    &self.config.travis_token,
                    project,
                    branch,
                    record,
                )?;
                self.send_travis("travis", &request, project, branch).await?;
            }
        }

        info!(projects = throttle.processed(), "Travis nightlies done");

        Ok(())
    }

    async fn notify_acceptance(&self) -> Result<()> {
        if self.config.travis_token.is_empty() {
            warn!("No Travis token configured, skipping acceptance tests");
            return Ok(());
        }

        self.send_acceptance(CORE_PROJECT, MASTER_BRANCH).await?;

        let mut throttle = self.throttle();

        for project in &self.config.acceptance_tests_projects {
            throttle.tick().await;

            for branch in self.branches() {
                self.send_acceptance(project, branch).await?;
            }
        }

        info!(projects = throttle.processed(), "Acceptance test runs requested");

        Ok(())
    }

    async fn send_acceptance(&self, project: &str, branch: &str) -> Result<()> {
        let request = acceptance::build_request(
            &self.config.travis_host,
            &self.config.travis_token,
            &self.config.acceptance_tests_repository,
            project,
            branch,
            self.config.override_for(project),
        )?;

        self.send_travis("acceptance", &request, project, branch).await
    }

    async fn send_travis(
        &self,
        provider: &'static str,
        request: &NotificationRequest,
        project: &str,
        branch: &str,
    ) -> Result<()> {
        let response = self.transport.send(request).await?;

        if response.is_travis_failure() {
            warn!(
                provider,
                project,
                branch,
                status = response.status,
                body = %response.body,
                "Nightly build request failed"
            );
        }

        Ok(())
    }
}

/// Resolve the latest core release once, then trigger every nightly against it
pub async fn run<T: Transport>(config: Config, github: &GitHubClient, transport: T) -> Result<()> {
    let release_tag = github
        .latest_tag(&config.github_user, &config.github_main_project)
        .await
        .context("Failed to resolve the latest core release")?;

    info!(release_tag = %release_tag, "Resolved latest core release");

    Dispatcher::new(config, release_tag, transport)
        .trigger_nightlies()
        .await
}
