use octocrab::service::middleware::retry::RetryConfig;
use octocrab::Octocrab;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while resolving the latest release tag
#[derive(Debug, Error)]
pub enum TagError {
    #[error("A repository owner and name are required to resolve the latest tag")]
    MissingIdentifier,

    #[error("Unexpected response shape from the tags endpoint of {repo}: {reason}")]
    UnexpectedResponse { repo: String, reason: &'static str },

    #[error("GitHub API request failed")]
    Api(#[from] octocrab::Error),
}

/// GitHub API client used to look up release tags
pub struct GitHubClient {
    client: Octocrab,
}

/// Entry of the tag listing; only the name matters here
#[derive(Debug, Deserialize)]
struct TagEntry {
    name: Option<String>,
}

impl GitHubClient {
    /// Create a client against `api_url`, authenticated when a token is given.
    /// Requests are never retried; one failed lookup aborts the run.
    pub fn new(token: &str, api_url: &str) -> Result<Self, TagError> {
        let mut builder = Octocrab::builder()
            .base_uri(api_url)?
            .add_retry_config(RetryConfig::None);
        if !token.is_empty() {
            builder = builder.personal_token(token.to_string());
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Name of the most recent tag of `owner/repo`, taken as the first entry GitHub lists
    pub async fn latest_tag(&self, owner: &str, repo: &str) -> Result<String, TagError> {
        if owner.is_empty() || repo.is_empty() {
            return Err(TagError::MissingIdentifier);
        }

        info!(owner, repo, "Fetching latest release tag");

        let tags: Vec<TagEntry> = self
            .client
            .get(format!("/repos/{}/{}/tags", owner, repo), None::<&()>)
            .await?;

        debug!(count = tags.len(), "Fetched tags");

        first_tag_name(tags).map_err(|reason| TagError::UnexpectedResponse {
            repo: format!("{}/{}", owner, repo),
            reason,
        })
    }
}

fn first_tag_name(tags: Vec<TagEntry>) -> Result<String, &'static str> {
    let first = tags.into_iter().next().ok_or("no tags listed")?;
    first.name.ok_or("first tag has no `name` field")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: Option<&str>) -> TagEntry {
        TagEntry {
            name: name.map(str::to_string),
        }
    }

    #[test]
    fn test_first_tag_name() {
        let tags = vec![tag(Some("4.9.80.p")), tag(Some("4.9.79.p"))];
        assert_eq!(first_tag_name(tags).unwrap(), "4.9.80.p");
    }

    #[test]
    fn test_first_tag_name_empty() {
        assert_eq!(first_tag_name(Vec::new()).unwrap_err(), "no tags listed");
    }

    #[test]
    fn test_first_tag_name_missing_name() {
        let tags = vec![tag(None), tag(Some("4.9.79.p"))];
        assert!(first_tag_name(tags).is_err());
    }

    #[tokio::test]
    async fn test_latest_tag_requires_identifiers() {
        let client = GitHubClient::new("", "https://api.github.com").unwrap();
        let err = client.latest_tag("", "event-espresso-core").await.unwrap_err();
        assert!(matches!(err, TagError::MissingIdentifier));
    }
}
