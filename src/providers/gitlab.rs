//! GitLab issues backend.

use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;

use crate::core::{Capability, CapabilitySet, Config, ProviderDescriptor};
use crate::providers::provider::{Provider, ProviderFactory};
use crate::providers::token::TokenResolver;
use crate::refspec::{numeric_id, Grammar, ParseError};

pub const PROVIDER_NAME: &str = "gitlab";

/// A parsed GitLab issue reference.
///
/// The IID is the issue's internal number within its project, not the
/// global id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitLabRef {
    /// `group/project#5`
    Path { project: String, iid: i64 },
    /// `12345#5` (numeric project id)
    ProjectId { project: i64, iid: i64 },
    /// `#5` or `5`, project comes from configuration
    Bare { iid: i64 },
}

impl fmt::Display for GitLabRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitLabRef::Path { project, iid } => write!(f, "{}#{}", project, iid),
            GitLabRef::ProjectId { project, iid } => write!(f, "{}#{}", project, iid),
            GitLabRef::Bare { iid } => write!(f, "#{}", iid),
        }
    }
}

static GRAMMAR: LazyLock<Grammar<GitLabRef>> = LazyLock::new(|| {
    Grammar::new(
        &["gitlab", "gl"],
        "#N, N, group/project#N, or projectID#N",
    )
    .rule(
        "project-path",
        r"^([a-zA-Z0-9_/-]+)/([a-zA-Z0-9_-]+)#(\d+)$",
        |caps| {
            Ok(GitLabRef::Path {
                project: format!("{}/{}", &caps[1], &caps[2]),
                iid: numeric_id(&caps[3])?,
            })
        },
    )
    .rule("project-id", r"^(\d+)#(\d+)$", |caps| {
        Ok(GitLabRef::ProjectId {
            project: numeric_id(&caps[1])?,
            iid: numeric_id(&caps[2])?,
        })
    })
    .rule("bare-iid", r"^#?(\d+)$", |caps| {
        Ok(GitLabRef::Bare {
            iid: numeric_id(&caps[1])?,
        })
    })
});

/// Parse a GitLab reference in any accepted form.
pub fn parse_reference(input: &str) -> Result<GitLabRef, ParseError> {
    GRAMMAR.parse(input)
}

fn capabilities() -> CapabilitySet {
    [
        Capability::Read,
        Capability::List,
        Capability::FetchComments,
        Capability::Comment,
        Capability::UpdateStatus,
        Capability::ManageLabels,
        Capability::CreateWorkUnit,
        Capability::DownloadAttachment,
        Capability::Snapshot,
        Capability::CreatePr,
        Capability::FetchSubtasks,
    ]
    .into_iter()
    .collect()
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "GitLab issues task source")
        .with_schemes(["gitlab", "gl"])
        .with_capabilities(capabilities())
        .with_priority(20)
}

/// GitLab backend instance.
pub struct GitLabProvider {
    descriptor: ProviderDescriptor,
    /// API token, used by the HTTP client layer.
    pub token: String,
    /// Instance host, `gitlab.com` unless configured.
    pub host: String,
    /// Default project path for bare references.
    pub project: String,
}

impl Provider for GitLabProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn parse(&self, input: &str) -> Result<String, ParseError> {
        parse_reference(input).map(|r| r.to_string())
    }

    fn matches(&self, input: &str) -> bool {
        GRAMMAR.matches_scheme(input)
    }

    fn declared_capabilities(&self) -> Option<&CapabilitySet> {
        Some(&self.descriptor.capabilities)
    }
}

/// Factory for [`GitLabProvider`].
pub struct GitLabFactory;

#[async_trait]
impl ProviderFactory for GitLabFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let token = TokenResolver::new("GITLAB", &["GITLAB_TOKEN"])
            .resolve(PROVIDER_NAME, config)
            .context("GitLab provider requires an API token")?;

        let mut host = config.get_string("host");
        if host.is_empty() {
            host = "gitlab.com".to_string();
        }

        Ok(Arc::new(GitLabProvider {
            descriptor: descriptor(),
            token,
            host,
            project: config.get_string("project"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_forms() {
        assert_eq!(parse_reference("5").unwrap(), GitLabRef::Bare { iid: 5 });
        assert_eq!(parse_reference("#5").unwrap(), GitLabRef::Bare { iid: 5 });
        assert_eq!(parse_reference("gitlab:5").unwrap(), GitLabRef::Bare { iid: 5 });
        assert_eq!(parse_reference("gl:#5").unwrap(), GitLabRef::Bare { iid: 5 });
    }

    #[test]
    fn test_project_path_form() {
        assert_eq!(
            parse_reference("group/project#12").unwrap(),
            GitLabRef::Path {
                project: "group/project".to_string(),
                iid: 12
            }
        );
        // Nested groups
        assert_eq!(
            parse_reference("gl:org/sub/project#3").unwrap(),
            GitLabRef::Path {
                project: "org/sub/project".to_string(),
                iid: 3
            }
        );
    }

    #[test]
    fn test_project_id_form() {
        assert_eq!(
            parse_reference("12345#678").unwrap(),
            GitLabRef::ProjectId {
                project: 12345,
                iid: 678
            }
        );
    }

    #[test]
    fn test_canonical_strings() {
        assert_eq!(
            parse_reference("gitlab:group/project#5").unwrap().to_string(),
            "group/project#5"
        );
        assert_eq!(parse_reference("12345#5").unwrap().to_string(), "12345#5");
        assert_eq!(parse_reference("5").unwrap().to_string(), "#5");
    }

    #[test]
    fn test_invalid_forms() {
        assert!(matches!(parse_reference(""), Err(ParseError::Empty)));
        assert!(matches!(parse_reference("gitlab:"), Err(ParseError::Empty)));
        assert!(matches!(
            parse_reference("not a ref"),
            Err(ParseError::Unrecognized { .. })
        ));
        assert!(matches!(
            parse_reference("group/project#"),
            Err(ParseError::Unrecognized { .. })
        ));
    }

    #[test]
    fn test_iid_overflow_is_invalid_not_unrecognized() {
        assert!(matches!(
            parse_reference("99999999999999999999"),
            Err(ParseError::Invalid { .. })
        ));
    }

    #[test]
    fn test_matches_only_own_schemes() {
        let provider = GitLabProvider {
            descriptor: descriptor(),
            token: String::new(),
            host: String::new(),
            project: String::new(),
        };
        assert!(provider.matches("gitlab:5"));
        assert!(provider.matches("gl:5"));
        assert!(!provider.matches("jira:PROJ-5"));
        assert!(!provider.matches("5"));
    }
}
