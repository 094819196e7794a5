//! Jira issues backend.

use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use url::Url;

use crate::core::{Capability, CapabilitySet, Config, ProviderDescriptor};
use crate::providers::provider::{Provider, ProviderFactory};
use crate::providers::token::TokenResolver;
use crate::refspec::{numeric_id, Grammar, ParseError};

pub const PROVIDER_NAME: &str = "jira";

/// A parsed Jira issue reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraRef {
    /// Full issue key, e.g. `PROJ-123`.
    pub issue_key: String,
    /// Project portion of the key.
    pub project_key: String,
    /// Numeric portion of the key.
    pub number: i64,
    /// Browse URL, when the reference was a URL.
    pub url: Option<String>,
}

impl JiraRef {
    /// Base URL of the instance, when the reference was a URL.
    pub fn base_url(&self) -> Option<String> {
        let url = Url::parse(self.url.as_deref()?).ok()?;
        let host = url.host_str()?;
        Some(format!("{}://{}", url.scheme(), host))
    }
}

impl fmt::Display for JiraRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{}", url),
            None => write!(f, "{}", self.issue_key),
        }
    }
}

fn key_ref(key: &str) -> Result<JiraRef, String> {
    // The grammar guarantees KEY-N shape; split cannot fail.
    let (project, number) = key.rsplit_once('-').ok_or("malformed issue key")?;
    Ok(JiraRef {
        issue_key: key.to_string(),
        project_key: project.to_string(),
        number: numeric_id(number)?,
        url: None,
    })
}

static GRAMMAR: LazyLock<Grammar<JiraRef>> = LazyLock::new(|| {
    Grammar::new(&["jira", "j"], "PROJ-123 or a Jira browse URL")
        .rule(
            "browse-url",
            r"^https?://[^/]+/browse/([A-Z0-9]{2,10}-[0-9]+)",
            |caps| {
                let mut parsed = key_ref(&caps[1])?;
                parsed.url = Some(caps[0].to_string());
                Ok(parsed)
            },
        )
        .rule("issue-key", r"^([A-Z0-9]{2,10})-([0-9]+)$", |caps| {
            Ok(JiraRef {
                issue_key: format!("{}-{}", &caps[1], &caps[2]),
                project_key: caps[1].to_string(),
                number: numeric_id(&caps[2])?,
                url: None,
            })
        })
});

/// Parse a Jira reference in any accepted form.
pub fn parse_reference(input: &str) -> Result<JiraRef, ParseError> {
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
        Capability::FetchSubtasks,
    ]
    .into_iter()
    .collect()
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "Jira issue source")
        .with_schemes(["jira", "j"])
        .with_capabilities(capabilities())
        .with_priority(20)
}

/// Jira backend instance.
pub struct JiraProvider {
    descriptor: ProviderDescriptor,
    /// API token, used by the HTTP client layer.
    pub token: String,
    /// Account email for basic auth (Jira Cloud).
    pub email: String,
    /// Instance base URL.
    pub base_url: String,
}

impl Provider for JiraProvider {
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

/// Factory for [`JiraProvider`].
pub struct JiraFactory;

#[async_trait]
impl ProviderFactory for JiraFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let token = TokenResolver::new("JIRA", &["JIRA_TOKEN"])
            .resolve(PROVIDER_NAME, config)
            .context("Jira provider requires an API token")?;

        Ok(Arc::new(JiraProvider {
            descriptor: descriptor(),
            token,
            email: config.get_string("email"),
            base_url: config.get_string("base_url"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_key_forms() {
        let parsed = parse_reference("PROJ-123").unwrap();
        assert_eq!(parsed.issue_key, "PROJ-123");
        assert_eq!(parsed.project_key, "PROJ");
        assert_eq!(parsed.number, 123);
        assert_eq!(parsed.url, None);

        assert_eq!(parse_reference("jira:PROJ-123").unwrap(), parsed);
        assert_eq!(parse_reference("j:PROJ-123").unwrap(), parsed);
    }

    #[test]
    fn test_browse_url() {
        let parsed =
            parse_reference("https://acme.atlassian.net/browse/OPS-7?focus=comments").unwrap();
        assert_eq!(parsed.issue_key, "OPS-7");
        assert_eq!(
            parsed.url.as_deref(),
            Some("https://acme.atlassian.net/browse/OPS-7")
        );
        assert_eq!(
            parsed.base_url().as_deref(),
            Some("https://acme.atlassian.net")
        );
    }

    #[test]
    fn test_scheme_prefixed_url() {
        // The URL contains a colon, so the rule must also try the raw input.
        let parsed = parse_reference("jira:https://jira.example.com/browse/AB-1").unwrap();
        assert_eq!(parsed.issue_key, "AB-1");
    }

    #[test]
    fn test_canonical_prefers_url() {
        let with_url = parse_reference("https://x.atlassian.net/browse/AB-1").unwrap();
        assert_eq!(with_url.to_string(), "https://x.atlassian.net/browse/AB-1");
        let bare = parse_reference("AB-1").unwrap();
        assert_eq!(bare.to_string(), "AB-1");
    }

    #[test]
    fn test_invalid_forms() {
        // Lowercase keys are not Jira issue keys.
        assert!(parse_reference("proj-123").is_err());
        // Single-character project keys are rejected.
        assert!(parse_reference("A-123").is_err());
        // Keys longer than 10 characters are rejected.
        assert!(parse_reference("ABCDEFGHIJK-1").is_err());
        assert!(matches!(parse_reference("jira:"), Err(ParseError::Empty)));
    }
}
