//! Linear issues backend.

use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;

use crate::core::{Capability, CapabilitySet, Config, ProviderDescriptor};
use crate::providers::provider::{Provider, ProviderFactory};
use crate::providers::token::TokenResolver;
use crate::refspec::{numeric_id, Grammar, ParseError};

pub const PROVIDER_NAME: &str = "linear";

/// A parsed Linear issue reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearRef {
    /// Full issue identifier, e.g. `ENG-123`.
    pub issue_id: String,
    /// Team portion of the identifier.
    pub team_key: String,
    /// Numeric portion of the identifier.
    pub number: i64,
    /// Issue URL, when the reference was a URL.
    pub url: Option<String>,
}

impl fmt::Display for LinearRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.url {
            Some(url) => write!(f, "{}", url),
            None => write!(f, "{}", self.issue_id),
        }
    }
}

fn id_ref(id: &str) -> Result<LinearRef, String> {
    let (team, number) = id.rsplit_once('-').ok_or("malformed issue id")?;
    Ok(LinearRef {
        issue_id: id.to_string(),
        team_key: team.to_string(),
        number: numeric_id(number)?,
        url: None,
    })
}

static GRAMMAR: LazyLock<Grammar<LinearRef>> = LazyLock::new(|| {
    Grammar::new(&["linear", "ln"], "TEAM-123 or a linear.app issue URL")
        .rule(
            "issue-url",
            r"^https://linear\.app/(?:[a-zA-Z0-9_-]+/)?issue/([A-Z0-9]+-[0-9]+)(?:-[^\s]*)?$",
            |caps| {
                let mut parsed = id_ref(&caps[1])?;
                parsed.url = Some(caps[0].to_string());
                Ok(parsed)
            },
        )
        .rule("issue-id", r"^([A-Z0-9]+)-([0-9]+)$", |caps| {
            Ok(LinearRef {
                issue_id: format!("{}-{}", &caps[1], &caps[2]),
                team_key: caps[1].to_string(),
                number: numeric_id(&caps[2])?,
                url: None,
            })
        })
});

/// Parse a Linear reference in any accepted form.
pub fn parse_reference(input: &str) -> Result<LinearRef, ParseError> {
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
        Capability::Snapshot,
        Capability::FetchSubtasks,
    ]
    .into_iter()
    .collect()
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "Linear issue source")
        .with_schemes(["linear", "ln"])
        .with_capabilities(capabilities())
        .with_priority(20)
}

/// Linear backend instance.
pub struct LinearProvider {
    descriptor: ProviderDescriptor,
    /// API key, used by the GraphQL client layer.
    pub token: String,
    /// Default team key for bare references.
    pub team: String,
}

impl Provider for LinearProvider {
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

/// Factory for [`LinearProvider`].
pub struct LinearFactory;

#[async_trait]
impl ProviderFactory for LinearFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let token = TokenResolver::new("LINEAR", &["LINEAR_API_KEY"])
            .resolve(PROVIDER_NAME, config)
            .context("Linear provider requires an API key")?;

        Ok(Arc::new(LinearProvider {
            descriptor: descriptor(),
            token,
            team: config.get_string("team"),
        }))
    }
}
