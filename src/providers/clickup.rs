//! ClickUp tasks backend.

use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;

use crate::core::{Capability, CapabilitySet, Config, ProviderDescriptor};
use crate::providers::provider::{Provider, ProviderFactory};
use crate::providers::token::TokenResolver;
use crate::refspec::{Grammar, ParseError};

pub const PROVIDER_NAME: &str = "clickup";

/// A parsed ClickUp task reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickUpRef {
    /// Native task id, e.g. `abc1234`, optionally with the team id from a URL.
    Task { id: String, team: Option<String> },
    /// Custom task id, e.g. `PROJ-123` (requires custom ids enabled).
    Custom { id: String },
}

impl fmt::Display for ClickUpRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickUpRef::Task { id, .. } => write!(f, "{}", id),
            ClickUpRef::Custom { id } => write!(f, "{}", id),
        }
    }
}

static GRAMMAR: LazyLock<Grammar<ClickUpRef>> = LazyLock::new(|| {
    Grammar::new(
        &["clickup", "cu"],
        "a task id, PROJ-N custom id, or a clickup.com task URL",
    )
    .rule(
        "app-url",
        r"(?:https?://)?app\.clickup\.com/t/(?:(\d+)/)?([a-zA-Z0-9]+)",
        |caps| {
            Ok(ClickUpRef::Task {
                id: caps[2].to_string(),
                team: caps.get(1).map(|m| m.as_str().to_string()),
            })
        },
    )
    .rule(
        "share-url",
        r"(?:https?://)?sharing\.clickup\.com/\d+/t/h/([a-zA-Z0-9]+)/",
        |caps| {
            Ok(ClickUpRef::Task {
                id: caps[1].to_string(),
                team: None,
            })
        },
    )
    .rule("custom-id", r"^[A-Z]+-\d+$", |caps| {
        Ok(ClickUpRef::Custom {
            id: caps[0].to_string(),
        })
    })
    .rule("task-id", r"^[a-zA-Z0-9]{7,9}$", |caps| {
        Ok(ClickUpRef::Task {
            id: caps[0].to_string(),
            team: None,
        })
    })
});

/// Parse a ClickUp reference in any accepted form.
pub fn parse_reference(input: &str) -> Result<ClickUpRef, ParseError> {
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
        Capability::Snapshot,
        Capability::CreateWorkUnit,
        Capability::FetchSubtasks,
    ]
    .into_iter()
    .collect()
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "Load tasks from ClickUp")
        .with_schemes(["clickup", "cu"])
        .with_capabilities(capabilities())
        .with_priority(20)
}

/// ClickUp backend instance.
pub struct ClickUpProvider {
    descriptor: ProviderDescriptor,
    /// API token, used by the HTTP client layer.
    pub token: String,
    /// Team (workspace) id for list and custom-id lookups.
    pub team_id: String,
}

impl Provider for ClickUpProvider {
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

/// Factory for [`ClickUpProvider`].
pub struct ClickUpFactory;

#[async_trait]
impl ProviderFactory for ClickUpFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let token = TokenResolver::new("CLICKUP", &["CLICKUP_TOKEN"])
            .resolve(PROVIDER_NAME, config)
            .context("ClickUp provider requires an API token")?;

        Ok(Arc::new(ClickUpProvider {
            descriptor: descriptor(),
            token,
            team_id: config.get_string("team_id"),
        }))
    }
}
