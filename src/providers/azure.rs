//! Azure DevOps work items backend.

use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;

use crate::core::{Capability, CapabilitySet, Config, ProviderDescriptor};
use crate::providers::provider::{Provider, ProviderFactory};
use crate::providers::token::TokenResolver;
use crate::refspec::{numeric_id, Grammar, ParseError};

pub const PROVIDER_NAME: &str = "azuredevops";

/// A parsed Azure DevOps work item reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AzureRef {
    /// `org/project#42`, or a work item URL
    Scoped {
        organization: String,
        project: String,
        id: i64,
    },
    /// `42`, organization and project come from configuration
    Bare { id: i64 },
}

impl fmt::Display for AzureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AzureRef::Scoped {
                organization,
                project,
                id,
            } => write!(f, "{}/{}#{}", organization, project, id),
            AzureRef::Bare { id } => write!(f, "{}", id),
        }
    }
}

fn work_item_id(raw: &str) -> Result<i64, String> {
    let id = numeric_id(raw)?;
    if id == 0 {
        return Err("work item ids start at 1".to_string());
    }
    Ok(id)
}

fn scoped(org: &str, project: &str, id: &str) -> Result<AzureRef, String> {
    Ok(AzureRef::Scoped {
        organization: org.to_string(),
        project: project.to_string(),
        id: work_item_id(id)?,
    })
}

static GRAMMAR: LazyLock<Grammar<AzureRef>> = LazyLock::new(|| {
    Grammar::new(
        &["azdo", "azure"],
        "N, org/project#N, or an Azure DevOps work item URL",
    )
    .rule(
        "dev-azure-url",
        r"(?:https?://)?dev\.azure\.com/([a-zA-Z0-9_-]+)/([a-zA-Z0-9_-]+)/_workitems/edit/(\d+)",
        |caps| scoped(&caps[1], &caps[2], &caps[3]),
    )
    .rule(
        "visualstudio-url",
        r"(?:https?://)?([a-zA-Z0-9_-]+)\.visualstudio\.com/([a-zA-Z0-9_-]+)/_workitems/edit/(\d+)",
        |caps| scoped(&caps[1], &caps[2], &caps[3]),
    )
    .rule(
        "org-project",
        r"^([a-zA-Z0-9_-]+)/([a-zA-Z0-9_-]+)#(\d+)$",
        |caps| scoped(&caps[1], &caps[2], &caps[3]),
    )
    .rule("bare-id", r"^\d+$", |caps| {
        Ok(AzureRef::Bare {
            id: work_item_id(&caps[0])?,
        })
    })
});

/// Parse an Azure DevOps reference in any accepted form.
pub fn parse_reference(input: &str) -> Result<AzureRef, ParseError> {
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
        Capability::CreatePr,
        Capability::LinkBranch,
        Capability::CreateWorkUnit,
        Capability::FetchSubtasks,
    ]
    .into_iter()
    .collect()
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "Load work items from Azure DevOps")
        .with_schemes(["azdo", "azure"])
        .with_capabilities(capabilities())
        .with_priority(20)
}

/// Azure DevOps backend instance.
pub struct AzureProvider {
    descriptor: ProviderDescriptor,
    /// Personal access token, used by the HTTP client layer.
    pub token: String,
    /// Default organization for bare references.
    pub organization: String,
    /// Default project for bare references.
    pub project: String,
}

impl Provider for AzureProvider {
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

/// Factory for [`AzureProvider`].
pub struct AzureFactory;

#[async_trait]
impl ProviderFactory for AzureFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        // SYSTEM_ACCESSTOKEN covers Azure Pipelines agents.
        let token = TokenResolver::new(
            "AZURE_DEVOPS",
            &["AZURE_DEVOPS_TOKEN", "SYSTEM_ACCESSTOKEN"],
        )
        .resolve(PROVIDER_NAME, config)
        .context("Azure DevOps provider requires a personal access token")?;

        Ok(Arc::new(AzureProvider {
            descriptor: descriptor(),
            token,
            organization: config.get_string("organization"),
            project: config.get_string("project"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id() {
        assert_eq!(parse_reference("42").unwrap(), AzureRef::Bare { id: 42 });
        assert_eq!(parse_reference("azdo:42").unwrap(), AzureRef::Bare { id: 42 });
        assert_eq!(parse_reference("azure:42").unwrap(), AzureRef::Bare { id: 42 });
    }

    #[test]
    fn test_org_project_form() {
        assert_eq!(
            parse_reference("myorg/myproject#123").unwrap(),
            AzureRef::Scoped {
                organization: "myorg".to_string(),
                project: "myproject".to_string(),
                id: 123
            }
        );
    }

    #[test]
    fn test_dev_azure_url() {
        let parsed =
            parse_reference("https://dev.azure.com/myorg/myproject/_workitems/edit/123").unwrap();
        assert_eq!(parsed.to_string(), "myorg/myproject#123");
    }

    #[test]
    fn test_visualstudio_url() {
        let parsed =
            parse_reference("azdo:https://myorg.visualstudio.com/proj/_workitems/edit/9").unwrap();
        assert_eq!(
            parsed,
            AzureRef::Scoped {
                organization: "myorg".to_string(),
                project: "proj".to_string(),
                id: 9
            }
        );
    }

    #[test]
    fn test_zero_id_is_invalid() {
        assert!(matches!(
            parse_reference("0"),
            Err(ParseError::Invalid { .. })
        ));
    }

    #[test]
    fn test_invalid_forms() {
        assert!(parse_reference("org/project").is_err());
        assert!(parse_reference("#42x").is_err());
        assert!(matches!(parse_reference("azdo:"), Err(ParseError::Empty)));
    }
}
