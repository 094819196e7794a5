//! YouTrack issues backend.

use std::fmt;
use std::sync::{Arc, LazyLock};

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use url::Url;

use crate::core::{Capability, CapabilitySet, Config, ProviderDescriptor};
use crate::providers::provider::{Provider, ProviderFactory};
use crate::providers::token::TokenResolver;
use crate::refspec::{Grammar, ParseError};

pub const PROVIDER_NAME: &str = "youtrack";

/// A parsed YouTrack issue reference.
///
/// Readable ids are normalized to uppercase; YouTrack treats them
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YouTrackRef {
    /// Readable id, e.g. `ABC-123`, uppercased.
    pub id: String,
    /// Permalink, when the reference was a URL.
    pub permalink: Option<String>,
}

impl YouTrackRef {
    /// Instance host, when the reference was a URL.
    pub fn host(&self) -> Option<String> {
        let url = Url::parse(self.permalink.as_deref()?).ok()?;
        url.host_str().map(|h| h.to_string())
    }
}

impl fmt::Display for YouTrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

static GRAMMAR: LazyLock<Grammar<YouTrackRef>> = LazyLock::new(|| {
    Grammar::new(&["youtrack", "yt"], "ABC-123 or a YouTrack issue URL")
        .rule(
            "issue-url",
            r"^https?://[^/]+/(?:youtrack/)?issue/([A-Za-z0-9]+-[0-9]+)",
            |caps| {
                Ok(YouTrackRef {
                    id: caps[1].to_uppercase(),
                    permalink: Some(caps[0].to_string()),
                })
            },
        )
        .rule("readable-id", r"^([A-Za-z0-9]+)-([0-9]+)$", |caps| {
            Ok(YouTrackRef {
                id: format!("{}-{}", caps[1].to_uppercase(), &caps[2]),
                permalink: None,
            })
        })
});

/// Parse a YouTrack reference in any accepted form.
pub fn parse_reference(input: &str) -> Result<YouTrackRef, ParseError> {
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
    ]
    .into_iter()
    .collect()
}

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "YouTrack issue source")
        .with_schemes(["youtrack", "yt"])
        .with_capabilities(capabilities())
        .with_priority(20)
}

/// YouTrack backend instance.
pub struct YouTrackProvider {
    descriptor: ProviderDescriptor,
    /// Permanent token, used by the HTTP client layer.
    pub token: String,
    /// Instance base URL.
    pub base_url: String,
}

impl Provider for YouTrackProvider {
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

/// Factory for [`YouTrackProvider`].
pub struct YouTrackFactory;

#[async_trait]
impl ProviderFactory for YouTrackFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let token = TokenResolver::new("YOUTRACK", &["YOUTRACK_TOKEN"])
            .resolve(PROVIDER_NAME, config)
            .context("YouTrack provider requires a permanent token")?;

        Ok(Arc::new(YouTrackProvider {
            descriptor: descriptor(),
            token,
            base_url: config.get_string("base_url"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readable_id_uppercased() {
        let parsed = parse_reference("abc-123").unwrap();
        assert_eq!(parsed.id, "ABC-123");
        assert_eq!(parsed.permalink, None);
        assert_eq!(parse_reference("yt:ABC-123").unwrap().id, "ABC-123");
    }

    #[test]
    fn test_cloud_url() {
        let parsed = parse_reference("https://acme.youtrack.cloud/issue/OPS-9").unwrap();
        assert_eq!(parsed.id, "OPS-9");
        assert_eq!(parsed.host().as_deref(), Some("acme.youtrack.cloud"));
    }

    #[test]
    fn test_self_hosted_url_with_path_prefix() {
        let parsed =
            parse_reference("youtrack:https://x.myjetbrains.com/youtrack/issue/ab-1").unwrap();
        assert_eq!(parsed.id, "AB-1");
        assert!(parsed.permalink.is_some());
    }

    #[test]
    fn test_canonical_is_readable_id() {
        assert_eq!(
            parse_reference("https://acme.youtrack.cloud/issue/OPS-9")
                .unwrap()
                .to_string(),
            "OPS-9"
        );
    }

    #[test]
    fn test_invalid_forms() {
        assert!(parse_reference("ABC_123").is_err());
        assert!(parse_reference("ABC-").is_err());
        assert!(matches!(parse_reference("yt:"), Err(ParseError::Empty)));
    }
}
