//! Provider descriptors - WHO a backend is.

use crate::core::capability::CapabilitySet;

/// Immutable metadata describing a registered provider.
///
/// The `capabilities` field is the provider's declared, informational set;
/// the authoritative set for a live instance comes from
/// [`infer_capabilities`](crate::providers::provider::infer_capabilities).
#[derive(Debug, Clone, Default)]
pub struct ProviderDescriptor {
    /// Unique provider name (registry key)
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Scheme strings this provider claims (e.g., `["gitlab", "gl"]`).
    /// Globally unique across all descriptors.
    pub schemes: Vec<String>,

    /// Declared capability set
    pub capabilities: CapabilitySet,

    /// Listing priority; higher sorts first
    pub priority: i32,
}

impl ProviderDescriptor {
    /// Create a descriptor with the given name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        ProviderDescriptor {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Set the schemes this provider claims.
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the declared capability set.
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the listing priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}
