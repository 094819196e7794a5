//! The provider directory: registration, lookup, and reference resolution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::core::{Config, ProviderDescriptor};
use crate::providers::{Provider, ProviderFactory};
use crate::registry::errors::RegistryError;
use crate::registry::scheme::parse_scheme;

/// Options for reference resolution.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Provider used for bare references (those without a scheme).
    pub default_provider: Option<String>,
}

/// A successfully resolved reference.
pub struct Resolution {
    /// The provider instance that claimed the reference.
    pub provider: Arc<dyn Provider>,
    /// Name of that provider.
    pub provider_name: String,
    /// Canonical string form of the reference.
    pub canonical: String,
    /// The scheme that routed the reference, if one was present.
    pub scheme: Option<String>,
}

// Arc<dyn Provider> has no Debug, so derive is out.
impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("provider_name", &self.provider_name)
            .field("canonical", &self.canonical)
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

struct Registered {
    descriptor: ProviderDescriptor,
    factory: Arc<dyn ProviderFactory>,
}

#[derive(Default)]
struct Inner {
    providers: HashMap<String, Registered>,
    /// scheme -> provider name
    schemes: HashMap<String, String>,
}

/// Thread-safe directory of provider factories, keyed by name and scheme.
///
/// Registration is an explicit value; there is no process-wide singleton.
/// Lookups take a read lock only; no lock is held across factory I/O.
#[derive(Default)]
pub struct Directory {
    inner: RwLock<Inner>,
}

impl Directory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Directory::default()
    }

    /// Register a provider factory.
    ///
    /// Fails without side effects if the name or any claimed scheme is
    /// already taken.
    pub fn register(&self, factory: Arc<dyn ProviderFactory>) -> Result<(), RegistryError> {
        let descriptor = factory.descriptor();
        let mut inner = self.inner.write().unwrap();

        if inner.providers.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateProvider {
                name: descriptor.name.clone(),
            });
        }

        // Validate every scheme before touching the maps.
        for scheme in &descriptor.schemes {
            if let Some(owner) = inner.schemes.get(scheme) {
                return Err(RegistryError::DuplicateScheme {
                    scheme: scheme.clone(),
                    existing: owner.clone(),
                    incoming: descriptor.name.clone(),
                });
            }
        }

        debug!(provider = %descriptor.name, schemes = ?descriptor.schemes, "registering provider");

        for scheme in &descriptor.schemes {
            inner.schemes.insert(scheme.clone(), descriptor.name.clone());
        }
        inner.providers.insert(
            descriptor.name.clone(),
            Registered {
                descriptor,
                factory,
            },
        );

        Ok(())
    }

    /// Look up a factory by provider name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn ProviderFactory>, RegistryError> {
        let inner = self.inner.read().unwrap();
        match inner.providers.get(name) {
            Some(rp) => Ok(Arc::clone(&rp.factory)),
            None => Err(RegistryError::UnknownProvider {
                name: name.to_string(),
                known: Self::provider_names(&inner),
            }),
        }
    }

    /// Look up a factory by scheme.
    pub fn get_by_scheme(&self, scheme: &str) -> Result<Arc<dyn ProviderFactory>, RegistryError> {
        let inner = self.inner.read().unwrap();
        match Self::factory_for_scheme(&inner, scheme) {
            Some((_, factory)) => Ok(factory),
            None => Err(RegistryError::UnknownScheme {
                scheme: scheme.to_string(),
                input: String::new(),
                known: Self::scheme_names(&inner),
            }),
        }
    }

    /// All registered descriptors, highest priority first.
    ///
    /// Ties break by name so the order is stable across runs.
    pub fn list(&self) -> Vec<ProviderDescriptor> {
        let inner = self.inner.read().unwrap();
        let mut descriptors: Vec<ProviderDescriptor> = inner
            .providers
            .values()
            .map(|rp| rp.descriptor.clone())
            .collect();
        descriptors.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.name.cmp(&b.name)));
        descriptors
    }

    /// All registered schemes, sorted alphabetically.
    pub fn schemes(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap();
        Self::scheme_names(&inner)
    }

    /// Create a provider instance by name.
    pub async fn create(
        &self,
        name: &str,
        config: &Config,
    ) -> Result<Arc<dyn Provider>, RegistryError> {
        let factory = self.get(name)?;
        factory
            .create(config)
            .await
            .map_err(|reason| RegistryError::Factory {
                provider: name.to_string(),
                reason,
            })
    }

    /// Resolve a raw reference string to a provider instance and its
    /// canonical form.
    ///
    /// Resolution order: explicit scheme prefix first, then the default
    /// provider from `options` for bare references, otherwise an error
    /// listing the registered schemes. The provider's parser always sees
    /// the full `scheme:identifier` form.
    pub async fn resolve(
        &self,
        input: &str,
        config: &Config,
        options: &ResolveOptions,
    ) -> Result<Resolution, RegistryError> {
        let (scheme, _identifier) = parse_scheme(input);

        if let Some(scheme) = scheme {
            return self
                .resolve_with_scheme(scheme, input, Some(scheme.to_string()), config)
                .await;
        }

        if let Some(default) = options.default_provider.as_deref() {
            // Bare reference: route to the default provider's scheme with
            // the whole input as the identifier.
            let prefixed = format!("{}:{}", default, input);
            return self.resolve_with_scheme(default, &prefixed, None, config).await;
        }

        Err(RegistryError::NoScheme {
            input: input.to_string(),
            schemes: self.schemes(),
        })
    }

    async fn resolve_with_scheme(
        &self,
        scheme: &str,
        full_input: &str,
        routed_scheme: Option<String>,
        config: &Config,
    ) -> Result<Resolution, RegistryError> {
        let (name, factory) = {
            let inner = self.inner.read().unwrap();
            match Self::factory_for_scheme(&inner, scheme) {
                Some(found) => found,
                None => {
                    return Err(RegistryError::UnknownScheme {
                        scheme: scheme.to_string(),
                        input: full_input.to_string(),
                        known: Self::scheme_names(&inner),
                    });
                }
            }
        };

        let provider = factory
            .create(config)
            .await
            .map_err(|reason| RegistryError::Factory {
                provider: name.clone(),
                reason,
            })?;

        let canonical = provider
            .parse(full_input)
            .map_err(|source| RegistryError::Parse {
                provider: name.clone(),
                source,
            })?;

        debug!(provider = %name, %canonical, "resolved reference");

        Ok(Resolution {
            provider,
            provider_name: name,
            canonical,
            scheme: routed_scheme,
        })
    }

    fn factory_for_scheme(inner: &Inner, scheme: &str) -> Option<(String, Arc<dyn ProviderFactory>)> {
        let name = inner.schemes.get(scheme)?;
        let rp = inner.providers.get(name)?;
        Some((name.clone(), Arc::clone(&rp.factory)))
    }

    fn scheme_names(inner: &Inner) -> Vec<String> {
        let mut schemes: Vec<String> = inner.schemes.keys().cloned().collect();
        schemes.sort();
        schemes
    }

    fn provider_names(inner: &Inner) -> Vec<String> {
        let mut names: Vec<String> = inner.providers.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;

    use crate::refspec::ParseError;

    struct StubProvider {
        descriptor: ProviderDescriptor,
    }

    impl Provider for StubProvider {
        fn descriptor(&self) -> &ProviderDescriptor {
            &self.descriptor
        }
        fn parse(&self, input: &str) -> Result<String, ParseError> {
            // Canonicalizes to "<name>:<rest after first colon>".
            let rest = input.split_once(':').map(|(_, r)| r).unwrap_or(input);
            if rest.is_empty() {
                return Err(ParseError::Empty);
            }
            Ok(format!("{}:{}", self.descriptor.name, rest))
        }
        fn matches(&self, _input: &str) -> bool {
            true
        }
    }

    struct StubFactory {
        descriptor: ProviderDescriptor,
        fail: bool,
    }

    impl StubFactory {
        fn new(name: &str, schemes: &[&str], priority: i32) -> Arc<Self> {
            Arc::new(StubFactory {
                descriptor: ProviderDescriptor::new(name, "stub")
                    .with_schemes(schemes.iter().copied())
                    .with_priority(priority),
                fail: false,
            })
        }

        fn failing(name: &str, schemes: &[&str]) -> Arc<Self> {
            Arc::new(StubFactory {
                descriptor: ProviderDescriptor::new(name, "stub")
                    .with_schemes(schemes.iter().copied()),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl ProviderFactory for StubFactory {
        fn descriptor(&self) -> ProviderDescriptor {
            self.descriptor.clone()
        }
        async fn create(&self, _config: &Config) -> Result<Arc<dyn Provider>> {
            if self.fail {
                anyhow::bail!("credentials rejected");
            }
            Ok(Arc::new(StubProvider {
                descriptor: self.descriptor.clone(),
            }))
        }
    }

    fn directory() -> Directory {
        let dir = Directory::new();
        dir.register(StubFactory::new("file", &["file"], 10)).unwrap();
        dir.register(StubFactory::new("gitlab", &["gitlab", "gl"], 20))
            .unwrap();
        dir
    }

    #[test]
    fn test_register_and_get() {
        let dir = directory();
        assert!(dir.get("file").is_ok());
        assert!(dir.get("gitlab").is_ok());
        assert!(matches!(
            dir.get("nope"),
            Err(RegistryError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn test_get_by_scheme_covers_aliases() {
        let dir = directory();
        assert!(dir.get_by_scheme("gl").is_ok());
        assert!(dir.get_by_scheme("gitlab").is_ok());
        assert!(matches!(
            dir.get_by_scheme("hg"),
            Err(RegistryError::UnknownScheme { .. })
        ));
    }

    #[test]
    fn test_duplicate_scheme_fails_without_side_effects() {
        let dir = directory();
        let err = dir
            .register(StubFactory::new("gitlab2", &["other", "gl"], 5))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateScheme { ref scheme, .. } if scheme == "gl"));
        // The non-colliding scheme must not have leaked in.
        assert!(dir.get_by_scheme("other").is_err());
        assert!(dir.get("gitlab2").is_err());
    }

    #[test]
    fn test_list_sorted_by_priority_then_name() {
        let dir = directory();
        dir.register(StubFactory::new("jira", &["jira", "j"], 20))
            .unwrap();
        let names: Vec<String> = dir.list().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["gitlab", "jira", "file"]);
    }

    #[test]
    fn test_schemes_sorted() {
        let dir = directory();
        assert_eq!(dir.schemes(), vec!["file", "gitlab", "gl"]);
    }

    #[tokio::test]
    async fn test_resolve_explicit_scheme_passes_full_input() {
        let dir = directory();
        let res = dir
            .resolve("gl:123", &Config::default(), &ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(res.provider_name, "gitlab");
        assert_eq!(res.canonical, "gitlab:123");
        assert_eq!(res.scheme.as_deref(), Some("gl"));
    }

    #[tokio::test]
    async fn test_resolve_bare_reference_uses_default() {
        let dir = directory();
        let opts = ResolveOptions {
            default_provider: Some("file".to_string()),
        };
        let res = dir
            .resolve("notes.md", &Config::default(), &opts)
            .await
            .unwrap();
        assert_eq!(res.provider_name, "file");
        assert_eq!(res.canonical, "file:notes.md");
        assert_eq!(res.scheme, None);
    }

    #[tokio::test]
    async fn test_resolve_bare_without_default_lists_schemes() {
        let dir = directory();
        let err = dir
            .resolve("notes.md", &Config::default(), &ResolveOptions::default())
            .await
            .unwrap_err();
        match err {
            RegistryError::NoScheme { input, schemes } => {
                assert_eq!(input, "notes.md");
                assert_eq!(schemes, vec!["file", "gitlab", "gl"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_unknown_scheme() {
        let dir = directory();
        let err = dir
            .resolve("hg:42", &Config::default(), &ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::UnknownScheme { ref scheme, .. } if scheme == "hg"));
    }

    #[tokio::test]
    async fn test_resolve_windows_path_is_bare() {
        let dir = directory();
        let opts = ResolveOptions {
            default_provider: Some("file".to_string()),
        };
        let res = dir
            .resolve(r"C:\work\notes.md", &Config::default(), &opts)
            .await
            .unwrap();
        assert_eq!(res.provider_name, "file");
        assert_eq!(res.canonical, r"file:C:\work\notes.md");
    }

    #[tokio::test]
    async fn test_explicit_scheme_beats_default() {
        let dir = directory();
        let opts = ResolveOptions {
            default_provider: Some("file".to_string()),
        };
        let res = dir.resolve("gl:5", &Config::default(), &opts).await.unwrap();
        assert_eq!(res.provider_name, "gitlab");
        assert_eq!(res.canonical, "gitlab:5");
        assert_eq!(res.scheme.as_deref(), Some("gl"));
    }

    #[tokio::test]
    async fn test_resolution_debug_omits_provider() {
        let dir = directory();
        let res = dir
            .resolve("file:notes.md", &Config::default(), &ResolveOptions::default())
            .await
            .unwrap();
        let debug = format!("{res:?}");
        assert!(debug.contains("\"file\""));
        assert!(debug.contains("file:notes.md"));
        assert!(debug.contains(".."));
    }

    #[tokio::test]
    async fn test_factory_failure_surfaces() {
        let dir = directory();
        dir.register(StubFactory::failing("broken", &["broken"]))
            .unwrap();
        let err = dir
            .resolve("broken:1", &Config::default(), &ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Factory { ref provider, .. } if provider == "broken"));
    }
}
