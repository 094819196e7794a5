//! Registry error types and diagnostics.

use thiserror::Error;

use crate::refspec::ParseError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error from registry lookups, registration, or reference resolution.
///
/// Display carries the full guidance (including known scheme lists) so
/// library consumers printing with `{}` lose nothing; `to_diagnostic`
/// renders the same guidance for the terminal.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum RegistryError {
    #[error(
        "reference `{input}` has no scheme and no default provider is configured (registered schemes: {})",
        schemes.join(", ")
    )]
    #[diagnostic(
        code(taskbridge::registry::no_scheme),
        help("Prefix the reference with a scheme, e.g. `gitlab:123`, or configure a default provider")
    )]
    NoScheme { input: String, schemes: Vec<String> },

    #[error("unknown scheme `{scheme}` (registered schemes: {})", known.join(", "))]
    #[diagnostic(
        code(taskbridge::registry::unknown_scheme),
        help("Run `taskbridge providers` to see registered schemes")
    )]
    UnknownScheme {
        scheme: String,
        input: String,
        known: Vec<String>,
    },

    #[error("provider `{name}` is already registered")]
    #[diagnostic(code(taskbridge::registry::duplicate_provider))]
    DuplicateProvider { name: String },

    #[error("scheme `{scheme}` is already claimed by provider `{existing}`")]
    #[diagnostic(code(taskbridge::registry::duplicate_scheme))]
    DuplicateScheme {
        scheme: String,
        existing: String,
        incoming: String,
    },

    #[error("no provider registered under name `{name}`")]
    #[diagnostic(code(taskbridge::registry::unknown_provider))]
    UnknownProvider { name: String, known: Vec<String> },

    #[error("provider `{provider}` rejected the reference")]
    #[diagnostic(
        code(taskbridge::registry::parse_failed),
        help("Run `taskbridge resolve --help` for accepted reference forms")
    )]
    Parse {
        provider: String,
        #[source]
        source: ParseError,
    },

    #[error("provider `{provider}` failed to initialize: {reason}")]
    #[diagnostic(
        code(taskbridge::registry::factory_failed),
        help("Export the provider's token variable, e.g. `TASKBRIDGE_GITLAB_TOKEN`")
    )]
    Factory {
        provider: String,
        reason: anyhow::Error,
    },
}

impl RegistryError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            RegistryError::NoScheme { input, schemes } => {
                let mut diag = Diagnostic::error(format!(
                    "reference `{}` has no scheme and no default provider is configured",
                    input
                ));

                if !schemes.is_empty() {
                    diag = diag
                        .with_context(format!("registered schemes: {}", schemes.join(", ")));
                }

                diag.with_suggestion(suggestions::NO_SCHEME)
                    .with_suggestion(
                        "Set `providers.default` in .taskbridge/config.toml to route bare references",
                    )
            }

            RegistryError::UnknownScheme {
                scheme,
                input,
                known,
            } => {
                let mut diag = Diagnostic::error(format!("unknown scheme `{}`", scheme));

                if !input.is_empty() {
                    diag = diag.with_context(format!("reference: {}", input));
                }
                if !known.is_empty() {
                    diag = diag.with_context(format!("registered schemes: {}", known.join(", ")));
                }

                diag.with_suggestion(suggestions::UNKNOWN_SCHEME)
            }

            RegistryError::DuplicateProvider { name } => {
                Diagnostic::error(format!("provider `{}` is already registered", name))
                    .with_suggestion("Register each provider exactly once at startup")
            }

            RegistryError::DuplicateScheme {
                scheme,
                existing,
                incoming,
            } => Diagnostic::error(format!(
                "scheme `{}` is already claimed by provider `{}`",
                scheme, existing
            ))
            .with_context(format!("provider `{}` attempted to claim it again", incoming))
            .with_suggestion("Give one of the two providers a different scheme list"),

            RegistryError::UnknownProvider { name, known } => {
                let mut diag =
                    Diagnostic::error(format!("no provider registered under name `{}`", name));

                if !known.is_empty() {
                    diag = diag
                        .with_context(format!("registered providers: {}", known.join(", ")));
                }

                diag.with_suggestion(suggestions::UNKNOWN_SCHEME)
            }

            RegistryError::Parse { provider, source } => {
                Diagnostic::error(format!("provider `{}` rejected the reference", provider))
                    .with_context(source.to_string())
                    .with_suggestion(suggestions::MALFORMED_REFERENCE)
            }

            RegistryError::Factory { provider, reason } => {
                Diagnostic::error(format!("provider `{}` failed to initialize", provider))
                    .with_context(reason.to_string())
                    .with_suggestion(suggestions::MISSING_TOKEN)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_scheme_lists_schemes() {
        let err = RegistryError::NoScheme {
            input: "1234".to_string(),
            schemes: vec!["dir".into(), "file".into(), "gitlab".into()],
        };
        let out = err.to_diagnostic().format(false);
        assert!(out.contains("registered schemes: dir, file, gitlab"));
        assert!(out.contains("providers.default"));
    }

    #[test]
    fn test_duplicate_scheme_names_both_providers() {
        let err = RegistryError::DuplicateScheme {
            scheme: "gl".to_string(),
            existing: "gitlab".to_string(),
            incoming: "gitlab2".to_string(),
        };
        let out = err.to_diagnostic().format(false);
        assert!(out.contains("already claimed by provider `gitlab`"));
        assert!(out.contains("`gitlab2`"));
    }

    #[test]
    fn test_display_includes_scheme_lists() {
        let err = RegistryError::NoScheme {
            input: "1234".to_string(),
            schemes: vec!["file".into(), "gitlab".into()],
        };
        assert!(err.to_string().contains("registered schemes: file, gitlab"));

        let err = RegistryError::UnknownScheme {
            scheme: "hg".to_string(),
            input: "hg:42".to_string(),
            known: vec!["file".into(), "gitlab".into()],
        };
        assert!(err.to_string().contains("registered schemes: file, gitlab"));
    }

    #[test]
    fn test_diagnostic_codes() {
        use miette::Diagnostic as _;

        let err = RegistryError::UnknownScheme {
            scheme: "hg".to_string(),
            input: "hg:42".to_string(),
            known: vec![],
        };
        assert_eq!(
            err.code().unwrap().to_string(),
            "taskbridge::registry::unknown_scheme"
        );
        assert!(err.help().is_some());
    }

    #[test]
    fn test_parse_error_carries_reason() {
        let err = RegistryError::Parse {
            provider: "jira".to_string(),
            source: ParseError::Unrecognized {
                input: "jira:???".to_string(),
                expected: "PROJ-N or a browse URL".to_string(),
            },
        };
        let out = err.to_diagnostic().format(false);
        assert!(out.contains("PROJ-N or a browse URL"));
    }
}
