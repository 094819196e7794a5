//! `taskbridge resolve` command
//!
//! Resolve a task reference to a provider, canonical form, and the
//! capabilities of the constructed instance.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use tokio::time::timeout;

use crate::cli::ResolveArgs;
use taskbridge::core::Config;
use taskbridge::providers::provider::infer_capabilities;
use taskbridge::register_builtins;
use taskbridge::registry::{parse_scheme, Directory, ResolveOptions};
use taskbridge::util::config::{global_config_path, load_merged, project_config_path};
use taskbridge::util::diagnostic;

pub async fn execute(args: ResolveArgs, use_color: bool) -> Result<()> {
    let directory = Directory::new();
    register_builtins(&directory)?;

    let file_config = load_merged(
        global_config_path().as_deref(),
        &project_config_path(Path::new(".")),
    );

    // The default provider for bare references: flag wins over config.
    let default_provider = args
        .provider
        .clone()
        .or_else(|| file_config.providers.default.clone());

    let config = provider_config_for(
        &directory,
        &file_config,
        &args.reference,
        default_provider.as_deref(),
    );

    let options = ResolveOptions {
        default_provider,
    };

    let resolved = timeout(
        Duration::from_secs(args.timeout),
        directory.resolve(&args.reference, &config, &options),
    )
    .await;

    let resolution = match resolved {
        Ok(Ok(resolution)) => resolution,
        Ok(Err(err)) => {
            diagnostic::emit(&err.to_diagnostic(), use_color);
            std::process::exit(1);
        }
        Err(_) => bail!(
            "resolving '{}' timed out after {}s",
            args.reference,
            args.timeout
        ),
    };

    let capabilities = infer_capabilities(resolution.provider.as_ref());

    if args.json {
        let caps: Vec<String> = capabilities.iter().map(|c| c.to_string()).collect();
        let out = serde_json::json!({
            "provider": resolution.provider_name,
            "scheme": resolution.scheme,
            "canonical": resolution.canonical,
            "capabilities": caps,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Provider:     {}", resolution.provider_name);
        if let Some(scheme) = &resolution.scheme {
            println!("Scheme:       {}", scheme);
        }
        println!("Canonical:    {}", resolution.canonical);
        let caps = if capabilities.is_empty() {
            "(none)".to_string()
        } else {
            capabilities.to_string()
        };
        println!("Capabilities: {}", caps);
    }

    Ok(())
}

/// Pick the provider table that applies to this reference so factories see
/// their own options. Falls back to an empty config for unknown schemes;
/// resolution will report the real error.
fn provider_config_for(
    directory: &Directory,
    file_config: &taskbridge::util::FileConfig,
    reference: &str,
    default_provider: Option<&str>,
) -> Config {
    let (scheme, _) = parse_scheme(reference);
    let routed = scheme.or(default_provider);

    let Some(routed) = routed else {
        return Config::new();
    };

    match directory.get_by_scheme(routed) {
        Ok(factory) => file_config.provider_config(&factory.descriptor().name),
        Err(_) => Config::new(),
    }
}
