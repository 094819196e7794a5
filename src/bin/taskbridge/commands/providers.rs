//! `taskbridge providers` command
//!
//! List the registered providers, their schemes, and capabilities.

use anyhow::Result;

use crate::cli::ProvidersArgs;
use taskbridge::register_builtins;
use taskbridge::registry::Directory;

pub fn execute(args: ProvidersArgs) -> Result<()> {
    let directory = Directory::new();
    register_builtins(&directory)?;

    let descriptors = directory.list();

    println!("Providers:");
    println!();

    for desc in descriptors {
        println!("  {} - {}", desc.name, desc.description);
        println!("    Schemes:   {}", desc.schemes.join(", "));
        println!("    Priority:  {}", desc.priority);

        if args.capabilities {
            let caps = if desc.capabilities.is_empty() {
                "(none)".to_string()
            } else {
                desc.capabilities.to_string()
            };
            println!("    Supports:  {}", caps);
        }

        println!();
    }

    Ok(())
}
