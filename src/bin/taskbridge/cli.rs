//! CLI definitions using clap.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Taskbridge - resolve task references across issue trackers
#[derive(Parser)]
#[command(name = "taskbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the registered providers and their capabilities
    Providers(ProvidersArgs),

    /// Resolve a task reference to a provider and canonical id
    Resolve(ResolveArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ProvidersArgs {
    /// Show capability sets and scheme aliases for each provider
    #[arg(long)]
    pub capabilities: bool,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Task reference, e.g. `gitlab:group/project#42` or `file:todo.md`
    pub reference: String,

    /// Provider to use when the reference carries no scheme
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Abort provider construction after this many seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Print the resolution as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
