//! Shared utilities

pub mod config;
pub mod diagnostic;

pub use config::FileConfig;
pub use diagnostic::Diagnostic;
