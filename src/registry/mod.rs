//! Provider registration, scheme routing, and reference resolution.

pub mod directory;
pub mod errors;
pub mod scheme;

pub use directory::{Directory, Resolution, ResolveOptions};
pub use errors::RegistryError;
pub use scheme::parse_scheme;
