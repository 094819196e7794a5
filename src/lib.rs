//! Taskbridge - uniform addressing for work items across task trackers
//!
//! This crate provides the provider registry and reference-resolution core:
//! a directory of installable tracker backends keyed by URI-like schemes,
//! a resolver that turns free-form reference strings into live backend
//! instances plus canonical identifiers, and runtime capability discovery
//! for those instances.

pub mod core;
pub mod providers;
pub mod refspec;
pub mod registry;
pub mod util;

pub use core::{
    capability::{Capability, CapabilitySet},
    config::Config,
    descriptor::ProviderDescriptor,
    work_unit::{Person, Priority, Status, WorkUnit},
};

pub use providers::provider::{infer_capabilities, Provider, ProviderFactory};
pub use providers::register_builtins;
pub use registry::{Directory, RegistryError, ResolveOptions, Resolution};
pub use util::diagnostic::Diagnostic;
