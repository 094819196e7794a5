//! Core data structures for taskbridge.
//!
//! This module contains the foundational value types used throughout the
//! crate:
//! - Provider descriptors and the closed capability table
//! - The copy-on-write per-call configuration store
//! - The normalized work-unit model shared by every backend

pub mod capability;
pub mod config;
pub mod descriptor;
pub mod work_unit;

pub use capability::{Capability, CapabilitySet};
pub use config::Config;
pub use descriptor::ProviderDescriptor;
pub use work_unit::{
    Attachment, Comment, CreateWorkUnitOptions, ListOptions, Person, Priority, PullRequest,
    PullRequestOptions, Snapshot, SnapshotFile, SnapshotKind, SourceInfo, Status, WorkUnit,
};
