//! Provider trait seam and capability inference.
//!
//! A backend implements [`Provider`] plus whichever operation traits it
//! supports. Capability discovery never consults a hand-maintained list:
//! [`infer_capabilities`] probes the `as_*` accessors, so a backend gains a
//! capability by implementing the trait and wiring the accessor, nothing
//! else. Backends whose operations all go through a remote API may instead
//! declare a capability set at construction, which short-circuits probing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::core::{
    Capability, CapabilitySet, Comment, Config, CreateWorkUnitOptions, ListOptions,
    ProviderDescriptor, PullRequest, PullRequestOptions, Snapshot, Status, WorkUnit,
};
use crate::refspec::ParseError;

/// A task-tracker backend.
pub trait Provider: Send + Sync {
    /// Static metadata: name, schemes, priority.
    fn descriptor(&self) -> &ProviderDescriptor;

    /// Parse a raw reference into its canonical string form.
    ///
    /// Must be pure: no I/O, no network, no filesystem probing.
    fn parse(&self, input: &str) -> Result<String, ParseError>;

    /// Cheap lexical check whether the input looks like one of this
    /// provider's references. Used for capability-style routing; must not
    /// perform I/O.
    fn matches(&self, input: &str) -> bool;

    /// Capability set fixed at construction, if the backend declares one.
    ///
    /// `None` means capabilities are discovered by probing the accessors
    /// below.
    fn declared_capabilities(&self) -> Option<&CapabilitySet> {
        None
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        None
    }
    fn as_lister(&self) -> Option<&dyn Lister> {
        None
    }
    fn as_attachment_downloader(&self) -> Option<&dyn AttachmentDownloader> {
        None
    }
    fn as_comment_fetcher(&self) -> Option<&dyn CommentFetcher> {
        None
    }
    fn as_commenter(&self) -> Option<&dyn Commenter> {
        None
    }
    fn as_status_updater(&self) -> Option<&dyn StatusUpdater> {
        None
    }
    fn as_label_manager(&self) -> Option<&dyn LabelManager> {
        None
    }
    fn as_snapshotter(&self) -> Option<&dyn Snapshotter> {
        None
    }
    fn as_pr_creator(&self) -> Option<&dyn PrCreator> {
        None
    }
    fn as_branch_linker(&self) -> Option<&dyn BranchLinker> {
        None
    }
    fn as_work_unit_creator(&self) -> Option<&dyn WorkUnitCreator> {
        None
    }
    fn as_subtask_fetcher(&self) -> Option<&dyn SubtaskFetcher> {
        None
    }
}

/// Constructs a provider instance from configuration.
///
/// `create` may perform I/O (credential checks, base-URL probes) and is
/// cancelled by dropping its future; implementations must not spawn work
/// that outlives the call.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    /// Descriptor advertised before any instance exists.
    fn descriptor(&self) -> ProviderDescriptor;

    /// Build a provider instance for the given configuration.
    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>>;
}

/// Fetch a single work unit.
#[async_trait]
pub trait Reader: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<WorkUnit>;
}

/// Enumerate work units.
#[async_trait]
pub trait Lister: Send + Sync {
    async fn list(&self, options: &ListOptions) -> Result<Vec<WorkUnit>>;
}

/// Download an attachment to a local path.
#[async_trait]
pub trait AttachmentDownloader: Send + Sync {
    async fn download_attachment(
        &self,
        reference: &str,
        attachment_id: &str,
        dest: &Path,
    ) -> Result<PathBuf>;
}

/// Fetch the comment thread of a work unit.
#[async_trait]
pub trait CommentFetcher: Send + Sync {
    async fn fetch_comments(&self, reference: &str) -> Result<Vec<Comment>>;
}

/// Post a comment on a work unit.
#[async_trait]
pub trait Commenter: Send + Sync {
    async fn comment(&self, reference: &str, body: &str) -> Result<()>;
}

/// Transition a work unit's status.
#[async_trait]
pub trait StatusUpdater: Send + Sync {
    async fn update_status(&self, reference: &str, status: Status) -> Result<()>;
}

/// Add and remove labels.
#[async_trait]
pub trait LabelManager: Send + Sync {
    async fn add_labels(&self, reference: &str, labels: &[String]) -> Result<()>;
    async fn remove_labels(&self, reference: &str, labels: &[String]) -> Result<()>;
}

/// Capture a point-in-time snapshot of a work unit's backing data.
#[async_trait]
pub trait Snapshotter: Send + Sync {
    async fn snapshot(&self, reference: &str) -> Result<Snapshot>;
}

/// Open a pull/merge request linked to a work unit.
#[async_trait]
pub trait PrCreator: Send + Sync {
    async fn create_pr(
        &self,
        reference: &str,
        options: &PullRequestOptions,
    ) -> Result<PullRequest>;
}

/// Associate a branch with a work unit.
#[async_trait]
pub trait BranchLinker: Send + Sync {
    async fn link_branch(&self, reference: &str, branch: &str) -> Result<()>;
    async fn unlink_branch(&self, reference: &str, branch: &str) -> Result<()>;
    /// The branch currently linked, if any.
    async fn linked_branch(&self, reference: &str) -> Result<Option<String>>;
}

/// Create new work units.
#[async_trait]
pub trait WorkUnitCreator: Send + Sync {
    async fn create_work_unit(&self, options: &CreateWorkUnitOptions) -> Result<WorkUnit>;
}

/// Fetch the children of a work unit.
#[async_trait]
pub trait SubtaskFetcher: Send + Sync {
    async fn fetch_subtasks(&self, reference: &str) -> Result<Vec<WorkUnit>>;
}

/// Discover a provider's capabilities.
///
/// A declared set wins outright; otherwise each accessor is probed once.
pub fn infer_capabilities(provider: &dyn Provider) -> CapabilitySet {
    if let Some(declared) = provider.declared_capabilities() {
        return declared.clone();
    }

    let mut set = CapabilitySet::new();

    if provider.as_reader().is_some() {
        set.insert(Capability::Read);
    }
    if provider.as_lister().is_some() {
        set.insert(Capability::List);
    }
    if provider.as_attachment_downloader().is_some() {
        set.insert(Capability::DownloadAttachment);
    }
    if provider.as_comment_fetcher().is_some() {
        set.insert(Capability::FetchComments);
    }
    if provider.as_commenter().is_some() {
        set.insert(Capability::Comment);
    }
    if provider.as_status_updater().is_some() {
        set.insert(Capability::UpdateStatus);
    }
    if provider.as_label_manager().is_some() {
        set.insert(Capability::ManageLabels);
    }
    if provider.as_snapshotter().is_some() {
        set.insert(Capability::Snapshot);
    }
    if provider.as_pr_creator().is_some() {
        set.insert(Capability::CreatePr);
    }
    if provider.as_branch_linker().is_some() {
        set.insert(Capability::LinkBranch);
    }
    if provider.as_work_unit_creator().is_some() {
        set.insert(Capability::CreateWorkUnit);
    }
    if provider.as_subtask_fetcher().is_some() {
        set.insert(Capability::FetchSubtasks);
    }

    set
}
