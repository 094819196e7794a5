//! Backend implementations and the provider trait seam.

use std::sync::Arc;

use crate::registry::{Directory, RegistryError};

pub mod azure;
pub mod clickup;
pub mod dir;
pub mod file;
pub mod gitlab;
pub mod jira;
pub mod linear;
pub mod provider;
pub mod token;
pub mod youtrack;

pub use provider::{
    infer_capabilities, AttachmentDownloader, BranchLinker, CommentFetcher, Commenter,
    LabelManager, Lister, PrCreator, Provider, ProviderFactory, Reader, Snapshotter,
    StatusUpdater, SubtaskFetcher, WorkUnitCreator,
};

/// Register every built-in backend on the given directory.
pub fn register_builtins(directory: &Directory) -> Result<(), RegistryError> {
    directory.register(Arc::new(file::FileFactory))?;
    directory.register(Arc::new(dir::DirFactory))?;
    directory.register(Arc::new(gitlab::GitLabFactory))?;
    directory.register(Arc::new(jira::JiraFactory))?;
    directory.register(Arc::new(linear::LinearFactory))?;
    directory.register(Arc::new(clickup::ClickUpFactory))?;
    directory.register(Arc::new(youtrack::YouTrackFactory))?;
    directory.register(Arc::new(azure::AzureFactory))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtins_has_no_scheme_collisions() {
        let dir = Directory::new();
        register_builtins(&dir).unwrap();

        let schemes = dir.schemes();
        assert_eq!(
            schemes,
            vec![
                "azdo", "azure", "clickup", "cu", "dir", "file", "gitlab", "gl", "j", "jira",
                "linear", "ln", "youtrack", "yt"
            ]
        );
    }

    #[test]
    fn test_list_orders_remote_trackers_first() {
        let dir = Directory::new();
        register_builtins(&dir).unwrap();

        let list = dir.list();
        // Remote trackers first (priority 20), then directory (15), then file (10).
        assert_eq!(list.first().map(|d| d.priority), Some(20));
        assert_eq!(list.last().map(|d| d.name.as_str()), Some("file"));
    }
}
