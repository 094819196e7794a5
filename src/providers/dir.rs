//! Directory-of-tasks backend.
//!
//! A reference like `dir:sprints/current` names a directory. The directory
//! itself resolves to one work unit described by its README (or TASK.md /
//! index.md); every other markdown file inside is a subtask and shows up in
//! listings.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::{
    Capability, Config, ListOptions, Priority, ProviderDescriptor, Snapshot, SnapshotFile,
    SnapshotKind, SourceInfo, Status, WorkUnit,
};
use crate::providers::file::parse_markdown;
use crate::providers::provider::{Lister, Provider, ProviderFactory, Reader, Snapshotter};
use crate::refspec::ParseError;

pub const PROVIDER_NAME: &str = "directory";

/// README candidates, in order of preference.
const README_CANDIDATES: &[&str] = &[
    "README.md",
    "readme.md",
    "Readme.md",
    "TASK.md",
    "task.md",
    "index.md",
];

/// Files that describe the directory itself, not a subtask.
const SKIP_FILES: &[&str] = &["readme.md", "task.md", "index.md"];

pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "Local directory task source")
        .with_schemes(["dir"])
        .with_capabilities(
            [Capability::Read, Capability::List, Capability::Snapshot]
                .into_iter()
                .collect(),
        )
        .with_priority(15)
}

/// Backend for a directory of markdown tasks.
pub struct DirProvider {
    descriptor: ProviderDescriptor,
    base_path: PathBuf,
}

impl DirProvider {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        DirProvider {
            descriptor: descriptor(),
            base_path: base_path.into(),
        }
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    async fn find_readme(&self, dir: &Path) -> Option<(PathBuf, String, String)> {
        for name in README_CANDIDATES {
            let candidate = dir.join(name);
            if let Ok(content) = tokio::fs::read_to_string(&candidate).await {
                let fallback = name.trim_end_matches(".md");
                let parsed = parse_markdown(&content, fallback);
                return Some((candidate, parsed.title, parsed.body));
            }
        }
        None
    }

    async fn subtask_paths(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("read task directory {}", dir.display()))?;

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if SKIP_FILES.contains(&name.as_str()) {
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    async fn fetch_file(&self, path: &Path) -> Result<WorkUnit> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("read task file {}", path.display()))?;

        let filename = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse_markdown(&content, &filename);

        let modified: Option<DateTime<Utc>> = tokio::fs::metadata(path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::from);

        let reference = path.display().to_string();
        Ok(WorkUnit {
            id: format!("{}:{}", PROVIDER_NAME, reference),
            external_id: reference.clone(),
            provider: PROVIDER_NAME.to_string(),
            title: parsed.title,
            description: parsed.body,
            status: Status::Open,
            priority: Priority::Normal,
            created_at: modified,
            updated_at: modified,
            source: SourceInfo {
                provider: PROVIDER_NAME.to_string(),
                reference,
                synced_at: Some(Utc::now()),
            },
            ..WorkUnit::default()
        })
    }
}

impl Provider for DirProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn parse(&self, input: &str) -> Result<String, ParseError> {
        let path = input
            .strip_prefix("dir:")
            .unwrap_or(input)
            .trim()
            .trim_end_matches('/');
        if path.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(self.resolve_path(path).display().to_string())
    }

    fn matches(&self, input: &str) -> bool {
        input.starts_with("dir:")
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        Some(self)
    }
    fn as_lister(&self) -> Option<&dyn Lister> {
        Some(self)
    }
    fn as_snapshotter(&self) -> Option<&dyn Snapshotter> {
        Some(self)
    }
}

#[async_trait]
impl Reader for DirProvider {
    async fn fetch(&self, reference: &str) -> Result<WorkUnit> {
        let dir = Path::new(reference);

        let (readme_path, title, description) = match self.find_readme(dir).await {
            Some((path, title, body)) => (Some(path), title, body),
            None => (None, String::new(), String::new()),
        };

        let title = if title.is_empty() {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| reference.to_string())
        } else {
            title
        };

        let modified: Option<DateTime<Utc>> = tokio::fs::metadata(dir)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
            .map(DateTime::from);

        let mut unit = WorkUnit {
            id: format!("{}:{}", PROVIDER_NAME, reference),
            external_id: reference.to_string(),
            provider: PROVIDER_NAME.to_string(),
            title,
            description,
            status: Status::Open,
            priority: Priority::Normal,
            created_at: modified,
            updated_at: modified,
            source: SourceInfo {
                provider: PROVIDER_NAME.to_string(),
                reference: reference.to_string(),
                synced_at: Some(Utc::now()),
            },
            ..WorkUnit::default()
        };

        if let Some(path) = readme_path {
            unit.metadata.insert(
                "readme_path".to_string(),
                serde_json::Value::String(path.display().to_string()),
            );
        }

        unit.subtasks = self
            .subtask_paths(dir)
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.display().to_string())
            .collect();

        Ok(unit)
    }
}

#[async_trait]
impl Lister for DirProvider {
    async fn list(&self, options: &ListOptions) -> Result<Vec<WorkUnit>> {
        let mut units = Vec::new();

        for path in self.subtask_paths(&self.base_path).await? {
            // Files that fail to parse are skipped, not fatal.
            let Ok(unit) = self.fetch_file(&path).await else {
                continue;
            };

            if let Some(status) = options.status {
                if unit.status != status {
                    continue;
                }
            }
            if !options.labels.is_empty()
                && !options.labels.iter().all(|l| unit.labels.contains(l))
            {
                continue;
            }

            units.push(unit);
        }

        let units: Vec<WorkUnit> = units
            .into_iter()
            .skip(options.offset)
            .take(options.limit.unwrap_or(usize::MAX))
            .collect();

        Ok(units)
    }
}

#[async_trait]
impl Snapshotter for DirProvider {
    async fn snapshot(&self, reference: &str) -> Result<Snapshot> {
        let dir = Path::new(reference);
        let mut files = Vec::new();

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("read task directory {}", dir.display()))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("read {}", path.display()))?;
            files.push(SnapshotFile {
                path: path.display().to_string(),
                content,
            });
        }

        Ok(Snapshot {
            kind: SnapshotKind::Directory,
            reference: reference.to_string(),
            files,
            content: String::new(),
        })
    }
}

/// Factory for [`DirProvider`].
pub struct DirFactory;

#[async_trait]
impl ProviderFactory for DirFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let mut base_path = config.get_string("base_path");
        if base_path.is_empty() {
            base_path = ".".to_string();
        }
        Ok(Arc::new(DirProvider::new(base_path)))
    }
}
