//! Single markdown file backend.
//!
//! A reference like `file:tasks/login.md` names one markdown file. The
//! file's YAML frontmatter (title, description, priority, labels,
//! assignees) is optional; a missing title falls back to the first `# `
//! heading and then to the filename.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::core::{
    Capability, Config, Person, Priority, ProviderDescriptor, SourceInfo, Status, WorkUnit,
};
use crate::providers::provider::{Provider, ProviderFactory, Reader};
use crate::refspec::ParseError;

pub const PROVIDER_NAME: &str = "file";

/// Metadata advertised before an instance exists.
pub fn descriptor() -> ProviderDescriptor {
    ProviderDescriptor::new(PROVIDER_NAME, "Local markdown file task source")
        .with_schemes(["file"])
        .with_capabilities([Capability::Read].into_iter().collect())
        .with_priority(10)
}

/// YAML frontmatter of a task file.
#[derive(Debug, Default, Deserialize)]
pub struct Frontmatter {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
}

/// Parsed markdown content.
#[derive(Debug, Default)]
pub struct ParsedMarkdown {
    pub frontmatter: Option<Frontmatter>,
    pub title: String,
    pub body: String,
}

/// Parse markdown content into frontmatter, title, and body.
///
/// Title precedence: frontmatter `title`, then the first `# ` heading,
/// then `fallback_title`. The heading scan stops at the first non-empty
/// line that is not a heading.
pub fn parse_markdown(content: &str, fallback_title: &str) -> ParsedMarkdown {
    let mut result = ParsedMarkdown::default();
    let mut content = content;

    if let Some(rest) = content.strip_prefix("---\n") {
        if let Some((raw_fm, after)) = rest.split_once("\n---") {
            // Malformed frontmatter is treated as body text, not an error.
            if let Ok(fm) = serde_yaml::from_str::<Frontmatter>(raw_fm) {
                result.frontmatter = Some(fm);
                content = after.strip_prefix('\n').unwrap_or(after);
            }
        }
    }

    let lines: Vec<&str> = content.lines().collect();
    let mut body_start = 0;
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if let Some(heading) = trimmed.strip_prefix("# ") {
            result.title = heading.to_string();
            body_start = i + 1;
            break;
        }
        if !trimmed.is_empty() && !trimmed.starts_with("---") {
            break;
        }
    }

    if let Some(fm) = &result.frontmatter {
        if !fm.title.is_empty() {
            result.title = fm.title.clone();
        }
    }
    if result.title.is_empty() {
        result.title = fallback_title.to_string();
    }

    result.body = if body_start > 0 && body_start < lines.len() {
        lines[body_start..].join("\n").trim().to_string()
    } else {
        content.trim().to_string()
    };

    result
}

/// Backend for a single markdown file.
pub struct FileProvider {
    descriptor: ProviderDescriptor,
    base_path: PathBuf,
}

impl FileProvider {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        FileProvider {
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
}

impl Provider for FileProvider {
    fn descriptor(&self) -> &ProviderDescriptor {
        &self.descriptor
    }

    fn parse(&self, input: &str) -> Result<String, ParseError> {
        let path = input.strip_prefix("file:").unwrap_or(input).trim();
        if path.is_empty() {
            return Err(ParseError::Empty);
        }
        Ok(self.resolve_path(path).display().to_string())
    }

    fn matches(&self, input: &str) -> bool {
        input.starts_with("file:")
    }

    fn as_reader(&self) -> Option<&dyn Reader> {
        Some(self)
    }
}

#[async_trait]
impl Reader for FileProvider {
    async fn fetch(&self, reference: &str) -> Result<WorkUnit> {
        let path = Path::new(reference);
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

        let mut unit = WorkUnit {
            id: format!("{}:{}", PROVIDER_NAME, reference),
            external_id: reference.to_string(),
            provider: PROVIDER_NAME.to_string(),
            title: parsed.title,
            description: parsed.body,
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

        if let Some(fm) = parsed.frontmatter {
            if !fm.priority.is_empty() {
                unit.priority = Priority::from_name(&fm.priority);
            }
            if !fm.description.is_empty() {
                unit.description = fm.description;
            }
            unit.labels = fm.labels;
            unit.assignees = fm
                .assignees
                .into_iter()
                .map(|name| Person {
                    name,
                    ..Person::default()
                })
                .collect();
        }

        Ok(unit)
    }
}

/// Factory for [`FileProvider`].
pub struct FileFactory;

#[async_trait]
impl ProviderFactory for FileFactory {
    fn descriptor(&self) -> ProviderDescriptor {
        descriptor()
    }

    async fn create(&self, config: &Config) -> Result<Arc<dyn Provider>> {
        let mut base_path = config.get_string("base_path");
        if base_path.is_empty() {
            base_path = ".".to_string();
        }
        Ok(Arc::new(FileProvider::new(base_path)))
    }
}
