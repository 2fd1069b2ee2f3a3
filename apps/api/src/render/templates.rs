//! Template Store: maps template identifiers to `.tex` files in the template directory.
//!
//! Templates are read from disk on every render; there is no cache.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::render::error::RenderError;

const TEMPLATE_EXTENSION: &str = "tex";
const MAX_TEMPLATE_ID_LEN: usize = 64;

/// A template file resolved from its identifier.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    pub id: String,
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TemplateDescriptor {
    pub id: String,
    pub is_default: bool,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    template_dir: PathBuf,
    default_id: String,
}

impl TemplateStore {
    pub fn new(template_dir: impl Into<PathBuf>, default_id: impl Into<String>) -> Self {
        Self {
            template_dir: template_dir.into(),
            default_id: default_id.into(),
        }
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Resolves an identifier to its template file, falling back to the default
    /// when the identifier is unset or blank. Unknown identifiers are an error.
    pub async fn resolve(&self, template_id: Option<&str>) -> Result<TemplateSource, RenderError> {
        let id = self.effective_id(template_id);
        if !is_valid_template_id(id) {
            return Err(RenderError::TemplateNotFound {
                template_id: id.to_string(),
            });
        }

        let path = self.path_for(id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                debug!("Resolved template '{id}' from {}", path.display());
                Ok(TemplateSource {
                    id: id.to_string(),
                    path,
                    content,
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RenderError::TemplateNotFound {
                template_id: id.to_string(),
            }),
            Err(e) => Err(RenderError::TemplateRead {
                template_id: id.to_string(),
                source: e,
            }),
        }
    }

    /// Lists every `.tex` file in the template directory, sorted by identifier.
    pub async fn list(&self) -> Result<Vec<TemplateDescriptor>, RenderError> {
        let mut entries = tokio::fs::read_dir(&self.template_dir)
            .await
            .map_err(RenderError::Workspace)?;

        let mut descriptors = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(RenderError::Workspace)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_template_id(id) {
                continue;
            }
            descriptors.push(TemplateDescriptor {
                id: id.to_string(),
                is_default: id == self.default_id,
            });
        }
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(descriptors)
    }

    fn effective_id<'a>(&'a self, template_id: Option<&'a str>) -> &'a str {
        match template_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => &self.default_id,
        }
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.template_dir
            .join(Path::new(id).with_extension(TEMPLATE_EXTENSION))
    }
}

/// Identifiers are bare file stems: lowercase ASCII, digits, `-` and `_`.
/// Anything else (path separators, dots) can never name a template.
pub fn is_valid_template_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_TEMPLATE_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}
