//! Loads configuration documents from a file or a directory tree.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::value::StructuredValue;
use crate::error::LoadError;

/// Source of the desired configuration document.
pub trait DocumentLoader: Send + Sync {
    /// Loads the document found at `path`.
    fn load(&self, path: &Path) -> Result<StructuredValue, LoadError>;
}

/// Supported on-disk document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Some(DocumentFormat::Yaml),
            Some("json") => Some(DocumentFormat::Json),
            _ => None,
        }
    }
}

/// Filesystem loader for YAML and JSON documents.
///
/// A file is parsed on its own. A directory is walked recursively and
/// assembled into one mapping: every subdirectory becomes a nested mapping
/// and every supported file is placed under its file stem, so
/// `config/db/primary.yaml` contributes to `db.primary`.
#[derive(Debug, Clone, Default)]
pub struct FsDocumentLoader;

impl FsDocumentLoader {
    pub fn new() -> Self {
        Self
    }

    /// Parses a single document file.
    pub fn load_file(&self, path: &Path) -> Result<StructuredValue, LoadError> {
        let format = DocumentFormat::from_path(path)
            .ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

        let content = fs::read_to_string(path).map_err(|e| LoadError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        parse_document(&content, format, path)
    }

    fn load_directory(&self, root: &Path) -> Result<StructuredValue, LoadError> {
        let mut document = StructuredValue::Mapping(Vec::new());
        let mut loaded = 0usize;

        for entry in WalkDir::new(root)
            .follow_links(true)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| LoadError::ReadDirectory {
                path: root.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = path.strip_prefix(root).unwrap_or(path);
            if has_hidden_component(relative) {
                continue;
            }

            if DocumentFormat::from_path(path).is_none() {
                log::debug!("Skipping unsupported file {}", path.display());
                continue;
            }

            let segments = document_segments(relative);
            if segments.is_empty() {
                continue;
            }

            let value = self.load_file(path)?;
            let mut nested = value;
            for segment in segments.into_iter().rev() {
                nested = StructuredValue::Mapping(vec![(segment, nested)]);
            }
            document.merge(nested);
            loaded += 1;
        }

        log::debug!("Loaded {} documents from {}", loaded, root.display());
        Ok(document)
    }
}

impl DocumentLoader for FsDocumentLoader {
    fn load(&self, path: &Path) -> Result<StructuredValue, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        if path.is_dir() {
            self.load_directory(path)
        } else {
            self.load_file(path)
        }
    }
}

fn parse_document(
    content: &str,
    format: DocumentFormat,
    path: &Path,
) -> Result<StructuredValue, LoadError> {
    match format {
        DocumentFormat::Yaml => {
            StructuredValue::from_yaml_str(content).map_err(|e| LoadError::ParseYaml {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
        DocumentFormat::Json => {
            StructuredValue::from_json_str(content).map_err(|e| LoadError::ParseJson {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        }
    }
}

fn has_hidden_component(relative: &Path) -> bool {
    relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s.starts_with('.'))
            .unwrap_or(false)
    })
}

/// Directory names followed by the file stem.
fn document_segments(relative: &Path) -> Vec<String> {
    let mut segments: Vec<String> = relative
        .parent()
        .map(|parent| {
            parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    match relative.file_stem() {
        Some(stem) => segments.push(stem.to_string_lossy().into_owned()),
        None => return Vec::new(),
    }
    segments
}
