use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

/// Source of unfilled template bytes, keyed by form identifier.
pub trait TemplateStore: Send + Sync {
    fn load(&self, form_id: &str) -> Result<Arc<[u8]>, TemplateError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("no template registered for form '{form_id}'")]
    NotFound { form_id: String },
    #[error("template for form '{form_id}' could not be read from {}", path.display())]
    Unreadable {
        form_id: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Reads `<root>/<FORM_ID>.pdf` once and keeps the bytes for the life of the
/// process; templates never change at runtime.
#[derive(Debug)]
pub struct DirectoryTemplateStore {
    root: PathBuf,
    cache: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl DirectoryTemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, form_id: &str) -> PathBuf {
        self.root.join(format!("{form_id}.pdf"))
    }

    fn cached(&self, form_id: &str) -> Option<Arc<[u8]>> {
        let guard = self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.get(form_id).cloned()
    }
}

impl TemplateStore for DirectoryTemplateStore {
    fn load(&self, form_id: &str) -> Result<Arc<[u8]>, TemplateError> {
        if let Some(bytes) = self.cached(form_id) {
            return Ok(bytes);
        }

        // Identifiers come from the catalog, but never let one escape the root.
        if form_id.is_empty() || form_id.contains(['/', '\\']) || form_id.contains("..") {
            return Err(TemplateError::NotFound {
                form_id: form_id.to_string(),
            });
        }

        let path = self.path_for(form_id);
        let bytes: Arc<[u8]> = match std::fs::read(&path) {
            Ok(bytes) => bytes.into(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(TemplateError::NotFound {
                    form_id: form_id.to_string(),
                })
            }
            Err(source) => {
                return Err(TemplateError::Unreadable {
                    form_id: form_id.to_string(),
                    path,
                    source,
                })
            }
        };
        debug!(form_id, path = %path.display(), size = bytes.len(), "template loaded");

        let mut guard = self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        let entry = guard.entry(form_id.to_string()).or_insert(bytes);
        Ok(entry.clone())
    }
}

/// Templates registered up front, for tests and embedded deployments.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTemplateStore {
    templates: HashMap<String, Arc<[u8]>>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, form_id: &str, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.templates.insert(form_id.to_string(), bytes.into());
        self
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn load(&self, form_id: &str) -> Result<Arc<[u8]>, TemplateError> {
        self.templates
            .get(form_id)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                form_id: form_id.to_string(),
            })
    }
}
