use std::sync::Arc;

use mime::Mime;
use tracing::{info, warn};

use super::engine::FormFillEngine;
use super::error::FormFillError;
use super::mapping::{FieldMapper, FormCatalog};
use super::record::{ApplicantRecord, PayloadError};
use super::template::TemplateStore;

/// What to do with body keys that no attribute recognizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFieldPolicy {
    /// Log and continue; unmatched keys never reach the form.
    #[default]
    Ignore,
    /// Fail the request with `InvalidPayload`.
    Reject,
}

impl UnknownFieldPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// A filled form ready to hand back to the caller.
#[derive(Debug, Clone)]
pub struct FilledDocument {
    pub bytes: Vec<u8>,
    pub media_type: Mime,
    pub filename: String,
}

/// Orchestrates one fill request: resolve the form, parse the record, map it
/// onto the form's table, and run the engine.
pub struct FormFillService<S> {
    catalog: FormCatalog,
    engine: FormFillEngine<S>,
    unknown_fields: UnknownFieldPolicy,
}

impl<S> FormFillService<S>
where
    S: TemplateStore + 'static,
{
    pub fn new(catalog: FormCatalog, store: Arc<S>, unknown_fields: UnknownFieldPolicy) -> Self {
        Self {
            catalog,
            engine: FormFillEngine::new(store),
            unknown_fields,
        }
    }

    pub fn catalog(&self) -> &FormCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &FormFillEngine<S> {
        &self.engine
    }

    pub fn handle(&self, form: &str, body: &[u8]) -> Result<FilledDocument, FormFillError> {
        let table = self
            .catalog
            .resolve(form)
            .ok_or_else(|| FormFillError::TemplateNotFound {
                form_id: form.to_string(),
            })?;

        let record = ApplicantRecord::from_body(body)?;
        let unknown = record.unknown_keys();
        if !unknown.is_empty() {
            match self.unknown_fields {
                UnknownFieldPolicy::Ignore => {
                    warn!(form_id = table.form_id, ignored = ?unknown, "unrecognized attributes ignored");
                }
                UnknownFieldPolicy::Reject => {
                    return Err(PayloadError::UnknownAttributes(unknown).into());
                }
            }
        }

        let fields = FieldMapper::new(table).map(&record.with_derived_attributes());
        let bytes = self.engine.fill(table.form_id, &fields)?;

        info!(
            form_id = table.form_id,
            revision = table.revision,
            fields = fields.len(),
            size = bytes.len(),
            "form filled"
        );

        Ok(FilledDocument {
            bytes,
            media_type: mime::APPLICATION_PDF,
            filename: table.file_name(),
        })
    }
}
