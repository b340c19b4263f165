use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::acroform::AcroForm;
use super::error::FormFillError;
use super::mapping::{FieldMap, FormTable};
use super::template::TemplateStore;

/// Applies field maps to templates through the AcroForm adapter.
pub struct FormFillEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for FormFillEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S> FormFillEngine<S>
where
    S: TemplateStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Writes every entry of `fields` into a private copy of the template and
    /// returns the serialized, still-editable document. Fields of the
    /// template that are not in the map keep their template state.
    pub fn fill(&self, form_id: &str, fields: &FieldMap) -> Result<Vec<u8>, FormFillError> {
        let template = self.store.load(form_id)?;
        let mut form = AcroForm::open(&template)?;
        for (name, value) in fields.iter() {
            form.set_text(name, value)?;
        }
        let bytes = form.save()?;
        debug!(form_id, fields = fields.len(), size = bytes.len(), "template filled");
        Ok(bytes)
    }

    /// Targets declared by `table` that its template does not contain. A
    /// non-empty result means the table belongs to a different revision.
    pub fn missing_targets(&self, table: &FormTable) -> Result<Vec<&'static str>, FormFillError> {
        let template = self.store.load(table.form_id)?;
        let form = AcroForm::open(&template)?;
        Ok(table
            .targets()
            .filter(|target| !form.has_field(target))
            .collect())
    }
}

/// Reads every text field of a filled document.
pub fn read_back(document: &[u8]) -> Result<BTreeMap<String, String>, FormFillError> {
    Ok(AcroForm::open(document)?.values()?)
}
