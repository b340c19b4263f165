use super::acroform::AcroFormError;
use super::record::PayloadError;
use super::template::TemplateError;

/// Failure of a single fill request.
#[derive(Debug, thiserror::Error)]
pub enum FormFillError {
    #[error("no template registered for form '{form_id}'")]
    TemplateNotFound { form_id: String },
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),
    #[error("form engine error: {0}")]
    FormEngine(#[from] AcroFormError),
    #[error("template unavailable: {0}")]
    TemplateUnreadable(#[source] TemplateError),
}

impl FormFillError {
    /// Stable identifier for response bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FormFillError::TemplateNotFound { .. } => "template_not_found",
            FormFillError::InvalidPayload(_) => "invalid_payload",
            FormFillError::FormEngine(_) => "form_engine_error",
            FormFillError::TemplateUnreadable(_) => "template_unreadable",
        }
    }
}

impl From<TemplateError> for FormFillError {
    fn from(value: TemplateError) -> Self {
        match value {
            TemplateError::NotFound { form_id } => Self::TemplateNotFound { form_id },
            other @ TemplateError::Unreadable { .. } => Self::TemplateUnreadable(other),
        }
    }
}
