//! Applicant-record to filled-form pipeline.
//!
//! [`FieldMapper`] turns a record into a [`FieldMap`] using a static
//! [`FormTable`]; [`FormFillEngine`] writes that map into the template served
//! by a [`TemplateStore`]; [`FormFillService`] ties both to a request body.

pub mod acroform;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod n400;
pub mod normalizer;
pub mod record;
pub mod router;
pub mod service;
pub mod template;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

#[cfg(test)]
mod tests;

pub use acroform::{AcroForm, AcroFormError};
pub use engine::{read_back, FormFillEngine};
pub use error::FormFillError;
pub use mapping::{FieldBinding, FieldMap, FieldMapper, FormCatalog, FormTable};
pub use n400::N400;
pub use normalizer::normalize_value;
pub use record::{ApplicantRecord, Attribute, PayloadError};
pub use router::form_router;
pub use service::{FilledDocument, FormFillService, UnknownFieldPolicy};
pub use template::{DirectoryTemplateStore, InMemoryTemplateStore, TemplateError, TemplateStore};
