//! Field-mapping and form-fill engine for government intake forms.
//!
//! An applicant record is normalized, projected onto the named fields of a
//! specific template revision, and written into a fillable PDF that stays
//! editable after the fill.

pub mod config;
pub mod error;
pub mod forms;
pub mod telemetry;
