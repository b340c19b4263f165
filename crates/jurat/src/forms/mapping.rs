use std::collections::BTreeMap;

use super::n400::N400;
use super::normalizer::normalize_value;
use super::record::{ApplicantRecord, Attribute};

/// One attribute projected onto every field that displays it.
#[derive(Debug, Clone, Copy)]
pub struct FieldBinding {
    pub attribute: Attribute,
    pub targets: &'static [&'static str],
}

/// Static field table for one template revision. Targets are fully
/// qualified AcroForm names and only valid for the revision they were read
/// from.
#[derive(Debug)]
pub struct FormTable {
    pub form_id: &'static str,
    pub revision: u16,
    pub bindings: &'static [FieldBinding],
}

impl FormTable {
    pub fn targets(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.bindings
            .iter()
            .flat_map(|binding| binding.targets.iter().copied())
    }

    pub fn binding(&self, attribute: Attribute) -> Option<&FieldBinding> {
        self.bindings
            .iter()
            .find(|binding| binding.attribute == attribute)
    }

    /// Suggested download name for a filled copy.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.form_id)
    }
}

/// Registry of the form tables this deployment can fill.
#[derive(Debug, Clone)]
pub struct FormCatalog {
    tables: Vec<&'static FormTable>,
}

impl FormCatalog {
    pub fn new(tables: Vec<&'static FormTable>) -> Self {
        Self { tables }
    }

    pub fn standard() -> Self {
        Self::new(vec![&N400])
    }

    /// Case-insensitive lookup so `/fill/n-400` reaches the `N-400` table.
    pub fn resolve(&self, form_id: &str) -> Option<&'static FormTable> {
        let wanted = form_id.trim();
        self.tables
            .iter()
            .copied()
            .find(|table| table.form_id.eq_ignore_ascii_case(wanted))
    }

    pub fn tables(&self) -> &[&'static FormTable] {
        &self.tables
    }
}

impl Default for FormCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Complete set of values written in one fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<String, String>);

impl FieldMap {
    pub fn get(&self, target: &str) -> Option<&str> {
        self.0.get(target).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Projects applicant records onto a single form table.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapper {
    table: &'static FormTable,
}

impl FieldMapper {
    pub fn new(table: &'static FormTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'static FormTable {
        self.table
    }

    /// Every target in the table receives a value; absent attributes write
    /// the empty string so template defaults are always overwritten.
    pub fn map(&self, record: &ApplicantRecord) -> FieldMap {
        let mut fields = BTreeMap::new();
        for binding in self.table.bindings {
            let value = normalize_value(record.get(binding.attribute));
            for target in binding.targets {
                fields.insert((*target).to_string(), value.clone());
            }
        }
        FieldMap(fields)
    }
}
