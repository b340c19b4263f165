use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

/// Applicant attributes recognized by the fill pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    LastName,
    FirstName,
    MiddleName,
    FormattedDateOfBirth,
    FormattedDateBecamePermanentResident,
    AlienNumber,
    UscisAccountNumber,
    CountryOfBirth,
    Citizenship,
    AddressNumber,
    AddressStreet,
    City,
    State,
    ZipCode,
    Country,
    Phone,
    Email,
    Ssn,
}

impl Attribute {
    pub const ALL: [Attribute; 18] = [
        Attribute::LastName,
        Attribute::FirstName,
        Attribute::MiddleName,
        Attribute::FormattedDateOfBirth,
        Attribute::FormattedDateBecamePermanentResident,
        Attribute::AlienNumber,
        Attribute::UscisAccountNumber,
        Attribute::CountryOfBirth,
        Attribute::Citizenship,
        Attribute::AddressNumber,
        Attribute::AddressStreet,
        Attribute::City,
        Attribute::State,
        Attribute::ZipCode,
        Attribute::Country,
        Attribute::Phone,
        Attribute::Email,
        Attribute::Ssn,
    ];

    /// Wire key used in request bodies.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::LastName => "lastName",
            Attribute::FirstName => "firstName",
            Attribute::MiddleName => "middleName",
            Attribute::FormattedDateOfBirth => "formattedDateOfBirth",
            Attribute::FormattedDateBecamePermanentResident => {
                "formattedDateBecamePermanentResident"
            }
            Attribute::AlienNumber => "alienNumber",
            Attribute::UscisAccountNumber => "uscisAccountNumber",
            Attribute::CountryOfBirth => "countryOfBirth",
            Attribute::Citizenship => "citizenship",
            Attribute::AddressNumber => "addressNumber",
            Attribute::AddressStreet => "addressStreet",
            Attribute::City => "city",
            Attribute::State => "state",
            Attribute::ZipCode => "zipCode",
            Attribute::Country => "country",
            Attribute::Phone => "phone",
            Attribute::Email => "email",
            Attribute::Ssn => "ssn",
        }
    }
}

/// Flat applicant record as submitted by the intake client.
///
/// Recognized keys must carry a string or `null`. Raw intake fields
/// (`fullName`, `dateOfBirth`, `address`, ...) are accepted so the canonical attributes
/// can be derived from them; anything else lands in `unknown` so callers can
/// decide whether to ignore or reject it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApplicantRecord {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub formatted_date_of_birth: Option<String>,
    pub formatted_date_became_permanent_resident: Option<String>,
    pub alien_number: Option<String>,
    pub uscis_account_number: Option<String>,
    pub country_of_birth: Option<String>,
    pub citizenship: Option<String>,
    pub address_number: Option<String>,
    pub address_street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub ssn: Option<String>,

    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub date_became_permanent_resident: Option<String>,
    pub address_line1: Option<String>,
    pub address: Option<String>,

    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

/// Request body could not be turned into an [`ApplicantRecord`].
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("body is not a flat JSON object of strings: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unrecognized attributes: {}", .0.join(", "))]
    UnknownAttributes(Vec<String>),
}

impl ApplicantRecord {
    /// Parses a request body. A blank body is an empty record, so callers
    /// can request a form with every mapped field cleared.
    pub fn from_body(body: &[u8]) -> Result<Self, PayloadError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        Ok(serde_json::from_slice(body)?)
    }

    pub fn get(&self, attribute: Attribute) -> Option<&str> {
        let value = match attribute {
            Attribute::LastName => &self.last_name,
            Attribute::FirstName => &self.first_name,
            Attribute::MiddleName => &self.middle_name,
            Attribute::FormattedDateOfBirth => &self.formatted_date_of_birth,
            Attribute::FormattedDateBecamePermanentResident => {
                &self.formatted_date_became_permanent_resident
            }
            Attribute::AlienNumber => &self.alien_number,
            Attribute::UscisAccountNumber => &self.uscis_account_number,
            Attribute::CountryOfBirth => &self.country_of_birth,
            Attribute::Citizenship => &self.citizenship,
            Attribute::AddressNumber => &self.address_number,
            Attribute::AddressStreet => &self.address_street,
            Attribute::City => &self.city,
            Attribute::State => &self.state,
            Attribute::ZipCode => &self.zip_code,
            Attribute::Country => &self.country,
            Attribute::Phone => &self.phone,
            Attribute::Email => &self.email,
            Attribute::Ssn => &self.ssn,
        };
        value.as_deref()
    }

    /// Keys in the body that no attribute or intake field recognizes.
    pub fn unknown_keys(&self) -> Vec<String> {
        self.unknown.keys().cloned().collect()
    }

    /// Fills absent canonical attributes from the raw intake fields. Present
    /// attributes, even blank ones, are never overridden.
    pub fn with_derived_attributes(mut self) -> Self {
        if self.first_name.is_none() && self.last_name.is_none() {
            if let Some(full_name) = self.full_name.as_deref() {
                let (first, middle, last) = split_full_name(full_name);
                self.first_name = first;
                self.last_name = last;
                if self.middle_name.is_none() {
                    self.middle_name = middle;
                }
            }
        }

        if self.formatted_date_of_birth.is_none() {
            self.formatted_date_of_birth = self.date_of_birth.as_deref().map(format_form_date);
        }
        if self.formatted_date_became_permanent_resident.is_none() {
            self.formatted_date_became_permanent_resident = self
                .date_became_permanent_resident
                .as_deref()
                .map(format_form_date);
        }

        if self.address_line1.is_none() {
            if let Some(address) = self.address.as_deref() {
                let parts = split_postal_address(address);
                self.address_line1 = parts.line1;
                self.city = self.city.take().or(parts.city);
                self.state = self.state.take().or(parts.state);
                self.zip_code = self.zip_code.take().or(parts.zip_code);
                self.country = self.country.take().or(parts.country);
            }
        }

        if self.address_number.is_none() && self.address_street.is_none() {
            if let Some(line) = self.address_line1.as_deref() {
                let (number, street) = split_street_address(line);
                self.address_number = number;
                self.address_street = Some(street);
            }
        }

        self
    }
}

fn split_full_name(full_name: &str) -> (Option<String>, Option<String>, Option<String>) {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.as_slice() {
        [] => (None, None, None),
        [first] => (Some(first.to_string()), None, None),
        [first, last] => (Some(first.to_string()), None, Some(last.to_string())),
        [first, middle @ .., last] => (
            Some(first.to_string()),
            Some(middle.join(" ")),
            Some(last.to_string()),
        ),
    }
}

/// Forms expect `MM/DD/YYYY`; ISO dates are rewritten, anything else is
/// passed through for the reviewer to correct.
fn format_form_date(raw: &str) -> String {
    let trimmed = raw.trim();
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.format("%m/%d/%Y").to_string(),
        Err(_) => trimmed.to_string(),
    }
}

fn split_street_address(line: &str) -> (Option<String>, String) {
    let trimmed = line.trim();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    if digits > 0 {
        let rest = &trimmed[digits..];
        if rest.starts_with(char::is_whitespace) {
            return (Some(trimmed[..digits].to_string()), rest.trim_start().to_string());
        }
    }
    (None, trimmed.to_string())
}

#[derive(Debug, Default, PartialEq)]
struct PostalAddress {
    line1: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    country: Option<String>,
}

/// Splits a one-line address of the shape `line1, city, STATE ZIP, country`.
/// Missing trailing components stay `None`; components past the country are
/// dropped.
fn split_postal_address(address: &str) -> PostalAddress {
    let mut parts = address
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string);

    let line1 = parts.next();
    let city = parts.next();
    let (state, zip_code) = match parts.next() {
        Some(state_zip) => {
            let mut tokens = state_zip.split_whitespace().map(str::to_string);
            (tokens.next(), tokens.next())
        }
        None => (None, None),
    };
    let country = parts.next();

    PostalAddress {
        line1,
        city,
        state,
        zip_code,
        country,
    }
}
