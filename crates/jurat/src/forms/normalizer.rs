/// Canonical form of a field value: surrounding whitespace trimmed, then
/// uppercased. Absent input becomes the empty string so a mapped field is
/// always written.
pub fn normalize_value(value: Option<&str>) -> String {
    match value {
        Some(raw) => raw.trim().to_uppercase(),
        None => String::new(),
    }
}
