//! Parsing of comma-separated runtime version lists.

/// Parse a comma-separated version list, padding each entry to three
/// dot-separated components (`18` -> `18.0.0`, `20.1` -> `20.1.0`).
///
/// Returns `None` for absent or empty input so callers fall back to their
/// default list. Entries are not validated.
pub fn parse_version_list(input: Option<&str>) -> Option<Vec<String>> {
    let input = input?;
    if input.is_empty() {
        return None;
    }
    Some(input.split(',').map(normalize_version).collect())
}

/// Pad a single version to three components.
pub fn normalize_version(version: &str) -> String {
    let parts = version.split('.').count();
    if parts < 3 {
        format!("{}{}", version, ".0".repeat(3 - parts))
    } else {
        version.to_string()
    }
}
