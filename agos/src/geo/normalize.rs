//! Location string normalization
//!
//! Cleans raw SMS text before cache lookup and geocoding: lowercase,
//! punctuation collapsed, administrative filler stripped, barangay
//! variants unified to "brgy".

/// Normalize a raw location string.
pub fn normalize_location(raw: &str) -> String {
    let lowered = raw.to_lowercase();

    // Punctuation to spaces so "Brgy. Lahug, Cebu" splits cleanly
    let cleaned: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();

    let mut text = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(rest) = text.strip_prefix("city of ") {
        text = rest.to_string();
    }
    if let Some(rest) = text.strip_suffix(" city") {
        text = rest.to_string();
    }

    // Unify barangay spellings
    for prefix in ["barangay ", "bgy "] {
        if let Some(rest) = text.strip_prefix(prefix) {
            text = format!("brgy {rest}");
            break;
        }
    }

    text
}
