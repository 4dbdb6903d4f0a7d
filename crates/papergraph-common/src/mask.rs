//! Credential masking.
//!
//! The backend never returns a stored API key in clear: it shows the first and
//! last four characters and replaces the rest with `*`. A value that still
//! contains the redaction character is therefore never a usable key.

pub const MASK_CHAR: char = '*';

/// Mask a secret the way the backend displays it.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}{}", head, MASK_CHAR.to_string().repeat(chars.len() - 8), tail)
    } else {
        MASK_CHAR.to_string().repeat(chars.len())
    }
}

pub fn is_masked(value: &str) -> bool {
    value.contains(MASK_CHAR)
}

/// Decide whether the key typed into the settings form must be sent.
///
/// Returns `None` when the form still shows the untouched masked value that was
/// loaded from the backend.
pub fn credential_for_update(current: &str, original: &str) -> Option<String> {
    if !is_masked(current) || current != original {
        Some(current.to_string())
    } else {
        None
    }
}
