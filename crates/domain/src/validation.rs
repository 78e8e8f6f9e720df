// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;

/// Maximum territory name length in characters.
pub const MAX_TERRITORY_NAME_LEN: usize = 120;

/// Maximum display name length in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 100;

/// Maximum length of report or permanent notes in characters.
pub const MAX_NOTES_LEN: usize = 2000;

/// File extensions accepted for uploaded maps.
pub const MAP_FILE_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "webp", "gif"];

/// Name used when neither a display name nor an email local part is usable.
pub const FALLBACK_DISPLAY_NAME: &str = "Publisher";

/// Validates a territory name.
///
/// # Arguments
///
/// * `name` - The proposed name
///
/// # Errors
///
/// Returns an error if:
/// - The name is empty after trimming
/// - The name is longer than 120 characters
pub fn validate_territory_name(name: &str) -> Result<(), DomainError> {
    let trimmed: &str = name.trim();

    // Rule: name must not be empty
    if trimmed.is_empty() {
        return Err(DomainError::InvalidTerritoryName(String::from(
            "Name cannot be empty",
        )));
    }

    if trimmed.chars().count() > MAX_TERRITORY_NAME_LEN {
        return Err(DomainError::InvalidTerritoryName(format!(
            "Name cannot exceed {MAX_TERRITORY_NAME_LEN} characters"
        )));
    }

    Ok(())
}

/// Validates an external map link.
///
/// Absolute HTTP(S) URLs and server-relative paths are accepted.
///
/// # Errors
///
/// Returns `DomainError::InvalidMap` if the link is empty, contains
/// whitespace, or uses another scheme.
pub fn validate_map_link(link: &str) -> Result<(), DomainError> {
    let trimmed: &str = link.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidMap(String::from(
            "Map link cannot be empty",
        )));
    }

    if trimmed.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidMap(String::from(
            "Map link cannot contain whitespace",
        )));
    }

    let accepted: bool = trimmed.starts_with("https://")
        || trimmed.starts_with("http://")
        || trimmed.starts_with('/');
    if !accepted {
        return Err(DomainError::InvalidMap(format!(
            "Map link must start with http://, https:// or /, got '{trimmed}'"
        )));
    }

    Ok(())
}

/// Validates the original file name of an uploaded map.
///
/// # Errors
///
/// Returns `DomainError::InvalidMap` if the name is empty or the extension is
/// not one of pdf, png, jpg, jpeg, webp, or gif.
pub fn validate_map_file_name(file_name: &str) -> Result<(), DomainError> {
    let trimmed: &str = file_name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidMap(String::from(
            "File name cannot be empty",
        )));
    }

    let extension: Option<String> = trimmed
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if MAP_FILE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => Err(DomainError::InvalidMap(format!(
            "Unsupported map file '{trimmed}', expected one of: {}",
            MAP_FILE_EXTENSIONS.join(", ")
        ))),
    }
}

/// Validates a user's display name.
///
/// # Errors
///
/// Returns `DomainError::InvalidDisplayName` if the name is blank or longer
/// than 100 characters.
pub fn validate_display_name(name: &str) -> Result<(), DomainError> {
    let trimmed: &str = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDisplayName(String::from(
            "Name cannot be empty",
        )));
    }
    if trimmed.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(DomainError::InvalidDisplayName(format!(
            "Name cannot exceed {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates the shape of an email address.
///
/// # Errors
///
/// Returns `DomainError::InvalidEmail` unless the address has exactly one `@`
/// with non-empty text on both sides and no whitespace.
pub fn validate_email(email: &str) -> Result<(), DomainError> {
    let trimmed: &str = email.trim();

    if trimmed.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidEmail(String::from(
            "Email cannot contain whitespace",
        )));
    }

    let mut parts = trimmed.split('@');
    let local: &str = parts.next().unwrap_or_default();
    let domain: Option<&str> = parts.next();
    let extra: Option<&str> = parts.next();

    match (domain, extra) {
        (Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DomainError::InvalidEmail(format!(
            "'{trimmed}' is not a valid email address"
        ))),
    }
}

/// Validates free-text notes.
///
/// # Errors
///
/// Returns `DomainError::InvalidNotes` if the notes exceed 2000 characters.
pub fn validate_notes(notes: &str) -> Result<(), DomainError> {
    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(DomainError::InvalidNotes(format!(
            "Notes cannot exceed {MAX_NOTES_LEN} characters"
        )));
    }
    Ok(())
}

/// Picks the name shown for an account.
///
/// Uses the trimmed `name` when present, otherwise the local part of the
/// email address, otherwise a generic label.
#[must_use]
pub fn display_name_fallback(name: Option<&str>, email: &str) -> String {
    if let Some(given) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return given.to_string();
    }

    let local: &str = email.trim().split('@').next().unwrap_or_default();
    if local.is_empty() {
        String::from(FALLBACK_DISPLAY_NAME)
    } else {
        local.to_string()
    }
}

/// Normalizes an email address for storage and lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
