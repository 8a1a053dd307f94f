//! Storage naming rules for container and item names
//!
//! Container names:
//! - 3 to 63 characters
//! - Lowercase letters, digits and hyphens only
//! - Start and end with a letter or digit
//! - No consecutive hyphens
//! - Exception: the reserved names `$root` and `$logs`
//!
//! Item names:
//! - 1 to 1024 characters, not whitespace-only
//! - Must not end with `.` or `/`
//! - At most 254 `/`-separated segments
//! - No control characters
//!
//! Manual byte/char checks, no regex: these run on every bind.

use crate::error::{BindingError, NameKind, Result};

pub const CONTAINER_NAME_MIN_LEN: usize = 3;
pub const CONTAINER_NAME_MAX_LEN: usize = 63;
pub const ITEM_NAME_MIN_LEN: usize = 1;
pub const ITEM_NAME_MAX_LEN: usize = 1024;
pub const ITEM_NAME_MAX_SEGMENTS: usize = 254;

/// Reserved container names accepted despite the `$`
pub const RESERVED_CONTAINER_NAMES: &[&str] = &["$root", "$logs"];

/// Validate a container-like name
pub fn validate_container_name(name: &str) -> Result<()> {
    if RESERVED_CONTAINER_NAMES.contains(&name) {
        return Ok(());
    }

    let bytes = name.as_bytes();

    if bytes.len() < CONTAINER_NAME_MIN_LEN || bytes.len() > CONTAINER_NAME_MAX_LEN {
        return Err(container_error(
            name,
            format!(
                "must be between {} and {} characters long",
                CONTAINER_NAME_MIN_LEN, CONTAINER_NAME_MAX_LEN
            ),
        ));
    }

    if !bytes
        .iter()
        .all(|&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(container_error(
            name,
            "may contain only lowercase letters, digits and hyphens".into(),
        ));
    }

    if bytes[0] == b'-' || bytes[bytes.len() - 1] == b'-' {
        return Err(container_error(
            name,
            "must start and end with a letter or digit".into(),
        ));
    }

    if bytes.windows(2).any(|pair| pair == b"--") {
        return Err(container_error(
            name,
            "must not contain consecutive hyphens".into(),
        ));
    }

    Ok(())
}

/// Validate an item-like name
pub fn validate_item_name(name: &str) -> Result<()> {
    let len = name.chars().count();

    if len < ITEM_NAME_MIN_LEN || len > ITEM_NAME_MAX_LEN {
        return Err(item_error(
            name,
            format!(
                "must be between {} and {} characters long",
                ITEM_NAME_MIN_LEN, ITEM_NAME_MAX_LEN
            ),
        ));
    }

    if name.trim().is_empty() {
        return Err(item_error(name, "must not be whitespace only".into()));
    }

    if name.ends_with('.') || name.ends_with('/') {
        return Err(item_error(name, "must not end with '.' or '/'".into()));
    }

    if name.split('/').count() > ITEM_NAME_MAX_SEGMENTS {
        return Err(item_error(
            name,
            format!("must not have more than {} path segments", ITEM_NAME_MAX_SEGMENTS),
        ));
    }

    if name.chars().any(char::is_control) {
        return Err(item_error(name, "must not contain control characters".into()));
    }

    Ok(())
}

fn container_error(name: &str, reason: String) -> BindingError {
    BindingError::NamingViolation {
        kind: NameKind::Container,
        name: name.to_string(),
        reason,
    }
}

fn item_error(name: &str, reason: String) -> BindingError {
    BindingError::NamingViolation {
        kind: NameKind::Item,
        name: name.to_string(),
        reason,
    }
}
