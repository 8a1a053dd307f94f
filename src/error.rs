//! Error types with fix suggestions
//!
//! Error code ranges:
//! - BIND-000-009: Pattern format errors
//! - BIND-010-019: Storage naming rule violations
//! - BIND-020-029: Parameter substitution errors
//! - BIND-030-039: Argument binding errors
//! - BIND-040-049: Configuration errors

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BindingError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Which half of a resource path a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Container,
    Item,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Container => f.write_str("container"),
            NameKind::Item => f.write_str("item"),
        }
    }
}

/// All error variants are part of the public API.
#[derive(Error, Debug)]
pub enum BindingError {
    // ─────────────────────────────────────────────────────────────
    // Pattern format errors (BIND-000 to BIND-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-001] Invalid path pattern '{pattern}': {reason}")]
    Format { pattern: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Naming rule errors (BIND-010 to BIND-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-010] Invalid {kind} name '{name}': {reason}")]
    NamingViolation {
        kind: NameKind,
        name: String,
        reason: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Substitution errors (BIND-020 to BIND-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-020] No value for parameter '{parameter}' in pattern '{pattern}'")]
    MissingParameter { parameter: String, pattern: String },

    // ─────────────────────────────────────────────────────────────
    // Argument binding errors (BIND-030 to BIND-039)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-030] No argument binding supports parameter '{parameter}' of type {type_name}")]
    UnsupportedType {
        parameter: String,
        type_name: String,
    },

    #[error("[BIND-031] Cannot convert payload for parameter '{parameter}': {source}")]
    BindingConversion {
        parameter: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("[BIND-032] Parameter '{parameter}' holds {actual}, not {expected}")]
    ArgumentTypeMismatch {
        parameter: String,
        expected: String,
        actual: String,
    },

    // ─────────────────────────────────────────────────────────────
    // Configuration errors (BIND-040 to BIND-049)
    // ─────────────────────────────────────────────────────────────
    #[error("[BIND-040] Invalid configuration: {reason}")]
    Config { reason: String },

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BindingError {
    /// Shorthand for a conversion failure with an underlying cause
    pub fn conversion(
        parameter: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        BindingError::BindingConversion {
            parameter: parameter.into(),
            source: source.into(),
        }
    }

    /// Stable error code, e.g. `BIND-010`
    pub fn code(&self) -> &'static str {
        match self {
            BindingError::Format { .. } => "BIND-001",
            BindingError::NamingViolation { .. } => "BIND-010",
            BindingError::MissingParameter { .. } => "BIND-020",
            BindingError::UnsupportedType { .. } => "BIND-030",
            BindingError::BindingConversion { .. } => "BIND-031",
            BindingError::ArgumentTypeMismatch { .. } => "BIND-032",
            BindingError::Config { .. } => "BIND-040",
            BindingError::YamlParse(_) => "BIND-041",
            BindingError::Io(_) => "BIND-042",
        }
    }

    /// Errors that reject a declaration outright when raised during registration.
    ///
    /// `MissingParameter`, `BindingConversion` and `ArgumentTypeMismatch` only ever
    /// happen per invocation. `Format` and `NamingViolation` can occur in both phases;
    /// when they come out of `bind` they fail only that invocation.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            BindingError::Format { .. }
                | BindingError::NamingViolation { .. }
                | BindingError::UnsupportedType { .. }
                | BindingError::Config { .. }
                | BindingError::YamlParse(_)
                | BindingError::Io(_)
        )
    }
}

impl FixSuggestion for BindingError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            BindingError::Format { .. } => {
                Some("Use 'container/item', a storage URL, or a URL template with exactly one {parameter}")
            }
            BindingError::NamingViolation {
                kind: NameKind::Container,
                ..
            } => Some("Container names use 3-63 lowercase letters, digits and single hyphens"),
            BindingError::NamingViolation {
                kind: NameKind::Item,
                ..
            } => Some("Item names are 1-1024 characters and must not end with '.' or '/'"),
            BindingError::MissingParameter { .. } => {
                Some("Supply a value for every {parameter} in the pattern")
            }
            BindingError::UnsupportedType { .. } => Some(
                "Declare the parameter as QueueMessage, Vec<u8>, String, serde_json::Value, or a serde type",
            ),
            BindingError::BindingConversion { .. } => {
                Some("Check the payload encoding matches the parameter type")
            }
            BindingError::ArgumentTypeMismatch { .. } => {
                Some("Downcast to the type the parameter was declared with")
            }
            BindingError::Config { .. } => Some("Check the bindery config file"),
            BindingError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            BindingError::Io(_) => Some("Check file path and permissions"),
        }
    }
}
