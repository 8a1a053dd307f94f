//! Resource path - a fully resolved `container[/item]` location

use std::fmt;

use crate::error::Result;

use super::validate::{validate_container_name, validate_item_name};

/// Concrete, validated storage location
///
/// Built fresh on every bind and owned by the invocation that asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePath {
    container: String,
    item: Option<String>,
}

impl ResourcePath {
    /// Build a path, validating both names
    pub fn new(container: impl Into<String>, item: Option<impl Into<String>>) -> Result<Self> {
        let container = container.into();
        let item = item.map(Into::into);

        validate_container_name(&container)?;
        if let Some(item) = &item {
            validate_item_name(item)?;
        }

        Ok(Self { container, item })
    }

    /// Container-only path
    pub fn container(name: impl Into<String>) -> Result<Self> {
        Self::new(name, None::<String>)
    }

    pub fn container_name(&self) -> &str {
        &self.container
    }

    pub fn item_name(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub fn is_container_only(&self) -> bool {
        self.item.is_none()
    }

    /// Split a `container/item` string on the first separator and validate it
    ///
    /// Used for paths that come from outside (trigger notifications, CLI input).
    pub fn parse(path: &str) -> Result<Self> {
        match path.split_once('/') {
            Some((container, item)) => Self::new(container, Some(item)),
            None => Self::container(path),
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{}/{}", self.container, item),
            None => f.write_str(&self.container),
        }
    }
}
