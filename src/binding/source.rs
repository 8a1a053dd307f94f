//! Trigger path source - match concrete blob paths against a trigger pattern
//!
//! The reverse of binding: a blob trigger declared as `input/{name}.txt`
//! fires for `input/report.txt` and contributes `{name: "report"}` (plus
//! `blobTrigger`) to the invocation's binding data.

use std::fmt;

use crate::error::{BindingError, Result};

use super::data::BindingData;
use super::path::ResourcePath;
use super::template::BindingTemplate;
use super::validate::validate_container_name;

/// Parsed blob-trigger pattern: literal container, templated item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerPathSource {
    container: String,
    item: Option<BindingTemplate>,
}

impl TriggerPathSource {
    /// Parse `container[/item-template]`
    ///
    /// The container must be a literal, valid container name: a trigger watches
    /// one container.
    pub fn new(pattern: &str) -> Result<Self> {
        let (container, item) = match pattern.split_once('/') {
            Some((container, "")) => (container, None),
            Some((container, item)) => (container, Some(item)),
            None => (pattern, None),
        };

        let container_template = BindingTemplate::parse(container)?;
        if container_template.has_parameters() {
            return Err(BindingError::Format {
                pattern: pattern.to_string(),
                reason: "trigger container names cannot contain parameters".to_string(),
            });
        }
        validate_container_name(container)?;

        let item = item.map(BindingTemplate::parse).transpose()?;

        Ok(Self {
            container: container.to_string(),
            item,
        })
    }

    pub fn container_name(&self) -> &str {
        &self.container
    }

    /// Parameter names the trigger contributes
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.item.iter().flat_map(|item| item.parameter_names())
    }

    /// Extract parameter values from a concrete path
    ///
    /// Returns `None` when the path lives in another container or does not fit
    /// the item pattern. A container-wide trigger matches every item.
    pub fn match_path(&self, path: &ResourcePath) -> Option<BindingData> {
        if path.container_name() != self.container {
            return None;
        }

        match (&self.item, path.item_name()) {
            (None, _) => Some(BindingData::new()),
            (Some(template), Some(item)) => template.match_values(item),
            (Some(_), None) => None,
        }
    }

    /// Full binding data for a matched path, including `blobTrigger`
    pub fn binding_data(&self, path: &ResourcePath) -> Option<BindingData> {
        self.match_path(path)
            .map(|matched| BindingData::from_blob(path, matched))
    }
}

impl fmt::Display for TriggerPathSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.item {
            Some(item) => write!(f, "{}/{}", self.container, item),
            None => f.write_str(&self.container),
        }
    }
}
