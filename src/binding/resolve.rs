//! Path Resolution - pattern string → bindable path
//!
//! Resolution runs once per declaration at registration time. Strategies are
//! tried in order; the first that applies wins:
//!
//! ```text
//! pattern ──► 1. storage URL? ──yes──► rewrite to container/item
//!                     │
//!                     ▼
//!             2. container/item split? ──no──────────────┐
//!                     │ yes                               ▼
//!                     ▼                        4. whole pattern as template
//!             3. any {param}?                     exactly one {param}?
//!               yes → Parameterized                 yes → UrlTemplate
//!               no  → validate → Bound              no  → FormatError
//! ```
//!
//! Bound paths are validated eagerly. Parameterized and URL-templated paths
//! validate on every [`BindablePath::bind`], since names are only known then.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::BindingConfig;
use crate::error::{BindingError, Result};

use super::data::BindingData;
use super::path::ResourcePath;
use super::template::BindingTemplate;
use super::storage_url::{StorageUrlConverter, UrlPathConverter};

/// A resolved pattern, ready to bind per invocation
///
/// Immutable and `Send + Sync`; share it behind an `Arc` across invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindablePath {
    /// Fully literal, already validated
    Bound(ResourcePath),
    /// Container and/or item contain `{parameters}`
    Parameterized(ParameterizedPath),
    /// Opaque URL with a single `{parameter}`
    UrlTemplate(UrlTemplatePath),
}

impl BindablePath {
    /// Names that must be present in the values passed to [`bind`](Self::bind)
    pub fn required_parameter_names(&self) -> BTreeSet<&str> {
        match self {
            BindablePath::Bound(_) => BTreeSet::new(),
            BindablePath::Parameterized(path) => path.parameter_names(),
            BindablePath::UrlTemplate(path) => path.template.parameter_names().collect(),
        }
    }

    /// Produce a concrete path for one invocation
    pub fn bind(&self, values: &BindingData) -> Result<ResourcePath> {
        match self {
            BindablePath::Bound(path) => Ok(path.clone()),
            BindablePath::Parameterized(path) => path.bind(values),
            BindablePath::UrlTemplate(path) => path.bind(values),
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, BindablePath::Bound(_))
    }

    /// Short variant name, for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            BindablePath::Bound(_) => "bound",
            BindablePath::Parameterized(_) => "parameterized",
            BindablePath::UrlTemplate(_) => "url-template",
        }
    }

    /// Container name or pattern; `None` when only the bound URL can tell
    pub fn container_pattern(&self) -> Option<&str> {
        match self {
            BindablePath::Bound(path) => Some(path.container_name()),
            BindablePath::Parameterized(path) => Some(path.container.pattern()),
            BindablePath::UrlTemplate(_) => None,
        }
    }

    /// Item name or pattern, if the path has one
    pub fn item_pattern(&self) -> Option<&str> {
        match self {
            BindablePath::Bound(path) => path.item_name(),
            BindablePath::Parameterized(path) => path.item.as_ref().map(BindingTemplate::pattern),
            BindablePath::UrlTemplate(_) => None,
        }
    }
}

impl fmt::Display for BindablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindablePath::Bound(path) => write!(f, "{}", path),
            BindablePath::Parameterized(path) => match &path.item {
                Some(item) => write!(f, "{}/{}", path.container, item),
                None => write!(f, "{}", path.container),
            },
            BindablePath::UrlTemplate(path) => write!(f, "{}", path.template),
        }
    }
}

/// Container/item templates, validated at bind time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterizedPath {
    container: BindingTemplate,
    item: Option<BindingTemplate>,
}

impl ParameterizedPath {
    pub fn container(&self) -> &BindingTemplate {
        &self.container
    }

    pub fn item(&self) -> Option<&BindingTemplate> {
        self.item.as_ref()
    }

    fn parameter_names(&self) -> BTreeSet<&str> {
        self.container
            .parameter_names()
            .chain(self.item.iter().flat_map(|item| item.parameter_names()))
            .collect()
    }

    fn bind(&self, values: &BindingData) -> Result<ResourcePath> {
        let container = self.container.bind(values)?;
        let item = self
            .item
            .as_ref()
            .map(|template| template.bind(values))
            .transpose()?;
        ResourcePath::new(container, item)
    }
}

/// Single-parameter URL template; decomposed only after binding
#[derive(Clone)]
pub struct UrlTemplatePath {
    template: BindingTemplate,
    container_only: bool,
    converter: Arc<dyn UrlPathConverter>,
}

impl UrlTemplatePath {
    pub fn template(&self) -> &BindingTemplate {
        &self.template
    }

    fn bind(&self, values: &BindingData) -> Result<ResourcePath> {
        let url = self.template.bind(values)?;

        let converted = self
            .converter
            .convert(&url)
            .ok_or_else(|| BindingError::Format {
                pattern: self.template.pattern().to_string(),
                reason: format!("bound value '{}' is not a recognized storage URL", url),
            })?;

        // The bound URL is concrete: its converted form must not hold parameters
        let literal = BindingTemplate::parse(&converted)
            .ok()
            .and_then(|template| template.as_literal())
            .ok_or_else(|| BindingError::Format {
                pattern: self.template.pattern().to_string(),
                reason: format!(
                    "bound value '{}' contains unencoded braces; use %7B and %7D",
                    url
                ),
            })?;

        let path = ResourcePath::parse(&literal)?;
        if self.container_only && !path.is_container_only() {
            return Err(BindingError::Format {
                pattern: self.template.pattern().to_string(),
                reason: format!("'{}' names an item but the binding is container-only", url),
            });
        }
        Ok(path)
    }
}

impl fmt::Debug for UrlTemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UrlTemplatePath")
            .field("template", &self.template)
            .field("container_only", &self.container_only)
            .finish_non_exhaustive()
    }
}

impl PartialEq for UrlTemplatePath {
    fn eq(&self, other: &Self) -> bool {
        self.template == other.template && self.container_only == other.container_only
    }
}

impl Eq for UrlTemplatePath {}

/// Resolves pattern strings into [`BindablePath`]s
///
/// Results are cached per `(pattern, container_only)`, so a pattern shared by
/// several declarations is parsed once. Errors are not cached.
pub struct PathResolver {
    converter: Arc<dyn UrlPathConverter>,
    cache: DashMap<(String, bool), Arc<BindablePath>>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PathResolver {
    /// Resolver using the default storage URL conventions
    pub fn new() -> Self {
        Self::with_converter(StorageUrlConverter::default())
    }

    /// Resolver using the URL conventions from configuration
    pub fn from_config(config: &BindingConfig) -> Self {
        Self::with_converter(StorageUrlConverter::from_config(config))
    }

    /// Resolver with a custom URL-to-path conversion
    pub fn with_converter(converter: impl UrlPathConverter + 'static) -> Self {
        Self {
            converter: Arc::new(converter),
            cache: DashMap::new(),
        }
    }

    /// Resolve a pattern (cached)
    pub fn resolve(&self, pattern: &str, container_only: bool) -> Result<Arc<BindablePath>> {
        let key = (pattern.to_string(), container_only);
        if let Some(cached) = self.cache.get(&key) {
            tracing::trace!(pattern, "path pattern cache hit");
            return Ok(Arc::clone(&cached));
        }

        let path = Arc::new(self.resolve_uncached(pattern, container_only)?);
        self.cache.insert(key, Arc::clone(&path));
        Ok(path)
    }

    /// Resolve a pattern without touching the cache
    pub fn resolve_uncached(&self, pattern: &str, container_only: bool) -> Result<BindablePath> {
        let converted = self
            .converter
            .convert(pattern)
            .filter(|converted| keeps_parameters(pattern, converted));
        let candidate = converted.as_deref().unwrap_or(pattern);

        // An unrecognized URL is never split on its scheme's slashes
        let structural = if converted.is_none() && looks_like_url(pattern) {
            None
        } else {
            split_structural(candidate, container_only)
        };

        let path = match structural {
            Some((container, item)) => self.from_parts(container, item)?,
            None => self.from_url_template(pattern, container_only)?,
        };

        tracing::debug!(
            pattern,
            container_only,
            kind = path.kind(),
            "resolved path pattern"
        );
        Ok(path)
    }

    /// Number of cached resolutions
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn from_parts(&self, container: &str, item: Option<&str>) -> Result<BindablePath> {
        let container = BindingTemplate::parse(container)?;
        let item = item.map(BindingTemplate::parse).transpose()?;

        let parameterized =
            container.has_parameters() || item.as_ref().is_some_and(BindingTemplate::has_parameters);
        if parameterized {
            return Ok(BindablePath::Parameterized(ParameterizedPath { container, item }));
        }

        let container = container.as_literal().unwrap_or_default();
        let item = item.and_then(|template| template.as_literal());
        Ok(BindablePath::Bound(ResourcePath::new(container, item)?))
    }

    fn from_url_template(&self, pattern: &str, container_only: bool) -> Result<BindablePath> {
        let template = BindingTemplate::parse(pattern)?;
        if template.parameter_count() != 1 {
            return Err(BindingError::Format {
                pattern: pattern.to_string(),
                reason: "paths must be 'container/item' or a single-parameter URL template"
                    .to_string(),
            });
        }

        Ok(BindablePath::UrlTemplate(UrlTemplatePath {
            template,
            container_only,
            converter: Arc::clone(&self.converter),
        }))
    }
}

/// Split `container[/item]` on the first separator
///
/// Item bindings need a non-empty container and item. Container bindings take
/// the whole pattern, allowing one trailing separator.
fn split_structural(candidate: &str, container_only: bool) -> Option<(&str, Option<&str>)> {
    match candidate.split_once('/') {
        None if container_only && !candidate.is_empty() => Some((candidate, None)),
        None => None,
        Some(("", _)) => None,
        Some((container, "")) if container_only => Some((container, None)),
        Some(_) if container_only => None,
        Some((_, "")) => None,
        Some((container, item)) => Some((container, Some(item))),
    }
}

fn looks_like_url(pattern: &str) -> bool {
    pattern.contains("://")
}

/// Whether every `{parameter}` of `pattern` is still present after conversion
///
/// A placeholder in the host, query or fragment is dropped by the rewrite; such
/// patterns are left to the URL-template step instead.
fn keeps_parameters(pattern: &str, converted: &str) -> bool {
    let Ok(original) = BindingTemplate::parse(pattern) else {
        return true;
    };
    if !original.has_parameters() {
        return true;
    }

    match BindingTemplate::parse(converted) {
        Ok(rewritten) => {
            let kept: BTreeSet<&str> = rewritten.parameter_names().collect();
            original.parameter_names().all(|name| kept.contains(name))
        }
        Err(_) => false,
    }
}
