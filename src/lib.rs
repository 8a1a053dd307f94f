//! Bindery - binding resolution for job hosts
//!
//! Two halves:
//! - [`binding`]: storage path patterns (`container/{name}.txt`, storage URLs,
//!   URL templates) resolved at registration and bound per invocation
//! - [`argument`]: trigger payloads converted to typed function arguments
//!   through an ordered provider registry

pub mod argument;
pub mod binding;
pub mod config;
pub mod error;

pub use argument::{
    ArgumentBinder, ArgumentBindingProvider, ArgumentBindingRegistry, BoundArgument,
    ConverterProvider, ParameterDescriptor, QueueMessage, TypeToken,
};
pub use binding::{
    BindablePath, BindingData, BindingTemplate, PathResolver, ResourcePath, StorageUrlConverter,
    TriggerPathSource, UrlPathConverter,
};
pub use config::BindingConfig;
pub use error::{BindingError, FixSuggestion, Result};
