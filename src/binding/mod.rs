//! Binding Module - resource path patterns
//!
//! Turns declarative path patterns into concrete storage locations:
//! - `template`: `{parameter}` templates (parse, bind, reverse match)
//! - `validate`: container/item naming rules
//! - `path`: `ResourcePath` (validated `container[/item]`)
//! - `storage_url`: storage URL → `container/item` conversion
//! - `resolve`: `PathResolver` → `BindablePath` (Bound | Parameterized | UrlTemplate)
//! - `source`: blob-trigger pattern matching
//! - `data`: per-invocation `BindingData`
//!
//! Data flow:
//! ```text
//! registration:  "input/{name}.txt" ──PathResolver::resolve──► Arc<BindablePath>
//!                                                                    │
//! invocation:    trigger ──► BindingData ──────────bind─────────────►┘
//!                                                                    ▼
//!                                                        ResourcePath { input, report.txt }
//! ```

mod data;
mod path;
mod resolve;
mod source;
mod storage_url;
mod template;
mod validate;

// Re-export public types
pub use data::{BindingData, BLOB_TRIGGER, DEQUEUE_COUNT, MESSAGE_ID, QUEUE_TRIGGER};
pub use path::ResourcePath;
pub use resolve::{BindablePath, ParameterizedPath, PathResolver, UrlTemplatePath};
pub use source::TriggerPathSource;
pub use storage_url::{StorageUrlConverter, UrlPathConverter};
pub use template::{BindingTemplate, Segment};
pub use validate::{
    validate_container_name, validate_item_name, CONTAINER_NAME_MAX_LEN, CONTAINER_NAME_MIN_LEN,
    ITEM_NAME_MAX_LEN, ITEM_NAME_MAX_SEGMENTS, ITEM_NAME_MIN_LEN, RESERVED_CONTAINER_NAMES,
};
