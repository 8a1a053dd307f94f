//! Argument Module - trigger payload → typed function arguments
//!
//! - `message`: `QueueMessage` envelope
//! - `descriptor`: `TypeToken`, `ParameterDescriptor`, `BoundArgument`
//! - `provider`: binder/provider traits and built-in providers
//! - `registry`: ordered provider selection
//!
//! ```text
//! registration:  ParameterDescriptor ──select_binder──► Arc<dyn ArgumentBinder>
//! invocation:    QueueMessage ──bind──► BoundArgument ──downcast──► T
//! ```

mod descriptor;
mod message;
mod provider;
mod registry;

pub use descriptor::{BoundArgument, ParameterDescriptor, StructuredCodec, TypeToken};
pub use message::QueueMessage;
pub use provider::{
    ArgumentBinder, ArgumentBindingProvider, BytesProvider, ConverterProvider, JsonValueProvider,
    MessageProvider, StructuredProvider, TextProvider,
};
pub use registry::{ArgumentBindingRegistry, RegistryBuilder};
