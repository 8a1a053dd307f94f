//! Argument binding providers and binders
//!
//! A provider answers two questions for a parameter: *can I bind it?*
//! ([`ArgumentBindingProvider::matches`]) and *give me a binder*
//! ([`ArgumentBindingProvider::create`]). Binders do the per-invocation work.
//!
//! | Provider | Parameter type | Conversion |
//! |----------|----------------|------------|
//! | [`MessageProvider`] | `QueueMessage` | clone of the envelope |
//! | [`BytesProvider`] | `Vec<u8>` | raw body |
//! | [`TextProvider`] | `String` | UTF-8 decode |
//! | [`JsonValueProvider`] | `serde_json::Value` | JSON parse |
//! | [`ConverterProvider`] | host-registered `T` | host closure |
//! | [`StructuredProvider`] | any `ParameterDescriptor::structured::<T>()` | JSON deserialize |

use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{BindingError, Result};

use super::descriptor::{BoundArgument, ParameterDescriptor, StructuredCodec, TypeToken};
use super::message::QueueMessage;

type BoxError = Box<dyn Error + Send + Sync>;

/// Converts a trigger payload to (and from) one parameter's type
pub trait ArgumentBinder: Send + Sync {
    /// Name of the parameter this binder was created for
    fn parameter(&self) -> &str;

    /// Declared type of the parameter
    fn value_type(&self) -> TypeToken;

    /// Payload → argument
    fn bind(&self, message: &QueueMessage) -> Result<BoundArgument>;

    /// Argument → payload body (output direction)
    fn to_payload(&self, argument: &BoundArgument) -> Result<Vec<u8>>;
}

/// Strategy that produces binders for a class of parameter types
pub trait ArgumentBindingProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn matches(&self, parameter: &ParameterDescriptor) -> bool;

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>>;
}

// ═══════════════════════════════════════════════════════════════
// Built-in payload binders
// ═══════════════════════════════════════════════════════════════

type PayloadDecode = fn(&QueueMessage) -> std::result::Result<Box<dyn Any + Send>, BoxError>;
type PayloadEncode = fn(&(dyn Any + Send)) -> Option<std::result::Result<Vec<u8>, BoxError>>;

/// Binder backed by a pair of plain functions
struct PayloadBinder {
    parameter: String,
    ty: TypeToken,
    decode: PayloadDecode,
    encode: PayloadEncode,
}

impl PayloadBinder {
    fn create<T: 'static>(
        parameter: &ParameterDescriptor,
        decode: PayloadDecode,
        encode: PayloadEncode,
    ) -> Arc<dyn ArgumentBinder> {
        Arc::new(Self {
            parameter: parameter.name().to_string(),
            ty: TypeToken::of::<T>(),
            decode,
            encode,
        })
    }
}

impl ArgumentBinder for PayloadBinder {
    fn parameter(&self) -> &str {
        &self.parameter
    }

    fn value_type(&self) -> TypeToken {
        self.ty
    }

    fn bind(&self, message: &QueueMessage) -> Result<BoundArgument> {
        let value =
            (self.decode)(message).map_err(|e| BindingError::conversion(&self.parameter, e))?;
        Ok(BoundArgument::from_boxed(&self.parameter, self.ty, value))
    }

    fn to_payload(&self, argument: &BoundArgument) -> Result<Vec<u8>> {
        match (self.encode)(argument.value()) {
            Some(encoded) => encoded.map_err(|e| BindingError::conversion(&self.parameter, e)),
            None => Err(mismatch(&self.parameter, self.ty, argument)),
        }
    }
}

fn mismatch(parameter: &str, expected: TypeToken, argument: &BoundArgument) -> BindingError {
    BindingError::ArgumentTypeMismatch {
        parameter: parameter.to_string(),
        expected: expected.name().to_string(),
        actual: argument.type_name().to_string(),
    }
}

/// Binds the native envelope; checked first so it never goes through a lossy conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageProvider;

impl ArgumentBindingProvider for MessageProvider {
    fn name(&self) -> &'static str {
        "message"
    }

    fn matches(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.is::<QueueMessage>()
    }

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        Ok(PayloadBinder::create::<QueueMessage>(
            parameter,
            |message| Ok(Box::new(message.clone())),
            |value| {
                value
                    .downcast_ref::<QueueMessage>()
                    .map(|message| Ok(message.body().to_vec()))
            },
        ))
    }
}

/// Raw body bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesProvider;

impl ArgumentBindingProvider for BytesProvider {
    fn name(&self) -> &'static str {
        "bytes"
    }

    fn matches(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.is::<Vec<u8>>()
    }

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        Ok(PayloadBinder::create::<Vec<u8>>(
            parameter,
            |message| Ok(Box::new(message.body().to_vec())),
            |value| value.downcast_ref::<Vec<u8>>().map(|bytes| Ok(bytes.clone())),
        ))
    }
}

/// Body decoded as UTF-8 text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextProvider;

impl ArgumentBindingProvider for TextProvider {
    fn name(&self) -> &'static str {
        "text"
    }

    fn matches(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.is::<String>()
    }

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        Ok(PayloadBinder::create::<String>(
            parameter,
            |message| {
                let text = String::from_utf8(message.body().to_vec())?;
                Ok(Box::new(text))
            },
            |value| {
                value
                    .downcast_ref::<String>()
                    .map(|text| Ok(text.as_bytes().to_vec()))
            },
        ))
    }
}

/// Body parsed as untyped JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonValueProvider;

impl ArgumentBindingProvider for JsonValueProvider {
    fn name(&self) -> &'static str {
        "json"
    }

    fn matches(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.is::<Value>()
    }

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        Ok(PayloadBinder::create::<Value>(
            parameter,
            |message| {
                let value: Value = serde_json::from_slice(message.body())?;
                Ok(Box::new(value))
            },
            |value| {
                value
                    .downcast_ref::<Value>()
                    .map(|json| serde_json::to_vec(json).map_err(Into::into))
            },
        ))
    }
}

// ═══════════════════════════════════════════════════════════════
// Structured (serde) fallback
// ═══════════════════════════════════════════════════════════════

/// Deserializes JSON bodies into any type registered with
/// [`ParameterDescriptor::structured`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredProvider;

impl ArgumentBindingProvider for StructuredProvider {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn matches(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.codec().is_some()
    }

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        let codec = parameter
            .codec()
            .copied()
            .ok_or_else(|| BindingError::UnsupportedType {
                parameter: parameter.name().to_string(),
                type_name: parameter.type_token().name().to_string(),
            })?;

        Ok(Arc::new(StructuredBinder {
            parameter: parameter.name().to_string(),
            ty: parameter.type_token(),
            codec,
        }))
    }
}

struct StructuredBinder {
    parameter: String,
    ty: TypeToken,
    codec: StructuredCodec,
}

impl ArgumentBinder for StructuredBinder {
    fn parameter(&self) -> &str {
        &self.parameter
    }

    fn value_type(&self) -> TypeToken {
        self.ty
    }

    fn bind(&self, message: &QueueMessage) -> Result<BoundArgument> {
        let value = self
            .codec
            .decode(message.body())
            .map_err(|e| BindingError::conversion(&self.parameter, e))?;
        Ok(BoundArgument::from_boxed(&self.parameter, self.ty, value))
    }

    fn to_payload(&self, argument: &BoundArgument) -> Result<Vec<u8>> {
        match self.codec.encode(argument.value()) {
            Some(encoded) => encoded.map_err(|e| BindingError::conversion(&self.parameter, e)),
            None => Err(mismatch(&self.parameter, self.ty, argument)),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Host-registered converters
// ═══════════════════════════════════════════════════════════════

type ConvertFn<T> = dyn Fn(&QueueMessage) -> std::result::Result<T, BoxError> + Send + Sync;
type ReverseFn<T> = dyn Fn(&T) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync;

/// Binds parameters of type `T` through a host-supplied conversion
pub struct ConverterProvider<T> {
    name: &'static str,
    convert: Arc<ConvertFn<T>>,
    reverse: Option<Arc<ReverseFn<T>>>,
}

impl<T: Send + 'static> ConverterProvider<T> {
    pub fn new<F>(name: &'static str, convert: F) -> Self
    where
        F: Fn(&QueueMessage) -> std::result::Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            name,
            convert: Arc::new(convert),
            reverse: None,
        }
    }

    /// Also support the output direction
    pub fn with_reverse<F>(mut self, reverse: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<Vec<u8>, BoxError> + Send + Sync + 'static,
    {
        self.reverse = Some(Arc::new(reverse));
        self
    }
}

impl<T: Send + 'static> ArgumentBindingProvider for ConverterProvider<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn matches(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.is::<T>()
    }

    fn create(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        Ok(Arc::new(ConverterBinder {
            parameter: parameter.name().to_string(),
            convert: Arc::clone(&self.convert),
            reverse: self.reverse.clone(),
        }))
    }
}

struct ConverterBinder<T> {
    parameter: String,
    convert: Arc<ConvertFn<T>>,
    reverse: Option<Arc<ReverseFn<T>>>,
}

impl<T: Send + 'static> ArgumentBinder for ConverterBinder<T> {
    fn parameter(&self) -> &str {
        &self.parameter
    }

    fn value_type(&self) -> TypeToken {
        TypeToken::of::<T>()
    }

    fn bind(&self, message: &QueueMessage) -> Result<BoundArgument> {
        let value =
            (self.convert)(message).map_err(|e| BindingError::conversion(&self.parameter, e))?;
        Ok(BoundArgument::new(&self.parameter, value))
    }

    fn to_payload(&self, argument: &BoundArgument) -> Result<Vec<u8>> {
        let value = argument
            .downcast_ref::<T>()
            .ok_or_else(|| mismatch(&self.parameter, TypeToken::of::<T>(), argument))?;

        let reverse = self.reverse.as_ref().ok_or_else(|| {
            BindingError::conversion(
                &self.parameter,
                format!("no payload encoding registered for {}", std::any::type_name::<T>()),
            )
        })?;

        reverse(value).map_err(|e| BindingError::conversion(&self.parameter, e))
    }
}
