//! Parameter descriptors and bound argument values
//!
//! The host describes each function parameter with an explicit [`TypeToken`]
//! (no runtime reflection). Binders hand back a [`BoundArgument`] that the host
//! downcasts to the declared type.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BindingError, Result};

/// Type identity supplied by the host
#[derive(Clone, Copy)]
pub struct TypeToken {
    id: TypeId,
    name: &'static str,
}

impl TypeToken {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeToken {}

impl Hash for TypeToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeToken({})", self.name)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

type DecodeFn = fn(&[u8]) -> serde_json::Result<Box<dyn Any + Send>>;
type EncodeFn = fn(&(dyn Any + Send)) -> Option<serde_json::Result<Vec<u8>>>;

/// JSON codec captured for a serde type when its descriptor is built
#[derive(Clone, Copy)]
pub struct StructuredCodec {
    decode: DecodeFn,
    encode: EncodeFn,
}

impl StructuredCodec {
    fn of<T>() -> Self
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        Self {
            decode: decode_json::<T>,
            encode: encode_json::<T>,
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> serde_json::Result<Box<dyn Any + Send>> {
        (self.decode)(bytes)
    }

    /// `None` when `value` is not the codec's type
    pub fn encode(&self, value: &(dyn Any + Send)) -> Option<serde_json::Result<Vec<u8>>> {
        (self.encode)(value)
    }
}

impl fmt::Debug for StructuredCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructuredCodec").finish_non_exhaustive()
    }
}

fn decode_json<T>(bytes: &[u8]) -> serde_json::Result<Box<dyn Any + Send>>
where
    T: DeserializeOwned + Send + 'static,
{
    let value: T = serde_json::from_slice(bytes)?;
    Ok(Box::new(value))
}

fn encode_json<T>(value: &(dyn Any + Send)) -> Option<serde_json::Result<Vec<u8>>>
where
    T: Serialize + 'static,
{
    value.downcast_ref::<T>().map(serde_json::to_vec)
}

/// What the host knows about one function parameter
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    name: String,
    ty: TypeToken,
    codec: Option<StructuredCodec>,
}

impl ParameterDescriptor {
    /// Parameter of type `T`
    pub fn new<T: 'static>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: TypeToken::of::<T>(),
            codec: None,
        }
    }

    /// Parameter of a serde type, bound by JSON deserialization
    pub fn structured<T>(name: impl Into<String>) -> Self
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        Self {
            name: name.into(),
            ty: TypeToken::of::<T>(),
            codec: Some(StructuredCodec::of::<T>()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_token(&self) -> TypeToken {
        self.ty
    }

    pub fn codec(&self) -> Option<&StructuredCodec> {
        self.codec.as_ref()
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.ty.is::<T>()
    }
}

/// Value produced by a binder for one invocation
pub struct BoundArgument {
    parameter: String,
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl BoundArgument {
    pub fn new<T: Send + 'static>(parameter: impl Into<String>, value: T) -> Self {
        Self {
            parameter: parameter.into(),
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    pub(crate) fn from_boxed(
        parameter: impl Into<String>,
        ty: TypeToken,
        value: Box<dyn Any + Send>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            type_name: ty.name(),
            value,
        }
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub(crate) fn value(&self) -> &(dyn Any + Send) {
        &*self.value
    }

    /// Take the value as its declared type
    pub fn downcast<T: 'static>(self) -> Result<T> {
        let Self {
            parameter,
            type_name,
            value,
        } = self;

        value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| BindingError::ArgumentTypeMismatch {
                parameter,
                expected: std::any::type_name::<T>().to_string(),
                actual: type_name.to_string(),
            })
    }
}

impl fmt::Debug for BoundArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundArgument")
            .field("parameter", &self.parameter)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
