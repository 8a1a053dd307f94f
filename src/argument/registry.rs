//! Ordered provider registry
//!
//! Selection is a linear scan: the first provider whose `matches` accepts the
//! parameter creates its binder. The order is fixed so that the native
//! envelope and raw bytes are always preferred over lossy conversions.

use std::fmt;
use std::sync::Arc;

use crate::error::{BindingError, Result};

use super::descriptor::ParameterDescriptor;
use super::provider::{
    ArgumentBinder, ArgumentBindingProvider, BytesProvider, JsonValueProvider, MessageProvider,
    StructuredProvider, TextProvider,
};

/// Immutable, ordered list of argument binding providers
pub struct ArgumentBindingRegistry {
    providers: Vec<Box<dyn ArgumentBindingProvider>>,
}

impl ArgumentBindingRegistry {
    /// Built-in providers only
    pub fn standard() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// First provider that accepts `parameter`
    pub fn select_provider(
        &self,
        parameter: &ParameterDescriptor,
    ) -> Option<&dyn ArgumentBindingProvider> {
        self.providers
            .iter()
            .map(|provider| &**provider)
            .find(|provider| provider.matches(parameter))
    }

    /// Binder for `parameter`, or `UnsupportedType` when no provider accepts it
    pub fn select_binder(&self, parameter: &ParameterDescriptor) -> Result<Arc<dyn ArgumentBinder>> {
        let provider =
            self.select_provider(parameter)
                .ok_or_else(|| BindingError::UnsupportedType {
                    parameter: parameter.name().to_string(),
                    type_name: parameter.type_token().name().to_string(),
                })?;

        tracing::debug!(
            parameter = parameter.name(),
            type_name = parameter.type_token().name(),
            provider = provider.name(),
            "selected argument binding provider"
        );

        provider.create(parameter)
    }

    /// Provider names in selection order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ArgumentBindingRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ArgumentBindingRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentBindingRegistry")
            .field("providers", &self.provider_names())
            .finish()
    }
}

/// Builder for [`ArgumentBindingRegistry`]
///
/// Host providers are slotted after the built-in conversions and before the
/// structured (serde) fallback, in registration order.
pub struct RegistryBuilder {
    host: Vec<Box<dyn ArgumentBindingProvider>>,
    structured_fallback: bool,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            host: Vec::new(),
            structured_fallback: true,
        }
    }
}

impl RegistryBuilder {
    /// Register a host provider (e.g. a `ConverterProvider`)
    pub fn provider(mut self, provider: impl ArgumentBindingProvider + 'static) -> Self {
        self.host.push(Box::new(provider));
        self
    }

    /// Leave out the structured fallback; structured descriptors then need a
    /// host provider
    pub fn without_structured_fallback(mut self) -> Self {
        self.structured_fallback = false;
        self
    }

    pub fn build(self) -> ArgumentBindingRegistry {
        let mut providers: Vec<Box<dyn ArgumentBindingProvider>> = vec![
            Box::new(MessageProvider),
            Box::new(BytesProvider),
            Box::new(TextProvider),
            Box::new(JsonValueProvider),
        ];
        providers.extend(self.host);
        if self.structured_fallback {
            providers.push(Box::new(StructuredProvider));
        }

        ArgumentBindingRegistry { providers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::{BoundArgument, ConverterProvider, QueueMessage};
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Order {
        id: u32,
    }

    #[test]
    fn standard_order() {
        let registry = ArgumentBindingRegistry::standard();
        assert_eq!(
            registry.provider_names(),
            vec!["message", "bytes", "text", "json", "structured"]
        );
        assert_eq!(registry.len(), 5);
        assert!(!registry.is_empty());
    }

    #[test]
    fn message_wins_over_conversions() {
        let registry = ArgumentBindingRegistry::default();
        let provider = registry
            .select_provider(&ParameterDescriptor::new::<QueueMessage>("msg"))
            .unwrap();
        assert_eq!(provider.name(), "message");
    }

    #[test]
    fn selects_by_declared_type() {
        let registry = ArgumentBindingRegistry::standard();
        let cases = [
            (ParameterDescriptor::new::<Vec<u8>>("b"), "bytes"),
            (ParameterDescriptor::new::<String>("s"), "text"),
            (ParameterDescriptor::new::<Value>("j"), "json"),
            (ParameterDescriptor::structured::<Order>("o"), "structured"),
        ];
        for (parameter, expected) in cases {
            let provider = registry.select_provider(&parameter).unwrap();
            assert_eq!(provider.name(), expected, "{}", parameter.name());
        }
    }

    #[test]
    fn unsupported_type() {
        let registry = ArgumentBindingRegistry::standard();
        let err = registry
            .select_binder(&ParameterDescriptor::new::<u32>("count"))
            .err()
            .unwrap();
        assert_eq!(err.code(), "BIND-030");
        assert!(err.is_registration_error());
        assert!(err.to_string().contains("count"));
    }

    #[test]
    fn structured_needs_fallback() {
        let registry = ArgumentBindingRegistry::builder()
            .without_structured_fallback()
            .build();
        assert!(registry
            .select_binder(&ParameterDescriptor::structured::<Order>("o"))
            .is_err());
    }

    #[test]
    fn host_provider_precedes_structured() {
        let registry = ArgumentBindingRegistry::builder()
            .provider(ConverterProvider::new("order-id", |message: &QueueMessage| {
                Ok(Order {
                    id: message.body().len() as u32,
                })
            }))
            .build();

        assert_eq!(
            registry.provider_names(),
            vec!["message", "bytes", "text", "json", "order-id", "structured"]
        );

        let binder = registry
            .select_binder(&ParameterDescriptor::structured::<Order>("o"))
            .unwrap();
        let bound = binder.bind(&QueueMessage::from_text("m", "abc")).unwrap();
        assert_eq!(bound.downcast::<Order>().unwrap(), Order { id: 3 });
    }

    #[test]
    fn host_provider_cannot_shadow_builtins() {
        let registry = ArgumentBindingRegistry::builder()
            .provider(ConverterProvider::new("shout", |message: &QueueMessage| {
                Ok(String::from_utf8_lossy(message.body()).to_uppercase())
            }))
            .build();

        let binder = registry
            .select_binder(&ParameterDescriptor::new::<String>("s"))
            .unwrap();
        let bound = binder.bind(&QueueMessage::from_text("m", "hi")).unwrap();
        assert_eq!(bound.downcast::<String>().unwrap(), "hi");
    }

    #[test]
    fn binder_conversion_error() {
        let registry = ArgumentBindingRegistry::standard();
        let binder = registry
            .select_binder(&ParameterDescriptor::structured::<Order>("order"))
            .unwrap();
        let err = binder
            .bind(&QueueMessage::from_text("m", "not json"))
            .unwrap_err();
        assert_eq!(err.code(), "BIND-031");
        assert!(!err.is_registration_error());
    }

    #[test]
    fn concurrent_selection_and_binding() {
        let registry = ArgumentBindingRegistry::standard();
        let binder = registry
            .select_binder(&ParameterDescriptor::new::<String>("s"))
            .unwrap();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let binder = Arc::clone(&binder);
                let registry = &registry;
                scope.spawn(move || {
                    let text = format!("message-{i}");
                    let bound: BoundArgument =
                        binder.bind(&QueueMessage::from_text("m", &text)).unwrap();
                    assert_eq!(bound.downcast::<String>().unwrap(), text);
                    assert!(registry
                        .select_binder(&ParameterDescriptor::new::<Vec<u8>>("b"))
                        .is_ok());
                });
            }
        });
    }
}
