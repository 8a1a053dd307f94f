//! Binding data - per-invocation parameter values
//!
//! A `BindingData` map is what `{parameter}` placeholders are bound against.
//! Hosts build one per invocation, usually from the trigger that fired:
//!
//! ```text
//! QueueMessage ──from_message──► { queueTrigger, id, dequeueCount, <json props> }
//! blob path    ──from_blob─────► { blobTrigger, <matched pattern params> }
//! ```

use std::collections::BTreeMap;

use serde_json::Value;

use crate::argument::QueueMessage;

use super::path::ResourcePath;

/// Built-in key: the message body as text
pub const QUEUE_TRIGGER: &str = "queueTrigger";
/// Built-in key: the message id
pub const MESSAGE_ID: &str = "id";
/// Built-in key: how many times the message was dequeued
pub const DEQUEUE_COUNT: &str = "dequeueCount";
/// Built-in key: the full `container/item` path of the triggering blob
pub const BLOB_TRIGGER: &str = "blobTrigger";

/// Parameter name → value mapping
///
/// Uses BTreeMap so iteration (and CLI output) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingData {
    values: BTreeMap<String, String>,
}

impl BindingData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `other` into `self`; existing keys keep their values
    pub fn merge_missing(&mut self, other: BindingData) {
        for (name, value) in other.values {
            self.values.entry(name).or_insert(value);
        }
    }

    /// Binding data contributed by a queue trigger
    ///
    /// Top-level scalar properties of a JSON object body are exposed by name.
    /// Built-in keys take precedence over body properties with the same name.
    pub fn from_message(message: &QueueMessage) -> Self {
        let mut data = Self::new();

        if let Ok(Value::Object(properties)) = serde_json::from_slice::<Value>(message.body()) {
            for (name, value) in properties {
                if let Some(text) = scalar_to_string(&value) {
                    data.insert(name, text);
                }
            }
        }

        if let Ok(text) = std::str::from_utf8(message.body()) {
            data.insert(QUEUE_TRIGGER, text);
        }
        data.insert(MESSAGE_ID, message.id());
        data.insert(DEQUEUE_COUNT, message.dequeue_count().to_string());
        data
    }

    /// Binding data contributed by a blob trigger
    ///
    /// `matched` holds the values extracted from the trigger's path pattern.
    pub fn from_blob(path: &ResourcePath, matched: BindingData) -> Self {
        let mut data = matched;
        data.insert(BLOB_TRIGGER, path.to_string());
        data
    }
}

impl<K, V> FromIterator<(K, V)> for BindingData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (name, value) in iter {
            data.insert(name, value);
        }
        data
    }
}

impl From<BTreeMap<String, String>> for BindingData {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut data = BindingData::new();
        assert!(data.insert("name", "report").is_none());
        assert_eq!(data.insert("name", "summary").as_deref(), Some("report"));
        assert_eq!(data.get("name"), Some("summary"));
        assert!(data.contains("name"));
        assert!(!data.contains("other"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn merge_keeps_existing() {
        let mut data = BindingData::new().with("a", "1");
        data.merge_missing(BindingData::new().with("a", "2").with("b", "3"));
        assert_eq!(data.get("a"), Some("1"));
        assert_eq!(data.get("b"), Some("3"));
    }

    #[test]
    fn from_message_text_body() {
        let message = QueueMessage::new("m-1", b"hello".to_vec()).with_dequeue_count(3);
        let data = BindingData::from_message(&message);
        assert_eq!(data.get(QUEUE_TRIGGER), Some("hello"));
        assert_eq!(data.get(MESSAGE_ID), Some("m-1"));
        assert_eq!(data.get(DEQUEUE_COUNT), Some("3"));
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn from_message_json_properties() {
        let body = br#"{"name":"report","size":12,"draft":false,"tags":["a"],"owner":null}"#;
        let message = QueueMessage::new("m-2", body.to_vec());
        let data = BindingData::from_message(&message);
        assert_eq!(data.get("name"), Some("report"));
        assert_eq!(data.get("size"), Some("12"));
        assert_eq!(data.get("draft"), Some("false"));
        assert!(!data.contains("tags"));
        assert!(!data.contains("owner"));
    }

    #[test]
    fn builtins_shadow_body_properties() {
        let message = QueueMessage::new("real-id", br#"{"id":"spoofed"}"#.to_vec());
        let data = BindingData::from_message(&message);
        assert_eq!(data.get(MESSAGE_ID), Some("real-id"));
    }

    #[test]
    fn from_message_binary_body() {
        let message = QueueMessage::new("m-3", vec![0xff, 0xfe]);
        let data = BindingData::from_message(&message);
        assert!(!data.contains(QUEUE_TRIGGER));
        assert_eq!(data.get(MESSAGE_ID), Some("m-3"));
    }

    #[test]
    fn from_blob_adds_trigger_path() {
        let path = ResourcePath::new("input", Some("report.txt")).unwrap();
        let data = BindingData::from_blob(&path, BindingData::new().with("name", "report"));
        assert_eq!(data.get(BLOB_TRIGGER), Some("input/report.txt"));
        assert_eq!(data.get("name"), Some("report"));
    }
}
