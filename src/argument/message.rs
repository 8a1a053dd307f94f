//! Queue message - the trigger's native payload envelope

/// Message as delivered by a queue trigger
///
/// The body is opaque bytes; binders decide how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    id: String,
    body: Vec<u8>,
    dequeue_count: u32,
}

impl QueueMessage {
    pub fn new(id: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            dequeue_count: 1,
        }
    }

    /// Message with a UTF-8 text body
    pub fn from_text(id: impl Into<String>, text: &str) -> Self {
        Self::new(id, text.as_bytes().to_vec())
    }

    pub fn with_dequeue_count(mut self, count: u32) -> Self {
        self.dequeue_count = count;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn dequeue_count(&self) -> u32 {
        self.dequeue_count
    }

    /// Body as text, when it is valid UTF-8
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}
