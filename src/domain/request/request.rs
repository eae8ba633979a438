use serde::{Deserialize, Serialize};

use super::{Message, MessageRole};

/// A generation request as seen by the cache.
///
/// Transient: only used to derive a fingerprint and a similarity text blob,
/// never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Ordered conversation messages
    pub messages: Vec<Message>,
    /// System instruction, kept separate from the message list
    #[serde(default)]
    pub system: String,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(messages: Vec<Message>, system: impl Into<String>, temperature: f32) -> Self {
        Self {
            messages,
            system: system.into(),
            temperature,
        }
    }

    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::new()
    }

    /// System instruction plus every message content, newline-joined.
    ///
    /// This is the text blob the similarity tier sketches over.
    pub fn combined_text(&self) -> String {
        let mut parts = Vec::with_capacity(self.messages.len() + 1);

        if !self.system.is_empty() {
            parts.push(self.system.as_str());
        }

        for message in &self.messages {
            if !message.content.is_empty() {
                parts.push(message.content.as_str());
            }
        }

        parts.join("\n")
    }

    /// Content of the first user message, if any
    pub fn first_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}

/// Builder for GenerationRequest
#[derive(Debug, Default)]
pub struct GenerationRequestBuilder {
    messages: Vec<Message>,
    system: String,
    temperature: f32,
}

impl GenerationRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(Message::user(content))
    }

    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(Message::assistant(content))
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn build(self) -> GenerationRequest {
        GenerationRequest {
            messages: self.messages,
            system: self.system,
            temperature: self.temperature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let request = GenerationRequest::builder()
            .system("You are a marketing expert.")
            .user("What is content marketing?")
            .temperature(0.7)
            .build();

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.system, "You are a marketing expert.");
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_combined_text_includes_system_and_contents() {
        let request = GenerationRequest::builder()
            .system("sys")
            .user("first")
            .assistant("second")
            .build();

        assert_eq!(request.combined_text(), "sys\nfirst\nsecond");
    }

    #[test]
    fn test_combined_text_skips_empty_parts() {
        let request = GenerationRequest::builder().user("only").build();
        assert_eq!(request.combined_text(), "only");
    }

    #[test]
    fn test_first_user_content() {
        let request = GenerationRequest::builder()
            .assistant("earlier answer")
            .user("question")
            .build();

        assert_eq!(request.first_user_content(), Some("question"));
    }
}
