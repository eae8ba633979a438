//! Request fingerprinting

use serde_json::json;
use sha2::{Digest, Sha256};

use crate::domain::request::GenerationRequest;

/// Derives the exact-match cache key for a generation request.
///
/// The fingerprint is the SHA-256 hex digest of a canonical JSON rendering of
/// `{messages, system, temperature}`. Canonical means key-sorted objects
/// (`serde_json::Map` keeps keys in sorted order) and a fixed-precision
/// temperature, so two requests that differ only in container iteration order
/// always produce the same digest. The digest is one-way: cache file names
/// never leak prompt content.
#[derive(Debug, Clone, Default)]
pub struct FingerprintDeriver;

impl FingerprintDeriver {
    pub fn new() -> Self {
        Self
    }

    /// Returns the 64-char hex fingerprint for the request.
    pub fn fingerprint(&self, request: &GenerationRequest) -> String {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|m| {
                json!({
                    "content": m.content,
                    "role": m.role.as_str(),
                })
            })
            .collect();

        let canonical = json!({
            "messages": messages,
            "system": request.system,
            "temperature": format!("{:.2}", request.temperature),
        });

        // Canonical value serialization cannot fail: the value holds only
        // strings and arrays built above.
        let payload = canonical.to_string();

        let mut hasher = Sha256::new();
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::Message;

    fn request() -> GenerationRequest {
        GenerationRequest::builder()
            .system("You are a marketing expert.")
            .user("What is content marketing?")
            .temperature(0.7)
            .build()
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let deriver = FingerprintDeriver::new();
        assert_eq!(deriver.fingerprint(&request()), deriver.fingerprint(&request()));
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fingerprint = FingerprintDeriver::new().fingerprint(&request());
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_message_key_order_does_not_matter() {
        let deriver = FingerprintDeriver::new();

        let a: Message = serde_json::from_str(r#"{"role":"user","content":"hello"}"#).unwrap();
        let b: Message = serde_json::from_str(r#"{"content":"hello","role":"user"}"#).unwrap();

        let request_a = GenerationRequest::new(vec![a], "sys", 0.5);
        let request_b = GenerationRequest::new(vec![b], "sys", 0.5);

        assert_eq!(deriver.fingerprint(&request_a), deriver.fingerprint(&request_b));
    }

    #[test]
    fn test_fingerprint_differs_by_content() {
        let deriver = FingerprintDeriver::new();
        let other = GenerationRequest::builder()
            .system("You are a marketing expert.")
            .user("What is the capital of France?")
            .temperature(0.7)
            .build();

        assert_ne!(deriver.fingerprint(&request()), deriver.fingerprint(&other));
    }

    #[test]
    fn test_fingerprint_differs_by_temperature() {
        let deriver = FingerprintDeriver::new();
        let mut hotter = request();
        hotter.temperature = 0.9;

        assert_ne!(deriver.fingerprint(&request()), deriver.fingerprint(&hotter));
    }

    #[test]
    fn test_fingerprint_differs_by_system() {
        let deriver = FingerprintDeriver::new();
        let mut other = request();
        other.system = "You are a pirate.".to_string();

        assert_ne!(deriver.fingerprint(&request()), deriver.fingerprint(&other));
    }

    #[test]
    fn test_message_order_matters() {
        let deriver = FingerprintDeriver::new();
        let ab = GenerationRequest::new(
            vec![Message::user("a"), Message::assistant("b")],
            "",
            0.0,
        );
        let ba = GenerationRequest::new(
            vec![Message::assistant("b"), Message::user("a")],
            "",
            0.0,
        );

        assert_ne!(deriver.fingerprint(&ab), deriver.fingerprint(&ba));
    }
}
