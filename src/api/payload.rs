/// Wire payload normalization
///
/// The backend is inconsistent about list shapes: some endpoints return a
/// bare JSON array, others wrap it as `{"data": [...]}`. `ListPayload`
/// accepts both so the rest of the client only ever sees `Vec<T>`.
/// Error bodies are similarly loose, carrying the human-readable text in
/// either an `error` or a `message` field.

use serde::Deserialize;

/// List response in either bare or envelope shape
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    /// Bare array: `[...]`
    Bare(Vec<T>),

    /// Envelope: `{"data": [...]}`
    Envelope {
        /// Wrapped items
        data: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    /// Unwraps into the item vector
    pub fn into_items(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) => items,
            ListPayload::Envelope { data } => data,
        }
    }
}

/// JSON error body shape
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    /// Primary error text
    #[serde(default)]
    pub error: Option<String>,

    /// Alternate error text
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extracts the server-supplied message, preferring `error` over
    /// `message`, skipping empty strings
    pub fn into_message(self) -> Option<String> {
        self.error
            .filter(|s| !s.is_empty())
            .or(self.message.filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_list() {
        let payload: ListPayload<i64> = serde_json::from_str("[1, 2, 3]").unwrap();
        assert_eq!(payload.into_items(), vec![1, 2, 3]);
    }

    #[test]
    fn test_envelope_list() {
        let payload: ListPayload<i64> = serde_json::from_str(r#"{"data": [4, 5]}"#).unwrap();
        assert_eq!(payload.into_items(), vec![4, 5]);
    }

    #[test]
    fn test_error_body_prefers_error_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error": "nope", "message": "other"}"#).unwrap();
        assert_eq!(body.into_message(), Some("nope".to_string()));
    }

    #[test]
    fn test_error_body_falls_back_to_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"message": "broken"}"#).unwrap();
        assert_eq!(body.into_message(), Some("broken".to_string()));
    }

    #[test]
    fn test_empty_error_body() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": ""}"#).unwrap();
        assert_eq!(body.into_message(), None);
    }
}
