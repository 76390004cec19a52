//! Wire types of the Dify `chat-messages` endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Body of `POST /chat-messages`.
#[derive(Debug, Serialize)]
pub(super) struct ChatMessageRequest<'a> {
    pub inputs: &'a BTreeMap<String, String>,
    pub query: &'a str,
    pub response_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
    pub user: &'a str,
}

/// Blocking-mode answer.
#[derive(Debug, Deserialize)]
pub(super) struct ChatMessageResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best readable description of a failed response body.
    pub fn describe(raw: &str) -> String {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(ErrorBody {
                code: Some(code),
                message: Some(message),
            }) => format!("{}: {}", code, message),
            Ok(ErrorBody {
                message: Some(message),
                ..
            }) => message,
            _ => raw.to_string(),
        }
    }
}
