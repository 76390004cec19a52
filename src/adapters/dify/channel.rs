//! Dify channel - DialogueChannel over the Dify chat-messages API.
//!
//! Requests use blocking response mode; the reply and the conversation id
//! arrive in one JSON document. Transient failures are retried with
//! exponential backoff before being surfaced.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};
use std::marker::PhantomData;
use tokio::time::sleep;

use crate::domain::foundation::{ChannelKind, ConversationHandle};
use crate::ports::{ChannelError, ChannelReply, ChannelRequest, DialogueChannel};

use super::config::DifyChannelConfig;
use super::wire::{ChatMessageRequest, ChatMessageResponse, ErrorBody};

const RESPONSE_MODE: &str = "blocking";
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Dify-backed dialogue channel of kind `C`.
pub struct DifyChannel<C: ChannelKind> {
    config: DifyChannelConfig,
    client: Client,
    _channel: PhantomData<fn() -> C>,
}

impl<C: ChannelKind> DifyChannel<C> {
    /// Creates a channel with the given configuration.
    pub fn new(config: DifyChannelConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChannelError::network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            client,
            _channel: PhantomData,
        })
    }

    pub fn config(&self) -> &DifyChannelConfig {
        &self.config
    }

    /// Builds the chat-messages endpoint URL.
    fn chat_messages_url(&self) -> String {
        format!("{}/chat-messages", self.config.base_url)
    }

    /// Sends one attempt and maps transport failures.
    async fn send_request(&self, request: &ChannelRequest<C>) -> Result<Response, ChannelError> {
        let body = ChatMessageRequest {
            inputs: &request.variables,
            query: &request.utterance,
            response_mode: RESPONSE_MODE,
            conversation_id: request.handle.as_ref().map(|h| h.as_str()),
            user: request.participant.as_str(),
        };

        self.client
            .post(self.chat_messages_url())
            .bearer_auth(self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChannelError::timeout(self.config.timeout.as_secs())
                } else if e.is_connect() {
                    ChannelError::network(format!("Connection failed: {}", e))
                } else {
                    ChannelError::network(e.to_string())
                }
            })
    }

    /// Turns a response into a reply or a classified error.
    async fn parse_response(&self, response: Response) -> Result<ChannelReply<C>, ChannelError> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .text()
            .await
            .map_err(|e| ChannelError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), &body, retry_after.as_deref()));
        }
        decode_reply(&body)
    }

    async fn attempt(&self, request: &ChannelRequest<C>) -> Result<ChannelReply<C>, ChannelError> {
        let response = self.send_request(request).await?;
        self.parse_response(response).await
    }
}

#[async_trait]
impl<C: ChannelKind> DialogueChannel<C> for DifyChannel<C> {
    async fn send(&self, request: ChannelRequest<C>) -> Result<ChannelReply<C>, ChannelError> {
        tracing::debug!(
            channel = C::NAME,
            participant = %request.participant,
            continuing = request.handle.is_some(),
            utterance_chars = request.utterance.chars().count(),
            "sending chat message"
        );

        let mut retry_count = 0;
        loop {
            match self.attempt(&request).await {
                Ok(reply) => {
                    tracing::debug!(
                        channel = C::NAME,
                        conversation = %reply.handle,
                        reply_chars = reply.reply.chars().count(),
                        "chat message answered"
                    );
                    return Ok(reply);
                }
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    let delay = self.config.backoff_for(retry_count);
                    tracing::warn!(
                        channel = C::NAME,
                        error = %err,
                        attempt = retry_count + 1,
                        delay_ms = delay.as_millis() as u64,
                        "retrying chat message"
                    );
                    sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Maps a non-success status to a channel error.
fn classify_status(status: u16, body: &str, retry_after: Option<&str>) -> ChannelError {
    match status {
        401 | 403 => ChannelError::AuthenticationFailed,
        429 => ChannelError::rate_limited(parse_retry_after(retry_after)),
        400..=499 => ChannelError::invalid_request(ErrorBody::describe(body)),
        500..=599 => ChannelError::unavailable(format!(
            "Server error {}: {}",
            status,
            ErrorBody::describe(body)
        )),
        _ => ChannelError::network(format!("Unexpected status {}: {}", status, body)),
    }
}

fn parse_retry_after(header: Option<&str>) -> u64 {
    header
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Decodes a successful body.
///
/// A missing answer is an empty reply; a missing conversation id is
/// malformed because the next turn could not continue the dialogue.
fn decode_reply<C: ChannelKind>(body: &str) -> Result<ChannelReply<C>, ChannelError> {
    let parsed: ChatMessageResponse = serde_json::from_str(body)
        .map_err(|e| ChannelError::malformed(format!("Failed to parse response: {}", e)))?;

    let conversation_id = parsed
        .conversation_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ChannelError::malformed("missing conversation_id"))?;

    Ok(ChannelReply::new(
        parsed.answer.unwrap_or_default(),
        ConversationHandle::new(conversation_id),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Guidance, Summarizer};

    mod decoding {
        use super::*;

        #[test]
        fn decodes_answer_and_conversation() {
            let reply: ChannelReply<Guidance> =
                decode_reply(r#"{"answer":"Where is it? forest park","conversation_id":"c-1","id":"m-1"}"#)
                    .unwrap();
            assert_eq!(reply.reply, "Where is it? forest park");
            assert_eq!(reply.handle.as_str(), "c-1");
        }

        #[test]
        fn missing_answer_is_empty_reply() {
            let reply: ChannelReply<Summarizer> = decode_reply(r#"{"conversation_id":"c-2"}"#).unwrap();
            assert_eq!(reply.reply, "");
        }

        #[test]
        fn missing_conversation_is_malformed() {
            let err = decode_reply::<Guidance>(r#"{"answer":"hi"}"#).unwrap_err();
            assert!(err.is_malformed());

            let err = decode_reply::<Guidance>(r#"{"answer":"hi","conversation_id":""}"#).unwrap_err();
            assert!(err.is_malformed());
        }

        #[test]
        fn non_json_is_malformed() {
            let err = decode_reply::<Guidance>("<html>bad gateway</html>").unwrap_err();
            assert!(err.is_malformed());
            assert!(!err.is_retryable());
        }
    }

    mod status {
        use super::*;

        #[test]
        fn unauthorized_is_authentication_failure() {
            assert_eq!(classify_status(401, "", None), ChannelError::AuthenticationFailed);
        }

        #[test]
        fn too_many_requests_uses_retry_after_header() {
            assert_eq!(classify_status(429, "", Some("12")), ChannelError::rate_limited(12));
            assert_eq!(
                classify_status(429, "", Some("soon")),
                ChannelError::rate_limited(DEFAULT_RETRY_AFTER_SECS)
            );
        }

        #[test]
        fn client_errors_are_not_retryable() {
            let err = classify_status(400, r#"{"code":"invalid_param","message":"bad"}"#, None);
            assert_eq!(err, ChannelError::invalid_request("invalid_param: bad"));
            assert!(!err.is_retryable());
        }

        #[test]
        fn server_errors_are_retryable() {
            let err = classify_status(503, "maintenance", None);
            assert!(matches!(err, ChannelError::Unavailable { .. }));
            assert!(err.is_retryable());
        }
    }

    mod construction {
        use super::*;
        use std::time::Duration;

        #[test]
        fn url_appends_endpoint() {
            let channel: DifyChannel<Guidance> = DifyChannel::new(
                DifyChannelConfig::new("k").with_base_url("http://localhost:5001/v1/"),
            )
            .unwrap();
            assert_eq!(channel.chat_messages_url(), "http://localhost:5001/v1/chat-messages");
        }

        #[tokio::test]
        async fn unreachable_backend_surfaces_network_error() {
            let channel: DifyChannel<Guidance> = DifyChannel::new(
                DifyChannelConfig::new("k")
                    .with_base_url("http://127.0.0.1:9")
                    .with_timeout(Duration::from_secs(2))
                    .with_max_retries(1)
                    .with_retry_backoff(Duration::from_millis(1)),
            )
            .unwrap();

            let participant = crate::domain::foundation::ParticipantId::anonymous();
            let err = channel
                .send(ChannelRequest::new("hello", participant))
                .await
                .unwrap_err();
            assert!(err.is_retryable());
        }
    }
}
