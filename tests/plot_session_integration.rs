//! Integration tests for a full plot brainstorming session.
//!
//! These tests drive the public API end to end:
//! 1. Controller with mock channels through opening, turns and completion
//! 2. A replacement extraction strategy behind `FieldExtractor`
//! 3. The Dify channel against a wiremock server

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use plot_brainstorm::adapters::{
    DifyChannel, DifyChannelConfig, InMemoryInteractionLog, MockDialogueChannel, MockReply,
};
use plot_brainstorm::application::{ExtractionController, TurnError};
use plot_brainstorm::domain::foundation::{Guidance, ParticipantId, Summarizer};
use plot_brainstorm::domain::plot::{
    CharacterProfile, ExtractionState, FieldExtractor, FieldValue, GateStatus,
    LabelledFieldReconciler, PlotField, PlotSession, Reconciliation, ReconcilerConfig,
    StageIncomplete, StructuredPlot,
};
use plot_brainstorm::ports::{ChannelError, ChannelRequest, DialogueChannel};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn reconciler() -> Arc<LabelledFieldReconciler> {
    Arc::new(LabelledFieldReconciler::new(ReconcilerConfig::default()).unwrap())
}

fn student() -> PlotSession {
    PlotSession::new(ParticipantId::new("student-integration").unwrap()).with_character(
        CharacterProfile::named("Mochi")
            .with_species("cat")
            .with_traits(["shy", "clever"]),
    )
}

const CHAT_MESSAGES: &str = "/v1/chat-messages";

async fn request_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request.body_json().unwrap())
        .collect()
}

fn dify_config(base_url: &str) -> DifyChannelConfig {
    DifyChannelConfig::new("app-test")
        .with_base_url(base_url)
        .with_timeout(Duration::from_secs(5))
        .with_max_retries(2)
        .with_retry_backoff(Duration::from_millis(1))
}

// =============================================================================
// Full Session
// =============================================================================

#[tokio::test]
async fn brainstorm_session_reaches_completed_plot() {
    let guidance = MockDialogueChannel::<Guidance>::new()
        .with_reply("Hello Mochi! Where does this story take place? school home forest park beach library")
        .with_reply("A forest! What goes wrong there? storm fire flood monster thief trap")
        .with_reply("Oh no! What does Mochi want? home friend treasure peace courage help");
    let summarizer = MockDialogueChannel::<Summarizer>::new()
        .with_reply("setting: forest\nconflict: unknown\ngoal: unknown")
        .with_reply("Setting: a misty forest\nConflict: a storm knocks down the tree house\nGoal: unknown")
        .with_reply("setting: a misty forest\nconflict: a storm knocks down the tree house\ngoal: rebuild the tree house with friends\nDONE");
    let log = Arc::new(InMemoryInteractionLog::new());
    let controller = ExtractionController::new(
        Arc::new(guidance.clone()),
        Arc::new(summarizer.clone()),
        reconciler(),
    )
    .with_interaction_log(log.clone());

    let mut session = student();
    let opening = controller.start(&mut session).await.unwrap();
    assert_eq!(opening.hints.len(), 6);
    assert!(guidance.get_calls()[0].utterance.contains("Character name: Mochi"));

    let first = controller.submit_hint(&mut session, 2).await.unwrap();
    assert_eq!(first.updated, vec![PlotField::Setting]);
    assert_eq!(first.gate, GateStatus::SummaryPending);

    let second = controller
        .submit_turn(&mut session, "a storm breaks the tree house")
        .await
        .unwrap();
    assert_eq!(second.updated, vec![PlotField::Setting, PlotField::Conflict]);
    assert_eq!(
        controller.complete_stage(&mut session),
        Err(StageIncomplete::SummaryPending)
    );

    let third = controller
        .submit_turn(&mut session, "she wants to rebuild it with her friends")
        .await
        .unwrap();
    assert_eq!(third.updated, vec![PlotField::Goal]);
    assert!(third.gate.is_open());

    let plot = controller.complete_stage(&mut session).unwrap();
    assert_eq!(plot.setting, "a misty forest");
    assert_eq!(plot.conflict, "a storm knocks down the tree house");
    assert_eq!(plot.goal, "rebuild the tree house with friends");
    assert_eq!(session.state(), ExtractionState::StageComplete);

    // the last summary saw every student answer
    let last_summary = summarizer.last_call().unwrap();
    assert!(last_summary.utterance.contains("forest\n\na storm breaks the tree house\n\nshe wants"));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(log.for_session(session.id()).len(), 3);
}

#[tokio::test]
async fn failed_turn_in_the_middle_of_a_session_is_recoverable() {
    let guidance = MockDialogueChannel::<Guidance>::new()
        .with_reply("Where? a b c d e f")
        .with_reply("Nice! g h i j k l")
        .with_error(ChannelError::unavailable("Server error 502"))
        .with_reply("Tell me more m n o p q r");
    let summarizer = MockDialogueChannel::<Summarizer>::new()
        .with_reply("setting: castle")
        .with_reply("setting: unknown\nconflict: the king is missing");
    let controller = ExtractionController::new(
        Arc::new(guidance.clone()),
        Arc::new(summarizer.clone()),
        reconciler(),
    );

    let mut session = student();
    controller.start(&mut session).await.unwrap();
    controller.submit_turn(&mut session, "a castle").await.unwrap();
    let before = session.transcript().clone();

    let err = controller.submit_turn(&mut session, "the king").await.unwrap_err();
    assert!(matches!(err, TurnError::ChannelUnavailable { .. }));
    assert_eq!(session.transcript(), &before);
    assert_eq!(summarizer.call_count(), 1);

    let outcome = controller.submit_turn(&mut session, "the king").await.unwrap();
    assert_eq!(outcome.plot.setting(), &FieldValue::Concrete("castle".into()));
    assert_eq!(
        outcome.plot.conflict(),
        &FieldValue::Concrete("the king is missing".into())
    );
    assert_eq!(session.transcript().len(), 5);
}

// =============================================================================
// Replaceable Extraction Strategy
// =============================================================================

/// Reads `field=value` pairs separated by `|`, as a stricter backend
/// contract might return them.
struct PipeExtractor;

impl FieldExtractor for PipeExtractor {
    fn extract_fields(&self, text: &str, prior: &StructuredPlot) -> Reconciliation {
        let mut values = [
            prior.setting().clone(),
            prior.conflict().clone(),
            prior.goal().clone(),
        ];
        let mut updated = Vec::new();
        for pair in text.split('|') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let Some(index) = PlotField::ALL.iter().position(|f| f.label() == name.trim()) else {
                continue;
            };
            let value = FieldValue::Concrete(value.trim().to_string());
            if values[index] != value {
                values[index] = value;
                updated.push(PlotField::ALL[index]);
            }
        }
        let [setting, conflict, goal] = values;
        Reconciliation {
            plot: StructuredPlot::with_values(setting, conflict, goal),
            updated,
            completion_marker_seen: text.contains("|complete"),
        }
    }
}

#[tokio::test]
async fn controller_accepts_a_replacement_extractor() {
    let summarizer = MockDialogueChannel::<Summarizer>::new()
        .with_reply("setting=moon base|conflict=the air is leaking|goal=fix the dome|complete");
    let controller = ExtractionController::new(
        Arc::new(MockDialogueChannel::<Guidance>::new()),
        Arc::new(summarizer),
        Arc::new(PipeExtractor),
    );

    let mut session = student();
    controller.start(&mut session).await.unwrap();
    let outcome = controller.submit_turn(&mut session, "space").await.unwrap();

    assert!(outcome.gate.is_open());
    assert_eq!(controller.complete_stage(&mut session).unwrap().setting, "moon base");
}

// =============================================================================
// Dify Channel over HTTP
// =============================================================================

#[tokio::test]
async fn dify_channel_speaks_chat_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_MESSAGES))
        .and(header("authorization", "Bearer app-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "event": "message",
            "answer": "Where is it? a b c d e f",
            "conversation_id": "conv-abc"
        })))
        .expect(2)
        .mount(&server)
        .await;
    let channel = DifyChannel::<Guidance>::new(dify_config(&format!("{}/v1", server.uri()))).unwrap();
    let participant = ParticipantId::new("student-http").unwrap();

    let first = channel
        .send(ChannelRequest::new("hello", participant.clone()))
        .await
        .unwrap();
    assert_eq!(first.handle.as_str(), "conv-abc");
    assert_eq!(first.reply, "Where is it? a b c d e f");

    channel
        .send(
            ChannelRequest::new("a castle", participant)
                .with_handle(Some(first.handle))
                .with_variable("conversation", "a castle"),
        )
        .await
        .unwrap();

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["query"], "hello");
    assert_eq!(bodies[0]["response_mode"], "blocking");
    assert_eq!(bodies[0]["user"], "student-http");
    assert!(bodies[0].get("conversation_id").is_none());
    assert_eq!(bodies[1]["conversation_id"], "conv-abc");
    assert_eq!(bodies[1]["inputs"]["conversation"], "a castle");
}

#[tokio::test]
async fn dify_channel_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_MESSAGES))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"code": "unavailable", "message": "busy"})),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(CHAT_MESSAGES))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"answer": "setting: cave", "conversation_id": "conv-s"})),
        )
        .mount(&server)
        .await;
    let channel = DifyChannel::<Summarizer>::new(dify_config(&format!("{}/v1", server.uri()))).unwrap();

    let reply = channel
        .send(ChannelRequest::new("summarize", ParticipantId::anonymous()))
        .await
        .unwrap();

    assert_eq!(reply.reply, "setting: cave");
    assert_eq!(request_bodies(&server).await.len(), 2);
}

#[tokio::test]
async fn dify_channel_does_not_retry_rejected_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_MESSAGES))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "invalid_param",
            "message": "query is required"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let channel = DifyChannel::<Guidance>::new(dify_config(&format!("{}/v1", server.uri()))).unwrap();

    let err = channel
        .send(ChannelRequest::new("", ParticipantId::anonymous()))
        .await
        .unwrap_err();

    assert_eq!(err, ChannelError::invalid_request("invalid_param: query is required"));
}

#[tokio::test]
async fn dify_channel_reads_non_ascii_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_MESSAGES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "这个故事发生在哪呢？ 学校 家 森林 公园 海滩 图书馆",
            "conversation_id": "conv-zh"
        })))
        .mount(&server)
        .await;
    let channel = DifyChannel::<Guidance>::new(dify_config(&format!("{}/v1", server.uri()))).unwrap();

    let reply = channel
        .send(ChannelRequest::new("森林", ParticipantId::anonymous()))
        .await
        .unwrap();

    assert!(reply.reply.ends_with("图书馆"));
    assert_eq!(request_bodies(&server).await[0]["query"], "森林");
}

#[tokio::test]
async fn dify_reply_without_conversation_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CHAT_MESSAGES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "hi"})))
        .mount(&server)
        .await;
    let channel = DifyChannel::<Guidance>::new(dify_config(&format!("{}/v1", server.uri()))).unwrap();

    let err = channel
        .send(ChannelRequest::new("hello", ParticipantId::anonymous()))
        .await
        .unwrap_err();

    assert!(err.is_malformed());
}
