//! Integration tests for the risklens-agent crate.
//!
//! These tests drive the full pipeline against a scripted chat model, so
//! every dispatch path and payload contract is exercised without a live
//! endpoint. The scripted model replays canned replies in order and
//! records every request it receives.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use risklens_agent::{
    AgentError, ChatModel, ChatRequest, Pipeline, PipelineConfig, Result,
};
use risklens_core::{RiskRegister, Value, schema};

// ═══════════════════════════════════════════════════════════════════════
//  Test double
// ═══════════════════════════════════════════════════════════════════════

struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        self.calls.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AgentError::RequestFailed {
                reason: "scripted model ran out of replies".into(),
            })
    }
}

fn pipeline_with(replies: &[&str]) -> (Pipeline, Arc<ScriptedModel>) {
    let model = ScriptedModel::new(replies);
    let pipeline = Pipeline::new(model.clone(), &PipelineConfig::default());
    (pipeline, model)
}

/// The JSON object a stage received as its user message.
fn user_payload(request: &ChatRequest) -> serde_json::Value {
    let content = &request.messages.last().unwrap().content;
    serde_json::from_str(content).unwrap()
}

fn payload_keys(payload: &serde_json::Value) -> Vec<String> {
    payload.as_object().unwrap().keys().cloned().collect()
}

// ═══════════════════════════════════════════════════════════════════════
//  Register fixture
// ═══════════════════════════════════════════════════════════════════════

fn register(rows: &[&[(&str, &str)]]) -> RiskRegister {
    let mut text: String = schema::column_names().collect::<Vec<_>>().join(",");
    text.push('\n');
    for overrides in rows {
        let cells: Vec<&str> = schema::COLUMNS
            .iter()
            .map(|col| {
                overrides
                    .iter()
                    .find(|(name, _)| *name == col.name)
                    .map(|(_, value)| *value)
                    .unwrap_or("")
            })
            .collect();
        text.push_str(&cells.join(","));
        text.push('\n');
    }
    RiskRegister::from_csv_reader(text.as_bytes()).unwrap()
}

fn sample_register() -> RiskRegister {
    register(&[
        &[
            ("RiskIDNumber", "R-001"),
            ("Contract:Region", "North East"),
            ("Risk Type - Reputational", "true"),
            ("Status", "Open"),
        ],
        &[
            ("RiskIDNumber", "R-002"),
            ("Contract:Region", "South"),
            ("Risk Type - Reputational", "true"),
            ("Status", "Open"),
        ],
        &[
            ("RiskIDNumber", "R-003"),
            ("Contract:Region", "North West"),
            ("Risk Type - Reputational", "false"),
            ("Status", "Closed"),
        ],
    ])
}

/// A well-formed filter reply that matches only R-001 in the fixture.
const FILTER_REPLY: &str = r#"{"filter": {"type": "and", "clauses": [{"type": "compare", "column": "Risk Type - Reputational", "op": "eq", "value": true}, {"type": "contains", "column": "Contract:Region", "value": "north"}]}, "explanation": "Keeps reputational risks in northern regions."}"#;

// ═══════════════════════════════════════════════════════════════════════
//  Dispatch
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn empty_intent_set_runs_nothing_else() {
    let (pipeline, model) = pipeline_with(&["[]"]);
    let outcome = pipeline.run("???", &sample_register()).await.unwrap();

    assert_eq!(model.calls().len(), 1);
    assert!(outcome.intents.is_empty());
    assert!(outcome.filtered.is_none());
    assert!(outcome.filter_explanation.is_none());
    assert!(outcome.summary.is_none());
    assert!(outcome.final_answer.is_none());
    assert!(outcome.narrative().is_none());
}

#[tokio::test]
async fn filter_only_query_stops_after_filtering() {
    let (pipeline, model) = pipeline_with(&[r#"["filter_data"]"#, FILTER_REPLY]);
    let source = sample_register();
    let outcome = pipeline
        .run("show reputational risks in the north", &source)
        .await
        .unwrap();

    assert_eq!(model.calls().len(), 2);

    let subset = outcome.filtered.unwrap();
    assert_eq!(subset.len(), 1);
    assert_eq!(
        subset.rows()[0].cell("RiskIDNumber"),
        Some(&Value::Text("R-001".into()))
    );
    assert_eq!(source.len(), 3);

    assert_eq!(
        outcome.filter_explanation.as_deref(),
        Some("Keeps reputational risks in northern regions.")
    );
    assert!(outcome.summary.is_none());
    assert!(outcome.final_answer.is_none());
}

#[tokio::test]
async fn summary_without_filter_sees_the_whole_register() {
    let (pipeline, model) = pipeline_with(&[
        r#"["summarise_risks"]"#,
        "The register is dominated by open reputational risks.",
    ]);
    let outcome = pipeline
        .run("give me an overview", &sample_register())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 2);

    let payload = user_payload(&calls[1]);
    assert_eq!(payload["user_prompt"], "give me an overview");
    assert_eq!(payload["complete_unfiltered_data"].as_array().unwrap().len(), 3);
    assert!(payload.get("filtered_data").is_none());
    assert!(payload.get("filter_explanation").is_none());

    assert_eq!(
        outcome.narrative(),
        Some("The register is dominated by open reputational risks.")
    );
}

#[tokio::test]
async fn filter_then_summary_passes_the_subset_along() {
    let (pipeline, model) = pipeline_with(&[
        r#"["filter_data", "summarise_risks"]"#,
        FILTER_REPLY,
        "One reputational risk is open in the north east.",
    ]);
    let outcome = pipeline
        .run("summarise northern reputational risks", &sample_register())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 3);

    let payload = user_payload(&calls[2]);
    let rows = payload["filtered_data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["RiskIDNumber"], "R-001");
    assert_eq!(
        payload["filter_explanation"],
        "Keeps reputational risks in northern regions."
    );
    assert!(payload.get("complete_unfiltered_data").is_none());

    assert!(outcome.summary.is_some());
    assert!(outcome.final_answer.is_none());
}

#[tokio::test]
async fn direct_question_reaches_the_answer_stage_bare() {
    let (pipeline, model) = pipeline_with(&[
        r#"["other"]"#,
        "SHE stands for safety, health and environment.",
    ]);
    let outcome = pipeline
        .run("What does SHE stand for?", &sample_register())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 2);

    let payload = user_payload(&calls[1]);
    assert_eq!(payload_keys(&payload), vec!["user_prompt"]);

    assert_eq!(
        outcome.narrative(),
        Some("SHE stands for safety, health and environment.")
    );
    assert!(outcome.summary.is_none());
}

#[tokio::test]
async fn answer_sees_rows_when_nothing_was_summarised() {
    let (pipeline, model) = pipeline_with(&[
        r#"["filter_data", "other"]"#,
        FILTER_REPLY,
        "Compared with sector norms, one open reputational risk is modest.",
    ]);
    pipeline
        .run("are the northern reputational risks unusual?", &sample_register())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 3);

    let payload = user_payload(&calls[2]);
    assert!(payload.get("prior_summary").is_none());
    assert_eq!(payload["filtered_data"].as_array().unwrap().len(), 1);
    assert_eq!(
        payload["filter_explanation"],
        "Keeps reputational risks in northern regions."
    );
}

#[tokio::test]
async fn answer_prefers_the_summary_over_raw_rows() {
    let (pipeline, model) = pipeline_with(&[
        r#"["filter_data", "summarise_risks", "other"]"#,
        FILTER_REPLY,
        "One open reputational risk in the north east.",
        "Given that picture, exposure in the north looks contained.",
    ]);
    let outcome = pipeline
        .run(
            "summarise northern reputational risks and tell me if we should worry",
            &sample_register(),
        )
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls.len(), 4);

    let payload = user_payload(&calls[3]);
    assert_eq!(
        payload["prior_summary"],
        "One open reputational risk in the north east."
    );
    assert!(payload.get("filtered_data").is_none());
    assert_eq!(
        payload["filter_explanation"],
        "Keeps reputational risks in northern regions."
    );

    assert_eq!(
        outcome.narrative(),
        Some("Given that picture, exposure in the north looks contained.")
    );
    assert_eq!(
        outcome.summary.as_deref(),
        Some("One open reputational risk in the north east.")
    );
}

#[tokio::test]
async fn empty_subset_still_flows_to_the_summary() {
    let no_match = r#"{"filter": {"type": "compare", "column": "Status", "op": "eq", "value": "Archived"}, "explanation": "Keeps archived risks."}"#;
    let (pipeline, model) = pipeline_with(&[
        r#"["filter_data", "summarise_risks"]"#,
        no_match,
        "No risks are archived.",
    ]);
    let outcome = pipeline
        .run("summarise the archived risks", &sample_register())
        .await
        .unwrap();

    assert_eq!(outcome.filtered.as_ref().unwrap().len(), 0);

    let payload = user_payload(&model.calls()[2]);
    assert_eq!(payload["filtered_data"], serde_json::json!([]));
    assert_eq!(outcome.summary.as_deref(), Some("No risks are archived."));
}

// ═══════════════════════════════════════════════════════════════════════
//  Failure modes
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn malformed_intent_reply_fails_the_query() {
    let (pipeline, model) = pipeline_with(&["the intent is probably filter_data"]);
    let err = pipeline
        .run("show open risks", &sample_register())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::IntentParseFailed { .. }));
    assert_eq!(model.calls().len(), 1);
}

#[tokio::test]
async fn malformed_filter_reply_embeds_the_raw_text() {
    let (pipeline, model) = pipeline_with(&[r#"["filter_data"]"#, "I would filter by region."]);
    let err = pipeline
        .run("show northern risks", &sample_register())
        .await
        .unwrap_err();

    match err {
        AgentError::FilterParseFailed { reason } => {
            assert!(
                reason.contains("I would filter by region."),
                "raw reply missing from: {reason}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn filter_against_unknown_column_stops_the_query() {
    let bad = r#"{"filter": {"type": "compare", "column": "Shoe Size", "op": "eq", "value": 9}, "explanation": "Filters by shoe size."}"#;
    let (pipeline, model) = pipeline_with(&[r#"["filter_data", "summarise_risks"]"#, bad]);
    let err = pipeline
        .run("show risks by shoe size", &sample_register())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AgentError::Register(risklens_core::RegisterError::UnknownColumn { .. })
    ));
    // The summary stage never runs after a rejected filter.
    assert_eq!(model.calls().len(), 2);
}

#[tokio::test]
async fn blank_summary_reply_is_an_error() {
    let (pipeline, _model) = pipeline_with(&[r#"["summarise_risks"]"#, "   \n"]);
    let err = pipeline
        .run("summarise the register", &sample_register())
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::EmptyResponse { .. }));
}

// ═══════════════════════════════════════════════════════════════════════
//  Stage configuration
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn each_stage_uses_its_configured_model_and_temperature() {
    let config = PipelineConfig {
        classifier_model: "m-classify".into(),
        filter_model: "m-filter".into(),
        summary_model: "m-summary".into(),
        answer_model: "m-answer".into(),
        ..PipelineConfig::default()
    };
    let model = ScriptedModel::new(&[
        r#"["filter_data", "summarise_risks", "other"]"#,
        FILTER_REPLY,
        "A summary.",
        "An answer.",
    ]);
    let pipeline = Pipeline::new(model.clone(), &config);
    pipeline
        .run("summarise and advise", &sample_register())
        .await
        .unwrap();

    let calls = model.calls();
    assert_eq!(calls[0].model, "m-classify");
    assert_eq!(calls[1].model, "m-filter");
    assert_eq!(calls[2].model, "m-summary");
    assert_eq!(calls[3].model, "m-answer");

    assert_eq!(calls[0].temperature, Some(0.0));
    assert_eq!(calls[1].temperature, Some(0.0));
    assert_eq!(calls[2].temperature, Some(0.2));
    assert_eq!(calls[3].temperature, Some(0.0));
}

#[tokio::test]
async fn stages_prompt_with_system_then_user() {
    let (pipeline, model) = pipeline_with(&[r#"["other"]"#, "An answer."]);
    pipeline.run("hello there", &sample_register()).await.unwrap();

    for call in model.calls() {
        assert_eq!(call.messages.len(), 2);
        assert_eq!(call.messages[0].role, risklens_agent::Role::System);
        assert_eq!(call.messages[1].role, risklens_agent::Role::User);
    }
}
