//! Watched knowledge-base queries and feedback, as driven by `rag-demo`.

use bedrock_logs::{BedrockLogs, Feedback, LogError, WatchOptions, Watched};
use llm::{RagError, RagRequest, RagResponse, RetrieveAndGenerate};
use serde_json::{json, Value};

pub const RAG_CALL_TYPE: &str = "RAG";

/// Runs a retrieve-and-generate call under `logs.watch`.
///
/// `user_id` and the Bedrock session are recorded as metadata; pass the
/// `run_id` of an earlier answer to keep follow-up questions in one run.
pub async fn ask(
    logs: &BedrockLogs,
    rag: &dyn RetrieveAndGenerate,
    request: &RagRequest,
    user_id: &str,
    run_id: Option<&str>,
) -> Result<Watched<RagResponse>, RagError> {
    let mut metadata = json!({
        "user_id": user_id,
        "session_id": request.session_id,
    });
    if let Some(run_id) = run_id {
        metadata["run_id"] = Value::String(run_id.to_string());
    }

    logs.watch(&WatchOptions::new(RAG_CALL_TYPE), metadata, request, || {
        rag.retrieve_and_generate(request)
    })
    .await
}

pub async fn rate_answer(
    logs: &BedrockLogs,
    answer: &Watched<RagResponse>,
    user_id: &str,
    score: i64,
    comment: Option<String>,
) -> Result<Watched<Value>, LogError> {
    let mut feedback = Feedback::for_call(user_id, answer, json!({ "score": score }));
    if let Some(comment) = comment {
        feedback = feedback.with_comment(comment);
    }
    logs.collect_feedback(&feedback).await
}
