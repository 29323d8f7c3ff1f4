use crate::record::WatchOptions;
use crate::watch::{BedrockLogs, Watched};
use crate::LogError;
use rag_core::is_valid_id;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const FEEDBACK_CALL_TYPE: &str = "Feedback";

/// Human feedback about one logged observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub user_id: String,
    pub run_id: String,
    pub observation_id: String,
    pub feedback: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Feedback {
    pub fn for_call<R>(user_id: impl Into<String>, watched: &Watched<R>, feedback: Value) -> Self {
        Self {
            user_id: user_id.into(),
            run_id: watched.run_id().to_string(),
            observation_id: watched.observation_id().to_string(),
            feedback,
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn validate(&self) -> Result<(), LogError> {
        // Runs may be named by the caller, observations are always generated.
        if self.run_id.trim().is_empty() {
            return Err(LogError::InvalidFeedback("run_id cannot be empty".to_string()));
        }
        if !is_valid_id(&self.observation_id) {
            return Err(LogError::InvalidFeedback(format!(
                "observation_id '{}' is not a valid identifier",
                self.observation_id
            )));
        }
        if self.feedback.is_null() {
            return Err(LogError::InvalidFeedback(
                "feedback payload cannot be null".to_string(),
            ));
        }
        Ok(())
    }
}

impl BedrockLogs {
    /// Logs `feedback` under the run it refers to.
    ///
    /// The feedback record shares the original `run_id` and names the rated
    /// observation in its metadata, which is the join key downstream.
    pub async fn collect_feedback(&self, feedback: &Feedback) -> Result<Watched<Value>, LogError> {
        feedback.validate()?;

        let metadata = json!({
            "run_id": feedback.run_id,
            "feedback_for": feedback.observation_id,
            "user_id": feedback.user_id,
        });

        self.watch(
            &WatchOptions::new(FEEDBACK_CALL_TYPE),
            metadata,
            feedback,
            || async { Ok::<_, LogError>(json!({ "status": "received" })) },
        )
        .await
    }
}
