use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub mod config;

pub use config::Config;

/// Identifiers used to join feedback records to a specific logged call.
///
/// `run_id` groups every observation of one logical run (for example a
/// retrieval followed by a generation), `observation_id` is unique per call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationIds {
    pub run_id: String,
    pub observation_id: String,
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            observation_id: Uuid::new_v4().to_string(),
        }
    }

    /// Keeps an existing run and opens a new observation inside it.
    pub fn within_run(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            observation_id: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run_id={} observation_id={}", self.run_id, self.observation_id)
    }
}

/// Returns true when `value` parses as a UUID.
pub fn is_valid_id(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_distinct_identifiers() {
        let ids = CorrelationIds::new();
        assert_ne!(ids.run_id, ids.observation_id);
        assert!(is_valid_id(&ids.run_id));
        assert!(is_valid_id(&ids.observation_id));
    }

    #[test]
    fn should_keep_run_id_within_run() {
        let first = CorrelationIds::new();
        let second = CorrelationIds::within_run(first.run_id.clone());

        assert_eq!(first.run_id, second.run_id);
        assert_ne!(first.observation_id, second.observation_id);
    }

    #[test]
    fn should_serialize_correlation_ids() {
        let ids = CorrelationIds {
            run_id: "r".to_string(),
            observation_id: "o".to_string(),
        };

        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"{"run_id":"r","observation_id":"o"}"#);
    }

    #[test]
    fn should_reject_non_uuid_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-a-uuid"));
    }
}
