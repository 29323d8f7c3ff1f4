use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One logged call, delivered as a single JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub call_type: String,
    pub run_id: String,
    pub observation_id: String,
    pub timestamp_start: DateTime<Utc>,
    pub timestamp_end: DateTime<Utc>,
    pub duration_ms: u64,
    pub input_log: Value,
    pub output_log: Value,
    pub metadata: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogRecord {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Newline terminated JSON, the framing Firehose and the local file expect.
    pub fn to_json_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub call_type: String,
    pub capture_input: bool,
    pub capture_output: bool,
}

impl WatchOptions {
    pub fn new(call_type: impl Into<String>) -> Self {
        Self {
            call_type: call_type.into(),
            capture_input: true,
            capture_output: true,
        }
    }

    pub fn without_input(mut self) -> Self {
        self.capture_input = false;
        self
    }

    pub fn without_output(mut self) -> Self {
        self.capture_output = false;
        self
    }
}
