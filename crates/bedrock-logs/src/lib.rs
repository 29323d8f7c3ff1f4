//! Request/response logging and feedback collection for Bedrock calls.
//!
//! [`BedrockLogs::watch`] wraps a call, captures its input and output, tags
//! it with a `run_id`/`observation_id` pair and hands a [`LogRecord`] to a
//! [`LogSink`]. [`BedrockLogs::collect_feedback`] logs user feedback under
//! the same identifiers so both can be joined downstream.

pub mod feedback;
pub mod record;
pub mod sink;
pub mod watch;

pub use feedback::Feedback;
pub use record::{LogRecord, WatchOptions};
pub use sink::{FirehoseSink, LocalSink, LogSink};
pub use watch::{BedrockLogs, DeliveryMode, Watched};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogError {
    #[error("Failed to serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Log delivery failed: {0}")]
    Delivery(String),

    #[error("Invalid feedback: {0}")]
    InvalidFeedback(String),
}
