use crate::record::{LogRecord, WatchOptions};
use crate::sink::{FirehoseSink, LocalSink, LogSink};
use crate::LogError;
use chrono::Utc;
use rag_core::config::{LoggingConfig, LoggingMode};
use rag_core::CorrelationIds;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryMode {
    Local,
    Firehose { stream_name: String },
}

/// Result of a watched call.
///
/// `log` carries the record in local mode once the sink has stored it; in
/// Firehose mode, or when local delivery failed, it is `None` and only the
/// identifiers come back.
#[derive(Debug, Clone)]
pub struct Watched<R> {
    pub response: R,
    pub log: Option<LogRecord>,
    pub ids: CorrelationIds,
}

impl<R> Watched<R> {
    pub fn run_id(&self) -> &str {
        &self.ids.run_id
    }

    pub fn observation_id(&self) -> &str {
        &self.ids.observation_id
    }
}

pub struct BedrockLogs {
    mode: DeliveryMode,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for BedrockLogs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockLogs")
            .field("mode", &self.mode)
            .finish()
    }
}

impl BedrockLogs {
    pub fn new(mode: DeliveryMode, sink: Arc<dyn LogSink>) -> Self {
        Self { mode, sink }
    }

    pub fn local(sink: Arc<LocalSink>) -> Self {
        Self::new(DeliveryMode::Local, sink)
    }

    pub fn firehose(sink: FirehoseSink) -> Self {
        let stream_name = sink.stream_name().to_string();
        Self::new(DeliveryMode::Firehose { stream_name }, Arc::new(sink))
    }

    pub async fn from_config(config: &LoggingConfig, aws_region: &str) -> Result<Self, LogError> {
        match config.mode {
            LoggingMode::Local => {
                let sink = match &config.local_path {
                    Some(path) => LocalSink::with_file(path),
                    None => LocalSink::new(),
                };
                Ok(Self::local(Arc::new(sink)))
            }
            LoggingMode::Firehose => {
                let stream_name = config.delivery_stream.clone().ok_or_else(|| {
                    LogError::Delivery("no delivery stream configured".to_string())
                })?;
                Ok(Self::firehose(
                    FirehoseSink::new(stream_name, aws_region).await?,
                ))
            }
        }
    }

    pub fn mode(&self) -> &DeliveryMode {
        &self.mode
    }

    /// Runs `call`, logging its input, output and timing.
    ///
    /// A `run_id` string inside `metadata` is reused so several calls can be
    /// grouped into one run; otherwise a new run is opened. Every call gets a
    /// fresh `observation_id`. Delivery problems are logged and never fail
    /// the wrapped call; a failing call is logged with its error and the
    /// error is returned unchanged.
    pub async fn watch<I, R, E, F, Fut>(
        &self,
        options: &WatchOptions,
        metadata: Value,
        input: &I,
        call: F,
    ) -> Result<Watched<R>, E>
    where
        I: Serialize + ?Sized,
        R: Serialize,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let ids = match metadata.get("run_id").and_then(Value::as_str) {
            Some(run_id) if !run_id.is_empty() => CorrelationIds::within_run(run_id),
            _ => CorrelationIds::new(),
        };

        let input_log = if options.capture_input {
            capture(input)
        } else {
            Value::Null
        };

        let timestamp_start = Utc::now();
        let clock = Instant::now();
        let outcome = call().await;
        let duration_ms = clock.elapsed().as_millis() as u64;
        let timestamp_end = Utc::now();

        let (output_log, error) = match &outcome {
            Ok(response) if options.capture_output => (capture(response), None),
            Ok(_) => (Value::Null, None),
            Err(e) => (Value::Null, Some(e.to_string())),
        };

        let record = LogRecord {
            call_type: options.call_type.clone(),
            run_id: ids.run_id.clone(),
            observation_id: ids.observation_id.clone(),
            timestamp_start,
            timestamp_end,
            duration_ms,
            input_log,
            output_log,
            metadata,
            error,
        };

        let delivered = self.dispatch(&record).await;

        let response = outcome?;
        let log = match self.mode {
            DeliveryMode::Local if delivered => Some(record),
            _ => None,
        };

        Ok(Watched { response, log, ids })
    }

    async fn dispatch(&self, record: &LogRecord) -> bool {
        match self.sink.deliver(record).await {
            Ok(()) => {
                info!(
                    call_type = %record.call_type,
                    run_id = %record.run_id,
                    observation_id = %record.observation_id,
                    duration_ms = record.duration_ms,
                    "Logged call"
                );
                true
            }
            Err(e) => {
                warn!(
                    call_type = %record.call_type,
                    observation_id = %record.observation_id,
                    "Dropping log record: {}",
                    e
                );
                false
            }
        }
    }
}

fn capture<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value)
        .unwrap_or_else(|e| json!({ "capture_error": e.to_string() }))
}
