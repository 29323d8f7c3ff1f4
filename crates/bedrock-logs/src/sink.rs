use crate::record::LogRecord;
use crate::LogError;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_firehose::{primitives::Blob, types::Record, Client as FirehoseClient};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

#[async_trait]
pub trait LogSink: Send + Sync {
    async fn deliver(&self, record: &LogRecord) -> Result<(), LogError>;
}

/// Keeps delivered records in memory and optionally appends them to a JSON
/// lines file.
#[derive(Debug, Default)]
pub struct LocalSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
    path: Option<PathBuf>,
}

impl LocalSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            records: Arc::default(),
            path: Some(path.into()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Records sharing `run_id`, in delivery order.
    pub fn records_for_run(&self, run_id: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.run_id == run_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LogSink for LocalSink {
    async fn deliver(&self, record: &LogRecord) -> Result<(), LogError> {
        if let Some(path) = &self.path {
            let line = record.to_json_line()?;
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(&line).await?;
            file.flush().await?;
        }

        self.records
            .lock()
            .map_err(|_| LogError::Delivery("local record buffer poisoned".to_string()))?
            .push(record.clone());

        debug!(
            run_id = %record.run_id,
            observation_id = %record.observation_id,
            "Stored log record locally"
        );
        Ok(())
    }
}

/// Streams records to a Kinesis Data Firehose delivery stream.
pub struct FirehoseSink {
    client: FirehoseClient,
    stream_name: String,
}

impl FirehoseSink {
    pub async fn new(stream_name: impl Into<String>, aws_region: &str) -> Result<Self, LogError> {
        let stream_name = stream_name.into();
        if stream_name.is_empty() {
            return Err(LogError::Delivery(
                "delivery stream name cannot be empty".to_string(),
            ));
        }

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(aws_region.to_string()))
            .load()
            .await;

        Ok(Self {
            client: FirehoseClient::new(&aws_config),
            stream_name,
        })
    }

    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }
}

#[async_trait]
impl LogSink for FirehoseSink {
    async fn deliver(&self, record: &LogRecord) -> Result<(), LogError> {
        let data = Record::builder()
            .data(Blob::new(record.to_json_line()?))
            .build()
            .map_err(|e| LogError::Delivery(e.to_string()))?;

        self.client
            .put_record()
            .delivery_stream_name(&self.stream_name)
            .record(data)
            .send()
            .await
            .map_err(|e| {
                error!("Firehose put_record failed: {}", e);
                LogError::Delivery(e.to_string())
            })?;

        debug!(
            stream = %self.stream_name,
            observation_id = %record.observation_id,
            "Delivered log record to Firehose"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn record(run_id: &str, observation_id: &str) -> LogRecord {
        let now = Utc::now();
        LogRecord {
            call_type: "test".to_string(),
            run_id: run_id.to_string(),
            observation_id: observation_id.to_string(),
            timestamp_start: now,
            timestamp_end: now,
            duration_ms: 0,
            input_log: json!(null),
            output_log: json!(null),
            metadata: json!({}),
            error: None,
        }
    }

    #[tokio::test]
    async fn should_keep_records_in_memory() {
        let sink = LocalSink::new();
        assert!(sink.is_empty());

        sink.deliver(&record("r1", "o1")).await.unwrap();
        sink.deliver(&record("r2", "o2")).await.unwrap();
        sink.deliver(&record("r1", "o3")).await.unwrap();

        assert_eq!(sink.len(), 3);
        let run = sink.records_for_run("r1");
        assert_eq!(run.len(), 2);
        assert_eq!(run[1].observation_id, "o3");
    }

    #[tokio::test]
    async fn should_append_json_lines_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("logs.jsonl");
        let sink = LocalSink::with_file(&path);

        sink.deliver(&record("r1", "o1")).await.unwrap();
        sink.deliver(&record("r1", "o2")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: LogRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.observation_id, "o2");
    }

    #[tokio::test]
    async fn should_reject_empty_stream_name() {
        let result = FirehoseSink::new("", "us-east-1").await;
        assert!(matches!(result, Err(LogError::Delivery(_))));
    }

    #[tokio::test]
    #[ignore = "Requires AWS credentials and an existing Firehose delivery stream"]
    async fn should_deliver_record_to_firehose() {
        let stream = std::env::var("FIREHOSE_STREAM_NAME").unwrap();
        let sink = FirehoseSink::new(stream, "us-east-1").await.unwrap();

        sink.deliver(&record("r1", "o1")).await.unwrap();
    }
}
