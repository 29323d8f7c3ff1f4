//! Provider specific request/response shapes for `invoke_model`.
//!
//! Every Bedrock model family expects its own JSON body and returns its own
//! response document. The helpers here translate between those shapes and a
//! plain prompt/completion pair.

use serde_json::{json, Map, Value};
use std::fmt;
use thiserror::Error;

pub type ModelKwargs = Map<String, Value>;

const DEFAULT_MAX_TOKENS_TO_SAMPLE: u64 = 50;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("response body is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response body is missing field '{0}'")]
    MissingField(&'static str),

    #[error("provider '{0}' does not support embeddings")]
    EmbeddingsUnsupported(Provider),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    Ai21,
    Amazon,
    Cohere,
    Meta,
    Other(String),
}

impl Provider {
    /// Derives the provider from a model id such as `anthropic.claude-v2`.
    pub fn from_model_id(model_id: &str) -> Self {
        let prefix = model_id.split('.').next().unwrap_or_default();
        match prefix.to_ascii_lowercase().as_str() {
            "anthropic" => Provider::Anthropic,
            "ai21" => Provider::Ai21,
            "amazon" => Provider::Amazon,
            "cohere" => Provider::Cohere,
            "meta" => Provider::Meta,
            other => Provider::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Ai21 => "ai21",
            Provider::Amazon => "amazon",
            Provider::Cohere => "cohere",
            Provider::Meta => "meta",
            Provider::Other(name) => name,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds the `invoke_model` body for `provider`.
pub fn prepare_input(provider: &Provider, prompt: &str, kwargs: &ModelKwargs) -> Value {
    match provider {
        Provider::Amazon => json!({
            "inputText": prompt,
            "textGenerationConfig": Value::Object(kwargs.clone()),
        }),
        Provider::Anthropic | Provider::Ai21 | Provider::Cohere | Provider::Meta => {
            let mut body = kwargs.clone();
            body.insert("prompt".to_string(), Value::String(prompt.to_string()));
            if *provider == Provider::Anthropic && !body.contains_key("max_tokens_to_sample") {
                body.insert(
                    "max_tokens_to_sample".to_string(),
                    json!(DEFAULT_MAX_TOKENS_TO_SAMPLE),
                );
            }
            Value::Object(body)
        }
        Provider::Other(_) => {
            let mut body = kwargs.clone();
            body.insert("inputText".to_string(), Value::String(prompt.to_string()));
            Value::Object(body)
        }
    }
}

/// Extracts the generated text from an `invoke_model` response body.
pub fn prepare_output(provider: &Provider, body: &[u8]) -> Result<String, PayloadError> {
    let response: Value = serde_json::from_slice(body)?;

    let text = match provider {
        Provider::Anthropic => response.get("completion"),
        Provider::Ai21 => response.pointer("/completions/0/data/text"),
        Provider::Cohere => response.pointer("/generations/0/text"),
        Provider::Meta => response.get("generation"),
        Provider::Amazon | Provider::Other(_) => response.pointer("/results/0/outputText"),
    };

    text.and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(PayloadError::MissingField(output_field(provider)))
}

fn output_field(provider: &Provider) -> &'static str {
    match provider {
        Provider::Anthropic => "completion",
        Provider::Ai21 => "completions[0].data.text",
        Provider::Cohere => "generations[0].text",
        Provider::Meta => "generation",
        Provider::Amazon | Provider::Other(_) => "results[0].outputText",
    }
}

/// Builds the body of an embedding request (Titan or Cohere embed models).
pub fn prepare_embedding_input(provider: &Provider, text: &str) -> Result<Value, PayloadError> {
    match provider {
        Provider::Amazon => Ok(json!({ "inputText": text })),
        Provider::Cohere => Ok(json!({
            "texts": [text],
            "input_type": "search_document",
        })),
        other => Err(PayloadError::EmbeddingsUnsupported(other.clone())),
    }
}

pub fn prepare_embedding_output(provider: &Provider, body: &[u8]) -> Result<Vec<f32>, PayloadError> {
    let response: Value = serde_json::from_slice(body)?;

    let (vector, field) = match provider {
        Provider::Amazon => (response.get("embedding"), "embedding"),
        Provider::Cohere => (response.pointer("/embeddings/0"), "embeddings[0]"),
        other => return Err(PayloadError::EmbeddingsUnsupported(other.clone())),
    };

    let vector = vector.ok_or(PayloadError::MissingField(field))?;
    Ok(serde_json::from_value(vector.clone())?)
}
