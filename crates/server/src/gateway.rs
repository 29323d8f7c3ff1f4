//! Model gateway behind the API Gateway proxy route.
//!
//! The request names a Bedrock model in the `model_id` header and carries
//! `{"inputs": ..., "parameters": {...}}`. The reply is always a JSON array
//! with a single item; failures come back as status 500 with the error
//! chain in `generated_text`.

use crate::errors::GatewayError;
use crate::models::{GatewayRequest, ProxyEvent, ProxyResponse};
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine};
use llm::{EmbeddingVector, GeneratedText, ModelInvoker};
use log::{error, info, warn};

pub const MODEL_ID_HEADER: &str = "model_id";
pub const EMBEDDINGS_HEADER: &str = "embeddings";

pub async fn handle(event: &ProxyEvent, invoker: &dyn ModelInvoker) -> ProxyResponse {
    match process(event, invoker).await {
        Ok(body) => ProxyResponse::json(200, body),
        Err(e) => {
            match e.downcast_ref::<GatewayError>() {
                Some(gateway_error) if gateway_error.is_client_error() => {
                    warn!("Rejected gateway request: {}", gateway_error)
                }
                _ => error!("Gateway request failed: {:#}", e),
            }
            let body = serde_json::to_string(&[GeneratedText {
                generated_text: format!("{:?}", e),
            }])
            .unwrap_or_else(|_| "[]".to_string());
            ProxyResponse::json(500, body)
        }
    }
}

async fn process(event: &ProxyEvent, invoker: &dyn ModelInvoker) -> Result<String> {
    let model_id = event
        .header(MODEL_ID_HEADER)
        .filter(|value| !value.is_empty())
        .ok_or(GatewayError::MissingHeader(MODEL_ID_HEADER))?;
    let embeddings = event.header(EMBEDDINGS_HEADER).map_or(false, is_truthy);

    let request = parse_request(event)?;

    if embeddings {
        info!("Embedding request for model {}", model_id);
        let embedding = invoker
            .embed(model_id, &request.inputs)
            .await
            .map_err(|e| GatewayError::ModelError(format!("{:#}", e)))?;
        Ok(serde_json::to_string(&[EmbeddingVector { embedding }])?)
    } else {
        info!("Generation request for model {}", model_id);
        let generated_text = invoker
            .generate(model_id, &request.inputs, &request.parameters)
            .await
            .map_err(|e| GatewayError::ModelError(format!("{:#}", e)))?;
        Ok(serde_json::to_string(&[GeneratedText { generated_text }])?)
    }
}

fn parse_request(event: &ProxyEvent) -> Result<GatewayRequest, GatewayError> {
    let raw = event
        .body
        .as_deref()
        .ok_or_else(|| GatewayError::InvalidBody("request body is empty".to_string()))?;

    let decoded;
    let body = if event.is_base64_encoded {
        decoded = STANDARD
            .decode(raw)
            .map_err(|e| GatewayError::InvalidBody(format!("invalid base64 body: {}", e)))?;
        decoded.as_slice()
    } else {
        raw.as_bytes()
    };

    serde_json::from_slice(body).map_err(|e| GatewayError::InvalidBody(e.to_string()))
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}
