use crate::models::ModelConfig;
use crate::payload::{
    prepare_embedding_input, prepare_embedding_output, prepare_input, prepare_output,
    ModelKwargs, Provider,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{primitives::Blob, Client};
use log::{error, info};
use std::time::Duration;

/// Anything that can run a raw `invoke_model` call.
///
/// The provided methods shape the request and response bodies, so an
/// implementor only moves bytes.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>>;

    async fn generate(&self, model_id: &str, prompt: &str, kwargs: &ModelKwargs) -> Result<String> {
        let provider = Provider::from_model_id(model_id);
        let body = serde_json::to_vec(&prepare_input(&provider, prompt, kwargs))?;

        let response = self.invoke(model_id, body).await?;

        prepare_output(&provider, &response)
            .with_context(|| format!("Failed to read {} response", provider))
    }

    async fn embed(&self, model_id: &str, text: &str) -> Result<Vec<f32>> {
        let provider = Provider::from_model_id(model_id);
        let body = serde_json::to_vec(&prepare_embedding_input(&provider, text)?)?;

        let response = self.invoke(model_id, body).await?;

        prepare_embedding_output(&provider, &response)
            .with_context(|| format!("Failed to read {} embedding", provider))
    }
}

pub struct BedrockClient {
    client: Client,
    config: ModelConfig,
}

impl BedrockClient {
    pub async fn new(config: ModelConfig) -> Result<Self> {
        info!("Initializing BedrockClient");
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.aws_region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let aws_config = loader.load().await;

        let client = Client::new(&aws_config);

        Ok(Self { client, config })
    }
}

#[async_trait]
impl ModelInvoker for BedrockClient {
    async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        info!("Sending request to Bedrock model: {}", model_id);

        let request = self
            .client
            .invoke_model()
            .model_id(model_id)
            .accept("application/json")
            .content_type("application/json")
            .body(Blob::new(body))
            .send();

        let response = tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), request)
            .await
            .with_context(|| {
                format!(
                    "Bedrock model {} timed out after {}s",
                    model_id, self.config.timeout_secs
                )
            })?
            .map_err(|e| {
                error!("Bedrock invoke_model error: {:?}", e);
                anyhow::anyhow!("Failed to invoke Bedrock model {}: {}", model_id, e)
            })?;

        info!("Received response from Bedrock model: {}", model_id);
        Ok(response.body().as_ref().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct RecordingInvoker {
        response: Vec<u8>,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl RecordingInvoker {
        fn new(response: Value) -> Self {
            Self {
                response: serde_json::to_vec(&response).unwrap(),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelInvoker for RecordingInvoker {
        async fn invoke(&self, model_id: &str, body: Vec<u8>) -> Result<Vec<u8>> {
            let body: Value = serde_json::from_slice(&body)?;
            self.requests
                .lock()
                .unwrap()
                .push((model_id.to_string(), body));
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn should_create_bedrock_client() {
        let config = ModelConfig {
            aws_region: Some("us-east-1".to_string()),
            ..ModelConfig::default()
        };

        let result = BedrockClient::new(config).await;

        assert!(result.is_ok(), "BedrockClient creation should not need credentials");
    }

    #[tokio::test]
    async fn should_generate_through_provider_shapes() {
        let invoker = RecordingInvoker::new(json!({"completion": " Paris"}));

        let text = invoker
            .generate("anthropic.claude-v2", "Capital of France?", &ModelKwargs::new())
            .await
            .unwrap();

        assert_eq!(text, " Paris");
        let requests = invoker.requests.lock().unwrap();
        assert_eq!(requests[0].0, "anthropic.claude-v2");
        assert_eq!(requests[0].1["prompt"], "Capital of France?");
        assert_eq!(requests[0].1["max_tokens_to_sample"], 50);
    }

    #[tokio::test]
    async fn should_embed_with_titan_shape() {
        let invoker = RecordingInvoker::new(json!({"embedding": [1.0, 2.0]}));

        let vector = invoker
            .embed("amazon.titan-embed-text-v1", "hello")
            .await
            .unwrap();

        assert_eq!(vector, vec![1.0, 2.0]);
        let requests = invoker.requests.lock().unwrap();
        assert_eq!(requests[0].1, json!({"inputText": "hello"}));
    }

    #[tokio::test]
    async fn should_fail_generation_on_unexpected_body() {
        let invoker = RecordingInvoker::new(json!({"unexpected": true}));

        let result = invoker
            .generate("amazon.titan-text-express-v1", "hi", &ModelKwargs::new())
            .await;

        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("results[0].outputText"));
    }

    #[tokio::test]
    #[ignore = "Requires AWS credentials with Bedrock model access"]
    async fn should_invoke_real_titan_model() {
        let client = BedrockClient::new(ModelConfig::default()).await.unwrap();

        let text = client
            .generate("amazon.titan-text-express-v1", "Say hi", &ModelKwargs::new())
            .await
            .unwrap();

        assert!(!text.is_empty());
    }
}
