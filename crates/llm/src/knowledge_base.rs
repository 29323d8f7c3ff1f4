//! Retrieve-and-generate against a Bedrock knowledge base.

use anyhow::Result;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockagentruntime::{
    types::{
        GenerationConfiguration, GuardrailConfiguration, InferenceConfig,
        KnowledgeBaseRetrieveAndGenerateConfiguration, RetrieveAndGenerateConfiguration,
        RetrieveAndGenerateInput, RetrieveAndGenerateType, TextInferenceConfig,
    },
    Client,
};
use log::{error, info};
use rag_core::Config;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("Invalid retrieve-and-generate request: {0}")]
    Validation(String),

    #[error("Failed to build Bedrock request: {0}")]
    Build(#[from] aws_sdk_bedrockagentruntime::error::BuildError),

    #[error("Knowledge base call failed: {0}")]
    Service(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guardrail {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagInference {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    pub knowledge_base_id: String,
    pub model_arn: String,
    pub guardrail: Option<Guardrail>,
    pub inference: RagInference,
}

impl RagConfig {
    pub fn from_config(config: &Config) -> Self {
        let kb = &config.knowledge_base;
        let guardrail = match (&kb.guardrail_id, &kb.guardrail_version) {
            (Some(id), Some(version)) => Some(Guardrail {
                id: id.clone(),
                version: version.clone(),
            }),
            _ => None,
        };

        Self {
            knowledge_base_id: kb.id.clone(),
            model_arn: kb.model_arn.clone(),
            guardrail,
            inference: RagInference {
                max_tokens: config.inference.max_tokens,
                temperature: config.inference.temperature,
                top_p: config.inference.top_p,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl RagRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: None,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagResponse {
    pub text: String,
    pub session_id: String,
    pub citations: Vec<Citation>,
}

#[async_trait]
pub trait RetrieveAndGenerate: Send + Sync {
    async fn retrieve_and_generate(&self, request: &RagRequest) -> Result<RagResponse, RagError>;
}

pub struct KnowledgeBaseClient {
    client: Client,
    config: RagConfig,
}

impl KnowledgeBaseClient {
    pub async fn new(config: RagConfig, region: &str) -> Result<Self> {
        validate_config(&config)?;

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let client = Client::new(&aws_config);
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}

#[async_trait]
impl RetrieveAndGenerate for KnowledgeBaseClient {
    async fn retrieve_and_generate(&self, request: &RagRequest) -> Result<RagResponse, RagError> {
        if request.query.trim().is_empty() {
            return Err(RagError::Validation("query cannot be empty".to_string()));
        }

        let input = RetrieveAndGenerateInput::builder()
            .text(request.query.clone())
            .build()?;

        info!(
            "Querying knowledge base {} (session: {:?})",
            self.config.knowledge_base_id, request.session_id
        );

        let output = self
            .client
            .retrieve_and_generate()
            .input(input)
            .retrieve_and_generate_configuration(build_configuration(&self.config)?)
            .set_session_id(request.session_id.clone())
            .send()
            .await
            .map_err(|e| {
                error!("retrieve_and_generate error: {:?}", e);
                RagError::Service(e.to_string())
            })?;

        let citations = output
            .citations()
            .iter()
            .map(|citation| Citation {
                text: citation
                    .generated_response_part()
                    .and_then(|part| part.text_response_part())
                    .and_then(|part| part.text())
                    .unwrap_or_default()
                    .to_string(),
                sources: citation
                    .retrieved_references()
                    .iter()
                    .filter_map(|reference| {
                        reference
                            .location()
                            .and_then(|location| location.s3_location())
                            .and_then(|s3| s3.uri())
                            .map(str::to_string)
                    })
                    .collect(),
            })
            .collect();

        Ok(RagResponse {
            text: output
                .output()
                .map(|generated| generated.text().to_string())
                .unwrap_or_default(),
            session_id: output.session_id().to_string(),
            citations,
        })
    }
}

fn validate_config(config: &RagConfig) -> Result<(), RagError> {
    if config.knowledge_base_id.is_empty() {
        return Err(RagError::Validation(
            "knowledge base id cannot be empty".to_string(),
        ));
    }
    if config.model_arn.is_empty() {
        return Err(RagError::Validation("model ARN cannot be empty".to_string()));
    }
    Ok(())
}

/// Builds the `KNOWLEDGE_BASE` retrieve-and-generate configuration.
pub fn build_configuration(config: &RagConfig) -> Result<RetrieveAndGenerateConfiguration, RagError> {
    validate_config(config)?;

    let max_tokens = i32::try_from(config.inference.max_tokens).map_err(|_| {
        RagError::Validation(format!(
            "max_tokens {} exceeds the supported maximum",
            config.inference.max_tokens
        ))
    })?;

    let text_inference = TextInferenceConfig::builder()
        .max_tokens(max_tokens)
        .temperature(config.inference.temperature)
        .top_p(config.inference.top_p)
        .build();

    let mut generation = GenerationConfiguration::builder().inference_config(
        InferenceConfig::builder()
            .text_inference_config(text_inference)
            .build(),
    );

    if let Some(guardrail) = &config.guardrail {
        generation = generation.guardrail_configuration(
            GuardrailConfiguration::builder()
                .guardrail_id(guardrail.id.clone())
                .guardrail_version(guardrail.version.clone())
                .build()?,
        );
    }

    let knowledge_base = KnowledgeBaseRetrieveAndGenerateConfiguration::builder()
        .knowledge_base_id(config.knowledge_base_id.clone())
        .model_arn(config.model_arn.clone())
        .generation_configuration(generation.build())
        .build()?;

    Ok(RetrieveAndGenerateConfiguration::builder()
        .r#type(RetrieveAndGenerateType::KnowledgeBase)
        .knowledge_base_configuration(knowledge_base)
        .build()?)
}
