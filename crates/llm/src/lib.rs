pub mod bedrock;
pub mod knowledge_base;
pub mod models;
pub mod payload;

pub use bedrock::{BedrockClient, ModelInvoker};
pub use knowledge_base::{
    Citation, KnowledgeBaseClient, RagConfig, RagError, RagRequest, RagResponse,
    RetrieveAndGenerate,
};
pub use models::{EmbeddingVector, GeneratedText, ModelConfig};
pub use payload::{ModelKwargs, PayloadError, Provider};
