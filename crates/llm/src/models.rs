use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub aws_region: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            aws_region: None,
            timeout_secs: 30,
        }
    }
}

/// Text generation result item of the gateway body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedText {
    pub generated_text: String,
}

/// Embedding result item of the gateway body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_create_default_model_config() {
        let config = ModelConfig::default();
        assert_eq!(config.aws_region, None);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn should_serialize_generated_text() {
        let item = GeneratedText {
            generated_text: "Hello".to_string(),
        };

        let json = serde_json::to_string(&vec![item]).unwrap();
        assert_eq!(json, r#"[{"generated_text":"Hello"}]"#);
    }

    #[test]
    fn should_serialize_embedding_vector() {
        let item = EmbeddingVector {
            embedding: vec![0.5, 1.0],
        };

        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, r#"{"embedding":[0.5,1.0]}"#);
    }
}
