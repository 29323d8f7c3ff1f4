use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aws: AwsConfig,
    pub knowledge_base: KnowledgeBaseConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("logging mode 'firehose' requires logging.delivery_stream")]
    MissingDeliveryStream,

    #[error("guardrail_id and guardrail_version must be set together")]
    IncompleteGuardrail,

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
        }
    }
}

impl AwsConfig {
    pub fn with_env_overrides(&self) -> Self {
        let region = env::var("AWS_REGION").unwrap_or_else(|_| self.region.clone());
        Self { region }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    pub id: String,
    pub model_arn: String,
    pub guardrail_id: Option<String>,
    pub guardrail_version: Option<String>,
}

impl KnowledgeBaseConfig {
    pub fn with_env_overrides(&self) -> Self {
        let id = env::var("KNOWLEDGE_BASE_ID").unwrap_or_else(|_| self.id.clone());
        let model_arn = env::var("MODEL_ARN").unwrap_or_else(|_| self.model_arn.clone());
        let guardrail_id = env::var("GUARDRAIL_ID")
            .ok()
            .or_else(|| self.guardrail_id.clone());
        let guardrail_version = env::var("GUARDRAIL_VERSION")
            .ok()
            .or_else(|| self.guardrail_version.clone());
        Self {
            id,
            model_arn,
            guardrail_id,
            guardrail_version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.0,
            top_p: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggingMode {
    #[default]
    Local,
    Firehose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub mode: LoggingMode,
    pub delivery_stream: Option<String>,
    pub local_path: Option<String>,
}

impl LoggingConfig {
    pub fn with_env_overrides(&self) -> Self {
        let delivery_stream = env::var("FIREHOSE_STREAM_NAME")
            .ok()
            .or_else(|| self.delivery_stream.clone());
        Self {
            mode: self.mode,
            delivery_stream,
            local_path: self.local_path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn with_env_overrides(&self) -> Self {
        let bind = env::var("GATEWAY_BIND").unwrap_or_else(|_| self.bind.clone());
        Self { bind }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| Self::default_config_path());
        let config = Self::load(Path::new(&config_path))?.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn default_config_path() -> String {
        "./config.toml".to_string()
    }

    pub fn with_env_overrides(&self) -> Self {
        Self {
            aws: self.aws.with_env_overrides(),
            knowledge_base: self.knowledge_base.with_env_overrides(),
            inference: self.inference.clone(),
            logging: self.logging.with_env_overrides(),
            gateway: self.gateway.with_env_overrides(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.knowledge_base.id.is_empty() {
            return Err(ConfigError::Empty("knowledge_base.id"));
        }
        if self.knowledge_base.model_arn.is_empty() {
            return Err(ConfigError::Empty("knowledge_base.model_arn"));
        }
        if self.knowledge_base.guardrail_id.is_some() != self.knowledge_base.guardrail_version.is_some()
        {
            return Err(ConfigError::IncompleteGuardrail);
        }
        if self.logging.mode == LoggingMode::Firehose
            && self
                .logging
                .delivery_stream
                .as_deref()
                .map_or(true, str::is_empty)
        {
            return Err(ConfigError::MissingDeliveryStream);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const FULL_TOML: &str = r#"
[aws]
region = "eu-west-1"

[knowledge_base]
id = "KB12345"
model_arn = "arn:aws:bedrock:eu-west-1::foundation-model/anthropic.claude-v2"
guardrail_id = "gr-abc"
guardrail_version = "DRAFT"

[inference]
max_tokens = 1024
temperature = 0.2
top_p = 0.8

[logging]
mode = "firehose"
delivery_stream = "rag-logs"

[gateway]
bind = "127.0.0.1:8080"
"#;

    #[test]
    fn should_deserialize_config_from_toml() {
        let config: Config = toml::from_str(FULL_TOML).unwrap();

        assert_eq!(config.aws.region, "eu-west-1");
        assert_eq!(config.knowledge_base.id, "KB12345");
        assert_eq!(config.knowledge_base.guardrail_id.as_deref(), Some("gr-abc"));
        assert_eq!(config.inference.max_tokens, 1024);
        assert_eq!(config.logging.mode, LoggingMode::Firehose);
        assert_eq!(config.logging.delivery_stream.as_deref(), Some("rag-logs"));
        assert_eq!(config.gateway.bind, "127.0.0.1:8080");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_apply_defaults_for_optional_sections() {
        let toml_content = r#"
[knowledge_base]
id = "KB1"
model_arn = "arn:model"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();

        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.inference, InferenceConfig::default());
        assert_eq!(config.logging.mode, LoggingMode::Local);
        assert_eq!(config.gateway.bind, "0.0.0.0:3000");
        assert!(config.knowledge_base.guardrail_id.is_none());
    }

    #[test]
    fn should_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL_TOML.as_bytes()).unwrap();

        let config = Config::load(temp_file.path()).unwrap();

        assert_eq!(config.knowledge_base.id, "KB12345");
    }

    #[test]
    fn should_load_config_with_env_path_and_overrides() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(FULL_TOML.as_bytes()).unwrap();
        let temp_path = temp_file.path().to_string_lossy().to_string();

        env::set_var("CONFIG_PATH", &temp_path);
        env::set_var("KNOWLEDGE_BASE_ID", "KB-FROM-ENV");

        let config = Config::load_from_env().unwrap();

        assert_eq!(config.knowledge_base.id, "KB-FROM-ENV");

        env::remove_var("CONFIG_PATH");
        env::remove_var("KNOWLEDGE_BASE_ID");
    }

    #[test]
    fn should_use_default_config_path() {
        assert_eq!(Config::default_config_path(), "./config.toml");
    }

    #[test]
    fn should_return_error_for_missing_file() {
        let result = Config::load(Path::new("/non/existent/path.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn should_return_error_for_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"invalid toml content [[[").unwrap();

        assert!(Config::load(temp_file.path()).is_err());
    }

    #[test]
    fn should_reject_firehose_mode_without_stream() {
        let mut config: Config = toml::from_str(FULL_TOML).unwrap();
        config.logging.delivery_stream = None;

        assert_eq!(config.validate(), Err(ConfigError::MissingDeliveryStream));
    }

    #[test]
    fn should_reject_half_configured_guardrail() {
        let mut config: Config = toml::from_str(FULL_TOML).unwrap();
        config.knowledge_base.guardrail_version = None;

        assert_eq!(config.validate(), Err(ConfigError::IncompleteGuardrail));
    }

    #[test]
    fn should_reject_empty_knowledge_base_id() {
        let mut config: Config = toml::from_str(FULL_TOML).unwrap();
        config.knowledge_base.id = String::new();

        assert_eq!(
            config.validate(),
            Err(ConfigError::Empty("knowledge_base.id"))
        );
    }
}
