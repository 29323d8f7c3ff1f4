use llm::ModelKwargs;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// The subset of an API Gateway proxy event the gateway reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl ProxyEvent {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Case-insensitive header lookup; REST and HTTP APIs disagree on casing.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// REST API events send `"headers": null` when no header is present.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    pub fn json(status_code: u16, body: String) -> Self {
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status_code,
            headers,
            body,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub inputs: String,
    #[serde(default)]
    pub parameters: ModelKwargs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_deserialize_api_gateway_event() {
        let event: ProxyEvent = serde_json::from_value(json!({
            "version": "2.0",
            "routeKey": "ANY /{proxy+}",
            "headers": {"model_id": "anthropic.claude-v2", "content-type": "application/json"},
            "body": "{\"inputs\": \"hi\"}",
            "isBase64Encoded": false
        }))
        .unwrap();

        assert_eq!(event.header("model_id"), Some("anthropic.claude-v2"));
        assert_eq!(event.body.as_deref(), Some("{\"inputs\": \"hi\"}"));
        assert!(!event.is_base64_encoded);
    }

    #[test]
    fn should_tolerate_event_without_headers_or_body() {
        let event: ProxyEvent = serde_json::from_value(json!({})).unwrap();
        assert!(event.headers.is_empty());
        assert!(event.body.is_none());

        let event: ProxyEvent =
            serde_json::from_value(json!({"headers": null, "body": null})).unwrap();
        assert!(event.headers.is_empty());
        assert!(event.body.is_none());
    }

    #[test]
    fn should_lookup_headers_case_insensitively() {
        let event = ProxyEvent::new("{}").with_header("Model_Id", "amazon.titan-text-express-v1");

        assert_eq!(event.header("model_id"), Some("amazon.titan-text-express-v1"));
        assert_eq!(event.header("embeddings"), None);
    }

    #[test]
    fn should_serialize_proxy_response_in_lambda_shape() {
        let response = ProxyResponse::json(200, "[]".to_string());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "[]");
        assert_eq!(json["headers"]["content-type"], "application/json");
    }

    #[test]
    fn should_default_parameters_to_empty_object() {
        let request: GatewayRequest = serde_json::from_str(r#"{"inputs": "hello"}"#).unwrap();

        assert_eq!(request.inputs, "hello");
        assert!(request.parameters.is_empty());
    }
}
