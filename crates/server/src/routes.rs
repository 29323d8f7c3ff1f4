use crate::gateway;
use crate::models::{ProxyEvent, ProxyResponse};
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use llm::ModelInvoker;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub invoker: Arc<dyn ModelInvoker>,
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Local stand-in for the `ANY /` and `ANY /{proxy+}` API Gateway routes.
async fn proxy(State(state): State<AppState>, headers: HeaderMap, body: String) -> Response {
    let event = event_from_http(&headers, body);
    let response = gateway::handle(&event, state.invoker.as_ref()).await;
    into_http_response(response)
}

fn event_from_http(headers: &HeaderMap, body: String) -> ProxyEvent {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    ProxyEvent {
        headers,
        body: (!body.is_empty()).then_some(body),
        is_base64_encoded: false,
    }
}

fn into_http_response(response: ProxyResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, "application/json")], response.body).into_response()
}

pub fn create_app(invoker: Arc<dyn ModelInvoker>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", any(proxy))
        .route("/*proxy", any(proxy))
        .with_state(AppState { invoker })
}
