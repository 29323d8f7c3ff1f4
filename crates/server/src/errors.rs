use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Model invocation error: {0}")]
    ModelError(String),
}

impl GatewayError {
    /// Every failure is reported to the caller as a 500 with the error text.
    pub fn http_status_code(&self) -> u16 {
        500
    }

    /// True when the caller sent something unusable, as opposed to the model
    /// call failing.
    pub fn is_client_error(&self) -> bool {
        match self {
            GatewayError::MissingHeader(_) => true,
            GatewayError::InvalidBody(_) => true,
            GatewayError::ModelError(_) => false,
        }
    }
}
