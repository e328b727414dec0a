use std::time::Duration;

/// Every way a model call can fail to yield usable data.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No API key was supplied, so the model is never called.
    #[error("model gateway is not configured (no API key)")]
    NotConfigured,

    /// Transport failure: DNS, connect, TLS, broken connection.
    #[error("model network error: {0}")]
    Network(String),

    /// The model API answered with a non-success status.
    #[error("model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("model call timed out after {0:?}")]
    Timeout(Duration),

    /// The API answered but carried no text.
    #[error("model response contained no text content")]
    EmptyResponse,

    /// The text was not the JSON we asked for.
    #[error("failed to parse model output: {0}")]
    Parse(String),

    /// The JSON parsed but broke a shape rule (empty list, negative price, ...).
    #[error("malformed model output: {0}")]
    Malformed(String),

    /// The scan image could not be decoded.
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
}

impl GatewayError {
    /// True for failures caused by the model service rather than our input.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            GatewayError::Network(_)
                | GatewayError::Api { .. }
                | GatewayError::Timeout(_)
                | GatewayError::EmptyResponse
        )
    }
}
