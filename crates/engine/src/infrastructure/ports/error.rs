//! Error types for port operations.

/// Failures of the chat completion transport.
///
/// `Clone` so a single result can be shared by every coalesced caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LlmError {
    /// Missing or invalid static setup (credentials, endpoint, model).
    #[error("LLM configuration error: {0}")]
    Configuration(String),

    /// Transport failure or non-success HTTP status.
    #[error("LLM request failed{}: {message}", status_suffix(.status))]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The response carried no usable text payload.
    #[error("Invalid response: {0}")]
    Content(String),
}

impl LlmError {
    pub fn configuration(message: impl ToString) -> Self {
        Self::Configuration(message.to_string())
    }

    /// Transport-level failure with no HTTP status.
    pub fn network(message: impl ToString) -> Self {
        Self::Network {
            status: None,
            message: message.to_string(),
        }
    }

    /// Non-success HTTP status with the response body.
    pub fn status(status: u16, body: impl ToString) -> Self {
        Self::Network {
            status: Some(status),
            message: body.to_string(),
        }
    }

    pub fn content(message: impl ToString) -> Self {
        Self::Content(message.to_string())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_embeds_status_and_body() {
        let err = LlmError::status(503, "overloaded");
        assert_eq!(err.to_string(), "LLM request failed (503): overloaded");
    }

    #[test]
    fn transport_error_has_no_status() {
        let err = LlmError::network("connection refused");
        assert_eq!(err.to_string(), "LLM request failed: connection refused");
    }
}
