use std::fmt;

/// Backend errors with user-friendly messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Network-level failure (connection, timeout, DNS)
    Network(String),
    /// HTTP error response (4xx, 5xx)
    HttpStatus(u16, String),
    /// Failed to parse response
    Parse(String),
}

impl ApiError {
    /// Returns a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(details) => {
                if details.contains("timed out") {
                    "Request timed out. Please try again.".into()
                } else if details.contains("connection failed") {
                    "Network error: Could not reach the backend.".into()
                } else {
                    format!("Network error: {details}")
                }
            }
            Self::HttpStatus(400, _) => "The backend says you are not logged in.".into(),
            Self::HttpStatus(401, _) => "Authentication was rejected.".into(),
            Self::HttpStatus(429, _) => "Rate limited. Please wait a moment.".into(),
            Self::HttpStatus(500..=599, _) => "Server error. Please try again later.".into(),
            Self::HttpStatus(code, msg) => format!("HTTP error {code}: {msg}"),
            Self::Parse(details) => format!("Failed to parse response: {details}"),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timed out".into())
        } else if err.is_connect() {
            Self::Network("connection failed".into())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::HttpStatus(
                status.as_u16(),
                status.canonical_reason().unwrap_or("").into(),
            )
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_share_a_message() {
        assert_eq!(
            ApiError::HttpStatus(500, "Internal Server Error".into()).user_message(),
            ApiError::HttpStatus(503, "Service Unavailable".into()).user_message()
        );
    }

    #[test]
    fn test_other_status_includes_code() {
        let msg = ApiError::HttpStatus(418, "I'm a teapot".into()).user_message();
        assert!(msg.contains("418"));
        assert!(msg.contains("teapot"));
    }

    #[test]
    fn test_timeout_message() {
        let msg = ApiError::Network("request timed out".into()).user_message();
        assert!(msg.contains("timed out"));
    }
}
