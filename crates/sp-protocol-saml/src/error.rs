//! SAML error types.
//!
//! Errors are split into two families. Protocol validation errors describe a
//! SAML message that is missing, malformed or not acceptable; callers use them
//! as a branch signal. Everything else (configuration, internal failures) is a
//! hard failure and must propagate.

use thiserror::Error;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// The request carries neither a `SAMLRequest` nor a `SAMLResponse`.
    #[error("SAML LogoutRequest/LogoutResponse not found")]
    MessageNotFound,

    /// Invalid SAML request format or content.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid SAML response format or content.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Missing required element or attribute.
    #[error("missing required element: {0}")]
    MissingElement(String),

    /// The message is past its `NotOnOrAfter` instant.
    #[error("logout request expired")]
    Expired,

    /// Invalid issuer.
    #[error("invalid issuer: expected {expected}, got {actual}")]
    InvalidIssuer {
        /// The expected issuer.
        expected: String,
        /// The actual issuer.
        actual: String,
    },

    /// Invalid destination.
    #[error("invalid destination: expected {expected}, got {actual}")]
    InvalidDestination {
        /// The expected destination URL.
        expected: String,
        /// The actual destination URL.
        actual: String,
    },

    /// The IdP reported a non-success status.
    #[error("logout response status is not success: {0}")]
    StatusNotSuccess(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// Deflate (de)compression error.
    #[error("deflate error: {0}")]
    Deflate(String),

    /// Settings do not allow the requested operation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SamlError {
    /// Returns true for errors caused by the inbound SAML message itself.
    ///
    /// These are the errors the logout handlers recover from locally.
    #[must_use]
    pub const fn is_protocol_validation(&self) -> bool {
        !matches!(self, Self::Configuration(_) | Self::Internal(_))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Internal(_) => 500,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_classification() {
        assert!(SamlError::MessageNotFound.is_protocol_validation());
        assert!(SamlError::Expired.is_protocol_validation());
        assert!(SamlError::InvalidIssuer {
            expected: "a".to_string(),
            actual: "b".to_string(),
        }
        .is_protocol_validation());

        assert!(!SamlError::Configuration("no SLO".to_string()).is_protocol_validation());
        assert!(!SamlError::Internal("boom".to_string()).is_protocol_validation());
    }

    #[test]
    fn error_http_status() {
        assert_eq!(SamlError::MessageNotFound.http_status(), 400);
        assert_eq!(SamlError::Internal("test".to_string()).http_status(), 500);
    }
}
