//! Security error types.

use sp_protocol_saml::SamlError;
use thiserror::Error;

/// Errors raised while orchestrating logout.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The SAML engine failed.
    #[error(transparent)]
    Saml(#[from] SamlError),

    /// No authenticated principal to build a logout URL for.
    #[error("cannot resolve principal: {0}")]
    PrincipalResolution(String),

    /// The generated logout URL carries no `name=value` CSRF binding.
    #[error("generated logout URL has no CSRF parameter: {0}")]
    MalformedLogoutUrl(String),

    /// The request already carries the CSRF parameter, so it was wrong.
    #[error("request already carries CSRF parameter '{0}'")]
    DuplicateCsrfToken(String),

    /// Invalid request data.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SecurityError {
    /// Returns true for failures the logout components absorb silently.
    ///
    /// Everything else propagates to the framework's error handling.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Saml(e) => e.is_protocol_validation(),
            Self::PrincipalResolution(_)
            | Self::MalformedLogoutUrl(_)
            | Self::DuplicateCsrfToken(_) => true,
            Self::InvalidRequest(_) => false,
        }
    }
}

/// Result type for security operations.
pub type SecurityResult<T> = Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors() {
        assert!(SecurityError::from(SamlError::MessageNotFound).is_recoverable());
        assert!(!SecurityError::from(SamlError::Internal("x".to_string())).is_recoverable());
        assert!(SecurityError::DuplicateCsrfToken("csrf".to_string()).is_recoverable());
        assert!(!SecurityError::InvalidRequest("x".to_string()).is_recoverable());
    }

    #[test]
    fn saml_error_display_is_transparent() {
        let err = SecurityError::from(SamlError::MessageNotFound);
        assert_eq!(err.to_string(), "SAML LogoutRequest/LogoutResponse not found");
    }
}
