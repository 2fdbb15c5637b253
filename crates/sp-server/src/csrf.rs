//! CSRF protection of the logout route.

use rand::distr::{Alphanumeric, SampleString};
use sp_security::{LogoutUrlGenerator, SecurityError, SecurityResult, SessionToken};

/// Length of generated CSRF tokens.
pub const CSRF_TOKEN_LENGTH: usize = 32;

/// Generates a random alphanumeric CSRF token.
#[must_use]
pub fn generate_csrf_token() -> String {
    let mut rng = rand::rng();
    Alphanumeric.sample_string(&mut rng, CSRF_TOKEN_LENGTH)
}

/// Checks a submitted token against the session's token.
#[must_use]
pub fn is_csrf_token_valid(expected: &str, submitted: Option<&str>) -> bool {
    submitted.is_some_and(|submitted| constant_time_eq(expected.as_bytes(), submitted.as_bytes()))
}

/// Constant-time comparison of two byte slices.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Builds the logout URL of the current session, token included.
#[derive(Debug, Clone, Copy)]
pub struct SessionLogoutUrlGenerator<'a> {
    logout_path: &'a str,
    csrf_parameter: &'a str,
    csrf_token: Option<&'a str>,
}

impl<'a> SessionLogoutUrlGenerator<'a> {
    /// Creates a generator for the session holding `csrf_token`.
    #[must_use]
    pub const fn new(
        logout_path: &'a str,
        csrf_parameter: &'a str,
        csrf_token: Option<&'a str>,
    ) -> Self {
        Self {
            logout_path,
            csrf_parameter,
            csrf_token,
        }
    }
}

impl LogoutUrlGenerator for SessionLogoutUrlGenerator<'_> {
    fn logout_path(&self, principal: Option<&SessionToken>) -> SecurityResult<String> {
        if principal.is_none() {
            return Err(SecurityError::PrincipalResolution(
                "no authenticated session".to_string(),
            ));
        }
        match self.csrf_token {
            Some(token) => Ok(format!(
                "{}?{}={}",
                self.logout_path,
                urlencoding::encode(self.csrf_parameter),
                urlencoding::encode(token)
            )),
            None => Ok(self.logout_path.to_string()),
        }
    }
}
