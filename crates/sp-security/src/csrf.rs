//! CSRF token binding recovered from generated logout URLs.

/// Message of the access-denied failure raised when a CSRF token is invalid.
pub const INVALID_CSRF_TOKEN_MESSAGE: &str = "Invalid CSRF token.";

/// The `name=value` pair a logout URL uses to carry its CSRF token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfParameterBinding {
    /// Parameter name, exactly as it appears in the URL.
    pub name: String,
    /// Parameter value, exactly as it appears in the URL.
    pub value: String,
}

impl CsrfParameterBinding {
    /// Recovers the binding from a generated logout URL.
    ///
    /// The name is the text between the first `?` and the first `=` after it;
    /// this is a first-match scan, not a query parser. Returns `None` when the
    /// URL has no `?`, or no `=` follows it.
    #[must_use]
    pub fn from_logout_url(url: &str) -> Option<Self> {
        let query_start = url.find('?')?;
        let name_end = query_start + url[query_start..].find('=')?;
        let value = &url[name_end + 1..];
        let value = value.split('&').next().unwrap_or(value);

        Some(Self {
            name: url[query_start + 1..name_end].to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_from_first_pair() {
        let binding = CsrfParameterBinding::from_logout_url("/saml_logout?csrf=token").unwrap();
        assert_eq!(binding.name, "csrf");
        assert_eq!(binding.value, "token");

        let binding =
            CsrfParameterBinding::from_logout_url("/logout?_csrf_token=abc&lang=en").unwrap();
        assert_eq!(binding.name, "_csrf_token");
        assert_eq!(binding.value, "abc");
    }

    #[test]
    fn no_query_or_no_equals() {
        assert_eq!(CsrfParameterBinding::from_logout_url("/saml_logout"), None);
        assert_eq!(CsrfParameterBinding::from_logout_url("/saml_logout?token"), None);
    }

    #[test]
    fn name_spans_to_first_equals() {
        let binding = CsrfParameterBinding::from_logout_url("/logout?flag&csrf=t").unwrap();
        assert_eq!(binding.name, "flag&csrf");
    }

    #[test]
    fn empty_value() {
        let binding = CsrfParameterBinding::from_logout_url("/logout?csrf=").unwrap();
        assert_eq!(binding.name, "csrf");
        assert_eq!(binding.value, "");
    }
}
