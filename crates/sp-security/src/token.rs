//! Authenticated session tokens.

/// SAML data captured when the session was established from an assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamlSessionAttributes {
    /// `SessionIndex` of the authentication statement, if the IdP sent one.
    pub session_index: Option<String>,
}

impl SamlSessionAttributes {
    /// Creates attributes with the given session index.
    #[must_use]
    pub const fn new(session_index: Option<String>) -> Self {
        Self { session_index }
    }
}

/// The token of an authenticated session.
///
/// A token is SAML-backed when it carries [`SamlSessionAttributes`]; logout
/// handlers check for that capability rather than for a concrete type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    username: String,
    saml: Option<SamlSessionAttributes>,
}

impl SessionToken {
    /// Creates a token for a locally authenticated user.
    #[must_use]
    pub fn local(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            saml: None,
        }
    }

    /// Creates a token for a user authenticated by a SAML assertion.
    #[must_use]
    pub fn saml(username: impl Into<String>, attributes: SamlSessionAttributes) -> Self {
        Self {
            username: username.into(),
            saml: Some(attributes),
        }
    }

    /// The authenticated username; the NameID for SAML sessions.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// SAML attributes, present only for SAML-backed sessions.
    #[must_use]
    pub const fn saml_attributes(&self) -> Option<&SamlSessionAttributes> {
        self.saml.as_ref()
    }

    /// The SAML session index, if any.
    #[must_use]
    pub fn session_index(&self) -> Option<&str> {
        self.saml.as_ref()?.session_index.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saml_capability() {
        let token = SessionToken::saml(
            "alice",
            SamlSessionAttributes::new(Some("_s1".to_string())),
        );
        assert!(token.saml_attributes().is_some());
        assert_eq!(token.session_index(), Some("_s1"));

        let no_index = SessionToken::saml("carol", SamlSessionAttributes::default());
        assert!(no_index.saml_attributes().is_some());
        assert_eq!(no_index.session_index(), None);

        let local = SessionToken::local("bob");
        assert!(local.saml_attributes().is_none());
        assert_eq!(local.session_index(), None);
        assert_eq!(local.username(), "bob");
    }
}
