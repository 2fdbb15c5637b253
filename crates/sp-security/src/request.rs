//! Request and failure primitives.

use std::fmt;

use crate::csrf::INVALID_CSRF_TOKEN_MESSAGE;
use crate::error::{SecurityError, SecurityResult};

/// The parts of an HTTP request the logout components look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    scheme: String,
    host: String,
    port: Option<u16>,
    base_path: String,
    path_info: String,
    query: Option<String>,
}

impl RequestContext {
    /// Creates a context for `path_info` on `scheme://host`.
    #[must_use]
    pub fn new(
        scheme: impl Into<String>,
        host: impl Into<String>,
        path_info: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port: None,
            base_path: String::new(),
            path_info: path_info.into(),
            query: None,
        }
    }

    /// Parses an absolute URL.
    pub fn from_url(url: &str) -> SecurityResult<Self> {
        let parsed = url::Url::parse(url)
            .map_err(|e| SecurityError::InvalidRequest(format!("invalid URL {url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| SecurityError::InvalidRequest(format!("URL has no host: {url}")))?;

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host: host.to_string(),
            port: parsed.port(),
            base_path: String::new(),
            path_info: parsed.path().to_string(),
            query: parsed.query().map(String::from),
        })
    }

    /// Sets a non-default port.
    #[must_use]
    pub const fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Sets the path the application is mounted under (no trailing slash).
    #[must_use]
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the raw query string (without `?`).
    #[must_use]
    pub fn with_query(mut self, query: Option<impl Into<String>>) -> Self {
        self.query = query.map(Into::into);
        self
    }

    /// Request scheme, `http` or `https`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host name without port.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if any.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path the application is mounted under, empty at the root.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Path below the base path.
    #[must_use]
    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// The raw query string, `None` when absent or empty.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref().filter(|q| !q.is_empty())
    }

    /// Decoded query parameters in request order.
    #[must_use]
    pub fn query_params(&self) -> Vec<(String, String)> {
        self.query_string()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if the query carries a parameter named `name`.
    #[must_use]
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params().iter().any(|(key, _)| key == name)
    }

    /// `scheme://host[:port]`, omitting the scheme's default port.
    #[must_use]
    pub fn scheme_and_http_host(&self) -> String {
        let default_port = match self.scheme.as_str() {
            "https" => Some(443),
            "http" => Some(80),
            _ => None,
        };
        match self.port {
            Some(port) if Some(port) != default_port => {
                format!("{}://{}:{}", self.scheme, self.host, port)
            }
            _ => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// `scheme://host[:port]/base`, the root of the application.
    #[must_use]
    pub fn root_url(&self) -> String {
        format!("{}{}", self.scheme_and_http_host(), self.base_path)
    }
}

impl fmt::Display for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.root_url(), self.path_info)?;
        if let Some(query) = self.query_string() {
            write!(f, "?{query}")?;
        }
        Ok(())
    }
}

/// Class of a request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Access was denied (HTTP 403).
    AccessDenied,
    /// Anything else.
    Other,
}

/// A failed request, as observed after its handler ran.
#[derive(Debug, Clone)]
pub struct FailureContext {
    /// Failure class.
    pub kind: FailureKind,
    /// Failure message.
    pub message: String,
    /// The request that failed.
    pub request: RequestContext,
}

impl FailureContext {
    /// Creates a failure context.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>, request: RequestContext) -> Self {
        Self {
            kind,
            message: message.into(),
            request,
        }
    }

    /// Returns true if this is exactly a CSRF token rejection.
    ///
    /// The message must match exactly; other access denials never qualify.
    #[must_use]
    pub fn is_invalid_csrf_token(&self) -> bool {
        self.kind == FailureKind::AccessDenied && self.message == INVALID_CSRF_TOKEN_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_url_keeps_non_default_port() {
        let request = RequestContext::from_url("http://mock.test:8080/saml_logout?SAMLRequest=please")
            .unwrap();
        assert_eq!(request.scheme_and_http_host(), "http://mock.test:8080");
        assert_eq!(request.path_info(), "/saml_logout");
        assert_eq!(request.query_string(), Some("SAMLRequest=please"));
    }

    #[test]
    fn default_port_is_omitted() {
        let request = RequestContext::new("https", "sp.example.com", "/").with_port(Some(443));
        assert_eq!(request.scheme_and_http_host(), "https://sp.example.com");
    }

    #[test]
    fn root_url_includes_base_path() {
        let request =
            RequestContext::new("https", "sp.example.com", "/logout").with_base_path("/app/");
        assert_eq!(request.root_url(), "https://sp.example.com/app");
        assert_eq!(request.to_string(), "https://sp.example.com/app/logout");
    }

    #[test]
    fn empty_query_is_absent() {
        let request = RequestContext::new("http", "h", "/").with_query(Some(""));
        assert_eq!(request.query_string(), None);
        assert!(request.query_params().is_empty());
    }

    #[test]
    fn query_params_are_decoded() {
        let request = RequestContext::new("http", "h", "/").with_query(Some("_csrf%5Ftoken=a&b=c%20d"));
        assert!(request.has_query_param("_csrf_token"));
        assert_eq!(request.query_params()[1], ("b".to_string(), "c d".to_string()));
    }

    #[test]
    fn csrf_failure_requires_exact_message() {
        let request = RequestContext::new("http", "h", "/");
        assert!(FailureContext::new(FailureKind::AccessDenied, "Invalid CSRF token.", request.clone())
            .is_invalid_csrf_token());
        assert!(!FailureContext::new(FailureKind::AccessDenied, "Invalid CSRF token", request.clone())
            .is_invalid_csrf_token());
        assert!(!FailureContext::new(FailureKind::Other, "Invalid CSRF token.", request)
            .is_invalid_csrf_token());
    }
}
