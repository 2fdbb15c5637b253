//! Application state management.
//!
//! This module defines the shared state that is passed to all request handlers.

use std::sync::Arc;

use axum::http::{header, HeaderMap, Uri};
use sp_protocol_saml::SamlAuth;
use sp_security::{HttpUtils, RequestContext};

use crate::config::ServerConfig;
use crate::session::SessionStore;

/// Name of the logout route.
pub const LOGOUT_ROUTE: &str = "saml_logout";

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,

    /// SAML engine.
    pub saml: Arc<SamlAuth>,

    /// Named routes and redirect rules.
    pub http: Arc<HttpUtils>,

    /// Session store.
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(config: ServerConfig) -> Self {
        let http = HttpUtils::new().with_route(LOGOUT_ROUTE, config.logout_path.clone());
        let saml = SamlAuth::new(config.saml.clone());
        let sessions = SessionStore::new(config.session_idle_timeout);

        Self {
            config: Arc::new(config),
            saml: Arc::new(saml),
            http: Arc::new(http),
            sessions: Arc::new(sessions),
        }
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Describes an incoming request for the logout components.
    ///
    /// Scheme comes from `X-Forwarded-Proto`, host and port from `Host`;
    /// both fall back to the configured base URL.
    pub fn request_context(&self, uri: &Uri, headers: &HeaderMap) -> RequestContext {
        let fallback = RequestContext::from_url(&self.config.base_url).ok();

        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .or_else(|| fallback.as_ref().map(|r| r.scheme().to_string()))
            .unwrap_or_else(|| "http".to_string());

        let (host, port) = match headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
            Some(value) => split_host_port(value),
            None => match &fallback {
                Some(base) => (base.host().to_string(), base.port()),
                None => ("localhost".to_string(), None),
            },
        };

        let base_path = self.config.base_path.as_str();
        let path = uri.path();
        let path_info = match path.strip_prefix(base_path) {
            Some(rest) if !base_path.is_empty() && rest.starts_with('/') => rest,
            _ => path,
        };

        RequestContext::new(scheme, host, path_info)
            .with_port(port)
            .with_base_path(base_path)
            .with_query(uri.query())
    }
}

/// Splits a `Host` header value into host and port.
fn split_host_port(value: &str) -> (String, Option<u16>) {
    match value.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() => match port.parse() {
            Ok(port) => (host.to_string(), Some(port)),
            Err(_) => (value.to_string(), None),
        },
        _ => (value.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn context_from_host_header() {
        let state = AppState::new(ServerConfig::for_testing());
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("mock.test:8080"));
        let uri: Uri = "/saml/logout?SAMLRequest=please".parse().unwrap();

        let request = state.request_context(&uri, &headers);
        assert_eq!(request.scheme_and_http_host(), "http://mock.test:8080");
        assert_eq!(request.path_info(), "/saml/logout");
        assert_eq!(request.query_string(), Some("SAMLRequest=please"));
    }

    #[test]
    fn context_falls_back_to_base_url() {
        let state = AppState::new(ServerConfig::for_testing());
        let uri: Uri = "/".parse().unwrap();

        let request = state.request_context(&uri, &HeaderMap::new());
        assert_eq!(request.root_url(), "http://localhost:8080");
    }

    #[test]
    fn base_path_is_split_off() {
        let mut config = ServerConfig::for_testing();
        config.base_path = "/app".to_string();
        let state = AppState::new(config);
        let uri: Uri = "/app/saml/logout".parse().unwrap();

        let request = state.request_context(&uri, &HeaderMap::new());
        assert_eq!(request.base_path(), "/app");
        assert_eq!(request.path_info(), "/saml/logout");
    }

    #[test]
    fn host_port_splitting() {
        assert_eq!(split_host_port("sp.example.com"), ("sp.example.com".to_string(), None));
        assert_eq!(
            split_host_port("sp.example.com:8443"),
            ("sp.example.com".to_string(), Some(8443))
        );
        assert_eq!(split_host_port("[::1]"), ("[::1]".to_string(), None));
    }
}
