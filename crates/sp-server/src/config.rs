//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible defaults.

use sp_protocol_saml::{NameIdFormat, SamlSettings, ServiceEndpoint};

/// Default session idle timeout (30 minutes).
pub const DEFAULT_SESSION_IDLE_TIMEOUT: i64 = 1800;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Public base URL of the SP, without the base path.
    pub base_url: String,

    /// Path the application is mounted under, empty at the root.
    pub base_path: String,

    /// Path of the CSRF-protected logout route.
    pub logout_path: String,

    /// Where the browser goes after a local-only logout.
    pub logout_target: String,

    /// Name of the query parameter carrying the logout CSRF token.
    pub csrf_parameter: String,

    /// Name of the session cookie.
    pub session_cookie: String,

    /// Seconds a session may stay unused before it is evicted.
    pub session_idle_timeout: i64,

    /// SAML engine settings.
    pub saml: SamlSettings,

    /// Log level.
    pub log_level: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("SP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("SP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let base_url = std::env::var("SP_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let base_path = std::env::var("SP_BASE_PATH")
            .map(|p| normalize_base_path(&p))
            .unwrap_or_default();

        let logout_path =
            std::env::var("SP_LOGOUT_PATH").unwrap_or_else(|_| "/saml/logout".to_string());
        if !logout_path.starts_with('/') {
            anyhow::bail!("SP_LOGOUT_PATH must be an absolute path, got {logout_path}");
        }

        let logout_target = std::env::var("SP_LOGOUT_TARGET").unwrap_or_else(|_| "/".to_string());

        let csrf_parameter =
            std::env::var("SP_CSRF_PARAMETER").unwrap_or_else(|_| "_csrf_token".to_string());

        let session_cookie =
            std::env::var("SP_SESSION_COOKIE").unwrap_or_else(|_| "SPSESSID".to_string());

        let session_idle_timeout = std::env::var("SP_SESSION_IDLE_TIMEOUT")
            .ok()
            .and_then(|t| t.parse().ok())
            .filter(|t: &i64| *t > 0)
            .unwrap_or(DEFAULT_SESSION_IDLE_TIMEOUT);

        let default_sp_slo = format!("{base_url}{base_path}{logout_path}");
        let saml = saml_settings_from_env(&default_sp_slo)?;

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            host,
            port,
            base_url,
            base_path,
            logout_path,
            logout_target,
            csrf_parameter,
            session_cookie,
            session_idle_timeout,
            saml,
            log_level,
        })
    }

    /// Creates a configuration for testing.
    ///
    /// The IdP has a Single Logout Service at `https://idp.example.com/saml/slo`.
    #[must_use]
    pub fn for_testing() -> Self {
        let saml = SamlSettings::new("http://localhost:8080/saml/metadata", "https://idp.example.com")
            .with_idp_slo(ServiceEndpoint::redirect("https://idp.example.com/saml/slo"))
            .with_sp_slo(ServiceEndpoint::redirect("http://localhost:8080/saml/logout"));

        Self {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            base_url: "http://localhost:8080".to_string(),
            base_path: String::new(),
            logout_path: "/saml/logout".to_string(),
            logout_target: "/".to_string(),
            csrf_parameter: "_csrf_token".to_string(),
            session_cookie: "SPSESSID".to_string(),
            session_idle_timeout: DEFAULT_SESSION_IDLE_TIMEOUT,
            saml,
            log_level: "debug".to_string(),
        }
    }

    /// Logout path including the base path, as the browser sees it.
    #[must_use]
    pub fn public_logout_path(&self) -> String {
        format!("{}{}", self.base_path, self.logout_path)
    }
}

/// Loads the SAML engine settings from `SAML_*` variables.
fn saml_settings_from_env(default_sp_slo: &str) -> anyhow::Result<SamlSettings> {
    let sp_entity_id = std::env::var("SAML_SP_ENTITY_ID")
        .map_err(|_| anyhow::anyhow!("SAML_SP_ENTITY_ID environment variable is required"))?;

    let idp_entity_id = std::env::var("SAML_IDP_ENTITY_ID")
        .map_err(|_| anyhow::anyhow!("SAML_IDP_ENTITY_ID environment variable is required"))?;

    let strict = std::env::var("SAML_STRICT")
        .map(|v| v.to_lowercase() != "false" && v != "0")
        .unwrap_or(true);

    let debug = std::env::var("SAML_DEBUG")
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false);

    let sp_slo_url = std::env::var("SAML_SP_SLO_URL").unwrap_or_else(|_| default_sp_slo.to_string());

    let mut settings = SamlSettings::new(sp_entity_id, idp_entity_id)
        .strict(strict)
        .with_sp_slo(ServiceEndpoint::redirect(sp_slo_url));
    settings.debug = debug;

    if let Ok(idp_slo_url) = std::env::var("SAML_IDP_SLO_URL") {
        let mut endpoint = ServiceEndpoint::redirect(idp_slo_url);
        if let Ok(response_url) = std::env::var("SAML_IDP_SLO_RESPONSE_URL") {
            endpoint = endpoint.with_response_url(response_url);
        }
        settings = settings.with_idp_slo(endpoint);
    }

    if let Ok(format) = std::env::var("SAML_NAME_ID_FORMAT") {
        let format = NameIdFormat::from_uri(&format)
            .ok_or_else(|| anyhow::anyhow!("unsupported SAML_NAME_ID_FORMAT {format}"))?;
        settings = settings.with_name_id_format(format);
    }

    settings.validate()?;
    Ok(settings)
}

/// `/app/` becomes `/app`, `/` and empty become empty.
fn normalize_base_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            ..Self::for_testing()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_normalization() {
        assert_eq!(normalize_base_path("/app/"), "/app");
        assert_eq!(normalize_base_path("app"), "/app");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path(""), "");
    }

    #[test]
    fn testing_config_has_idp_slo() {
        let config = ServerConfig::for_testing();
        assert!(config.saml.idp.single_logout_service.is_some());
        assert!(config.saml.validate().is_ok());
        assert_eq!(config.public_logout_path(), "/saml/logout");
    }
}
