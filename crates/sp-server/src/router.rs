//! Router configuration.
//!
//! This module creates the main Axum router that combines all endpoints.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use sp_security::LogoutUrlGenerator;
use tower_http::trace::TraceLayer;

use crate::csrf::SessionLogoutUrlGenerator;
use crate::logout::logout;
use crate::middleware::csrf_bypass_middleware;
use crate::session::session_id_from_headers;
use crate::state::AppState;

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let logout_path = state.config().logout_path.clone();
    let base_path = state.config().base_path.clone();

    let app = Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route(&logout_path, get(logout))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            csrf_bypass_middleware,
        ))
        .with_state(state);

    let app = if base_path.is_empty() {
        app
    } else {
        Router::new().nest(&base_path, app)
    };

    app.layer(TraceLayer::new_for_http())
}

/// Session overview.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    /// Whether the session is authenticated.
    pub authenticated: bool,
    /// Authenticated username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Whether the session came from a SAML assertion.
    pub saml: bool,
    /// CSRF-protected logout URL, for authenticated sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logout_url: Option<String>,
}

/// Shows the current session.
///
/// Requests without a live session get an anonymous overview; nothing is
/// stored for them.
async fn home(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Json<SessionInfo> {
    let config = state.config();
    let Some(session) = session_id_from_headers(&headers, &config.session_cookie)
        .and_then(|id| state.sessions.get(&id))
    else {
        return Json(SessionInfo {
            authenticated: false,
            username: None,
            saml: false,
            logout_url: None,
        });
    };

    let logout_path = config.public_logout_path();
    let generator = SessionLogoutUrlGenerator::new(
        &logout_path,
        &config.csrf_parameter,
        Some(session.csrf_token.as_str()),
    );
    let logout_url = generator.logout_path(Some(&session.token)).ok().map(|path| {
        let request = state.request_context(&uri, &headers);
        format!("{}{}", request.scheme_and_http_host(), path)
    });

    Json(SessionInfo {
        authenticated: true,
        username: Some(session.token.username().to_string()),
        saml: session.token.saml_attributes().is_some(),
        logout_url,
    })
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Basic health check.
async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let (status, response) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.0.status, "healthy");
    }
}
