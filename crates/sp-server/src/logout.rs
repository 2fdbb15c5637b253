//! The CSRF-protected logout route.

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use sp_protocol_saml::{SamlEngine, SloOptions};
use sp_security::{
    LogoutHandler, LogoutOutcome, RedirectBuilder, RequestContext, SamlLogoutHandler,
    INVALID_CSRF_TOKEN_MESSAGE,
};

use crate::csrf::is_csrf_token_valid;
use crate::error::{AppError, AppResult};
use crate::session::{expired_session_cookie, session_id_from_headers};
use crate::state::AppState;

/// Logs the current session out.
///
/// Requires the session's CSRF token in the query. Runs the logout handlers,
/// invalidates the session and redirects to the URL chosen by the last
/// handler asking for one, or to the configured logout target.
///
/// Without a session, a valid LogoutResponse from the IdP (the last leg of
/// an SP-initiated logout) is sent to the logout target as well.
pub async fn logout(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> AppResult<Response> {
    let config = state.config();
    let request = state.request_context(&uri, &headers);

    let session = session_id_from_headers(&headers, &config.session_cookie)
        .and_then(|id| state.sessions.get(&id));
    let submitted = request
        .query_params()
        .into_iter()
        .find(|(name, _)| *name == config.csrf_parameter)
        .map(|(_, value)| value);

    let session = match session {
        Some(session) if is_csrf_token_valid(&session.csrf_token, submitted.as_deref()) => session,
        Some(_) => return Err(csrf_rejection(&request)),
        None if completes_sp_initiated_logout(&state, &request) => {
            tracing::info!("SAML logout completed by the IdP");
            return Ok(found(logout_target(&state, &request), None));
        }
        None => return Err(csrf_rejection(&request)),
    };

    let mut target = None;
    let saml = SamlLogoutHandler::new(state.saml.as_ref());
    let handlers: [&dyn LogoutHandler; 1] = [&saml];
    for handler in handlers {
        if let LogoutOutcome::Redirect(url) = handler.logout(&request, &session.token)? {
            target = Some(url);
        }
    }
    tracing::info!(user = session.token.username(), "User logged out");

    state.sessions.invalidate(&session.id);

    let location = target.unwrap_or_else(|| logout_target(&state, &request));
    let cookie_path = if config.base_path.is_empty() {
        "/"
    } else {
        config.base_path.as_str()
    };

    Ok(found(
        location,
        Some(expired_session_cookie(&config.session_cookie, cookie_path)),
    ))
}

fn csrf_rejection(request: &RequestContext) -> AppError {
    tracing::debug!(path = request.path_info(), "Logout rejected: CSRF token mismatch");
    AppError::AccessDenied(INVALID_CSRF_TOKEN_MESSAGE.to_string())
}

/// True when the request carries a valid LogoutResponse and nothing is left
/// to do for it.
fn completes_sp_initiated_logout(state: &AppState, request: &RequestContext) -> bool {
    match state.saml.process_slo(request.query_string(), &SloOptions::stay()) {
        Ok(None) => true,
        Ok(Some(_)) => false,
        Err(e) => {
            tracing::debug!(error = %e, "No completed SAML logout in request");
            false
        }
    }
}

fn logout_target(state: &AppState, request: &RequestContext) -> String {
    state
        .http
        .create_redirect_url(request, &state.config().logout_target)
}

/// A `302 Found` response.
pub fn found(location: String, set_cookie: Option<String>) -> Response {
    let mut response = (StatusCode::FOUND, [(header::LOCATION, location)]).into_response();
    if let Some(cookie) = set_cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
