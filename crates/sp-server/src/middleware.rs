//! Failure-observing middleware.
//!
//! Runs after the inner handler. When the response carries a
//! [`RequestFailure`], the logout CSRF bypass gets a chance to replace it with
//! a redirect before it reaches the client.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use sp_security::{FailureContext, LogoutCsrfBypass, LogoutOutcome};

use crate::csrf::SessionLogoutUrlGenerator;
use crate::error::{AppError, RequestFailure};
use crate::logout::found;
use crate::session::session_id_from_headers;
use crate::state::{AppState, LOGOUT_ROUTE};

/// Replaces CSRF rejections of valid IdP-initiated logout requests.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/saml/logout", get(logout))
///     .layer(middleware::from_fn_with_state(state.clone(), csrf_bypass_middleware));
/// ```
pub async fn csrf_bypass_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let uri = request.uri().clone();
    let headers = request.headers().clone();

    let response = next.run(request).await;

    let Some(failure) = response.extensions().get::<RequestFailure>().cloned() else {
        return response;
    };

    let config = state.config();
    let failure = FailureContext::new(
        failure.kind,
        failure.message,
        state.request_context(&uri, &headers),
    );
    let session = session_id_from_headers(&headers, &config.session_cookie)
        .and_then(|id| state.sessions.get(&id));
    let principal = session.as_ref().map(|s| &s.token);

    let logout_path = config.public_logout_path();
    let generator = SessionLogoutUrlGenerator::new(
        &logout_path,
        &config.csrf_parameter,
        session.as_ref().map(|s| s.csrf_token.as_str()),
    );
    let bypass = LogoutCsrfBypass::new(
        state.saml.as_ref(),
        generator,
        state.http.as_ref(),
        LOGOUT_ROUTE,
    );

    match bypass.on_failure(&failure, principal) {
        Ok(LogoutOutcome::Redirect(url)) => found(url, None),
        Ok(LogoutOutcome::NoAction) => response,
        Err(e) => AppError::from(e).into_response(),
    }
}
