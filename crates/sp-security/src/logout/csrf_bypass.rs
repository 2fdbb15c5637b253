//! IdP-initiated logout through the CSRF-protected logout route.
//!
//! The IdP sends the browser to the SP logout route carrying a
//! `SAMLRequest`, but without the CSRF token the route demands. When, and
//! only when, that request is a valid SAML logout message, the failure is
//! replaced by a redirect to the same route with the session's token added.

use sp_protocol_saml::{SamlEngine, SloOptions};
use tracing::{debug, info, warn};

use crate::csrf::CsrfParameterBinding;
use crate::error::{SecurityError, SecurityResult};
use crate::http::{LogoutUrlGenerator, RedirectBuilder, RouteMatcher};
use crate::logout::LogoutOutcome;
use crate::request::FailureContext;
use crate::token::SessionToken;

/// Rewrites CSRF rejections of valid IdP-initiated logout requests.
///
/// Never mutates session or SAML state; `process_slo` is only used to
/// validate the message and is run again by the logout route itself.
#[derive(Debug, Clone)]
pub struct LogoutCsrfBypass<E, G, H> {
    engine: E,
    generator: G,
    http: H,
    logout_route: String,
}

impl<E, G, H> LogoutCsrfBypass<E, G, H>
where
    E: SamlEngine,
    G: LogoutUrlGenerator,
    H: RouteMatcher + RedirectBuilder,
{
    /// Creates an interceptor guarding `logout_route` (a route name or path).
    pub fn new(engine: E, generator: G, http: H, logout_route: impl Into<String>) -> Self {
        Self {
            engine,
            generator,
            http,
            logout_route: logout_route.into(),
        }
    }

    /// Inspects a failed request.
    ///
    /// Returns [`LogoutOutcome::Redirect`] with the absolute URL of the
    /// CSRF-bearing logout route, or [`LogoutOutcome::NoAction`] to leave the
    /// failure untouched. Only errors that are not protocol validation
    /// failures are returned as `Err`.
    pub fn on_failure(
        &self,
        failure: &FailureContext,
        principal: Option<&SessionToken>,
    ) -> SecurityResult<LogoutOutcome> {
        if !failure.is_invalid_csrf_token() {
            return Ok(LogoutOutcome::NoAction);
        }

        let request = &failure.request;
        if !self.http.path_matches(request, &self.logout_route) {
            debug!(path = request.path_info(), "CSRF failure outside the logout route");
            return Ok(LogoutOutcome::NoAction);
        }

        let Some(query) = request.query_string() else {
            debug!("CSRF failure on the logout route without a query string");
            return Ok(LogoutOutcome::NoAction);
        };

        match self.bypass(failure, principal, query) {
            Ok(url) => {
                info!(url = %url, "Redirecting IdP-initiated logout past CSRF protection");
                Ok(LogoutOutcome::Redirect(url))
            }
            Err(e) if e.is_recoverable() => {
                debug!(error = %e, "Not bypassing CSRF protection");
                Ok(LogoutOutcome::NoAction)
            }
            Err(e) => {
                warn!(error = %e, "Logout CSRF bypass failed");
                Err(e)
            }
        }
    }

    fn bypass(
        &self,
        failure: &FailureContext,
        principal: Option<&SessionToken>,
        query: &str,
    ) -> SecurityResult<String> {
        self.engine.process_slo(Some(query), &SloOptions::stay())?;

        let logout_path = self.generator.logout_path(principal).map_err(|e| match e {
            SecurityError::PrincipalResolution(_) => e,
            other => SecurityError::PrincipalResolution(other.to_string()),
        })?;

        let binding = CsrfParameterBinding::from_logout_url(&logout_path)
            .ok_or_else(|| SecurityError::MalformedLogoutUrl(logout_path.clone()))?;

        if failure.request.has_query_param(&binding.name) {
            return Err(SecurityError::DuplicateCsrfToken(binding.name));
        }

        let target = format!("{logout_path}&{query}");
        Ok(self.http.create_redirect_url(&failure.request, &target))
    }
}
