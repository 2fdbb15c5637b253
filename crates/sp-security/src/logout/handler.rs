//! Logout handlers run by the logout route.

use sp_protocol_saml::{LogoutParams, SamlEngine, SloOptions};
use tracing::{debug, info};

use crate::error::SecurityResult;
use crate::logout::LogoutOutcome;
use crate::request::RequestContext;
use crate::token::SessionToken;

/// A step of the logout pipeline.
///
/// Handlers run before the local session is invalidated. A handler returning
/// [`LogoutOutcome::Redirect`] overrides the default logout target.
pub trait LogoutHandler {
    /// Handles the logout of the session identified by `token`.
    fn logout(&self, request: &RequestContext, token: &SessionToken)
        -> SecurityResult<LogoutOutcome>;
}

impl<T: LogoutHandler + ?Sized> LogoutHandler for &T {
    fn logout(
        &self,
        request: &RequestContext,
        token: &SessionToken,
    ) -> SecurityResult<LogoutOutcome> {
        (**self).logout(request, token)
    }
}

/// SAML Single Logout for SAML-backed sessions.
///
/// Answers an IdP-initiated LogoutRequest when the logout route carries one;
/// otherwise starts SP-initiated logout at the IdP, if it has an SLO endpoint.
#[derive(Debug, Clone)]
pub struct SamlLogoutHandler<E> {
    engine: E,
}

impl<E: SamlEngine> SamlLogoutHandler<E> {
    /// Creates a handler over `engine`.
    pub const fn new(engine: E) -> Self {
        Self { engine }
    }

    fn initiate_logout(
        &self,
        request: &RequestContext,
        token: &SessionToken,
    ) -> SecurityResult<LogoutOutcome> {
        if !self.engine.has_slo_endpoint() {
            debug!("IdP has no Single Logout endpoint, logging out locally only");
            return Ok(LogoutOutcome::NoAction);
        }

        let params = LogoutParams {
            relay_state: Some(request.root_url()),
            parameters: Vec::new(),
            name_id: token.username().to_string(),
            session_index: token.session_index().map(String::from),
        };
        let url = self.engine.logout(&params)?;
        info!(user = token.username(), "Starting SP-initiated SAML logout");
        Ok(LogoutOutcome::Redirect(url))
    }
}

impl<E: SamlEngine> LogoutHandler for SamlLogoutHandler<E> {
    fn logout(
        &self,
        request: &RequestContext,
        token: &SessionToken,
    ) -> SecurityResult<LogoutOutcome> {
        if token.saml_attributes().is_none() {
            return Ok(LogoutOutcome::NoAction);
        }

        match self
            .engine
            .process_slo(request.query_string(), &SloOptions::stay())
        {
            Ok(Some(url)) => {
                info!(user = token.username(), "Answering IdP-initiated SAML logout");
                Ok(LogoutOutcome::Redirect(url))
            }
            Ok(None) => {
                debug!(user = token.username(), "SAML LogoutResponse processed");
                Ok(LogoutOutcome::NoAction)
            }
            Err(e) if e.is_protocol_validation() => {
                debug!(error = %e, "No valid SLO message, falling back to SP-initiated logout");
                self.initiate_logout(request, token)
            }
            Err(e) => Err(e.into()),
        }
    }
}
