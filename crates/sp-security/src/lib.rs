//! # sp-security
//!
//! Logout orchestration for a SAML Service Provider.
//!
//! Two components reconcile the application's CSRF-protected logout route
//! with SAML Single Logout:
//!
//! - [`LogoutCsrfBypass`] observes failed requests. When the logout route
//!   rejects an IdP-initiated LogoutRequest for lacking a CSRF token, and the
//!   SAML message validates on its own, it redirects the browser to the same
//!   route with a fresh token.
//! - [`SamlLogoutHandler`] runs while a SAML-backed session terminates. It
//!   completes IdP-initiated logout when the request carries one, and
//!   otherwise starts SP-initiated logout at the IdP.
//!
//! Request state is passed explicitly as a [`RequestContext`]; nothing here
//! reads ambient request or session state.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod csrf;
pub mod error;
pub mod http;
pub mod logout;
pub mod request;
pub mod token;

pub use csrf::{CsrfParameterBinding, INVALID_CSRF_TOKEN_MESSAGE};
pub use error::{SecurityError, SecurityResult};
pub use http::{HttpUtils, LogoutUrlGenerator, RedirectBuilder, RouteMatcher};
pub use logout::{LogoutCsrfBypass, LogoutHandler, LogoutOutcome, SamlLogoutHandler};
pub use request::{FailureContext, FailureKind, RequestContext};
pub use token::{SamlSessionAttributes, SessionToken};
