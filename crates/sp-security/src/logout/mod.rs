//! Logout orchestration.
//!
//! - [`LogoutCsrfBypass`] - Recovers IdP-initiated logout from CSRF rejection
//! - [`SamlLogoutHandler`] - Dual-path SAML Single Logout

mod csrf_bypass;
mod handler;

pub use csrf_bypass::*;
pub use handler::*;

/// What a logout component asks the framework to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogoutOutcome {
    /// Not our concern; leave the response (or failure) as it is.
    NoAction,
    /// Respond `302 Found` with this `Location`.
    Redirect(String),
}
