//! SAML 2.0 Service Provider logout engine.
//!
//! This crate provides the SAML side of Single Logout for a Service Provider:
//!
//! - **LogoutRequest / LogoutResponse types** - Parse and serialize SLO messages
//! - **HTTP-Redirect binding** - DEFLATE + base64 query parameter encoding
//! - **Settings** - SP and IdP endpoints used to route logout messages
//! - **Engine** - [`SamlEngine`] and its reference implementation [`SamlAuth`]
//!
//! # Architecture
//!
//! - [`types`] - SLO messages, name IDs, status codes and constants
//! - [`bindings`] - HTTP-Redirect binding
//! - [`settings`] - SP/IdP settings
//! - [`auth`] - The engine consumed by the logout handlers
//! - [`error`] - Error types for SAML operations
//!
//! # Example
//!
//! ```rust,ignore
//! use sp_protocol_saml::{SamlAuth, SamlEngine, SloOptions};
//!
//! let auth = SamlAuth::new(settings);
//! match auth.process_slo(request.query_string(), &SloOptions::stay()) {
//!     Ok(Some(url)) => redirect(url),
//!     Ok(None) => {}
//!     Err(e) if e.is_protocol_validation() => fall_back(),
//!     Err(e) => return Err(e.into()),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod bindings;
pub mod error;
pub mod settings;
pub mod types;

mod xml;

pub use auth::{LogoutParams, SamlAuth, SamlEngine, SloOptions};
pub use error::{SamlError, SamlResult};
pub use settings::{IdpSettings, SamlSettings, ServiceEndpoint, SpSettings};
pub use types::*;
