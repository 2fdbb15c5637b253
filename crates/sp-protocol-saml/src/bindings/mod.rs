//! SAML bindings.
//!
//! Single Logout messages travel over the **HTTP-Redirect binding**: the XML is
//! deflated, base64-encoded and URL-encoded into a query parameter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sp_protocol_saml::bindings::HttpRedirectBinding;
//!
//! let url = HttpRedirectBinding::encode_request(&request_xml, "https://idp.example.com/slo", Some("relay"))?;
//! let decoded = HttpRedirectBinding::decode_query("SAMLRequest=...&RelayState=relay")?;
//! ```

mod redirect;

pub use redirect::*;

/// SAML message type for binding operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageType {
    /// LogoutRequest message.
    Request,
    /// LogoutResponse message.
    Response,
}

impl SamlMessageType {
    /// Returns the query parameter name for this message type.
    #[must_use]
    pub const fn form_param(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }
}

/// Decoded SAML binding message.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    /// The decoded XML message.
    pub xml: String,
    /// The message type (request or response).
    pub message_type: SamlMessageType,
    /// The RelayState if present.
    pub relay_state: Option<String>,
}
