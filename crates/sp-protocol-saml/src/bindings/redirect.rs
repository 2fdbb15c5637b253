//! HTTP-Redirect Binding implementation.
//!
//! Implements the SAML 2.0 HTTP-Redirect binding for sending SAML messages
//! via URL query parameters with DEFLATE compression.

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{SamlError, SamlResult};

use super::{DecodedMessage, SamlMessageType};

/// Upper bound on the inflated size of a received message.
pub const MAX_MESSAGE_BYTES: usize = 256 * 1024;

/// HTTP-Redirect binding encoder/decoder.
pub struct HttpRedirectBinding;

impl HttpRedirectBinding {
    /// Encodes a LogoutRequest for HTTP-Redirect binding.
    ///
    /// Returns a URL with the encoded message in query parameters.
    pub fn encode_request(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<String> {
        Self::encode(xml, destination, relay_state, SamlMessageType::Request)
    }

    /// Encodes a LogoutResponse for HTTP-Redirect binding.
    pub fn encode_response(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
    ) -> SamlResult<String> {
        Self::encode(xml, destination, relay_state, SamlMessageType::Response)
    }

    fn encode(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
        message_type: SamlMessageType,
    ) -> SamlResult<String> {
        let compressed = deflate_compress(xml.as_bytes())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&compressed);

        let param_name = message_type.form_param();
        let separator = if destination.contains('?') { '&' } else { '?' };

        let mut url = format!(
            "{}{}{}={}",
            destination,
            separator,
            param_name,
            urlencoding::encode(&encoded)
        );

        if let Some(rs) = relay_state {
            url.push_str(&format!("&RelayState={}", urlencoding::encode(rs)));
        }

        Ok(url)
    }

    /// Decodes a SAML message from already URL-decoded parameter values.
    pub fn decode(
        saml_request: Option<&str>,
        saml_response: Option<&str>,
        relay_state: Option<&str>,
    ) -> SamlResult<DecodedMessage> {
        let (encoded, message_type) = if let Some(req) = saml_request {
            (req, SamlMessageType::Request)
        } else if let Some(resp) = saml_response {
            (resp, SamlMessageType::Response)
        } else {
            return Err(SamlError::MessageNotFound);
        };

        let b64_decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SamlError::Base64Decode(e.to_string()))?;

        let xml_bytes = deflate_decompress(&b64_decoded)?;

        let xml = String::from_utf8(xml_bytes)
            .map_err(|e| SamlError::InvalidRequest(format!("invalid UTF-8 in message: {e}")))?;

        Ok(DecodedMessage {
            xml,
            message_type,
            relay_state: relay_state.map(String::from),
        })
    }

    /// Decodes a message from a raw query string.
    pub fn decode_query(query: &str) -> SamlResult<DecodedMessage> {
        let mut saml_request = None;
        let mut saml_response = None;
        let mut relay_state = None;

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "SAMLRequest" => saml_request = Some(value.into_owned()),
                "SAMLResponse" => saml_response = Some(value.into_owned()),
                "RelayState" => relay_state = Some(value.into_owned()),
                _ => {}
            }
        }

        Self::decode(
            saml_request.as_deref(),
            saml_response.as_deref(),
            relay_state.as_deref(),
        )
    }
}

/// Compresses data using DEFLATE (raw, no zlib header).
fn deflate_compress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SamlError::Deflate(format!("compression error: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SamlError::Deflate(format!("compression finish error: {e}")))
}

/// Decompresses DEFLATE data, refusing output beyond [`MAX_MESSAGE_BYTES`].
fn deflate_decompress(data: &[u8]) -> SamlResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data).take(MAX_MESSAGE_BYTES as u64 + 1);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SamlError::Deflate(format!("decompression error: {e}")))?;

    if decompressed.len() > MAX_MESSAGE_BYTES {
        return Err(SamlError::Deflate("message too large".to_string()));
    }
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_decodes_from_its_query() {
        let xml = r#"<samlp:LogoutRequest>test content here</samlp:LogoutRequest>"#;
        let url = HttpRedirectBinding::encode_request(
            xml,
            "https://idp.example.com/slo",
            Some("https://sp.example.com/"),
        )
        .unwrap();

        assert!(url.starts_with("https://idp.example.com/slo?SAMLRequest="));
        assert!(url.ends_with("&RelayState=https%3A%2F%2Fsp.example.com%2F"));

        let (_, query) = url.split_once('?').unwrap();
        let decoded = HttpRedirectBinding::decode_query(query).unwrap();
        assert_eq!(decoded.xml, xml);
        assert_eq!(decoded.message_type, SamlMessageType::Request);
        assert_eq!(decoded.relay_state.as_deref(), Some("https://sp.example.com/"));
    }

    #[test]
    fn query_without_message_is_not_found() {
        let err = HttpRedirectBinding::decode_query("foo=bar").unwrap_err();
        assert!(matches!(err, SamlError::MessageNotFound));
    }

    #[test]
    fn garbage_message_is_rejected() {
        let err = HttpRedirectBinding::decode_query("SAMLRequest=please").unwrap_err();
        assert!(err.is_protocol_validation());
    }

    #[test]
    fn oversized_message_is_rejected() {
        let bomb = deflate_compress(&vec![b'A'; 4 * MAX_MESSAGE_BYTES]).unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bomb);
        let query = format!("SAMLRequest={}", urlencoding::encode(&encoded));

        let err = HttpRedirectBinding::decode_query(&query).unwrap_err();
        assert!(matches!(err, SamlError::Deflate(ref msg) if msg == "message too large"));
        assert!(err.is_protocol_validation());
    }

    #[test]
    fn message_at_the_limit_is_accepted() {
        let xml = "A".repeat(MAX_MESSAGE_BYTES);
        let url = HttpRedirectBinding::encode_request(&xml, "https://idp.example.com/slo", None)
            .unwrap();

        let (_, query) = url.split_once('?').unwrap();
        let decoded = HttpRedirectBinding::decode_query(query).unwrap();
        assert_eq!(decoded.xml.len(), MAX_MESSAGE_BYTES);
    }

    #[test]
    fn url_with_existing_query() {
        let url = HttpRedirectBinding::encode_response(
            "<Test/>",
            "https://idp.example.com/slo?existing=param",
            None,
        )
        .unwrap();

        assert!(url.contains("?existing=param&SAMLResponse="));
    }
}
