//! The SAML engine used by the logout handlers.
//!
//! [`SamlEngine`] is the seam between the application's logout pipeline and
//! the SAML protocol. [`SamlAuth`] implements it over the HTTP-Redirect
//! binding; it never owns local session state, so processing a message has no
//! side effects and may be repeated for the same request.

use tracing::{debug, info};

use crate::bindings::{DecodedMessage, HttpRedirectBinding, SamlMessageType};
use crate::error::{SamlError, SamlResult};
use crate::settings::SamlSettings;
use crate::types::{logout_reasons, LogoutRequest, LogoutResponse, NameId};

/// Options for [`SamlEngine::process_slo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SloOptions {
    /// Return the continuation URL instead of following the RelayState of a
    /// LogoutResponse.
    pub stay: bool,
}

impl SloOptions {
    /// Options used by the logout handlers: hand every URL back to the caller.
    #[must_use]
    pub const fn stay() -> Self {
        Self { stay: true }
    }
}

/// Parameters of an SP-initiated LogoutRequest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoutParams {
    /// Where the IdP should send the browser once logout completes.
    pub relay_state: Option<String>,
    /// Extra query parameters appended to the IdP URL.
    pub parameters: Vec<(String, String)>,
    /// NameID of the principal.
    pub name_id: String,
    /// Session index from the authentication assertion.
    pub session_index: Option<String>,
}

/// SAML Single Logout engine.
pub trait SamlEngine: Send + Sync {
    /// Validates and consumes the SLO message carried by `query`.
    ///
    /// Returns the URL the browser must be sent to next (the IdP endpoint
    /// receiving our LogoutResponse), or `None` when a LogoutResponse was
    /// processed and nothing is left to do. A request without any SLO message
    /// yields [`SamlError::MessageNotFound`].
    fn process_slo(&self, query: Option<&str>, options: &SloOptions) -> SamlResult<Option<String>>;

    /// Builds an SP-initiated LogoutRequest and returns the IdP redirect URL.
    fn logout(&self, params: &LogoutParams) -> SamlResult<String>;

    /// Returns the IdP Single Logout Service URL, if configured.
    fn slo_url(&self) -> Option<&str>;

    /// Returns true if SP-initiated logout is possible.
    fn has_slo_endpoint(&self) -> bool {
        self.slo_url().is_some_and(|url| !url.is_empty())
    }
}

impl<T: SamlEngine + ?Sized> SamlEngine for &T {
    fn process_slo(&self, query: Option<&str>, options: &SloOptions) -> SamlResult<Option<String>> {
        (**self).process_slo(query, options)
    }

    fn logout(&self, params: &LogoutParams) -> SamlResult<String> {
        (**self).logout(params)
    }

    fn slo_url(&self) -> Option<&str> {
        (**self).slo_url()
    }

    fn has_slo_endpoint(&self) -> bool {
        (**self).has_slo_endpoint()
    }
}

/// Reference [`SamlEngine`] over the HTTP-Redirect binding.
#[derive(Debug, Clone)]
pub struct SamlAuth {
    settings: SamlSettings,
}

impl SamlAuth {
    /// Creates an engine with the given settings.
    #[must_use]
    pub const fn new(settings: SamlSettings) -> Self {
        Self { settings }
    }

    /// Returns the engine settings.
    #[must_use]
    pub const fn settings(&self) -> &SamlSettings {
        &self.settings
    }

    fn check_issuer(&self, issuer: &str) -> SamlResult<()> {
        if self.settings.strict && issuer != self.settings.idp.entity_id {
            return Err(SamlError::InvalidIssuer {
                expected: self.settings.idp.entity_id.clone(),
                actual: issuer.to_string(),
            });
        }
        Ok(())
    }

    fn check_destination(&self, destination: Option<&str>) -> SamlResult<()> {
        let (Some(actual), Some(expected)) =
            (destination, self.settings.sp.single_logout_service.as_ref())
        else {
            return Ok(());
        };
        if self.settings.strict && actual != expected.url {
            return Err(SamlError::InvalidDestination {
                expected: expected.url.clone(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    fn process_logout_request(&self, message: &DecodedMessage) -> SamlResult<String> {
        let request = LogoutRequest::from_xml(&message.xml)?;
        self.check_issuer(&request.issuer)?;
        self.check_destination(request.destination.as_deref())?;
        if self.settings.strict && request.is_expired() {
            return Err(SamlError::Expired);
        }

        let endpoint = self.settings.idp.single_logout_service.as_ref().ok_or_else(|| {
            SamlError::Configuration("IdP single logout service is not configured".to_string())
        })?;
        let destination = endpoint.response_location();

        let response = LogoutResponse::success(&self.settings.sp.entity_id)
            .in_response_to(&request.id)
            .with_destination(destination);

        info!(
            request_id = %request.id,
            name_id = %request.name_id.value,
            "IdP-initiated SAML logout request accepted"
        );

        HttpRedirectBinding::encode_response(
            &response.to_xml(),
            destination,
            message.relay_state.as_deref(),
        )
    }

    fn process_logout_response(
        &self,
        message: &DecodedMessage,
        options: &SloOptions,
    ) -> SamlResult<Option<String>> {
        let response = LogoutResponse::from_xml(&message.xml)?;
        self.check_issuer(&response.issuer)?;
        self.check_destination(response.destination.as_deref())?;

        if !response.is_success() {
            return Err(SamlError::StatusNotSuccess(
                response.status.status_code.value.clone(),
            ));
        }

        info!(
            response_id = %response.id,
            in_response_to = response.in_response_to.as_deref().unwrap_or_default(),
            "SAML logout response accepted"
        );

        if options.stay {
            Ok(None)
        } else {
            Ok(message.relay_state.clone())
        }
    }
}

impl SamlEngine for SamlAuth {
    fn process_slo(&self, query: Option<&str>, options: &SloOptions) -> SamlResult<Option<String>> {
        let query = query
            .filter(|q| !q.is_empty())
            .ok_or(SamlError::MessageNotFound)?;
        let message = HttpRedirectBinding::decode_query(query)?;

        if self.settings.debug {
            debug!(xml = %message.xml, "decoded SAML logout message");
        }

        match message.message_type {
            SamlMessageType::Request => self.process_logout_request(&message).map(Some),
            SamlMessageType::Response => self.process_logout_response(&message, options),
        }
    }

    fn logout(&self, params: &LogoutParams) -> SamlResult<String> {
        let destination = self.slo_url().ok_or_else(|| {
            SamlError::Configuration("IdP single logout service is not configured".to_string())
        })?;

        let name_id = NameId::new(&params.name_id)
            .with_format(self.settings.sp.name_id_format)
            .with_sp_name_qualifier(&self.settings.sp.entity_id);
        let mut request = LogoutRequest::new(&self.settings.sp.entity_id, name_id)
            .with_destination(destination)
            .with_reason(logout_reasons::USER);
        if let Some(index) = &params.session_index {
            request = request.with_session_index(index);
        }

        let mut url = HttpRedirectBinding::encode_request(
            &request.to_xml(),
            destination,
            params.relay_state.as_deref(),
        )?;
        for (key, value) in &params.parameters {
            url.push_str(&format!(
                "&{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            ));
        }

        debug!(request_id = %request.id, "built SP-initiated SAML logout request");
        Ok(url)
    }

    fn slo_url(&self) -> Option<&str> {
        self.settings
            .idp
            .single_logout_service
            .as_ref()
            .map(|endpoint| endpoint.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ServiceEndpoint;
    use crate::types::{Status, StatusCode};

    const IDP: &str = "https://idp.example.com";
    const IDP_SLO: &str = "https://idp.example.com/slo";
    const SP: &str = "https://sp.example.com";
    const SP_SLO: &str = "https://sp.example.com/saml/logout";

    fn auth() -> SamlAuth {
        SamlAuth::new(
            SamlSettings::new(SP, IDP)
                .with_idp_slo(ServiceEndpoint::redirect(IDP_SLO))
                .with_sp_slo(ServiceEndpoint::redirect(SP_SLO)),
        )
    }

    fn query_of(url: &str) -> &str {
        url.split_once('?').map(|(_, q)| q).unwrap()
    }

    fn idp_request(issuer: &str) -> String {
        let request = LogoutRequest::new(issuer, NameId::new("alice"))
            .with_destination(SP_SLO)
            .with_session_index("_s1");
        let url =
            HttpRedirectBinding::encode_request(&request.to_xml(), SP_SLO, Some("back")).unwrap();
        query_of(&url).to_string()
    }

    #[test]
    fn missing_message_is_a_validation_error() {
        let err = auth().process_slo(None, &SloOptions::stay()).unwrap_err();
        assert!(matches!(err, SamlError::MessageNotFound));
        assert!(err.is_protocol_validation());

        let err = auth().process_slo(Some(""), &SloOptions::stay()).unwrap_err();
        assert!(matches!(err, SamlError::MessageNotFound));
    }

    #[test]
    fn idp_logout_request_yields_response_url() {
        let url = auth()
            .process_slo(Some(&idp_request(IDP)), &SloOptions::stay())
            .unwrap()
            .unwrap();

        assert!(url.starts_with("https://idp.example.com/slo?SAMLResponse="));
        assert!(url.ends_with("&RelayState=back"));

        let decoded = HttpRedirectBinding::decode_query(query_of(&url)).unwrap();
        let response = LogoutResponse::from_xml(&decoded.xml).unwrap();
        assert!(response.is_success());
        assert_eq!(response.issuer, SP);
        assert!(response.in_response_to.is_some());
    }

    #[test]
    fn processing_is_repeatable() {
        let query = idp_request(IDP);
        let auth = auth();
        assert!(auth.process_slo(Some(&query), &SloOptions::stay()).is_ok());
        assert!(auth.process_slo(Some(&query), &SloOptions::stay()).is_ok());
    }

    #[test]
    fn wrong_issuer_is_rejected_in_strict_mode() {
        let err = auth()
            .process_slo(Some(&idp_request("https://evil.example.com")), &SloOptions::stay())
            .unwrap_err();
        assert!(matches!(err, SamlError::InvalidIssuer { .. }));

        let lax = SamlAuth::new(auth().settings().clone().strict(false));
        assert!(lax
            .process_slo(Some(&idp_request("https://evil.example.com")), &SloOptions::stay())
            .is_ok());
    }

    #[test]
    fn missing_idp_slo_is_a_configuration_error() {
        let auth = SamlAuth::new(SamlSettings::new(SP, IDP));
        let err = auth
            .process_slo(Some(&idp_request(IDP)), &SloOptions::stay())
            .unwrap_err();
        assert!(!err.is_protocol_validation());
        assert!(!auth.has_slo_endpoint());
    }

    #[test]
    fn logout_response_checks_issuer_and_status() {
        let ok = LogoutResponse::success(IDP).in_response_to("_req1");
        let url = HttpRedirectBinding::encode_response(&ok.to_xml(), SP_SLO, Some("/home")).unwrap();
        let query = query_of(&url);

        let auth = auth();
        assert_eq!(auth.process_slo(Some(query), &SloOptions::stay()).unwrap(), None);
        assert_eq!(
            auth.process_slo(Some(query), &SloOptions::default()).unwrap().as_deref(),
            Some("/home")
        );

        let forged = LogoutResponse::success("https://evil.example.com").in_response_to("_req1");
        let url = HttpRedirectBinding::encode_response(&forged.to_xml(), SP_SLO, None).unwrap();
        let err = auth
            .process_slo(Some(query_of(&url)), &SloOptions::stay())
            .unwrap_err();
        assert!(matches!(err, SamlError::InvalidIssuer { .. }));

        let failed = LogoutResponse::with_status(
            IDP,
            Status {
                status_code: StatusCode::new("urn:oasis:names:tc:SAML:2.0:status:Requester"),
                status_message: Some("denied".to_string()),
            },
        );
        let url = HttpRedirectBinding::encode_response(&failed.to_xml(), SP_SLO, None).unwrap();
        let err = auth
            .process_slo(Some(query_of(&url)), &SloOptions::stay())
            .unwrap_err();
        assert!(matches!(err, SamlError::StatusNotSuccess(_)));
    }

    #[test]
    fn sp_initiated_logout_url() {
        let url = auth()
            .logout(&LogoutParams {
                relay_state: Some("https://sp.example.com".to_string()),
                parameters: vec![("lang".to_string(), "en".to_string())],
                name_id: "alice".to_string(),
                session_index: Some("_s1".to_string()),
            })
            .unwrap();

        assert!(url.starts_with("https://idp.example.com/slo?SAMLRequest="));
        assert!(url.contains("&RelayState=https%3A%2F%2Fsp.example.com"));
        assert!(url.ends_with("&lang=en"));

        let decoded = HttpRedirectBinding::decode_query(query_of(&url)).unwrap();
        let request = LogoutRequest::from_xml(&decoded.xml).unwrap();
        assert_eq!(request.issuer, SP);
        assert_eq!(request.name_id.value, "alice");
        assert_eq!(request.session_indexes, vec!["_s1".to_string()]);
        assert_eq!(request.destination.as_deref(), Some(IDP_SLO));
    }

    #[test]
    fn sp_initiated_logout_requires_idp_slo() {
        let auth = SamlAuth::new(SamlSettings::new(SP, IDP));
        let err = auth.logout(&LogoutParams::default()).unwrap_err();
        assert!(matches!(err, SamlError::Configuration(_)));
    }
}
