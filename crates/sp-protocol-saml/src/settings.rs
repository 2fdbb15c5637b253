//! Service Provider and Identity Provider settings.

use crate::error::{SamlError, SamlResult};
use crate::types::NameIdFormat;

/// A SAML service endpoint reached over the HTTP-Redirect binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    /// Where messages are sent.
    pub url: String,
    /// Where responses go, when different from `url`.
    pub response_url: Option<String>,
}

impl ServiceEndpoint {
    /// Creates an HTTP-Redirect endpoint.
    #[must_use]
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            response_url: None,
        }
    }

    /// Sets a distinct response location.
    #[must_use]
    pub fn with_response_url(mut self, url: impl Into<String>) -> Self {
        self.response_url = Some(url.into());
        self
    }

    /// Returns the URL responses should be sent to.
    #[must_use]
    pub fn response_location(&self) -> &str {
        self.response_url.as_deref().unwrap_or(&self.url)
    }
}

/// Identity Provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdpSettings {
    /// IdP entity ID; expected issuer of inbound logout messages.
    pub entity_id: String,
    /// IdP Single Logout Service. SP-initiated logout is impossible without it.
    pub single_logout_service: Option<ServiceEndpoint>,
}

/// Service Provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpSettings {
    /// SP entity ID; issuer of outbound logout messages.
    pub entity_id: String,
    /// SP Single Logout Service, the expected destination of inbound messages.
    pub single_logout_service: Option<ServiceEndpoint>,
    /// NameID format used in outbound LogoutRequests.
    pub name_id_format: NameIdFormat,
}

/// Settings for the SAML engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamlSettings {
    /// Reject messages with a wrong issuer, destination or expiry.
    pub strict: bool,
    /// Log decoded SAML messages.
    pub debug: bool,
    /// Identity Provider settings.
    pub idp: IdpSettings,
    /// Service Provider settings.
    pub sp: SpSettings,
}

impl SamlSettings {
    /// Creates strict settings for the given SP and IdP entity IDs.
    #[must_use]
    pub fn new(sp_entity_id: impl Into<String>, idp_entity_id: impl Into<String>) -> Self {
        Self {
            strict: true,
            debug: false,
            idp: IdpSettings {
                entity_id: idp_entity_id.into(),
                single_logout_service: None,
            },
            sp: SpSettings {
                entity_id: sp_entity_id.into(),
                single_logout_service: None,
                name_id_format: NameIdFormat::Unspecified,
            },
        }
    }

    /// Sets the IdP Single Logout Service.
    #[must_use]
    pub fn with_idp_slo(mut self, endpoint: ServiceEndpoint) -> Self {
        self.idp.single_logout_service = Some(endpoint);
        self
    }

    /// Sets the SP Single Logout Service.
    #[must_use]
    pub fn with_sp_slo(mut self, endpoint: ServiceEndpoint) -> Self {
        self.sp.single_logout_service = Some(endpoint);
        self
    }

    /// Sets the NameID format.
    #[must_use]
    pub const fn with_name_id_format(mut self, format: NameIdFormat) -> Self {
        self.sp.name_id_format = format;
        self
    }

    /// Sets strict mode.
    #[must_use]
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Checks the settings are usable.
    pub fn validate(&self) -> SamlResult<()> {
        if self.sp.entity_id.is_empty() {
            return Err(SamlError::Configuration("SP entity ID is required".to_string()));
        }
        if self.idp.entity_id.is_empty() {
            return Err(SamlError::Configuration("IdP entity ID is required".to_string()));
        }
        for endpoint in [&self.idp.single_logout_service, &self.sp.single_logout_service]
            .into_iter()
            .flatten()
        {
            url::Url::parse(&endpoint.url).map_err(|e| {
                SamlError::Configuration(format!("invalid SLO URL {}: {e}", endpoint.url))
            })?;
        }
        Ok(())
    }
}
