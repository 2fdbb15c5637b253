//! SAML Logout types.
//!
//! Single Logout (SLO) request and response messages.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};
use crate::xml::{escape, extract_attribute, extract_element_content};

use super::{NameId, Status, StatusCode, SAMLP_NS, SAML_NS};

/// SAML Logout Request.
///
/// A request to terminate an existing session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the requester.
    pub issuer: String,

    /// The URL where this request was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// The name identifier of the principal to log out.
    pub name_id: NameId,

    /// Session indexes to terminate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub session_indexes: Vec<String>,

    /// Reason for the logout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Time after which the request is no longer valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,
}

fn default_version() -> String {
    "2.0".to_string()
}

fn new_id() -> String {
    format!("_id{}", uuid::Uuid::new_v4())
}

fn timestamp(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn parse_instant(value: &str, what: &str) -> SamlResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SamlError::InvalidRequest(format!("invalid {what}: {e}")))
}

impl LogoutRequest {
    /// Creates a new logout request.
    #[must_use]
    pub fn new(issuer: impl Into<String>, name_id: NameId) -> Self {
        Self {
            id: new_id(),
            version: default_version(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: None,
            name_id,
            session_indexes: Vec::new(),
            reason: None,
            not_on_or_after: None,
        }
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Adds a session index to terminate.
    #[must_use]
    pub fn with_session_index(mut self, index: impl Into<String>) -> Self {
        self.session_indexes.push(index.into());
        self
    }

    /// Sets the logout reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Sets the validity period.
    #[must_use]
    pub fn valid_for(mut self, minutes: i64) -> Self {
        self.not_on_or_after = Some(Utc::now() + chrono::Duration::minutes(minutes));
        self
    }

    /// Validates the basic structure of this request.
    pub fn validate(&self) -> SamlResult<()> {
        if self.id.is_empty() {
            return Err(SamlError::MissingElement("LogoutRequest ID".to_string()));
        }
        if self.version != "2.0" {
            return Err(SamlError::InvalidRequest(format!(
                "unsupported SAML version: {}",
                self.version
            )));
        }
        if self.issuer.is_empty() {
            return Err(SamlError::MissingElement("Issuer".to_string()));
        }
        if self.name_id.value.is_empty() {
            return Err(SamlError::MissingElement("NameID".to_string()));
        }
        Ok(())
    }

    /// Checks if the request has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.not_on_or_after
            .is_some_and(|not_after| Utc::now() >= not_after)
    }

    /// Parses a LogoutRequest from its XML form.
    pub fn from_xml(xml: &str) -> SamlResult<Self> {
        let id = extract_attribute(xml, "LogoutRequest", "ID")
            .ok_or_else(|| SamlError::MissingElement("LogoutRequest ID".to_string()))?;
        let version =
            extract_attribute(xml, "LogoutRequest", "Version").unwrap_or_else(default_version);
        let issue_instant = match extract_attribute(xml, "LogoutRequest", "IssueInstant") {
            Some(v) => parse_instant(&v, "IssueInstant")?,
            None => return Err(SamlError::MissingElement("IssueInstant".to_string())),
        };
        let not_on_or_after = extract_attribute(xml, "LogoutRequest", "NotOnOrAfter")
            .map(|v| parse_instant(&v, "NotOnOrAfter"))
            .transpose()?;

        let issuer = extract_element_content(xml, "Issuer")
            .ok_or_else(|| SamlError::MissingElement("Issuer".to_string()))?;
        let value = extract_element_content(xml, "NameID")
            .ok_or_else(|| SamlError::MissingElement("NameID".to_string()))?;
        let name_id = NameId {
            value,
            format: extract_attribute(xml, "NameID", "Format"),
            name_qualifier: extract_attribute(xml, "NameID", "NameQualifier"),
            sp_name_qualifier: extract_attribute(xml, "NameID", "SPNameQualifier"),
        };

        let request = Self {
            id,
            version,
            issue_instant,
            issuer,
            destination: extract_attribute(xml, "LogoutRequest", "Destination"),
            name_id,
            session_indexes: extract_element_content(xml, "SessionIndex")
                .into_iter()
                .collect(),
            reason: extract_attribute(xml, "LogoutRequest", "Reason"),
            not_on_or_after,
        };
        request.validate()?;
        Ok(request)
    }

    /// Serializes this request.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut attrs = format!(
            r#"ID="{}" Version="{}" IssueInstant="{}""#,
            escape(&self.id),
            escape(&self.version),
            timestamp(&self.issue_instant)
        );
        if let Some(destination) = &self.destination {
            attrs.push_str(&format!(r#" Destination="{}""#, escape(destination)));
        }
        if let Some(reason) = &self.reason {
            attrs.push_str(&format!(r#" Reason="{}""#, escape(reason)));
        }
        if let Some(not_after) = &self.not_on_or_after {
            attrs.push_str(&format!(r#" NotOnOrAfter="{}""#, timestamp(not_after)));
        }

        let session_indexes: String = self
            .session_indexes
            .iter()
            .map(|index| format!("<samlp:SessionIndex>{}</samlp:SessionIndex>", escape(index)))
            .collect();

        format!(
            r#"<samlp:LogoutRequest xmlns:samlp="{SAMLP_NS}" xmlns:saml="{SAML_NS}" {attrs}><saml:Issuer>{}</saml:Issuer>{}{session_indexes}</samlp:LogoutRequest>"#,
            escape(&self.issuer),
            self.name_id.to_xml(),
        )
    }
}

/// SAML Logout Response.
///
/// A response to a logout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Unique identifier for this response.
    pub id: String,

    /// Version of the SAML protocol (always "2.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Timestamp when this response was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the responder.
    pub issuer: String,

    /// The ID of the request this response is for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// The URL where this response was sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// The status of the response.
    pub status: Status,
}

impl LogoutResponse {
    /// Creates a new success logout response.
    #[must_use]
    pub fn success(issuer: impl Into<String>) -> Self {
        Self::with_status(issuer, Status::success())
    }

    /// Creates a logout response with the given status.
    #[must_use]
    pub fn with_status(issuer: impl Into<String>, status: Status) -> Self {
        Self {
            id: new_id(),
            version: default_version(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            in_response_to: None,
            destination: None,
            status,
        }
    }

    /// Sets the request ID this response is for.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.in_response_to = Some(request_id.into());
        self
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Returns true if this response indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Validates the basic structure of this response.
    pub fn validate(&self) -> SamlResult<()> {
        if self.id.is_empty() {
            return Err(SamlError::MissingElement("LogoutResponse ID".to_string()));
        }
        if self.version != "2.0" {
            return Err(SamlError::InvalidResponse(format!(
                "unsupported SAML version: {}",
                self.version
            )));
        }
        if self.issuer.is_empty() {
            return Err(SamlError::MissingElement("Issuer".to_string()));
        }
        Ok(())
    }

    /// Parses a LogoutResponse from its XML form.
    pub fn from_xml(xml: &str) -> SamlResult<Self> {
        let id = extract_attribute(xml, "LogoutResponse", "ID")
            .ok_or_else(|| SamlError::MissingElement("LogoutResponse ID".to_string()))?;
        let issue_instant = match extract_attribute(xml, "LogoutResponse", "IssueInstant") {
            Some(v) => parse_instant(&v, "IssueInstant")?,
            None => return Err(SamlError::MissingElement("IssueInstant".to_string())),
        };
        let issuer = extract_element_content(xml, "Issuer")
            .ok_or_else(|| SamlError::MissingElement("Issuer".to_string()))?;
        let code = extract_attribute(xml, "StatusCode", "Value")
            .ok_or_else(|| SamlError::MissingElement("StatusCode".to_string()))?;

        let response = Self {
            id,
            version: extract_attribute(xml, "LogoutResponse", "Version")
                .unwrap_or_else(default_version),
            issue_instant,
            issuer,
            in_response_to: extract_attribute(xml, "LogoutResponse", "InResponseTo"),
            destination: extract_attribute(xml, "LogoutResponse", "Destination"),
            status: Status {
                status_code: StatusCode::new(code),
                status_message: extract_element_content(xml, "StatusMessage"),
            },
        };
        response.validate()?;
        Ok(response)
    }

    /// Serializes this response.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut attrs = format!(
            r#"ID="{}" Version="{}" IssueInstant="{}""#,
            escape(&self.id),
            escape(&self.version),
            timestamp(&self.issue_instant)
        );
        if let Some(in_response_to) = &self.in_response_to {
            attrs.push_str(&format!(r#" InResponseTo="{}""#, escape(in_response_to)));
        }
        if let Some(destination) = &self.destination {
            attrs.push_str(&format!(r#" Destination="{}""#, escape(destination)));
        }

        format!(
            r#"<samlp:LogoutResponse xmlns:samlp="{SAMLP_NS}" xmlns:saml="{SAML_NS}" {attrs}><saml:Issuer>{}</saml:Issuer>{}</samlp:LogoutResponse>"#,
            escape(&self.issuer),
            self.status.to_xml(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{logout_reasons, NameIdFormat};

    #[test]
    fn logout_request_creation() {
        let request = LogoutRequest::new(
            "https://sp.example.com",
            NameId::new("user@example.com").with_format(NameIdFormat::Email),
        )
        .with_destination("https://idp.example.com/slo")
        .with_session_index("_session123")
        .with_reason(logout_reasons::USER)
        .valid_for(5);

        assert!(request.id.starts_with("_id"));
        assert_eq!(request.session_indexes.len(), 1);
        assert!(request.validate().is_ok());
        assert!(!request.is_expired());
    }

    #[test]
    fn parse_idp_logout_request() {
        let xml = r#"<samlp:LogoutRequest xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" ID="_logout123" Version="2.0" IssueInstant="2024-01-01T00:00:00Z" Destination="https://sp.example.com/saml/logout">
            <saml:Issuer>https://idp.example.com</saml:Issuer>
            <saml:NameID Format="urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress">user@example.com</saml:NameID>
            <samlp:SessionIndex>_session456</samlp:SessionIndex>
        </samlp:LogoutRequest>"#;

        let parsed = LogoutRequest::from_xml(xml).unwrap();
        assert_eq!(parsed.id, "_logout123");
        assert_eq!(parsed.issuer, "https://idp.example.com");
        assert_eq!(parsed.name_id.value, "user@example.com");
        assert_eq!(parsed.name_id.parsed_format(), NameIdFormat::Email);
        assert_eq!(parsed.session_indexes, vec!["_session456".to_string()]);
        assert_eq!(
            parsed.destination.as_deref(),
            Some("https://sp.example.com/saml/logout")
        );
    }

    #[test]
    fn parse_rejects_missing_name_id() {
        let xml = r#"<samlp:LogoutRequest ID="_x" IssueInstant="2024-01-01T00:00:00Z"><saml:Issuer>idp</saml:Issuer></samlp:LogoutRequest>"#;
        assert!(matches!(
            LogoutRequest::from_xml(xml),
            Err(SamlError::MissingElement(_))
        ));
    }

    #[test]
    fn expired_request_is_detected() {
        let xml = r#"<samlp:LogoutRequest ID="_x" IssueInstant="2020-01-01T00:00:00Z" NotOnOrAfter="2020-01-01T00:05:00Z"><saml:Issuer>idp</saml:Issuer><saml:NameID>u</saml:NameID></samlp:LogoutRequest>"#;
        assert!(LogoutRequest::from_xml(xml).unwrap().is_expired());
    }

    #[test]
    fn serialized_request_parses_back() {
        let request = LogoutRequest::new("https://sp.example.com", NameId::new("alice"))
            .with_destination("https://idp.example.com/slo")
            .with_session_index("_s1");

        let parsed = LogoutRequest::from_xml(&request.to_xml()).unwrap();
        assert_eq!(parsed.id, request.id);
        assert_eq!(parsed.name_id.value, "alice");
        assert_eq!(parsed.session_indexes, vec!["_s1".to_string()]);
    }

    #[test]
    fn logout_response_status_and_correlation() {
        let response = LogoutResponse::success("https://sp.example.com")
            .in_response_to("_req123")
            .with_destination("https://idp.example.com/slo");

        let parsed = LogoutResponse::from_xml(&response.to_xml()).unwrap();
        assert!(parsed.is_success());
        assert_eq!(parsed.in_response_to.as_deref(), Some("_req123"));

        let failed = LogoutResponse::with_status(
            "idp",
            Status {
                status_code: StatusCode::new("urn:oasis:names:tc:SAML:2.0:status:Requester"),
                status_message: Some("nope".to_string()),
            },
        );
        let parsed = LogoutResponse::from_xml(&failed.to_xml()).unwrap();
        assert!(!parsed.is_success());
        assert_eq!(parsed.status.status_message.as_deref(), Some("nope"));
    }
}
