//! SAML Name ID.

use serde::{Deserialize, Serialize};

use super::NameIdFormat;

/// Identifier of the principal being logged out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameId {
    /// The actual identifier value.
    pub value: String,

    /// The format of the name identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// The security or administrative domain that qualifies the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_qualifier: Option<String>,

    /// The service provider's entity ID that qualifies the name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_name_qualifier: Option<String>,
}

impl NameId {
    /// Creates a new name ID with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            format: None,
            name_qualifier: None,
            sp_name_qualifier: None,
        }
    }

    /// Sets the format for this name ID.
    #[must_use]
    pub fn with_format(mut self, format: NameIdFormat) -> Self {
        self.format = Some(format.uri().to_string());
        self
    }

    /// Sets the SP name qualifier.
    #[must_use]
    pub fn with_sp_name_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.sp_name_qualifier = Some(qualifier.into());
        self
    }

    /// Returns the parsed name ID format.
    #[must_use]
    pub fn parsed_format(&self) -> NameIdFormat {
        self.format
            .as_deref()
            .and_then(NameIdFormat::from_uri)
            .unwrap_or_default()
    }

    /// Serializes this name ID as a `saml:NameID` element.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut attrs = String::new();
        if let Some(format) = &self.format {
            attrs.push_str(&format!(r#" Format="{}""#, crate::xml::escape(format)));
        }
        if let Some(qualifier) = &self.name_qualifier {
            attrs.push_str(&format!(r#" NameQualifier="{}""#, crate::xml::escape(qualifier)));
        }
        if let Some(qualifier) = &self.sp_name_qualifier {
            attrs.push_str(&format!(r#" SPNameQualifier="{}""#, crate::xml::escape(qualifier)));
        }
        format!(
            "<saml:NameID{}>{}</saml:NameID>",
            attrs,
            crate::xml::escape(&self.value)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_id_with_format() {
        let name_id = NameId::new("user@example.com").with_format(NameIdFormat::Email);
        assert_eq!(name_id.parsed_format(), NameIdFormat::Email);
    }

    #[test]
    fn name_id_xml_escapes_value() {
        let xml = NameId::new("a<b")
            .with_sp_name_qualifier("https://sp.example.com")
            .to_xml();
        assert_eq!(
            xml,
            r#"<saml:NameID SPNameQualifier="https://sp.example.com">a&lt;b</saml:NameID>"#
        );
    }
}
