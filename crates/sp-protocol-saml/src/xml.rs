//! Minimal XML helpers for SLO messages.
//!
//! Logout messages are small and flat, so elements are located by scanning for
//! their (optionally prefixed) tag names instead of building a DOM.

const PREFIXES: [&str; 3] = ["samlp:", "saml:", ""];

/// Escapes text for use in element content or a double-quoted attribute.
pub(crate) fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`] for the five predefined entities.
pub(crate) fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Finds the opening tag of `element` and returns `(tag_start, tag_end)`,
/// where `tag_end` is the index of the closing `>`.
fn find_open_tag(xml: &str, element: &str) -> Option<(usize, usize)> {
    for prefix in PREFIXES {
        let pattern = format!("<{prefix}{element}");
        let mut from = 0;
        while let Some(rel) = xml[from..].find(&pattern) {
            let start = from + rel;
            let after = start + pattern.len();
            match xml[after..].chars().next() {
                Some(c) if c == '>' || c == '/' || c.is_whitespace() => {
                    let end = after + xml[after..].find('>')?;
                    return Some((start, end));
                }
                _ => from = after,
            }
        }
    }
    None
}

/// Extracts an attribute value from the first `element` tag.
pub(crate) fn extract_attribute(xml: &str, element: &str, attribute: &str) -> Option<String> {
    let (start, end) = find_open_tag(xml, element)?;
    let tag = &xml[start..end];
    let pattern = format!("{attribute}=\"");

    let mut from = 0;
    while let Some(rel) = tag[from..].find(&pattern) {
        let pos = from + rel;
        let preceded_by_space = tag[..pos].chars().last().is_some_and(char::is_whitespace);
        if preceded_by_space {
            let value_start = pos + pattern.len();
            let value_end = tag[value_start..].find('"')?;
            return Some(unescape(&tag[value_start..value_start + value_end]));
        }
        from = pos + pattern.len();
    }
    None
}

/// Extracts the trimmed text content of the first `element`.
pub(crate) fn extract_element_content(xml: &str, element: &str) -> Option<String> {
    let (start, end) = find_open_tag(xml, element)?;
    if xml[start..end].ends_with('/') {
        return Some(String::new());
    }
    let content_start = end + 1;
    let close = PREFIXES
        .iter()
        .filter_map(|prefix| xml[content_start..].find(&format!("</{prefix}{element}>")))
        .min()?;
    Some(unescape(xml[content_start..content_start + close].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_requires_word_boundary() {
        let xml = r#"<samlp:LogoutResponse RequestID="_other" InResponseTo="_req" ID="_resp">"#;
        assert_eq!(extract_attribute(xml, "LogoutResponse", "ID").as_deref(), Some("_resp"));
        assert_eq!(
            extract_attribute(xml, "LogoutResponse", "InResponseTo").as_deref(),
            Some("_req")
        );
    }

    #[test]
    fn element_with_attributes() {
        let xml = r#"<saml:NameID Format="urn:x">user@example.com</saml:NameID>"#;
        assert_eq!(
            extract_element_content(xml, "NameID").as_deref(),
            Some("user@example.com")
        );
    }

    #[test]
    fn element_prefix_must_match_whole_name() {
        let xml = "<saml:IssuerX>no</saml:IssuerX><Issuer>yes</Issuer>";
        assert_eq!(extract_element_content(xml, "Issuer").as_deref(), Some("yes"));
    }

    #[test]
    fn escape_unescape() {
        assert_eq!(unescape(&escape(r#"a<b&"c""#)), r#"a<b&"c""#);
    }
}
