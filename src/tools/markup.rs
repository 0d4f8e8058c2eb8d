//! Small helpers for pulling plain text out of HTML and Atom payloads.

use regex::Regex;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));").unwrap());

/// Removes markup tags, leaving their text content.
pub fn strip_tags(s: &str) -> String {
    TAG.replace_all(s, "").into_owned()
}

/// Decodes the named entities search pages use plus numeric references.
pub fn decode_entities(s: &str) -> String {
    let named = s
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    let numeric = NUMERIC_ENTITY.replace_all(&named, |caps: &regex::Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    // Last, so "&amp;lt;" stays "&lt;".
    numeric.replace("&amp;", "&")
}

/// Collapses runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tag-stripped, entity-decoded, whitespace-collapsed text.
pub fn to_plain_text(s: &str) -> String {
    collapse_whitespace(&decode_entities(&strip_tags(s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_plain_text() {
        assert_eq!(
            to_plain_text("The <b>Rust</b>\n  programming&nbsp;language &amp; friends"),
            "The Rust programming language & friends"
        );
    }

    #[test]
    fn test_decode_numeric_entities() {
        assert_eq!(decode_entities("it&#x27;s &#8212; ok"), "it's — ok");
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
    }
}
