//! HTML string backend.

use std::borrow::Cow;
use std::fmt::Write;

use super::Backend;

pub struct Html;

impl Backend for Html {
    type Output = String;

    const NAME: &'static str = "html";

    fn empty() -> String {
        String::new()
    }

    fn sequence(items: Vec<String>) -> String {
        items.concat()
    }
}

/// A closed tag around already-rendered `content`.
///
/// Attributes are written in the given order; absent or empty values are
/// dropped and the rest are escaped.
pub fn tag(name: &str, content: &str, attributes: &[(&str, Option<&str>)]) -> String {
    let mut out = open_tag(name, attributes);
    out.push_str(content);
    let _ = write!(out, "</{name}>");
    out
}

/// An unclosed tag such as `<img ...>`.
pub fn void_tag(name: &str, attributes: &[(&str, Option<&str>)]) -> String {
    open_tag(name, attributes)
}

pub fn escape(text: &str) -> Cow<'_, str> {
    html_escape::encode_text(text)
}

fn open_tag(name: &str, attributes: &[(&str, Option<&str>)]) -> String {
    let mut out = format!("<{name}");
    for &(attr, value) in attributes {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = write!(
                out,
                " {attr}=\"{}\"",
                html_escape::encode_double_quoted_attribute(value)
            );
        }
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_absent_and_empty_attributes() {
        assert_eq!(
            tag("a", "x", &[("href", Some("/u")), ("title", None), ("style", Some(""))]),
            r#"<a href="/u">x</a>"#
        );
    }

    #[test]
    fn test_escapes_attribute_values() {
        assert_eq!(
            void_tag("img", &[("alt", Some(r#"a "b" <c>"#))]),
            r#"<img alt="a &quot;b&quot; &lt;c&gt;">"#
        );
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
    }
}
