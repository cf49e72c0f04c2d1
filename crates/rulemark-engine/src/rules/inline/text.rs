use std::sync::OnceLock;

use regex::Regex;

use crate::output::{Element, Tag, html};
use crate::parsing::{Capture, NodeData};
use crate::rules::{MatchScope, Matcher, Rule, ignore_capture};

/// Plain text, up to the next character another inline rule could start on.
///
/// A run stops before any symbol (anything outside ASCII alphanumerics,
/// whitespace and U+00C0 upwards), a blank line, a hard break, or a
/// `word:non-space` sequence that could begin a bare URL.
pub fn text() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| match_text(source)),
        |capture, _, _| Ok(NodeData::new().field("content", capture.full()).into()),
    )
    .with_html(|node, _, _| html::escape(node.text("content").unwrap_or_default()).into_owned())
    .with_element(|node, _, _| Element::text(node.text("content").unwrap_or_default()))
}

/// A backslash before a symbol yields the symbol as text.
pub fn escape() -> Rule {
    let regex = Regex::new(r"^\\([^0-9A-Za-z\s])").expect("Invalid escape regex");
    Rule::new(Matcher::inline(regex), |capture, _, _| {
        Ok(NodeData::typed("text")
            .field("content", capture.group(1))
            .into())
    })
}

/// Two or more spaces before a newline.
pub fn br() -> Rule {
    let regex = Regex::new(r"^ {2,}\n").expect("Invalid br regex");
    Rule::new(Matcher::any_scope(regex), ignore_capture)
        .with_html(|_, _, _| html::void_tag("br", &[]))
        .with_element(|_, _, state| Tag::new("br").key(state.key()).into())
}

fn match_text(source: &str) -> Option<Capture> {
    static STOP: OnceLock<Regex> = OnceLock::new();
    let stop = STOP.get_or_init(|| {
        Regex::new(r"^(?:[^0-9A-Za-z\s\x{00c0}-\x{10ffff}]|\n\n| {2,}\n|[0-9A-Za-z_]+:\S|$)")
            .expect("Invalid text stop regex")
    });

    let end = source
        .char_indices()
        .map(|(i, _)| i)
        .skip(1)
        .find(|&i| stop.is_match(&source[i..]))
        .unwrap_or(source.len());
    (end > 0).then(|| Capture::whole(&source[..end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inline, inline_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("hello world", "hello world")]
    #[case("hello *world*", "hello ")]
    #[case("*x", "*x")]
    #[case("see http://x.com", "see ")]
    #[case("a\n\nb", "a")]
    #[case("a  \nb", "a")]
    #[case("café au lait!", "café au lait")]
    #[case("日本語.", "日本語")]
    fn test_text_runs_stop_before_markup(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(match_text(input).map(|c| c.full().to_string()), Some(expected.to_string()));
    }

    #[test]
    fn test_escaped_symbols_become_text() {
        let nodes = inline(r"\*not em\*");
        assert_eq!(nodes[0].kind(), "text");
        assert_eq!(nodes[0].text("content"), Some("*"));
        assert_eq!(inline_html(r"\*not em\*"), "*not em*");
    }

    #[test]
    fn test_backslash_before_letter_is_kept() {
        assert_eq!(inline_html(r"a\b"), r"a\b");
    }

    #[test]
    fn test_text_is_escaped_in_html() {
        assert_eq!(inline_html("a < b & c"), "a &lt; b &amp; c");
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(inline_html("one  \ntwo"), "one<br>two");
    }
}
