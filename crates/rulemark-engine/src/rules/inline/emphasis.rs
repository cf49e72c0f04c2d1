//! Emphasis, strong, underline and strikethrough.
//!
//! `em`, `strong` and `u` share an order tier and are scored by length, so
//! for runs like `***a***` or `___a___` the longest reading wins and `em`
//! takes ties. `del` has no score.

use std::sync::OnceLock;

use regex::Regex;

use crate::output::{Element, ElementTree, Output, RenderState, Tag, html};
use crate::parsing::{Capture, Cursor, Node, NodeData};
use crate::rules::{MatchScope, Matcher, Rule, capture_length, parse_capture_inline};

/// `_text_` between word boundaries, or `*text*` not starting with a space.
pub fn em() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| {
            match_underscore_em(source).or_else(|| match_star_em(source))
        }),
        |capture, parser, state| {
            let content = capture.first_non_empty(&[2, 1]).unwrap_or_default();
            let content = parser.parse_nested(content, state)?;
            Ok(NodeData::new().field("content", content).into())
        },
    )
    .with_quality(|capture, _, _| capture_length(capture) + 0.2)
    .with_html(|node, output, state| {
        html::tag("em", &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| wrap("em", node, output, state))
}

/// `**text**`
pub fn strong() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| match_doubled(source, b'*')),
        parse_capture_inline,
    )
    .with_quality(|capture, _, _| capture_length(capture) + 0.1)
    .with_html(|node, output, state| {
        html::tag("strong", &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| wrap("strong", node, output, state))
}

/// `__text__`
pub fn u() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| match_doubled(source, b'_')),
        parse_capture_inline,
    )
    .with_quality(|capture, _, _| capture_length(capture))
    .with_html(|node, output, state| {
        html::tag("u", &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| wrap("u", node, output, state))
}

/// `~~text~~` with no space just inside either end.
pub fn del() -> Rule {
    let regex = Regex::new(r"^~~([\s\S]*?\S)~~").expect("Invalid del regex");
    Rule::new(
        Matcher::custom(MatchScope::Inline, move |source, _, _| {
            let opens = Cursor::at(source, 2).peek_char().is_some_and(|c| !c.is_whitespace());
            if !opens {
                return None;
            }
            regex.captures(source).map(|caps| Capture::from_regex(&caps))
        }),
        parse_capture_inline,
    )
    .with_html(|node, output, state| {
        html::tag("del", &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| wrap("del", node, output, state))
}

fn wrap(name: &str, node: &Node, output: &Output<'_, ElementTree>, state: &RenderState) -> Element {
    Tag::new(name)
        .key(state.key())
        .child(output.render_all(node.nodes("content"), state))
        .into()
}

fn match_underscore_em(source: &str) -> Option<Capture> {
    static UNDERSCORE_EM: OnceLock<Regex> = OnceLock::new();
    let regex = UNDERSCORE_EM.get_or_init(|| {
        Regex::new(r"^(?-u:\b)_((?:__|\\[\s\S]|[^\\_])+?)_(?-u:\b)")
            .expect("Invalid emphasis regex")
    });
    regex.captures(source).map(|caps| Capture::from_regex(&caps))
}

/// `*` then a non-space, then the shortest run of tokens followed by a lone
/// `*`. A token is `**`, a whitespace run followed by `**` or by a character
/// that is neither space nor `*`, or a single such character. A star right
/// after whitespace never closes.
///
/// The content lands in group 2, group 1 being the underscore form's.
fn match_star_em(source: &str) -> Option<Capture> {
    let mut cur = Cursor::new(source);
    if cur.bump()? != b'*' || cur.peek_char().is_none_or(char::is_whitespace) {
        return None;
    }

    let start = cur.pos();
    loop {
        if cur.pos() > start && cur.peek() == Some(b'*') && cur.peek_at(1) != Some(b'*') {
            let end = cur.pos();
            return Some(Capture::new(&source[..end + 1], [None, Some(&source[start..end])]));
        }

        if cur.starts_with(b"**") {
            cur.bump_n(2);
            continue;
        }
        let c = cur.peek_char()?;
        if c.is_whitespace() {
            cur.eat_while(char::is_whitespace);
            if cur.starts_with(b"**") {
                cur.bump_n(2);
                continue;
            }
        }
        match cur.peek_char()? {
            '*' => return None,
            _ => {
                cur.bump_char();
            }
        }
    }
}

/// Two `marker`s, at least one character, then the first pair of `marker`s
/// not followed by a third.
fn match_doubled(source: &str, marker: u8) -> Option<Capture> {
    let delimiter = [marker, marker];
    let mut cur = Cursor::new(source);
    if !cur.starts_with(&delimiter) {
        return None;
    }
    cur.bump_n(2);
    cur.bump_char()?;

    loop {
        if cur.starts_with(&delimiter) && cur.peek_at(2) != Some(marker) {
            let end = cur.pos();
            return Some(Capture::new(&source[..end + 2], [Some(&source[2..end])]));
        }
        cur.bump_char()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inline, inline_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("*a*", Some("a"))]
    #[case("*a b* c", Some("a b"))]
    #[case("*a **b** c*", Some("a **b** c"))]
    #[case("* a*", None)]
    #[case("*a *", None)]
    #[case("**a**", None)]
    #[case("*a", None)]
    fn test_star_emphasis(#[case] input: &str, #[case] content: Option<&str>) {
        assert_eq!(match_star_em(input).map(|c| c.group(2).to_string()), content.map(str::to_string));
    }

    #[rstest]
    #[case("_a_", Some("a"))]
    #[case("_a_b", None)]
    #[case("_a\\_b_ c", Some("a\\_b"))]
    #[case("_a__b_", Some("a__b"))]
    fn test_underscore_emphasis(#[case] input: &str, #[case] content: Option<&str>) {
        assert_eq!(
            match_underscore_em(input).map(|c| c.group(1).to_string()),
            content.map(str::to_string)
        );
    }

    #[rstest]
    #[case("**a**", b'*', Some("**a**"))]
    #[case("**a***", b'*', Some("**a***"))]
    #[case("****", b'*', None)]
    #[case("__a__ b", b'_', Some("__a__"))]
    fn test_doubled_markers(#[case] input: &str, #[case] marker: u8, #[case] full: Option<&str>) {
        assert_eq!(
            match_doubled(input, marker).map(|c| c.full().to_string()),
            full.map(str::to_string)
        );
    }

    #[rstest]
    #[case("**bold**", "<strong>bold</strong>")]
    #[case("_word_", "<em>word</em>")]
    #[case("__under__", "<u>under</u>")]
    #[case("___a___", "<em><u>a</u></em>")]
    #[case("***a***", "<em><strong>a</strong></em>")]
    #[case("~~gone~~", "<del>gone</del>")]
    #[case("~~ gone~~", "~~ gone~~")]
    fn test_scored_emphasis(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(inline_html(input), expected);
    }

    #[test]
    fn test_em_content_comes_from_the_form_that_matched() {
        let nodes = inline("*x*");
        assert_eq!(nodes[0].kind(), "em");
        assert_eq!(nodes[0].nodes("content")[0].text("content"), Some("x"));
    }
}
