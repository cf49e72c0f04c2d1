//! Inline and reference links and images.
//!
//! The bracketed part may contain balanced `[...]` pairs, and a `]` that is
//! followed by another `]` before any `[`. The first way of reading the
//! brackets, in that preference order, after which the suffix also matches
//! wins, so `[a [b] c](/u)` links all of `a [b] c`.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::output::{Tag, html};
use crate::parsing::{Capture, Cursor, NodeData, State};
use crate::rules::{MatchScope, Matcher, Rule};
use crate::url::{sanitize_url, unescape_url};

/// `[text](target "title")`
pub fn link() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| {
            match_bracketed(source, "[", inline_suffix())
        }),
        |capture, parser, state| {
            let content = parser.parse_nested(capture.group(1), state)?;
            Ok(NodeData::new()
                .field("content", content)
                .field("target", unescape_url(capture.group(2)))
                .field_opt("title", capture.get(3))
                .into())
        },
    )
    .with_html(|node, output, state| {
        let href = node.text("target").and_then(sanitize_url);
        html::tag(
            "a",
            &output.render_all(node.nodes("content"), state),
            &[("href", href.as_deref()), ("title", node.text("title"))],
        )
    })
    .with_element(|node, output, state| {
        let href = node.text("target").and_then(sanitize_url);
        Tag::new("a")
            .key(state.key())
            .attr("href", href.as_deref())
            .attr("title", node.text("title"))
            .child(output.render_all(node.nodes("content"), state))
            .into()
    })
}

/// `![alt](src "title")`
pub fn image() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| {
            match_bracketed(source, "![", inline_suffix())
        }),
        |capture, _, _| {
            Ok(NodeData::new()
                .field("alt", capture.group(1))
                .field("target", unescape_url(capture.group(2)))
                .field_opt("title", capture.get(3))
                .into())
        },
    )
    .with_html(|node, _, _| {
        let src = node.text("target").and_then(sanitize_url);
        html::void_tag(
            "img",
            &[
                ("src", src.as_deref()),
                ("alt", node.text("alt")),
                ("title", node.text("title")),
            ],
        )
    })
    .with_element(|node, _, state| {
        let src = node.text("target").and_then(sanitize_url);
        Tag::new("img")
            .key(state.key())
            .attr("src", src.as_deref())
            .attr("alt", node.text("alt"))
            .attr("title", node.text("title"))
            .into()
    })
}

/// `[text][label]`, `[text] [label]` or `[label][]`; emits `link`.
pub fn reflink() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| {
            match_bracketed(source, "[", reference_suffix())
        }),
        |capture, parser, state| {
            let content = parser.parse_nested(capture.group(1), state)?;
            let data = NodeData::typed("link").field("content", content);
            Ok(with_reference(data, capture, state).into())
        },
    )
}

/// `![alt][label]`; emits `image`.
pub fn refimage() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| {
            match_bracketed(source, "![", reference_suffix())
        }),
        |capture, _, state| {
            let data = NodeData::typed("image").field("alt", capture.group(1));
            Ok(with_reference(data, capture, state).into())
        },
    )
}

/// Registers a reference slot for the explicit label, falling back to the
/// link text, and fills in the target now if it is already defined.
fn with_reference(data: NodeData, capture: &Capture, state: &mut State) -> NodeData {
    let label = capture.first_non_empty(&[2, 1]).unwrap_or_default();
    let id = state.references_mut().reference(label);
    let data = data.with_reference(id);
    match state.references().resolved(id) {
        Some(def) => data
            .field("target", def.target.as_str())
            .field_opt("title", def.title.as_deref()),
        None => data,
    }
}

fn inline_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| {
        Regex::new(r#"^\(\s*<?((?:[^\s\\]|\\.)*?)>?(?:\s+['"]([\s\S]*?)['"])?\s*\)"#)
            .expect("Invalid link target regex")
    })
}

fn reference_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| Regex::new(r"^\s*\[([^\]]*)\]").expect("Invalid reference regex"))
}

/// Matches `opener`, the bracketed text, `]`, then `suffix`.
///
/// Group 1 is the bracketed text; the suffix's groups follow it.
fn match_bracketed(source: &str, opener: &str, suffix: &Regex) -> Option<Capture> {
    let inside_start = opener.len();
    if !source.starts_with(opener) {
        return None;
    }

    let (close, caps) = find_close(source, inside_start, suffix)?;
    let end = close + 1 + caps.get(0)?.end();
    let mut groups = vec![Some(&source[inside_start..close])];
    groups.extend(caps.iter().skip(1).map(|m| m.map(|m| m.as_str())));
    Some(Capture::new(&source[..end], groups))
}

enum Step {
    /// Read more bracketed text from this position.
    Extend(usize),
    /// Try to close the brackets here.
    Close(usize),
}

/// Depth-first search over the ways of reading the bracketed text, in
/// preference order. A position that failed once fails again, so each is
/// expanded at most once.
fn find_close<'s>(source: &'s str, start: usize, suffix: &Regex) -> Option<(usize, Captures<'s>)> {
    let mut stack = vec![Step::Extend(start)];
    let mut seen = HashSet::new();

    while let Some(step) = stack.pop() {
        match step {
            Step::Extend(at) => {
                if !seen.insert(at) {
                    continue;
                }
                stack.push(Step::Close(at));
                let cur = Cursor::at(source, at);
                match cur.peek() {
                    Some(b']') => {
                        let rest = &source[at + 1..];
                        let next_close = rest.find(']');
                        let next_open = rest.find('[');
                        if next_close.is_some_and(|c| next_open.is_none_or(|o| c < o)) {
                            stack.push(Step::Extend(at + 1));
                        }
                    }
                    Some(b'[') => {
                        if let Some(c) = source[at + 1..].find(']') {
                            stack.push(Step::Extend(at + 1 + c + 1));
                        }
                    }
                    Some(_) => {
                        let width = cur.peek_char().map_or(1, char::len_utf8);
                        stack.push(Step::Extend(at + width));
                    }
                    None => {}
                }
            }
            Step::Close(at) => {
                if Cursor::at(source, at).peek() == Some(b']') {
                    if let Some(caps) = suffix.captures(&source[at + 1..]) {
                        return Some((at, caps));
                    }
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{block_html, inline, inline_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("[a](/u)", "a", "/u", None)]
    #[case("[a [b] c](/u)", "a [b] c", "/u", None)]
    #[case("[a]b](/u)", "a]b", "/u", None)]
    #[case("[x]( <http://a.com> \"T\" )", "x", "http://a.com", Some("T"))]
    #[case(r"[x](/a\)b)", "x", r"/a\)b", None)]
    fn test_bracketed_links(
        #[case] input: &str,
        #[case] text: &str,
        #[case] target: &str,
        #[case] title: Option<&str>,
    ) {
        let capture = match_bracketed(input, "[", inline_suffix()).unwrap();
        assert_eq!(capture.full(), input);
        assert_eq!(capture.group(1), text);
        assert_eq!(capture.group(2), target);
        assert_eq!(capture.get(3), title);
    }

    #[test]
    fn test_unclosed_brackets_do_not_match() {
        assert!(match_bracketed("[a(/u)", "[", inline_suffix()).is_none());
        assert!(match_bracketed("[a] (/u)", "[", inline_suffix()).is_none());
        assert!(match_bracketed("[a[b](/u)", "[", inline_suffix()).is_none());
    }

    #[test]
    fn test_stray_open_bracket_stays_text() {
        assert_eq!(inline_html("[a[b](/u)"), r#"[a<a href="/u">b</a>"#);
    }

    #[test]
    fn test_renders_link_with_title() {
        assert_eq!(
            inline_html(r#"[*hi*](/u "T")"#),
            r#"<a href="/u" title="T"><em>hi</em></a>"#
        );
    }

    #[test]
    fn test_link_target_is_unescaped() {
        let nodes = inline(r"[x](/a\)b)");
        assert_eq!(nodes[0].text("target"), Some("/a)b"));
    }

    #[test]
    fn test_script_links_lose_href() {
        assert_eq!(inline_html("[x](javascript:alert(1))"), "<a>x</a>)");
    }

    #[test]
    fn test_renders_image() {
        assert_eq!(
            inline_html(r#"![a cat](/cat.png "Cat")"#),
            r#"<img src="/cat.png" alt="a cat" title="Cat">"#
        );
    }

    #[test]
    fn test_reference_link_uses_explicit_label() {
        assert_eq!(
            block_html("[text][Ref]\n\n[ref]: /r \"R\"\n\n"),
            "<p><a href=\"/r\" title=\"R\">text</a></p>\n"
        );
    }

    #[test]
    fn test_reference_link_falls_back_to_text_label() {
        assert_eq!(
            block_html("[ref]: /r\n\n[Ref][]\n\n"),
            "<p><a href=\"/r\">Ref</a></p>"
        );
    }

    #[test]
    fn test_reference_image() {
        let nodes = inline("![pic] [p]");
        assert_eq!(nodes[0].kind(), "image");
        assert_eq!(nodes[0].text("alt"), Some("pic"));
        assert_eq!(nodes[0].get("target"), None);
    }
}
