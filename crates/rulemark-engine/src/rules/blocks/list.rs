//! Bulleted and numbered lists.
//!
//! Items nest by indentation: a line belongs to the current item unless it
//! starts with the list's own indentation followed by a bullet and a space.
//! An item containing a blank line is "loose" and its body is parsed as
//! blocks; otherwise it is parsed inline, with nested lists still allowed.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;
use crate::output::{Element, Tag, html};
use crate::parsing::{Capture, Node, NodeData, Parsed, Parser, State, Value};
use crate::rules::{MatchScope, Matcher, Rule};

/// Bullet syntax shared by the matcher and the item splitter.
pub struct ListBullet;

impl ListBullet {
    pub const MARKERS: [u8; 3] = [b'*', b'+', b'-'];

    /// Byte length of the bullet at the start of `s`: one marker character or
    /// digits followed by a dot.
    pub fn len_at(s: &str) -> Option<usize> {
        let bytes = s.as_bytes();
        match bytes.first()? {
            b if Self::MARKERS.contains(b) => Some(1),
            b if b.is_ascii_digit() => {
                let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
                (bytes.get(digits) == Some(&b'.')).then_some(digits + 1)
            }
            _ => None,
        }
    }

    /// True if `line` starts with exactly `indent`, a bullet, then a space.
    pub fn starts_item(line: &str, indent: &str) -> bool {
        line.strip_prefix(indent).is_some_and(|rest| {
            Self::len_at(rest).is_some_and(|n| rest.as_bytes().get(n) == Some(&b' '))
        })
    }
}

pub fn list() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Any, |source, state, prev| {
            let at_line_start = prev.is_empty() || prev.trim_end_matches(' ').ends_with('\n');
            let allowed = state.in_list() || !state.is_inline();
            if at_line_start && allowed {
                match_list(source)
            } else {
                None
            }
        }),
        parse_list,
    )
    .with_html(|node, output, state| {
        let items: String = list_items(node)
            .map(|item| html::tag("li", &output.render_all(item, state), &[]))
            .collect();
        let start = node.int("start").map(|n| n.to_string());
        let name = if node.flag("ordered") { "ol" } else { "ul" };
        html::tag(name, &items, &[("start", start.as_deref())])
    })
    .with_element(|node, output, state| {
        let start = node.int("start").map(|n| n.to_string());
        let name = if node.flag("ordered") { "ol" } else { "ul" };
        Tag::new(name)
            .key(state.key())
            .attr("start", start.as_deref())
            .children(list_items(node).enumerate().map(|(i, item)| {
                Element::from(
                    Tag::new("li")
                        .key(Some(i.to_string().as_str()))
                        .child(output.render_all(item, state)),
                )
            }))
            .into()
    })
}

fn list_items(node: &Node) -> impl Iterator<Item = &[Node]> {
    node.list("items")
        .iter()
        .map(|item| item.as_nodes().unwrap_or(&[]))
}

/// Finds where a list starting at the front of `source` ends.
///
/// The body is the shortest run (at least one character after the first
/// bullet) that is followed either by three or more newlines, by exactly two
/// newlines before a line that is neither indented nor another item at the
/// same indentation, or by nothing but whitespace.
fn match_list(source: &str) -> Option<Capture> {
    let indent_len = source.bytes().take_while(|&b| b == b' ').count();
    let indent = &source[..indent_len];
    let bullet_len = ListBullet::len_at(&source[indent_len..])?;
    let bullet = &source[indent_len..indent_len + bullet_len];
    let prefix_end = indent_len + bullet_len + 1;
    if source.as_bytes().get(prefix_end - 1) != Some(&b' ') {
        return None;
    }

    let trailing_space_start = source.trim_end().len();
    let bytes = source.as_bytes();
    let mut end = prefix_end;
    loop {
        end += source[end..].chars().next()?.len_utf8();

        let newlines = bytes[end..].iter().take_while(|&&b| b == b'\n').count();
        let after = end + newlines;
        let closes = match newlines {
            0 | 1 => false,
            2 => bytes.get(after) != Some(&b' ') && !ListBullet::starts_item(&source[after..], indent),
            _ => true,
        };
        if closes {
            return Some(Capture::new(&source[..after], [Some(indent), Some(bullet)]));
        }
        if end >= trailing_space_start {
            return Some(Capture::new(source, [Some(indent), Some(bullet)]));
        }
    }
}

/// Splits a matched list into items, each starting at a line with the list's
/// indentation followed by a bullet.
fn split_items<'a>(list: &'a str, indent: &str) -> Vec<&'a str> {
    let mut items = vec![];
    let mut start = 0;
    let mut offset = 0;
    for line in list.split_inclusive('\n') {
        if offset > start && ListBullet::starts_item(line, indent) {
            items.push(&list[start..offset]);
            start = offset;
        }
        offset += line.len();
    }
    if start < list.len() {
        items.push(&list[start..]);
    }
    items
}

fn parse_list(capture: &Capture, parser: &Parser<'_>, state: &mut State) -> Result<Parsed, ParseError> {
    static LIST_BLOCK_END: OnceLock<Regex> = OnceLock::new();
    static ITEM_PREFIX: OnceLock<Regex> = OnceLock::new();
    static ITEM_END: OnceLock<Regex> = OnceLock::new();
    let block_end =
        LIST_BLOCK_END.get_or_init(|| Regex::new(r"\n{2,}$").expect("Invalid list end regex"));
    let item_prefix = ITEM_PREFIX.get_or_init(|| {
        Regex::new(r"^ *(?:[*+-]|\d+\.) +").expect("Invalid list item prefix regex")
    });
    let item_end = ITEM_END.get_or_init(|| Regex::new(r" *\n+$").expect("Invalid item end regex"));

    let bullet = capture.group(2);
    let ordered = bullet.len() > 1;
    let start = if ordered {
        bullet.trim_end_matches('.').parse::<i64>().ok()
    } else {
        None
    };

    let body = block_end.replace(capture.full(), "\n");
    let items = split_items(&body, capture.group(1));

    let mut last_was_paragraph = false;
    let mut parsed = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let prefix_len = item_prefix.find(item).map_or(0, |m| m.end());
        let unindented: Cow<'_, str> = if prefix_len > 0 {
            Regex::new(&format!("(?m)^ {{1,{prefix_len}}}"))
                .map_err(|e| ParseError::failed("list", e))?
                .replace_all(item, "")
        } else {
            Cow::Borrowed(item)
        };
        let content = item_prefix.replace(&unindented, "");

        let is_last = i + 1 == items.len();
        let is_paragraph = content.contains("\n\n") || (is_last && last_was_paragraph);
        last_was_paragraph = is_paragraph;

        let adjusted = item_end.replace(&content, if is_paragraph { "\n\n" } else { "" });
        let nodes =
            state.with_list_item(!is_paragraph, |state| parser.parse_nested(&adjusted, state))?;
        parsed.push(Value::Nodes(nodes));
    }

    Ok(NodeData::new()
        .field("ordered", ordered)
        .field("start", start)
        .field("items", parsed)
        .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{block, block_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("* a", Some(1))]
    #[case("12. a", Some(3))]
    #[case("12 a", None)]
    #[case("a", None)]
    fn test_bullet_lengths(#[case] input: &str, #[case] expected: Option<usize>) {
        assert_eq!(ListBullet::len_at(input), expected);
    }

    #[test]
    fn test_tight_list_ends_at_blank_line_before_other_text() {
        let capture = match_list("* a\n* b\n\nafter\n\n").unwrap();
        assert_eq!(capture.full(), "* a\n* b\n\n");
        assert_eq!(capture.group(1), "");
        assert_eq!(capture.group(2), "*");
    }

    #[test]
    fn test_blank_line_before_next_item_continues_the_list() {
        let capture = match_list("- a\n\n- b\n\n\nafter").unwrap();
        assert_eq!(capture.full(), "- a\n\n- b\n\n\n");
    }

    #[test]
    fn test_trailing_whitespace_ends_the_list() {
        let capture = match_list("1. a\n").unwrap();
        assert_eq!(capture.full(), "1. a\n");
    }

    #[test]
    fn test_bullet_needs_a_space() {
        assert!(match_list("*a\n\n").is_none());
        assert!(match_list("* \n").is_some());
    }

    #[test]
    fn test_splits_on_same_indent_bullets_only() {
        let items = split_items("* a\n  * nested\n* b\n", "");
        assert_eq!(items, vec!["* a\n  * nested\n", "* b\n"]);
    }

    #[test]
    fn test_renders_tight_list() {
        assert_eq!(block_html("* a\n* b\n\n"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn test_renders_ordered_list_with_start() {
        assert_eq!(
            block_html("3. x\n4. y\n\n"),
            r#"<ol start="3"><li>x</li><li>y</li></ol>"#
        );
    }

    #[test]
    fn test_loose_items_are_paragraphs() {
        assert_eq!(
            block_html("* a\n\n* b\n\n"),
            "<ul><li><p>a</p></li><li><p>b</p></li></ul>"
        );
    }

    #[test]
    fn test_nested_list_inside_tight_item() {
        assert_eq!(
            block_html("* a\n    * b\n\n"),
            "<ul><li>a\n  <ul><li>b</li></ul></li></ul>"
        );
    }

    #[test]
    fn test_list_node_fields() {
        let nodes = block("- a\n- b\n\n");
        assert_eq!(nodes[0].kind(), "list");
        assert!(!nodes[0].flag("ordered"));
        assert_eq!(nodes[0].get("start"), Some(&Value::Null));
        assert_eq!(nodes[0].list("items").len(), 2);
    }

    #[test]
    fn test_bullet_mid_line_is_text() {
        assert_eq!(block_html("a * b\n\n"), "<p>a * b</p>");
    }
}
