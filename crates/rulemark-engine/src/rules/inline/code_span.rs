use crate::output::{Element, Tag, html};
use crate::parsing::{Capture, Cursor, NodeData};
use crate::rules::{MatchScope, Matcher, Rule};

/// Text between equal backtick runs, with surrounding whitespace trimmed.
pub fn inline_code() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Inline, |source, _, _| match_code_span(source)),
        |capture, _, _| Ok(NodeData::new().field("content", capture.group(2)).into()),
    )
    .with_html(|node, _, _| {
        html::tag("code", &html::escape(node.text("content").unwrap_or_default()), &[])
    })
    .with_element(|node, _, state| {
        Tag::new("code")
            .key(state.key())
            .child(Element::text(node.text("content").unwrap_or_default()))
            .into()
    })
}

/// Tries the longest opening run first, then shorter ones. Group 1 is the
/// fence, group 2 the content.
fn match_code_span(source: &str) -> Option<Capture> {
    let run = Cursor::new(source).run_of(b'`');
    (1..=run).rev().find_map(|fence| match_with_fence(source, fence))
}

/// Content must not end in a backtick, and the closing run must be exactly
/// `fence` long. Leading whitespace goes to the padding when it can; content
/// only starts inside it when nothing else closes.
fn match_with_fence(source: &str, fence: usize) -> Option<Capture> {
    let mut padding = Cursor::at(source, fence);
    padding.eat_while(char::is_whitespace);
    let padded = padding.pos();

    let starts = (fence..=padded).rev().filter(|&i| source.is_char_boundary(i));
    for (attempt, content_start) in starts.enumerate() {
        let limit = if attempt == 0 { source.len() } else { padded };
        let mut cur = Cursor::at(source, content_start);
        while cur.pos() < limit {
            if cur.bump_char()? == '`' {
                continue;
            }
            let content_end = cur.pos();
            let mut close = cur.clone();
            close.eat_while(char::is_whitespace);
            if close.run_of(b'`') == fence {
                return Some(Capture::new(
                    &source[..close.pos() + fence],
                    [Some(&source[..fence]), Some(&source[content_start..content_end])],
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inline, inline_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("`a`", "`a`", "a")]
    #[case("` a `", "` a `", "a")]
    #[case("`` a`b ``", "`` a`b ``", "a`b")]
    #[case("``a`", "``a`", "`a")]
    #[case("`  `", "`  `", " ")]
    #[case("`a` and `b`", "`a`", "a")]
    fn test_code_spans(#[case] input: &str, #[case] full: &str, #[case] content: &str) {
        let capture = match_code_span(input).unwrap();
        assert_eq!(capture.full(), full);
        assert_eq!(capture.group(2), content);
    }

    #[rstest]
    #[case("`a``")]
    #[case("``")]
    #[case("`unclosed")]
    fn test_unmatched_runs(#[case] input: &str) {
        assert!(match_code_span(input).is_none());
    }

    #[test]
    fn test_code_content_is_escaped() {
        assert_eq!(inline_html("`a<b>`"), "<code>a&lt;b&gt;</code>");
        assert_eq!(inline("`x`")[0].kind(), "inlineCode");
    }
}
