use std::sync::OnceLock;

use regex::Regex;

use crate::output::{Element, Tag, html};
use crate::parsing::Capture;
use crate::rules::{MatchScope, Matcher, Rule, ignore_capture, parse_capture_inline};

/// Blank lines between blocks.
pub fn newline() -> Rule {
    let regex = Regex::new(r"^(?:\n *)*\n").expect("Invalid newline regex");
    Rule::new(Matcher::block(regex), ignore_capture)
        .with_html(|_, _, _| "\n".to_string())
        .with_element(|_, _, _| Element::text("\n"))
}

/// Lines of text up to the next blank line.
pub fn paragraph() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Block, |source, _, _| match_paragraph(source)),
        parse_capture_inline,
    )
    .with_html(|node, output, state| {
        html::tag("p", &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| {
        Tag::new("p")
            .key(state.key())
            .child(output.render_all(node.nodes("content"), state))
            .into()
    })
}

/// Content runs to the first newline followed by an all-space line; the
/// blank lines after it are consumed too.
fn match_paragraph(source: &str) -> Option<Capture> {
    static BLANK_LINE: OnceLock<Regex> = OnceLock::new();
    static TERMINATOR: OnceLock<Regex> = OnceLock::new();
    let blank_line =
        BLANK_LINE.get_or_init(|| Regex::new(r"\n *\n").expect("Invalid blank line regex"));
    let terminator =
        TERMINATOR.get_or_init(|| Regex::new(r"^(?:\n *)+\n").expect("Invalid terminator regex"));

    let end = blank_line.find(source)?.start();
    if end == 0 {
        return None;
    }
    let tail = terminator.find(&source[end..])?;
    let content = &source[..end];
    Some(Capture::new(&source[..end + tail.end()], [Some(content)]))
}
