use std::sync::OnceLock;

use regex::Regex;

use crate::output::{Tag, html};
use crate::parsing::NodeData;
use crate::rules::{Matcher, Rule};

/// `>`-prefixed lines, with lazy continuation lines, up to a blank line.
pub fn block_quote() -> Rule {
    let regex =
        Regex::new(r"^( *>[^\n]+(\n[^\n]+)*\n*)+\n{2,}").expect("Invalid block quote regex");
    Rule::new(Matcher::block(regex), |capture, parser, state| {
        static QUOTE_MARKER: OnceLock<Regex> = OnceLock::new();
        let marker =
            QUOTE_MARKER.get_or_init(|| Regex::new(r"(?m)^ *> ?").expect("Invalid quote regex"));

        let body = marker.replace_all(capture.full(), "");
        let content = state.with_scope(false, |state| parser.parse_nested(&body, state))?;
        Ok(NodeData::new().field("content", content).into())
    })
    .with_html(|node, output, state| {
        html::tag("blockquote", &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| {
        Tag::new("blockquote")
            .key(state.key())
            .child(output.render_all(node.nodes("content"), state))
            .into()
    })
}
