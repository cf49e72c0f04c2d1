use regex::Regex;

use crate::parsing::NodeData;
use crate::rules::{Matcher, Rule};

/// `[label]: target "title"`. Parse-only: defines the label for reference
/// links and images anywhere in the document, and renders nothing.
pub fn definition() -> Rule {
    let regex = Regex::new(r#"^ *\[([^\]]+)\]: *<?([^\s>]*)>?(?: +["(]([^\n]+)[")])? *\n(?: *\n)?"#)
        .expect("Invalid definition regex");
    Rule::new(Matcher::block(regex), |capture, _, state| {
        let target = capture.group(2);
        let title = capture.get(3);
        let label = state
            .references_mut()
            .define(capture.group(1), target, title);

        Ok(NodeData::new()
            .field("def", label)
            .field("target", target)
            .field("title", title)
            .into())
    })
}
