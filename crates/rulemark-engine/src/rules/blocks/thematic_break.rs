use regex::Regex;

use crate::output::Tag;
use crate::rules::{Matcher, Rule, ignore_capture};

/// Three or more `-`, `*` or `_`, optionally spaced, on their own line.
pub fn hr() -> Rule {
    let regex = Regex::new(r"^( *[-*_]){3,} *(?:\n *)+\n").expect("Invalid hr regex");
    Rule::new(Matcher::block(regex), ignore_capture)
        .with_html(|_, _, _| "<hr>".to_string())
        .with_element(|_, _, state| Tag::new("hr").key(state.key()).into())
}
