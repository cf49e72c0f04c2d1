//! Bare and angle-bracketed URLs. All three rules emit `link` nodes.

use regex::Regex;

use crate::parsing::{Node, NodeData};
use crate::rules::{Matcher, Rule};

const MAILTO: &str = "mailto:";

/// `<scheme:/path>`
pub fn autolink() -> Rule {
    let regex = Regex::new(r"^<([^ >]+:/[^ >]+)>").expect("Invalid autolink regex");
    Rule::new(Matcher::inline(regex), |capture, _, _| {
        Ok(link_to(capture.group(1), capture.group(1)).into())
    })
}

/// `<user@host>`, linked with a `mailto:` target.
pub fn mailto() -> Rule {
    let regex = Regex::new(r"^<([^ >]+@[^ >]+)>").expect("Invalid mailto regex");
    Rule::new(Matcher::inline(regex), |capture, _, _| {
        let address = capture.group(1);
        let target = if address.to_ascii_lowercase().contains(MAILTO) {
            address.to_string()
        } else {
            format!("{MAILTO}{address}")
        };
        Ok(link_to(address, &target).into())
    })
}

/// A bare `http://` or `https://` URL, minus trailing punctuation.
pub fn url() -> Rule {
    let regex =
        Regex::new(r#"^(https?://[^\s<]+[^<.,:;"')\]\s])"#).expect("Invalid url regex");
    Rule::new(Matcher::inline(regex), |capture, _, _| {
        Ok(link_to(capture.group(1), capture.group(1)).into())
    })
}

fn link_to(label: &str, target: &str) -> NodeData {
    NodeData::typed("link")
        .field("content", vec![Node::new("text").with("content", label)])
        .field("target", target)
}
