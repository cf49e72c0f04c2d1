use std::sync::OnceLock;

use regex::Regex;

use crate::output::{Element, Tag, html};
use crate::parsing::{Capture, Node, NodeData};
use crate::rules::{MatchScope, Matcher, Rule};

/// Class prefix put in front of a code block's language when rendering.
pub const CODE_CLASS_PREFIX: &str = "markdown-code-";

/// Lines indented by four spaces.
pub fn code_block() -> Rule {
    let regex =
        Regex::new(r"^(?: {4}[^\n]+\n*)+(?:\n *)+\n").expect("Invalid code block regex");
    Rule::new(Matcher::block(regex), |capture, _, _| {
        static INDENT: OnceLock<Regex> = OnceLock::new();
        static TRAILING_NEWLINES: OnceLock<Regex> = OnceLock::new();
        let indent = INDENT.get_or_init(|| Regex::new(r"(?m)^ {4}").expect("Invalid indent regex"));
        let trailing = TRAILING_NEWLINES
            .get_or_init(|| Regex::new(r"\n+$").expect("Invalid trailing newline regex"));

        let unindented = indent.replace_all(capture.full(), "");
        let content = trailing.replace(&unindented, "");
        Ok(NodeData::new()
            .field("lang", None::<String>)
            .field("content", content.into_owned())
            .into())
    })
    .with_html(|node, _, _| {
        let class = code_class(node);
        let code = html::tag(
            "code",
            &html::escape(node.text("content").unwrap_or_default()),
            &[("class", class.as_deref())],
        );
        html::tag("pre", &code, &[])
    })
    .with_element(|node, _, state| {
        let class = code_class(node);
        let code = Tag::new("code")
            .attr("class", class.as_deref())
            .child(Element::text(node.text("content").unwrap_or_default()));
        Tag::new("pre").key(state.key()).child(code.into()).into()
    })
}

/// Backtick or tilde fence with an optional language; emits `codeBlock`.
pub fn fence() -> Rule {
    Rule::new(
        Matcher::custom(MatchScope::Block, |source, _, _| match_fence(source)),
        |capture, _, _| {
            Ok(NodeData::typed("codeBlock")
                .field("lang", capture.get(2))
                .field("content", capture.group(3))
                .into())
        },
    )
}

fn code_class(node: &Node) -> Option<String> {
    node.text("lang")
        .filter(|lang| !lang.is_empty())
        .map(|lang| format!("{CODE_CLASS_PREFIX}{lang}"))
}

/// The body is the shortest text after which the exact opening run recurs,
/// optionally preceded by whitespace, on a line followed by a blank line.
fn match_fence(source: &str) -> Option<Capture> {
    static OPEN: OnceLock<Regex> = OnceLock::new();
    let open = OPEN.get_or_init(|| {
        Regex::new(r"^ *(`{3,}|~{3,}) *(\S+)? *\n").expect("Invalid fence regex")
    });

    let caps = open.captures(source)?;
    let fence = caps.get(1)?.as_str();
    let lang = caps.get(2).map(|m| m.as_str());
    let body_start = caps.get(0)?.end();

    let close = Regex::new(&format!(r"^\s*{} *(?:\n *)+\n", regex::escape(fence))).ok()?;
    let body = &source[body_start..];
    (1..=body.len())
        .filter(|&end| body.is_char_boundary(end))
        .find_map(|end| {
            close.find(&body[end..]).map(|m| {
                let full = &source[..body_start + end + m.end()];
                Capture::new(full, [Some(fence), lang, Some(&body[..end])])
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{block, block_html};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_indented_block_strips_indent() {
        let nodes = block("    let x = 1;\n    x\n\n");
        assert_eq!(nodes[0].kind(), "codeBlock");
        assert_eq!(nodes[0].text("content"), Some("let x = 1;\nx"));
        assert_eq!(block_html("    a < b\n\n"), "<pre><code>a &lt; b</code></pre>");
    }

    #[test]
    fn test_fence_with_language() {
        assert_eq!(
            block_html("```rust\nfn main() {}\n```\n\n"),
            r#"<pre><code class="markdown-code-rust">fn main() {}</code></pre>"#
        );
    }

    #[test]
    fn test_fence_close_must_repeat_opening_run() {
        let capture = match_fence("~~~\na\n```\nb\n~~~\n\n").unwrap();
        assert_eq!(capture.group(3), "a\n```\nb");
    }

    #[test]
    fn test_fence_without_close_does_not_match() {
        assert!(match_fence("```\nnever closed\n").is_none());
    }

    #[test]
    fn test_fence_body_keeps_inner_blank_lines() {
        let nodes = block("```\none\n\ntwo\n```\n\n");
        assert_eq!(nodes[0].text("content"), Some("one\n\ntwo"));
        assert_eq!(nodes[0].get("lang"), Some(&crate::Value::Null));
    }
}
