use regex::Regex;

use crate::output::{Tag, html};
use crate::parsing::NodeData;
use crate::rules::{Matcher, Rule};

/// `# Title` through `###### Title`, optional closing hashes.
pub fn heading() -> Rule {
    let regex =
        Regex::new(r"^ *(#{1,6}) *([^\n]+?) *#* *(?:\n *)+\n").expect("Invalid heading regex");
    Rule::new(Matcher::block(regex), |capture, parser, state| {
        let content = parser.parse_inline(capture.group(2), state)?;
        Ok(NodeData::new()
            .field("level", capture.group(1).len())
            .field("content", content)
            .into())
    })
    .with_html(|node, output, state| {
        let name = heading_tag(node.int("level"));
        html::tag(&name, &output.render_all(node.nodes("content"), state), &[])
    })
    .with_element(|node, output, state| {
        Tag::new(heading_tag(node.int("level")))
            .key(state.key())
            .child(output.render_all(node.nodes("content"), state))
            .into()
    })
}

/// Setext heading: a line underlined with `===` (level 1) or `---` (level 2).
pub fn lheading() -> Rule {
    let regex =
        Regex::new(r"^([^\n]+)\n *(=|-){3,} *(?:\n *)+\n").expect("Invalid lheading regex");
    Rule::new(Matcher::block(regex), |capture, parser, state| {
        let level: i64 = if capture.group(2) == "=" { 1 } else { 2 };
        let content = parser.parse_inline(capture.group(1), state)?;
        Ok(NodeData::typed("heading")
            .field("level", level)
            .field("content", content)
            .into())
    })
}

fn heading_tag(level: Option<i64>) -> String {
    format!("h{}", level.unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{block, block_html};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("# Title\n\n", "<h1>Title</h1>")]
    #[case("### Three ###\n\n", "<h3>Three</h3>")]
    #[case("###### *Six*\n\n", "<h6><em>Six</em></h6>")]
    #[case("Setext\n======\n\n", "<h1>Setext</h1>")]
    #[case("Setext\n---\n\n", "<h2>Setext</h2>")]
    fn test_renders_headings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(block_html(input), expected);
    }

    #[test]
    fn test_setext_heading_shares_node_type() {
        let nodes = block("Title\n===\n\n");
        assert_eq!(nodes[0].kind(), "heading");
        assert_eq!(nodes[0].int("level"), Some(1));
        assert_eq!(nodes[0].nodes("content")[0].text("content"), Some("Title"));
    }

    #[test]
    fn test_space_after_hashes_is_optional() {
        assert_eq!(block_html("#Tight\n\n"), "<h1>Tight</h1>");
    }
}
