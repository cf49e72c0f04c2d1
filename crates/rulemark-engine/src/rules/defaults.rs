//! The built-in markdown grammar.

use super::blocks::{
    block_quote, code_block, definition, fence, heading, hr, lheading, list, newline, nptable,
    paragraph, table,
};
use super::inline::{
    autolink, br, del, em, escape, image, inline_code, link, mailto, refimage, reflink, strong,
    text, u, url,
};
use super::ruleset::RuleSetBuilder;

/// A builder holding every built-in rule in precedence order.
///
/// Block rules come first and `text` last. `strong` and `u` share `em`'s
/// order so the three compete by quality. Callers add, replace or remove
/// rules before building.
pub fn default_rules() -> RuleSetBuilder {
    RuleSetBuilder::new()
        .rule("heading", heading())
        .rule("nptable", nptable())
        .rule("lheading", lheading())
        .rule("hr", hr())
        .rule("codeBlock", code_block())
        .rule("fence", fence())
        .rule("blockQuote", block_quote())
        .rule("list", list())
        .rule("def", definition())
        .rule("table", table())
        .rule("newline", newline())
        .rule("paragraph", paragraph())
        .rule("escape", escape())
        .rule("autolink", autolink())
        .rule("mailto", mailto())
        .rule("url", url())
        .rule("link", link())
        .rule("image", image())
        .rule("reflink", reflink())
        .rule("refimage", refimage())
        .rule("em", em())
        .rule_ordered_as("strong", strong(), "em")
        .rule_ordered_as("u", u(), "em")
        .rule("del", del())
        .rule("inlineCode", inline_code())
        .rule("br", br())
        .rule("text", text())
}
