use std::sync::OnceLock;

use regex::Regex;

/// Spaces substituted for each tab.
pub const TAB_WIDTH: usize = 4;

/// Normalizes raw input once, before the first parse step.
///
/// CRLF and lone CR become LF, form feeds are dropped, and tabs expand to
/// [`TAB_WIDTH`] spaces. Nested parses work on slices of the result and are
/// never normalized again.
pub fn preprocess(source: &str) -> String {
    static CR_NEWLINE: OnceLock<Regex> = OnceLock::new();
    let cr_newline = CR_NEWLINE.get_or_init(|| Regex::new(r"\r\n?").expect("Invalid CR regex"));

    cr_newline
        .replace_all(source, "\n")
        .replace('\u{000c}', "")
        .replace('\t', &" ".repeat(TAB_WIDTH))
}
