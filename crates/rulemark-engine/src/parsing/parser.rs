use log::trace;

use crate::error::ParseError;
use crate::preprocess::preprocess;
use crate::rules::{RuleEntry, RuleSet};

use super::capture::Capture;
use super::node::{Node, Parsed};
use super::state::State;

/// Recursive-descent driver over a [`RuleSet`].
///
/// Each step picks one winning rule for the front of the remaining input,
/// hands its capture to the rule's `parse`, and strips the consumed prefix.
/// Rules recurse through the same `Parser` for nested content.
#[derive(Clone, Copy)]
pub struct Parser<'r> {
    rules: &'r RuleSet,
}

impl<'r> Parser<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'r RuleSet {
        self.rules
    }

    /// Parses a whole document.
    ///
    /// Normalizes the input once, then resolves reference nodes against the
    /// definitions collected in `state` before returning.
    ///
    /// # Arguments
    /// - `source`: Raw input; line endings, tabs and form feeds are normalized
    ///   before any rule sees it
    /// - `state`: Parse context; its inline flag picks the starting scope and
    ///   its reference table keeps the definitions found
    ///
    /// # Returns
    /// The top-level nodes, with reference links filled in where their label
    /// is defined, or the first [`ParseError`] raised by the parse loop or a
    /// rule.
    pub fn parse(&self, source: &str, state: &mut State) -> Result<Vec<Node>, ParseError> {
        let source = preprocess(source);
        let mut nodes = self.parse_nested(&source, state)?;
        state.resolve_references(&mut nodes);
        Ok(nodes)
    }

    /// Parses already-normalized content in the current scope.
    ///
    /// This is the recursion point for rules. The whole of `source` must be
    /// consumed; a remainder no rule matches is a [`ParseError::NoMatch`].
    pub fn parse_nested(&self, source: &str, state: &mut State) -> Result<Vec<Node>, ParseError> {
        let mut out = vec![];
        let mut rest = source;
        let mut prev = "";

        while !rest.is_empty() {
            let (entry, capture) = self.select(rest, state, prev)?;
            let len = capture.len();
            trace!("rule `{}` consumed {} bytes", entry.name(), len);

            match entry.rule().parse(&capture, self, state)? {
                Parsed::Node(data) => out.push(data.into_node(entry.name())),
                Parsed::Many(nodes) => out.extend(nodes),
            }

            prev = &rest[..len];
            rest = &rest[len..];
        }

        Ok(out)
    }

    /// Parses `content` with inline scope forced on.
    pub fn parse_inline(&self, content: &str, state: &mut State) -> Result<Vec<Node>, ParseError> {
        state.with_scope(true, |state| self.parse_nested(content, state))
    }

    /// Parses `content` as blocks, terminated by a blank line.
    pub fn parse_block(&self, content: &str, state: &mut State) -> Result<Vec<Node>, ParseError> {
        let content = format!("{content}\n\n");
        state.with_scope(false, |state| self.parse_nested(&content, state))
    }

    /// Finds the winning rule for the front of `source`.
    ///
    /// The first tier with any match decides. A match from a rule without a
    /// quality function wins outright; otherwise every quality-bearing rule of
    /// that tier is tried and the strictly highest score wins, earlier rules
    /// keeping ties.
    fn select(
        &self,
        source: &str,
        state: &State,
        prev: &str,
    ) -> Result<(&'r RuleEntry, Capture), ParseError> {
        let entries = self.rules.entries();
        let mut i = 0;

        while let Some(entry) = entries.get(i) {
            i += 1;
            let Some(capture) = try_match(entry, source, state, prev)? else {
                continue;
            };
            let Some(quality) = entry.rule().quality(&capture, state, prev) else {
                return Ok((entry, capture));
            };

            let mut best = (entry, capture, quality);
            while let Some(next) = entries
                .get(i)
                .filter(|next| next.tier() == entry.tier() && next.rule().has_quality())
            {
                i += 1;
                let Some(capture) = try_match(next, source, state, prev)? else {
                    continue;
                };
                let quality = next.rule().quality(&capture, state, prev).unwrap_or(0.0);
                if quality > best.2 {
                    best = (next, capture, quality);
                }
            }
            return Ok((best.0, best.1));
        }

        Err(ParseError::NoMatch {
            remainder: source.to_string(),
        })
    }
}

/// Runs one rule's matcher and checks the capture can be consumed.
fn try_match(
    entry: &RuleEntry,
    source: &str,
    state: &State,
    prev: &str,
) -> Result<Option<Capture>, ParseError> {
    let Some(capture) = entry.rule().matches(source, state, prev) else {
        return Ok(None);
    };
    if capture.is_empty() {
        return Err(ParseError::EmptyMatch {
            rule: entry.name().to_string(),
        });
    }
    if !source.starts_with(capture.full()) {
        return Err(ParseError::InvalidCapture {
            rule: entry.name().to_string(),
        });
    }
    Ok(Some(capture))
}
