//! The rule contract and the built-in grammar.

pub mod blocks;
pub mod defaults;
pub mod inline;
pub mod ruleset;

use std::any::Any;
use std::collections::BTreeMap;

use regex::Regex;

use crate::error::ParseError;
use crate::output::{Backend, ElementTree, Html, Output, RenderState};
use crate::parsing::{Capture, Node, NodeData, Parsed, Parser, State};

pub use defaults::default_rules;
pub use ruleset::{Order, RuleEntry, RuleSet, RuleSetBuilder};

/// `(source, state, prev_matched_text) -> capture`
pub type MatchFn = dyn Fn(&str, &State, &str) -> Option<Capture> + Send + Sync;

/// `(capture, parser, state) -> node(s)`
pub type ParseFn = dyn Fn(&Capture, &Parser<'_>, &mut State) -> Result<Parsed, ParseError> + Send + Sync;

/// `(capture, state, prev_matched_text) -> score`
pub type QualityFn = dyn Fn(&Capture, &State, &str) -> f64 + Send + Sync;

/// `(node, output, render_state) -> backend output`
pub type RenderFn<B> =
    dyn Fn(&Node, &Output<'_, B>, &RenderState) -> <B as Backend>::Output + Send + Sync;

/// Grammar scope a matcher is willing to run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    Inline,
    Block,
    Any,
}

impl MatchScope {
    fn allows(self, state: &State) -> bool {
        match self {
            MatchScope::Inline => state.is_inline(),
            MatchScope::Block => !state.is_inline(),
            MatchScope::Any => true,
        }
    }
}

enum MatchKind {
    Regex(Regex),
    Custom(Box<MatchFn>),
}

/// A scope guard around either an anchored regex or a hand-written scanner.
pub struct Matcher {
    scope: MatchScope,
    kind: MatchKind,
}

impl Matcher {
    /// Matches `regex` at the start of the input, inline scope only.
    pub fn inline(regex: Regex) -> Self {
        Self::regex(MatchScope::Inline, regex)
    }

    /// Matches `regex` at the start of the input, block scope only.
    pub fn block(regex: Regex) -> Self {
        Self::regex(MatchScope::Block, regex)
    }

    /// Matches `regex` at the start of the input in either scope.
    pub fn any_scope(regex: Regex) -> Self {
        Self::regex(MatchScope::Any, regex)
    }

    pub fn regex(scope: MatchScope, regex: Regex) -> Self {
        Self {
            scope,
            kind: MatchKind::Regex(regex),
        }
    }

    pub fn custom(
        scope: MatchScope,
        f: impl Fn(&str, &State, &str) -> Option<Capture> + Send + Sync + 'static,
    ) -> Self {
        Self {
            scope,
            kind: MatchKind::Custom(Box::new(f)),
        }
    }

    pub fn scope(&self) -> MatchScope {
        self.scope
    }

    pub fn matches(&self, source: &str, state: &State, prev: &str) -> Option<Capture> {
        if !self.scope.allows(state) {
            return None;
        }
        match &self.kind {
            MatchKind::Regex(regex) => regex
                .captures(source)
                .filter(|caps| caps.get(0).is_some_and(|m| m.start() == 0))
                .map(|caps| Capture::from_regex(&caps)),
            MatchKind::Custom(f) => f(source, state, prev),
        }
    }
}

/// One named grammar unit: how to recognize it, what node it builds, and how
/// each backend draws that node.
pub struct Rule {
    matcher: Matcher,
    parse: Box<ParseFn>,
    quality: Option<Box<QualityFn>>,
    /// `Backend::NAME -> Box<RenderFn<B>>`
    renderers: BTreeMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl Rule {
    pub fn new(
        matcher: Matcher,
        parse: impl Fn(&Capture, &Parser<'_>, &mut State) -> Result<Parsed, ParseError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            matcher,
            parse: Box::new(parse),
            quality: None,
            renderers: BTreeMap::new(),
        }
    }

    /// Makes this rule compete on score with the other scored rules of its
    /// order tier.
    pub fn with_quality(
        mut self,
        quality: impl Fn(&Capture, &State, &str) -> f64 + Send + Sync + 'static,
    ) -> Self {
        self.quality = Some(Box::new(quality));
        self
    }

    /// Registers how backend `B` draws the nodes this rule emits, replacing
    /// any earlier renderer for the same backend name.
    pub fn with_renderer<B: Backend>(
        mut self,
        render: impl Fn(&Node, &Output<'_, B>, &RenderState) -> B::Output + Send + Sync + 'static,
    ) -> Self {
        let render: Box<RenderFn<B>> = Box::new(render);
        self.renderers.insert(B::NAME, Box::new(render));
        self
    }

    pub fn with_html(
        self,
        render: impl Fn(&Node, &Output<'_, Html>, &RenderState) -> String + Send + Sync + 'static,
    ) -> Self {
        self.with_renderer::<Html>(render)
    }

    pub fn with_element(
        self,
        render: impl Fn(&Node, &Output<'_, ElementTree>, &RenderState) -> crate::output::Element
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.with_renderer::<ElementTree>(render)
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn matches(&self, source: &str, state: &State, prev: &str) -> Option<Capture> {
        self.matcher.matches(source, state, prev)
    }

    pub fn parse(
        &self,
        capture: &Capture,
        parser: &Parser<'_>,
        state: &mut State,
    ) -> Result<Parsed, ParseError> {
        (self.parse)(capture, parser, state)
    }

    pub fn has_quality(&self) -> bool {
        self.quality.is_some()
    }

    /// Score for `capture`, or `None` for rules that do not compete.
    pub fn quality(&self, capture: &Capture, state: &State, prev: &str) -> Option<f64> {
        self.quality.as_ref().map(|q| q(capture, state, prev))
    }

    /// The renderer registered for backend `B`, if any. A renderer stored
    /// under `B::NAME` by a different backend type is not returned.
    pub fn renderer<B: Backend>(&self) -> Option<&RenderFn<B>> {
        self.renderers
            .get(B::NAME)?
            .downcast_ref::<Box<RenderFn<B>>>()
            .map(|render| &**render)
    }

    /// Names of the backends this rule can render to.
    pub fn backends(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.renderers.keys().copied()
    }

    pub fn html(&self) -> Option<&RenderFn<Html>> {
        self.renderer::<Html>()
    }

    pub fn element(&self) -> Option<&RenderFn<ElementTree>> {
        self.renderer::<ElementTree>()
    }
}

/// Parses group 1 inline into `content`.
pub fn parse_capture_inline(
    capture: &Capture,
    parser: &Parser<'_>,
    state: &mut State,
) -> Result<Parsed, ParseError> {
    let content = parser.parse_inline(capture.group(1), state)?;
    Ok(NodeData::new().field("content", content).into())
}

/// Builds a node with no fields.
pub fn ignore_capture(
    _capture: &Capture,
    _parser: &Parser<'_>,
    _state: &mut State,
) -> Result<Parsed, ParseError> {
    Ok(NodeData::new().into())
}

/// Length used by quality functions, in characters.
pub(crate) fn capture_length(capture: &Capture) -> f64 {
    capture.full().chars().count() as f64
}
