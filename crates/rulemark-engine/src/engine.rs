//! High-level entry points: a built rule table plus a default scope.

use std::sync::OnceLock;

use regex::Regex;
use rulemark_config::{EngineConfig, Scope};

use crate::error::{ParseError, RuleSetError};
use crate::output::{Element, ElementTree, Html, Output, RenderState};
use crate::parsing::{Node, Parser, State};
use crate::rules::{RuleSet, default_rules};

/// A ready-to-use parser and renderer over one [`RuleSet`].
pub struct Engine {
    rules: RuleSet,
    scope: Scope,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// The built-in grammar with automatic scope detection.
    pub fn new() -> Self {
        let rules = default_rules()
            .build()
            .expect("Invalid default rule table");
        Self::with_rules(rules)
    }

    /// The built-in grammar reshaped by `config`.
    pub fn from_config(config: &EngineConfig) -> Result<Self, RuleSetError> {
        let rules = default_rules().configure(config)?.build()?;
        Ok(Self::with_rules(rules).with_scope(config.scope))
    }

    pub fn with_rules(rules: RuleSet) -> Self {
        Self {
            rules,
            scope: Scope::default(),
        }
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Parses `source` in this engine's default scope.
    pub fn parse(&self, source: &str) -> Result<Vec<Node>, ParseError> {
        self.parse_with_scope(source, self.scope)
    }

    /// Parses `source` with a fresh [`State`].
    ///
    /// # Arguments
    /// - `source`: The document or fragment to parse
    /// - `scope`: `Block` parses `source` followed by a blank line; `Inline`
    ///   parses it as-is; `Auto` picks block scope only when `source` already
    ///   ends in a blank line
    ///
    /// # Returns
    /// The parsed nodes, or a [`ParseError`] when some remainder matches no
    /// rule or a rule fails.
    pub fn parse_with_scope(&self, source: &str, scope: Scope) -> Result<Vec<Node>, ParseError> {
        let parser = Parser::new(&self.rules);
        match resolve_scope(source, scope) {
            Scope::Block => {
                let source = format!("{source}\n\n");
                parser.parse(&source, &mut State::block())
            }
            _ => parser.parse(source, &mut State::inline()),
        }
    }

    pub fn render_html(&self, nodes: &[Node]) -> String {
        Output::<Html>::new(&self.rules).render_all(nodes, &RenderState::new())
    }

    pub fn render_element_tree(&self, nodes: &[Node]) -> Element {
        Output::<ElementTree>::new(&self.rules).render_all(nodes, &RenderState::new())
    }
}

fn resolve_scope(source: &str, scope: Scope) -> Scope {
    static BLOCK_END: OnceLock<Regex> = OnceLock::new();
    match scope {
        Scope::Auto => {
            let block_end =
                BLOCK_END.get_or_init(|| Regex::new(r"\n{2,}$").expect("Invalid block end regex"));
            if block_end.is_match(source) {
                Scope::Block
            } else {
                Scope::Inline
            }
        }
        scope => scope,
    }
}

fn shared() -> &'static Engine {
    static ENGINE: OnceLock<Engine> = OnceLock::new();
    ENGINE.get_or_init(Engine::new)
}

/// Parses `source` with the built-in grammar.
pub fn parse_document(source: &str, scope: Scope) -> Result<Vec<Node>, ParseError> {
    shared().parse_with_scope(source, scope)
}

/// Renders nodes produced by the built-in grammar to HTML.
pub fn render_to_html(nodes: &[Node]) -> String {
    shared().render_html(nodes)
}

pub fn render_to_element_tree(nodes: &[Node]) -> Element {
    shared().render_element_tree(nodes)
}
