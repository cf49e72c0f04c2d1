//! Rendering an AST through per-rule renderers.
//!
//! An [`Output`] walks nodes and looks up the renderer registered for each
//! node's type under one [`Backend`]. Renderers receive the same `Output` so
//! they can render their nested content. Rendering never mutates the AST.

pub mod element;
pub mod html;

use std::collections::BTreeMap;
use std::marker::PhantomData;

use log::warn;

use crate::parsing::{Node, Value};
use crate::rules::RuleSet;

pub use element::{Element, ElementTree, Tag};
pub use html::Html;

/// An output target.
///
/// Rules register per-backend renderers with
/// [`Rule::with_renderer`](crate::Rule::with_renderer), keyed by `NAME`.
pub trait Backend: Sized + 'static {
    type Output: 'static;

    /// Registry key for this backend's renderers, unique among backends.
    const NAME: &'static str;

    /// What a node without a renderer becomes.
    fn empty() -> Self::Output;

    /// Combines the rendered children of a node sequence.
    fn sequence(items: Vec<Self::Output>) -> Self::Output;
}

/// Per-call rendering context, passed down to every renderer.
///
/// Besides the positional key, callers and renderers may carry their own
/// fields; a renderer that wants to pass something to its children renders
/// them with [`RenderState::with_field`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderState {
    key: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl RenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional key of the node being rendered within its sequence.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn with_key(&self, key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            fields: self.fields.clone(),
        }
    }

    /// Caller-defined field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// A copy of this state with one more field set.
    pub fn with_field(&self, name: &str, value: impl Into<Value>) -> Self {
        let mut state = self.clone();
        state.set(name, value);
        state
    }
}

pub struct Output<'a, B> {
    rules: &'a RuleSet,
    backend: PhantomData<B>,
}

impl<'a, B: Backend> Output<'a, B> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            backend: PhantomData,
        }
    }

    /// Renders one node with the renderer of the rule named by its type.
    pub fn render(&self, node: &Node, state: &RenderState) -> B::Output {
        let Some(rule) = self.rules.get(node.kind()) else {
            warn!("No rule for node type `{}`", node.kind());
            return B::empty();
        };
        match rule.renderer::<B>() {
            Some(render) => render(node, self, state),
            None => B::empty(),
        }
    }

    /// Renders a sequence, keying each child by its index.
    pub fn render_all(&self, nodes: &[Node], state: &RenderState) -> B::Output {
        B::sequence(
            nodes
                .iter()
                .enumerate()
                .map(|(i, node)| self.render(node, &state.with_key(i.to_string())))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{NodeData, Parser, State};
    use crate::rules::{Matcher, Rule, RuleSetBuilder};
    use pretty_assertions::assert_eq;
    use regex::Regex;

    /// Renders words as plain text, upper-cased when the state says so.
    struct PlainText;

    impl Backend for PlainText {
        type Output = String;
        const NAME: &'static str = "plain";

        fn empty() -> String {
            String::new()
        }

        fn sequence(items: Vec<String>) -> String {
            items.join(" ")
        }
    }

    fn word_rules() -> RuleSet {
        let word = Rule::new(
            Matcher::any_scope(Regex::new(r"^\w+ *").unwrap()),
            |capture, _, _| {
                Ok(NodeData::new()
                    .field("word", capture.full().trim_end())
                    .into())
            },
        )
        .with_renderer::<PlainText>(|node, _, state| {
            let word = node.text("word").unwrap_or_default();
            match state.get("shout").and_then(Value::as_bool) {
                Some(true) => word.to_uppercase(),
                _ => word.to_string(),
            }
        })
        .with_html(|node, _, _| format!("<w>{}</w>", node.text("word").unwrap_or_default()));

        RuleSetBuilder::new().rule("word", word).build().unwrap()
    }

    #[test]
    fn test_custom_backend_renders_through_its_own_renderers() {
        let rules = word_rules();
        let nodes = Parser::new(&rules)
            .parse("one two", &mut State::inline())
            .unwrap();

        let plain = Output::<PlainText>::new(&rules).render_all(&nodes, &RenderState::new());
        assert_eq!(plain, "one two");

        let html = Output::<Html>::new(&rules).render_all(&nodes, &RenderState::new());
        assert_eq!(html, "<w>one</w><w>two</w>");
    }

    #[test]
    fn test_rule_lists_its_backends() {
        let rules = word_rules();
        let backends: Vec<&str> = rules.get("word").unwrap().backends().collect();
        assert_eq!(backends, vec!["html", "plain"]);
        assert!(rules.get("word").unwrap().element().is_none());
    }

    #[test]
    fn test_render_state_fields_reach_every_renderer() {
        let rules = word_rules();
        let nodes = Parser::new(&rules)
            .parse("one two", &mut State::inline())
            .unwrap();

        let state = RenderState::new().with_field("shout", true);
        let plain = Output::<PlainText>::new(&rules).render_all(&nodes, &state);
        assert_eq!(plain, "ONE TWO");
    }

    #[test]
    fn test_with_key_keeps_fields() {
        let mut state = RenderState::new();
        state.set("depth", 2i64);
        let child = state.with_key("4");

        assert_eq!(child.key(), Some("4"));
        assert_eq!(child.get("depth"), Some(&Value::Int(2)));
        assert_eq!(state.key(), None);
        assert_eq!(state.clone().remove("depth"), Some(Value::Int(2)));
    }
}
