use std::collections::BTreeMap;

use super::node::{Node, Value};
use super::references::ReferenceTable;

/// Mutable context threaded through one top-level parse and all nested parses.
///
/// Scope changes go through [`State::with_scope`] and [`State::with_list_item`],
/// which put the previous flags back whether or not the nested call succeeded.
#[derive(Debug, Clone, Default)]
pub struct State {
    inline: bool,
    in_list: bool,
    references: ReferenceTable,
    fields: BTreeMap<String, Value>,
}

impl State {
    pub fn new(inline: bool) -> Self {
        Self {
            inline,
            ..Self::default()
        }
    }

    pub fn block() -> Self {
        Self::new(false)
    }

    pub fn inline() -> Self {
        Self::new(true)
    }

    pub fn is_inline(&self) -> bool {
        self.inline
    }

    /// True while parsing the body of a list item.
    pub fn in_list(&self) -> bool {
        self.in_list
    }

    /// Runs `f` with the inline flag set to `inline`, then restores it.
    pub fn with_scope<T>(&mut self, inline: bool, f: impl FnOnce(&mut State) -> T) -> T {
        let was_inline = self.inline;
        self.inline = inline;
        let result = f(self);
        self.inline = was_inline;
        result
    }

    /// Runs `f` as the body of a list item: nested lists may start even in
    /// inline scope. Both flags are restored afterwards.
    pub fn with_list_item<T>(&mut self, inline: bool, f: impl FnOnce(&mut State) -> T) -> T {
        let was_in_list = self.in_list;
        self.in_list = true;
        let result = self.with_scope(inline, f);
        self.in_list = was_in_list;
        result
    }

    pub fn references(&self) -> &ReferenceTable {
        &self.references
    }

    pub fn references_mut(&mut self) -> &mut ReferenceTable {
        &mut self.references
    }

    /// Applies every definition seen so far to reference nodes in `nodes`.
    ///
    /// [`Parser::parse`](crate::Parser::parse) does this for its own output;
    /// call it again on earlier results when one state spans several parses.
    pub fn resolve_references(&self, nodes: &mut [Node]) {
        self.references.seal(nodes);
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
}
