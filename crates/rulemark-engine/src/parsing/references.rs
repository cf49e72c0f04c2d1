//! Link and image reference bookkeeping.
//!
//! A reference node does not hold its target directly. It holds a [`RefId`]
//! naming a slot in the [`ReferenceTable`]; definitions fill slots in place,
//! whichever of the two was parsed first, and [`ReferenceTable::seal`] copies
//! the slot contents onto the finished nodes.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use super::node::Node;

/// Stable handle for one reference node, assigned when the node is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RefId(usize);

impl RefId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a `[label]: target "title"` line binds its label to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub target: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    definitions: BTreeMap<String, Definition>,
    pending: BTreeMap<String, Vec<RefId>>,
    slots: Vec<Option<Definition>>,
}

/// Collapses whitespace runs to one space and case-folds.
pub fn normalize_label(label: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));
    whitespace.replace_all(label, " ").to_lowercase()
}

impl ReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a reference node under `label` and returns its slot.
    ///
    /// The slot starts out filled when the label is already defined.
    pub fn reference(&mut self, label: &str) -> RefId {
        let key = normalize_label(label);
        let id = RefId(self.slots.len());
        self.slots.push(self.definitions.get(&key).cloned());
        self.pending.entry(key).or_default().push(id);
        id
    }

    /// Records a definition and fills every slot already waiting on its label.
    ///
    /// A later definition of the same label overwrites the earlier one for all
    /// references, before and after it. Returns the normalized label.
    pub fn define(&mut self, label: &str, target: &str, title: Option<&str>) -> String {
        let key = normalize_label(label);
        let definition = Definition {
            target: target.to_string(),
            title: title.map(str::to_string),
        };

        if let Some(ids) = self.pending.get(&key) {
            for id in ids {
                if let Some(slot) = self.slots.get_mut(id.0) {
                    *slot = Some(definition.clone());
                }
            }
        }
        self.definitions.insert(key.clone(), definition);
        key
    }

    pub fn definition(&self, label: &str) -> Option<&Definition> {
        self.definitions.get(&normalize_label(label))
    }

    /// Current resolution of a slot; `None` while its label is undefined.
    pub fn resolved(&self, id: RefId) -> Option<&Definition> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of reference nodes registered so far.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Writes `target` and `title` onto every reference node in `nodes`,
    /// including nested ones. Unresolved references lose both fields.
    pub fn seal(&self, nodes: &mut [Node]) {
        for node in nodes {
            node.walk_mut(&mut |n| {
                let Some(id) = n.reference() else {
                    return;
                };
                match self.resolved(id) {
                    Some(def) => {
                        n.set("target", def.target.as_str());
                        match &def.title {
                            Some(title) => n.set("title", title.as_str()),
                            None => {
                                n.remove("title");
                            }
                        }
                    }
                    None => {
                        n.remove("target");
                        n.remove("title");
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::node::NodeData;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("A  B", "a b")]
    #[case("a\n\tb", "a b")]
    #[case("Foo", "foo")]
    #[case(" x ", " x ")]
    fn test_normalizes_labels(#[case] label: &str, #[case] expected: &str) {
        assert_eq!(normalize_label(label), expected);
    }

    #[test]
    fn test_definition_after_reference_fills_slot() {
        let mut table = ReferenceTable::new();
        let id = table.reference("X");
        assert_eq!(table.resolved(id), None);

        table.define("x", "/url", Some("t"));
        assert_eq!(
            table.resolved(id),
            Some(&Definition {
                target: "/url".to_string(),
                title: Some("t".to_string()),
            })
        );
    }

    #[test]
    fn test_reference_after_definition_starts_resolved() {
        let mut table = ReferenceTable::new();
        table.define("a b", "/url", None);
        let id = table.reference("A   B");
        assert_eq!(table.resolved(id).map(|d| d.target.as_str()), Some("/url"));
    }

    #[test]
    fn test_redefinition_updates_all_references() {
        let mut table = ReferenceTable::new();
        let first = table.reference("x");
        table.define("x", "/one", None);
        let second = table.reference("x");
        table.define("x", "/two", None);

        assert_eq!(table.resolved(first).map(|d| d.target.as_str()), Some("/two"));
        assert_eq!(table.resolved(second).map(|d| d.target.as_str()), Some("/two"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_seal_writes_nested_reference_nodes() {
        let mut table = ReferenceTable::new();
        let id = table.reference("x");
        let link = NodeData::typed("link").with_reference(id).into_node("reflink");
        let mut nodes = vec![Node::new("paragraph").with("content", vec![link])];

        table.define("x", "/url", Some("t"));
        table.seal(&mut nodes);

        let link = &nodes[0].nodes("content")[0];
        assert_eq!(link.text("target"), Some("/url"));
        assert_eq!(link.text("title"), Some("t"));
    }

    #[test]
    fn test_seal_clears_unresolved_references() {
        let mut table = ReferenceTable::new();
        let id = table.reference("missing");
        let mut nodes = vec![
            NodeData::typed("link")
                .field("target", "stale")
                .with_reference(id)
                .into_node("reflink"),
        ];

        table.seal(&mut nodes);
        assert_eq!(nodes[0].get("target"), None);
        assert_eq!(nodes[0].get("title"), None);
    }
}
