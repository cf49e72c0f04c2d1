use std::collections::BTreeMap;

use serde::Serialize;

use super::references::RefId;

/// A field value on an AST node.
///
/// Nodes are open records: rules choose their own field names and shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    /// Nested content, itself a parsed node sequence.
    Nodes(Vec<Node>),
    /// Ordered values, e.g. list items or table rows.
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_nodes(&self) -> Option<&[Node]> {
        match self {
            Value::Nodes(nodes) => Some(nodes.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    fn for_each_node_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        match self {
            Value::Nodes(nodes) => nodes.iter_mut().for_each(|n| n.walk_mut(f)),
            Value::List(values) => values.iter_mut().for_each(|v| v.for_each_node_mut(f)),
            _ => {}
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Node>> for Value {
    fn from(nodes: Vec<Node>) -> Self {
        Value::Nodes(nodes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::List(values)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// An AST node: a type tag plus the fields its rule chose to record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
    /// Slot in the reference table for link/image reference nodes.
    #[serde(skip)]
    reference: Option<RefId>,
}

impl Node {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: BTreeMap::new(),
            reference: None,
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn reference(&self) -> Option<RefId> {
        self.reference
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    /// Text field, `None` when absent or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Nested node sequence; empty when the field is absent.
    pub fn nodes(&self, name: &str) -> &[Node] {
        self.get(name).and_then(Value::as_nodes).unwrap_or(&[])
    }

    /// List field; empty when the field is absent.
    pub fn list(&self, name: &str) -> &[Value] {
        self.get(name).and_then(Value::as_list).unwrap_or(&[])
    }

    /// Visits this node and every node nested in its fields, depth first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for value in self.fields.values_mut() {
            value.for_each_node_mut(f);
        }
    }
}

/// What a rule's `parse` builds before the parser assigns a default type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    kind: Option<String>,
    fields: BTreeMap<String, Value>,
    reference: Option<RefId>,
}

impl NodeData {
    /// A node that takes the owning rule's name as its type.
    pub fn new() -> Self {
        Self::default()
    }

    /// A node with an explicit type, e.g. several link rules emitting `"link"`.
    pub fn typed(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Like [`NodeData::field`] but leaves the field absent for `None`.
    pub fn field_opt<T: Into<Value>>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.field(name, v),
            None => self,
        }
    }

    pub fn with_reference(mut self, id: RefId) -> Self {
        self.reference = Some(id);
        self
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_node(self, default_kind: &str) -> Node {
        Node {
            kind: self.kind.unwrap_or_else(|| default_kind.to_string()),
            fields: self.fields,
            reference: self.reference,
        }
    }
}

/// Result of a rule's `parse`: one node, or a run spliced into the output.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Node(NodeData),
    Many(Vec<Node>),
}

impl From<NodeData> for Parsed {
    fn from(data: NodeData) -> Self {
        Parsed::Node(data)
    }
}

impl From<Vec<Node>> for Parsed {
    fn from(nodes: Vec<Node>) -> Self {
        Parsed::Many(nodes)
    }
}
