//! Generic element-tree backend, for UI layers that build their own views.

use std::collections::BTreeMap;

use serde::Serialize;

use super::Backend;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Element {
    /// Renders nothing; dropped when placed among siblings.
    Empty,
    Text(String),
    Tag(Tag),
    /// An unwrapped run of siblings.
    Fragment(Vec<Element>),
}

impl Element {
    pub fn text(text: impl Into<String>) -> Self {
        Element::Text(text.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Element::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Element::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Element::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Children of a tag, or the members of a fragment.
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Tag(tag) => &tag.children,
            Element::Fragment(items) => items,
            _ => &[],
        }
    }
}

impl From<Tag> for Element {
    fn from(tag: Tag) -> Self {
        Element::Tag(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub name: String,
    pub key: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Element>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            attributes: BTreeMap::new(),
            children: vec![],
        }
    }

    pub fn key(mut self, key: Option<&str>) -> Self {
        self.key = key.map(str::to_string);
        self
    }

    /// Sets an attribute; absent or empty values are skipped.
    pub fn attr(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.attributes.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Appends a child, splicing fragments and merging adjacent text.
    pub fn child(mut self, child: Element) -> Self {
        push_coalesced(&mut self.children, child);
        self
    }

    pub fn children(self, children: impl IntoIterator<Item = Element>) -> Self {
        children.into_iter().fold(self, Tag::child)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

pub struct ElementTree;

impl Backend for ElementTree {
    type Output = Element;

    const NAME: &'static str = "element";

    fn empty() -> Element {
        Element::Empty
    }

    fn sequence(items: Vec<Element>) -> Element {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            push_coalesced(&mut out, item);
        }
        Element::Fragment(out)
    }
}

fn push_coalesced(out: &mut Vec<Element>, element: Element) {
    match element {
        Element::Empty => {}
        Element::Fragment(items) => {
            for item in items {
                push_coalesced(out, item);
            }
        }
        Element::Text(text) => match out.last_mut() {
            Some(Element::Text(last)) => last.push_str(&text),
            _ => out.push(Element::Text(text)),
        },
        tag => out.push(tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sequence_merges_adjacent_text() {
        let out = ElementTree::sequence(vec![
            Element::text("a"),
            Element::text("b"),
            Tag::new("em").into(),
            Element::text("c"),
        ]);
        assert_eq!(
            out.children(),
            &[
                Element::text("ab"),
                Element::Tag(Tag::new("em")),
                Element::text("c"),
            ]
        );
    }

    #[test]
    fn test_empty_elements_do_not_split_text() {
        let out = ElementTree::sequence(vec![
            Element::text("a"),
            Element::Empty,
            Element::text("b"),
        ]);
        assert_eq!(out.children(), &[Element::text("ab")]);
    }

    #[test]
    fn test_fragments_are_spliced_into_tags() {
        let tag = Tag::new("p")
            .child(Element::text("x"))
            .child(Element::Fragment(vec![Element::text("y"), Tag::new("br").into()]));
        assert_eq!(
            tag.children,
            vec![Element::text("xy"), Element::Tag(Tag::new("br"))]
        );
    }

    #[test]
    fn test_attr_skips_missing_values() {
        let tag = Tag::new("a")
            .attr("href", Some("/x"))
            .attr("title", None)
            .key(Some("3"));
        assert_eq!(tag.attribute("href"), Some("/x"));
        assert_eq!(tag.attribute("title"), None);
        assert_eq!(tag.key.as_deref(), Some("3"));
    }
}
