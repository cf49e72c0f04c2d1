use regex::Captures;

/// The result of a successful match.
///
/// Group 0 is the consumed text; further groups are whatever sub-captures
/// the rule's `parse` needs, absent when an optional group did not take part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    groups: Vec<Option<String>>,
}

impl Capture {
    pub fn new<'a>(full: &str, groups: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        let mut all = vec![Some(full.to_string())];
        all.extend(groups.into_iter().map(|g| g.map(str::to_string)));
        Self { groups: all }
    }

    /// A capture without sub-groups.
    pub fn whole(full: &str) -> Self {
        Self {
            groups: vec![Some(full.to_string())],
        }
    }

    pub fn from_regex(caps: &Captures<'_>) -> Self {
        Self {
            groups: caps
                .iter()
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        }
    }

    /// The consumed text.
    pub fn full(&self) -> &str {
        self.get(0).unwrap_or_default()
    }

    /// Length in bytes of the consumed text.
    pub fn len(&self) -> usize {
        self.full().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<&str> {
        self.groups.get(i).and_then(|g| g.as_deref())
    }

    /// Group `i`, or `""` when it did not participate.
    pub fn group(&self, i: usize) -> &str {
        self.get(i).unwrap_or_default()
    }

    /// First group among `indices` that participated with non-empty text.
    pub fn first_non_empty(&self, indices: &[usize]) -> Option<&str> {
        indices
            .iter()
            .filter_map(|&i| self.get(i))
            .find(|s| !s.is_empty())
    }
}
