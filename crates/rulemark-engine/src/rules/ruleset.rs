use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use rulemark_config::{EngineConfig, OrderPolicy};

use crate::error::RuleSetError;

use super::Rule;

/// How a declared rule gets its precedence.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Explicit(f64),
    /// Whatever order the named rule resolves to.
    SameAs(String),
}

struct Declared {
    name: String,
    rule: Rule,
    order: Order,
    /// Declaration counter value at first declaration.
    position: usize,
}

/// Collects `(name, rule)` declarations and produces a sorted [`RuleSet`].
///
/// Rules are never mutated after [`RuleSetBuilder::build`]; reshaping a table
/// means building a new one.
pub struct RuleSetBuilder {
    declared: Vec<Declared>,
    next_position: usize,
    policy: OrderPolicy,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSetBuilder {
    pub fn new() -> Self {
        Self {
            declared: vec![],
            next_position: 0,
            policy: OrderPolicy::default(),
        }
    }

    /// Declares a rule ordered by its declaration position. Positions come
    /// from a counter that only grows, so removing another rule never moves
    /// this one relative to explicit orders. Redeclaring an existing name
    /// swaps the rule and keeps its position and order.
    pub fn rule(self, name: &str, rule: Rule) -> Self {
        let order = Order::Explicit(self.next_position as f64);
        self.declare(name, rule, order)
    }

    pub fn rule_with_order(self, name: &str, rule: Rule, order: f64) -> Self {
        self.declare(name, rule, Order::Explicit(order))
    }

    /// Declares a rule in the same order tier as `target`, so the two compete
    /// by quality. `target` is checked at build time.
    pub fn rule_ordered_as(self, name: &str, rule: Rule, target: &str) -> Self {
        self.declare(name, rule, Order::SameAs(target.to_string()))
    }

    fn declare(mut self, name: &str, rule: Rule, order: Order) -> Self {
        match self.position(name) {
            Some(i) => self.declared[i].rule = rule,
            None => {
                self.declared.push(Declared {
                    name: name.to_string(),
                    rule,
                    order,
                    position: self.next_position,
                });
                self.next_position += 1;
            }
        }
        self
    }

    /// Swaps the rule registered as `name`, keeping its order.
    pub fn replace(mut self, name: &str, rule: Rule) -> Result<Self, RuleSetError> {
        let i = self.require(name)?;
        self.declared[i].rule = rule;
        Ok(self)
    }

    pub fn remove(mut self, name: &str) -> Result<Self, RuleSetError> {
        let i = self.require(name)?;
        self.declared.remove(i);
        Ok(self)
    }

    /// Moves an already declared rule into `target`'s order tier.
    pub fn alias_order(mut self, name: &str, target: &str) -> Result<Self, RuleSetError> {
        let i = self.require(name)?;
        self.require(target)?;
        self.declared[i].order = Order::SameAs(target.to_string());
        Ok(self)
    }

    pub fn order_policy(mut self, policy: OrderPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Applies the table-shaping settings of `config`: order policy, disabled
    /// rules, then order aliases.
    pub fn configure(self, config: &EngineConfig) -> Result<Self, RuleSetError> {
        let mut builder = self.order_policy(config.order_policy);
        for name in &config.disabled_rules {
            builder = builder.remove(name)?;
        }
        for (name, target) in &config.order_aliases {
            builder = builder.alias_order(name, target)?;
        }
        Ok(builder)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(|d| d.name.as_str())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.declared.iter().position(|d| d.name == name)
    }

    fn require(&self, name: &str) -> Result<usize, RuleSetError> {
        self.position(name).ok_or_else(|| RuleSetError::UnknownRule {
            rule: name.to_string(),
        })
    }

    /// Resolves every order and sorts: ascending order, then rules with a
    /// quality function, then name.
    pub fn build(self) -> Result<RuleSet, RuleSetError> {
        let orders = self.resolve_orders()?;

        let mut entries: Vec<RuleEntry> = self
            .declared
            .into_iter()
            .zip(orders)
            .map(|(declared, order)| RuleEntry {
                name: declared.name,
                order,
                tier: 0,
                rule: declared.rule,
            })
            .collect();

        entries.sort_by(|a, b| {
            a.order
                .total_cmp(&b.order)
                .then_with(|| match (a.rule.has_quality(), b.rule.has_quality()) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => Ordering::Equal,
                })
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut tier = 0;
        for i in 1..entries.len() {
            if entries[i].order != entries[i - 1].order {
                tier += 1;
            }
            entries[i].tier = tier;
        }

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();

        debug!(
            "rule order: {}",
            entries
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(RuleSet { entries, index })
    }

    fn resolve_orders(&self) -> Result<Vec<f64>, RuleSetError> {
        let mut own = Vec::with_capacity(self.declared.len());
        for declared in &self.declared {
            let resolved = match &declared.order {
                Order::Explicit(order) if order.is_finite() => Resolved::Order(*order),
                Order::Explicit(order) => match self.policy {
                    OrderPolicy::Strict => {
                        return Err(RuleSetError::InvalidOrder {
                            rule: declared.name.clone(),
                            order: *order,
                        });
                    }
                    OrderPolicy::Fallback => {
                        warn!(
                            "Invalid order for rule `{}`: {}, using declaration position {}",
                            declared.name, order, declared.position
                        );
                        Resolved::Order(declared.position as f64)
                    }
                },
                Order::SameAs(target) => Resolved::Alias(target),
            };
            own.push(resolved);
        }

        (0..own.len()).map(|i| self.follow_alias(i, &own)).collect()
    }

    fn follow_alias(&self, start: usize, own: &[Resolved<'_>]) -> Result<f64, RuleSetError> {
        let mut seen = BTreeSet::new();
        let mut i = start;
        loop {
            match own[i] {
                Resolved::Order(order) => return Ok(order),
                Resolved::Alias(target) => {
                    if !seen.insert(i) {
                        return Err(RuleSetError::AliasCycle {
                            rule: self.declared[start].name.clone(),
                        });
                    }
                    i = self.require(target)?;
                }
            }
        }
    }
}

enum Resolved<'a> {
    Order(f64),
    Alias(&'a str),
}

/// A rule in its evaluated position.
pub struct RuleEntry {
    name: String,
    order: f64,
    tier: usize,
    rule: Rule,
}

impl RuleEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn order(&self) -> f64 {
        self.order
    }

    /// Dense index of this entry's order among all distinct orders.
    pub fn tier(&self) -> usize {
        self.tier
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }
}

/// An immutable, pre-sorted rule table.
pub struct RuleSet {
    entries: Vec<RuleEntry>,
    index: BTreeMap<String, usize>,
}

impl RuleSet {
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&i| &self.entries[i].rule)
    }

    /// Rule names in evaluation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(RuleEntry::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
