//! A rule-driven markdown engine.
//!
//! Parsing is a loop over an ordered table of named [`Rule`]s: at each step
//! the first matching rule (or, within a tier of scored rules, the best
//! scoring one) consumes a prefix of the input and builds an AST [`Node`].
//! Rules recurse through the [`Parser`] for nested content. Rendering walks
//! the AST and asks the rule named by each node's type to draw it, as an
//! HTML string or as an [`Element`] tree.
//!
//! ```
//! use rulemark_engine::{Scope, parse_document, render_to_html};
//!
//! let nodes = parse_document("Hello *world*\n\n", Scope::Auto).unwrap();
//! assert_eq!(render_to_html(&nodes), "<p>Hello <em>world</em></p>");
//! ```

pub mod engine;
pub mod error;
pub mod output;
pub mod parsing;
pub mod preprocess;
pub mod rules;
pub mod url;

pub use engine::{Engine, parse_document, render_to_element_tree, render_to_html};
pub use error::{BoxError, ParseError, RuleSetError};
pub use output::{Backend, Element, ElementTree, Html, Output, RenderState, Tag};
pub use parsing::{Capture, Node, NodeData, Parsed, Parser, State, Value};
pub use rules::{
    MatchScope, Matcher, Rule, RuleSet, RuleSetBuilder, default_rules, ignore_capture,
    parse_capture_inline,
};
pub use rulemark_config::{EngineConfig, OrderPolicy, Scope};
pub use url::{sanitize_url, unescape_url};
