use thiserror::Error;

/// Error type a rule's own failure can carry as its source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Fatal parse failures. None of these are retried or recovered from.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not find rule to match content: {remainder}")]
    NoMatch { remainder: String },

    #[error("rule `{rule}` matched zero characters")]
    EmptyMatch { rule: String },

    #[error("rule `{rule}` returned a capture that is not a prefix of its input")]
    InvalidCapture { rule: String },

    #[error("rule `{rule}` failed: {message}")]
    Rule { rule: String, message: String },

    #[error("rule `{rule}` failed: {source}")]
    Failed {
        rule: String,
        #[source]
        source: BoxError,
    },
}

impl ParseError {
    pub fn rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::Rule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Wraps an underlying error raised while `rule` was parsing, keeping it
    /// reachable through [`std::error::Error::source`].
    pub fn failed(rule: impl Into<String>, source: impl Into<BoxError>) -> Self {
        ParseError::Failed {
            rule: rule.into(),
            source: source.into(),
        }
    }

    /// Name of the rule that raised this error, if one did.
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            ParseError::NoMatch { .. } => None,
            ParseError::EmptyMatch { rule }
            | ParseError::InvalidCapture { rule }
            | ParseError::Rule { rule, .. }
            | ParseError::Failed { rule, .. } => Some(rule),
        }
    }
}

/// Rule table configuration defects, reported when the table is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuleSetError {
    #[error("invalid order for rule `{rule}`: {order}")]
    InvalidOrder { rule: String, order: f64 },

    #[error("unknown rule `{rule}`")]
    UnknownRule { rule: String },

    #[error("order alias cycle through rule `{rule}`")]
    AliasCycle { rule: String },
}
