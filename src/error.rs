use thiserror::Error;

use crate::types::OptionKind;

/// Failure of a single value grammar.
///
/// Grammars never abort or print; they hand this back to the dispatch engine,
/// which wraps it into an [`OptionsError`] naming the option involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{hint}")]
pub struct GrammarError {
    /// Human-readable description of the accepted format.
    pub hint: String,
}

impl GrammarError {
    pub fn new(hint: impl Into<String>) -> Self {
        Self { hint: hint.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum OptionsError {
    #[error("no match for option \"{name}\"")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(tokopt::unknown_option), help("run with the usage listing to see valid options"))
    )]
    UnknownOption { name: String },

    #[error("error parsing '{value}' for {kind} option '{option}'")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(tokopt::malformed_value)))]
    MalformedValue {
        option: String,
        kind: OptionKind,
        value: String,
        #[cfg_attr(feature = "rich-errors", help)]
        hint: String,
    },

    #[error("error parsing list item '{token}' for {kind} option '{option}'")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(tokopt::malformed_list_item)))]
    MalformedListItem {
        option: String,
        kind: OptionKind,
        token: String,
        #[cfg_attr(feature = "rich-errors", help)]
        hint: String,
    },

    #[error("error parsing '{value}' from environment variable {var} for option '{option}'")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(tokopt::environment_value)))]
    EnvironmentValueInvalid {
        option: String,
        var: String,
        value: String,
        #[cfg_attr(feature = "rich-errors", help)]
        hint: String,
    },

    #[error("alias cycle detected: {chain}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(tokopt::alias_cycle)))]
    AliasCycle { chain: String },

    #[error("alias '{alias}' exceeds the maximum expansion depth of {depth}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(tokopt::alias_depth)))]
    AliasDepthExceeded { alias: String, depth: usize },
}

impl OptionsError {
    /// The grammar hint attached to this error, if it came from a grammar.
    pub fn hint(&self) -> Option<&str> {
        match self {
            OptionsError::MalformedValue { hint, .. }
            | OptionsError::MalformedListItem { hint, .. }
            | OptionsError::EnvironmentValueInvalid { hint, .. } => Some(hint),
            _ => None,
        }
    }
}
