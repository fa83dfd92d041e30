//! Usage text, value listing, and result types.
//!
//! Provides the logic behind `--options-help` and `--options-list`, and the
//! `OptionsResult` enum that callers use to display results.

use std::fmt;

use serde_json::{Map, Value};

use crate::registry::Registry;
use crate::types::{OptionKind, OptionValue};

/// Result of an [`OptionAction`](crate::OptionAction). Returned to the caller
/// for display.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionsResult {
    /// The two-column usage text.
    Usage(String),
    /// Every option's current value.
    Listing(Listing),
    /// Tokens were dispatched successfully.
    Parsed,
}

impl fmt::Display for OptionsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsResult::Usage(text) => write!(f, "{text}"),
            OptionsResult::Listing(listing) => write!(f, "{listing}"),
            OptionsResult::Parsed => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListingEntry {
    pub name: String,
    pub value: String,
    pub is_set: bool,
}

/// Current values of every named option, in registration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Listing {
    pub entries: Vec<ListingEntry>,
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{} = {}", entry.name, entry.value)?;
        }
        Ok(())
    }
}

fn is_unlisted(kind: OptionKind) -> bool {
    matches!(kind, OptionKind::Group | OptionKind::Alias | OptionKind::AliasList)
}

impl Registry {
    /// One line per option: the name left-justified to the longest name,
    /// then the usage text. Groups print their text alone.
    pub fn usage_text(&self) -> String {
        let width = self.iter().map(|o| o.name().chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for option in self.iter() {
            if option.kind() == OptionKind::Group {
                out.push_str(option.usage());
            } else {
                out.push_str(&format!("  {:<width$} {}", option.name(), option.usage()));
            }
            out.push('\n');
        }
        out
    }

    pub fn show_usage(&self, sink: &mut impl fmt::Write) -> fmt::Result {
        sink.write_str(&self.usage_text())
    }

    pub fn print_usage(&self) {
        print!("{}", self.usage_text());
    }

    /// `name = value` for every option except groups, aliases and alias
    /// lists. Enum values render by label.
    pub fn listing(&self) -> Listing {
        let entries = self
            .iter()
            .filter(|o| !is_unlisted(o.kind()))
            .map(|option| {
                let value = match option.value() {
                    OptionValue::Enum(v) => match option.enum_label() {
                        Some(label) => label.to_string(),
                        None => format!("undefined ({v})"),
                    },
                    other => other.to_string(),
                };
                ListingEntry {
                    name: option.name().to_string(),
                    value,
                    is_set: option.is_set(),
                }
            })
            .collect();
        Listing { entries }
    }

    /// Snapshot of current values as a JSON object keyed by option name.
    /// Groups and aliases are skipped; the first of several same-named
    /// options wins.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        let mut map = Map::new();
        for option in self.iter() {
            if is_unlisted(option.kind()) || map.contains_key(option.name()) {
                continue;
            }
            map.insert(option.name().to_string(), serde_json::to_value(option.value())?);
        }
        Ok(Value::Object(map))
    }
}
