//! Label tables for enumerated options.
//!
//! Lookups are case-insensitive and return the first matching entry in
//! insertion order. The `listing` renderers produce the "valid values" block
//! shown when a token matches nothing.

use crate::types::EnumPair;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub value: u32,
    pub label: String,
    pub help: String,
}

/// Ordered `{value, label, help}` triples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumTable {
    entries: Vec<EnumEntry>,
}

impl EnumTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry, builder style.
    pub fn variant(mut self, value: u32, label: &str, help: &str) -> Self {
        self.add(value, label, help);
        self
    }

    pub fn add(&mut self, value: u32, label: &str, help: &str) {
        self.entries.push(EnumEntry {
            value,
            label: label.to_string(),
            help: help.to_string(),
        });
    }

    pub fn entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    /// Case-insensitive label lookup.
    pub fn lookup(&self, label: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(label))
            .map(|e| e.value)
    }

    /// Reverse lookup: the first label registered for `value`.
    pub fn label_of(&self, value: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.label.as_str())
    }

    pub fn listing(&self) -> String {
        let width = self.entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for e in &self.entries {
            let line = format!("  {:<width$} 0x{:02x} {}", e.label, e.value, e.help);
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairEntry {
    pub first: u32,
    pub second: u32,
    pub label: String,
    pub help: String,
}

/// Named shortcuts for whole `first.second` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairTable {
    entries: Vec<PairEntry>,
}

impl PairTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pair(mut self, first: u32, second: u32, label: &str, help: &str) -> Self {
        self.entries.push(PairEntry {
            first,
            second,
            label: label.to_string(),
            help: help.to_string(),
        });
        self
    }

    pub fn entries(&self) -> &[PairEntry] {
        &self.entries
    }

    pub fn lookup(&self, label: &str) -> Option<EnumPair> {
        self.entries
            .iter()
            .find(|e| e.label.eq_ignore_ascii_case(label))
            .map(|e| EnumPair {
                first: e.first,
                second: e.second,
            })
    }

    pub fn listing(&self) -> String {
        let width = self.entries.iter().map(|e| e.label.chars().count()).max().unwrap_or(0);
        let mut out = String::new();
        for e in &self.entries {
            let line = format!(
                "  {:<width$} 0x{:02x}.0x{:02x} {}",
                e.label, e.first, e.second, e.help
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }
}
