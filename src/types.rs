use std::fmt;

use serde::Serialize;

/// Closed tag over every option shape the registry understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OptionKind {
    Bool,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    Enum,
    EnumPair,
    IntRange,
    IntList,
    StringList,
    OptionFreeStringList,
    Alias,
    AliasList,
    /// Not an option: a separator line in the usage text.
    Group,
}

impl OptionKind {
    /// Consumes a run of following tokens rather than the `=value` string.
    pub fn is_list(self) -> bool {
        matches!(
            self,
            OptionKind::IntList
                | OptionKind::StringList
                | OptionKind::OptionFreeStringList
                | OptionKind::AliasList
        )
    }

    /// List whose run ends at the first token naming a registered option.
    pub fn is_option_free_list(self) -> bool {
        matches!(self, OptionKind::OptionFreeStringList | OptionKind::AliasList)
    }

    fn label(self) -> &'static str {
        match self {
            OptionKind::Bool => "bool",
            OptionKind::Int32 => "int",
            OptionKind::UInt32 => "uint",
            OptionKind::Int64 => "int64",
            OptionKind::UInt64 => "uint64",
            OptionKind::Double => "Double",
            OptionKind::String => "string",
            OptionKind::Enum => "enum",
            OptionKind::EnumPair => "enum pair",
            OptionKind::IntRange => "IntRange",
            OptionKind::IntList => "IntList",
            OptionKind::StringList => "string list",
            OptionKind::OptionFreeStringList => "option-free string list",
            OptionKind::Alias => "alias",
            OptionKind::AliasList => "alias list",
            OptionKind::Group => "group",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An integer range given as `start..end` or `start+count`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntRange {
    pub start: i32,
    pub end: i32,
    pub size: i32,
}

/// Accumulated integer list plus a bitmask view of the members in `0..=31`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntList {
    pub values: Vec<i32>,
    pub mask: u32,
}

impl IntList {
    pub fn push(&mut self, value: i32) {
        self.values.push(value);
        if (0..32).contains(&value) {
            self.mask |= 1 << value;
        }
    }

    pub fn extend(&mut self, values: impl IntoIterator<Item = i32>) {
        for value in values {
            self.push(value);
        }
    }

    pub fn contains(&self, value: i32) -> bool {
        self.values.contains(&value)
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.mask = 0;
    }
}

/// A two-part enumerated value such as `lane.3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EnumPair {
    pub first: u32,
    pub second: u32,
}

/// The typed payload of a descriptor.
///
/// Serializes untagged so a JSON snapshot reads like plain values.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Groups and aliases carry no value.
    None,
    Bool(bool),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    String(String),
    Enum(u32),
    EnumPair(EnumPair),
    IntRange(IntRange),
    IntList(IntList),
    /// Used by string lists and alias lists.
    StringList(Vec<String>),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            OptionValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            OptionValue::UInt32(v) | OptionValue::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            OptionValue::UInt64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum_pair(&self) -> Option<EnumPair> {
        match self {
            OptionValue::EnumPair(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int_range(&self) -> Option<IntRange> {
        match self {
            OptionValue::IntRange(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<&IntList> {
        match self {
            OptionValue::IntList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            OptionValue::StringList(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::None => Ok(()),
            OptionValue::Bool(v) => write!(f, "{v}"),
            OptionValue::Int32(v) => write!(f, "{v}"),
            OptionValue::UInt32(v) | OptionValue::Enum(v) => write!(f, "{v}"),
            OptionValue::Int64(v) => write!(f, "{v}"),
            OptionValue::UInt64(v) => write!(f, "{v}"),
            OptionValue::Double(v) => write!(f, "{v}"),
            OptionValue::String(v) => write!(f, "\"{v}\""),
            OptionValue::EnumPair(p) => write!(f, "{}.{}", p.first, p.second),
            OptionValue::IntRange(r) => write!(f, "{}..{}", r.start, r.end),
            OptionValue::IntList(list) => {
                let items: Vec<String> = list.values.iter().map(|v| format!("{v:#x}")).collect();
                write!(f, "[{}]", items.join(", "))
            }
            OptionValue::StringList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// An options operation, independent of any CLI framework.
/// The clap adapter converts parsed args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionAction {
    /// Render the usage listing.
    Usage,
    /// Render every option's current value.
    List,
    /// Dispatch the given tokens (no program name).
    Parse { tokens: Vec<String> },
}
