//! One declared option: its grammar, default, current value, and state flags.
//!
//! Descriptors are plain values until they are handed to
//! [`Registry::register`](crate::Registry::register), which attaches them and
//! seeds them from the environment. Per-kind behavior is a `match` over
//! `Grammar`, so adding a kind is an exhaustiveness error everywhere it
//! matters.

use std::fmt;

use crate::enum_table::{EnumTable, PairTable};
use crate::error::GrammarError;
use crate::grammar;
use crate::types::{EnumPair, IntList, IntRange, OptionKind, OptionValue};

/// Called after every successful application of a value.
pub type SetHook = Box<dyn FnMut(&OptionValue)>;

/// Kind-specific grammar configuration.
#[derive(Debug, Clone)]
pub(crate) enum Grammar {
    Bool,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Double,
    String,
    Enum(EnumTable),
    EnumPair { first: EnumTable, pairs: PairTable },
    IntRange,
    IntList { default_step: i32 },
    StringList,
    OptionFreeStringList,
    Alias,
    AliasList,
    Group,
}

/// What a successful grammar run wants done to the descriptor's value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Parsed {
    Replace(OptionValue),
    AppendInts(Vec<i32>),
    AppendText(String),
    /// Aliases: the dispatch engine expands the template.
    Trigger,
}

pub struct OptionDescriptor {
    name: String,
    usage: String,
    grammar: Grammar,
    default: OptionValue,
    value: OptionValue,
    is_set: bool,
    /// Dispatch pass in which list accumulation last started.
    list_pass: Option<u64>,
    /// Set when a list is entered in a new pass; the stale list is dropped
    /// by the first successful commit.
    clear_pending: bool,
    on_set: Option<SetHook>,
}

impl OptionDescriptor {
    fn new(name: &str, usage: &str, grammar: Grammar, default: OptionValue) -> Self {
        Self {
            name: name.to_string(),
            usage: usage.to_string(),
            grammar,
            value: default.clone(),
            default,
            is_set: false,
            list_pass: None,
            clear_pending: false,
            on_set: None,
        }
    }

    pub fn bool(name: &str, default: bool, usage: &str) -> Self {
        Self::new(name, usage, Grammar::Bool, OptionValue::Bool(default))
    }

    pub fn int32(name: &str, default: i32, usage: &str) -> Self {
        Self::new(name, usage, Grammar::Int32, OptionValue::Int32(default))
    }

    pub fn uint32(name: &str, default: u32, usage: &str) -> Self {
        Self::new(name, usage, Grammar::UInt32, OptionValue::UInt32(default))
    }

    pub fn int64(name: &str, default: i64, usage: &str) -> Self {
        Self::new(name, usage, Grammar::Int64, OptionValue::Int64(default))
    }

    pub fn uint64(name: &str, default: u64, usage: &str) -> Self {
        Self::new(name, usage, Grammar::UInt64, OptionValue::UInt64(default))
    }

    pub fn double(name: &str, default: f64, usage: &str) -> Self {
        Self::new(name, usage, Grammar::Double, OptionValue::Double(default))
    }

    pub fn string(name: &str, default: &str, usage: &str) -> Self {
        Self::new(
            name,
            usage,
            Grammar::String,
            OptionValue::String(default.to_string()),
        )
    }

    pub fn enumeration(name: &str, default: u32, usage: &str, table: EnumTable) -> Self {
        Self::new(name, usage, Grammar::Enum(table), OptionValue::Enum(default))
    }

    pub fn enum_pair(
        name: &str,
        default: EnumPair,
        usage: &str,
        first: EnumTable,
        pairs: PairTable,
    ) -> Self {
        Self::new(
            name,
            usage,
            Grammar::EnumPair { first, pairs },
            OptionValue::EnumPair(default),
        )
    }

    /// Defaults to the empty range at zero; see [`with_range`](Self::with_range).
    pub fn int_range(name: &str, usage: &str) -> Self {
        Self::new(
            name,
            usage,
            Grammar::IntRange,
            OptionValue::IntRange(IntRange::default()),
        )
    }

    /// `default_step` applies to `start..end` items and to `start+count`
    /// items without an explicit `/step`. Address lists commonly use 4.
    pub fn int_list(name: &str, usage: &str, default_step: i32) -> Self {
        Self::new(
            name,
            usage,
            Grammar::IntList { default_step },
            OptionValue::IntList(IntList::default()),
        )
    }

    pub fn string_list(name: &str, usage: &str) -> Self {
        Self::new(
            name,
            usage,
            Grammar::StringList,
            OptionValue::StringList(Vec::new()),
        )
    }

    /// A string list whose run stops at the first token naming another option.
    pub fn option_free_string_list(name: &str, usage: &str) -> Self {
        Self::new(
            name,
            usage,
            Grammar::OptionFreeStringList,
            OptionValue::StringList(Vec::new()),
        )
    }

    /// `template` is both the usage text and the command line it expands to.
    pub fn alias(name: &str, template: &str) -> Self {
        Self::new(name, template, Grammar::Alias, OptionValue::None)
    }

    /// Like [`alias`](Self::alias), but consumes a run of tokens that are
    /// substituted into `%0..%N` and `%*` in the template.
    pub fn alias_list(name: &str, template: &str) -> Self {
        Self::new(
            name,
            template,
            Grammar::AliasList,
            OptionValue::StringList(Vec::new()),
        )
    }

    /// A separator line in the usage text. Never matches a token.
    pub fn group(usage: &str) -> Self {
        Self::new("", usage, Grammar::Group, OptionValue::None)
    }

    /// Attach a post-set hook, e.g. to mirror a log level into a global.
    pub fn on_set(mut self, hook: impl FnMut(&OptionValue) + 'static) -> Self {
        self.on_set = Some(Box::new(hook));
        self
    }

    /// Replace an IntRange default.
    pub fn with_range(mut self, range: IntRange) -> Self {
        if matches!(self.grammar, Grammar::IntRange) {
            self.default = OptionValue::IntRange(range);
            self.value = self.default.clone();
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn kind(&self) -> OptionKind {
        match self.grammar {
            Grammar::Bool => OptionKind::Bool,
            Grammar::Int32 => OptionKind::Int32,
            Grammar::UInt32 => OptionKind::UInt32,
            Grammar::Int64 => OptionKind::Int64,
            Grammar::UInt64 => OptionKind::UInt64,
            Grammar::Double => OptionKind::Double,
            Grammar::String => OptionKind::String,
            Grammar::Enum(_) => OptionKind::Enum,
            Grammar::EnumPair { .. } => OptionKind::EnumPair,
            Grammar::IntRange => OptionKind::IntRange,
            Grammar::IntList { .. } => OptionKind::IntList,
            Grammar::StringList => OptionKind::StringList,
            Grammar::OptionFreeStringList => OptionKind::OptionFreeStringList,
            Grammar::Alias => OptionKind::Alias,
            Grammar::AliasList => OptionKind::AliasList,
            Grammar::Group => OptionKind::Group,
        }
    }

    pub fn is_list(&self) -> bool {
        self.kind().is_list()
    }

    pub fn is_option_free_list(&self) -> bool {
        self.kind().is_option_free_list()
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn value(&self) -> &OptionValue {
        &self.value
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default
    }

    /// The label of the current Enum value, if the table has one.
    pub fn enum_label(&self) -> Option<&str> {
        match (&self.grammar, &self.value) {
            (Grammar::Enum(table), OptionValue::Enum(v)) => table.label_of(*v),
            _ => None,
        }
    }

    /// Run the grammar without touching any state.
    pub(crate) fn parse(&self, token: &str) -> Result<Parsed, GrammarError> {
        let parsed = match &self.grammar {
            Grammar::Bool => Parsed::Replace(OptionValue::Bool(grammar::parse_bool(token)?)),
            Grammar::Int32 => Parsed::Replace(OptionValue::Int32(grammar::parse_int(token)?)),
            Grammar::UInt32 => Parsed::Replace(OptionValue::UInt32(grammar::parse_int(token)?)),
            Grammar::Int64 => Parsed::Replace(OptionValue::Int64(grammar::parse_int(token)?)),
            Grammar::UInt64 => Parsed::Replace(OptionValue::UInt64(grammar::parse_int(token)?)),
            Grammar::Double => Parsed::Replace(OptionValue::Double(grammar::parse_double(token)?)),
            Grammar::String => Parsed::Replace(OptionValue::String(token.to_string())),
            Grammar::Enum(table) => {
                Parsed::Replace(OptionValue::Enum(grammar::parse_enum(table, token)?))
            }
            Grammar::EnumPair { first, pairs } => Parsed::Replace(OptionValue::EnumPair(
                grammar::parse_enum_pair(first, pairs, token)?,
            )),
            Grammar::IntRange => {
                Parsed::Replace(OptionValue::IntRange(grammar::parse_int_range(token)?))
            }
            Grammar::IntList { default_step } => {
                Parsed::AppendInts(grammar::parse_int_list_item(token, *default_step)?)
            }
            Grammar::StringList | Grammar::OptionFreeStringList | Grammar::AliasList => {
                Parsed::AppendText(token.to_string())
            }
            Grammar::Alias => Parsed::Trigger,
            Grammar::Group => return Err(GrammarError::new("not an option")),
        };
        Ok(parsed)
    }

    pub(crate) fn commit(&mut self, parsed: Parsed) {
        if self.clear_pending && matches!(parsed, Parsed::AppendInts(_) | Parsed::AppendText(_)) {
            self.clear_pending = false;
            match &mut self.value {
                OptionValue::IntList(list) => list.clear(),
                OptionValue::StringList(list) => list.clear(),
                _ => {}
            }
        }
        match (parsed, &mut self.value) {
            (Parsed::Replace(value), slot) => *slot = value,
            (Parsed::AppendInts(items), OptionValue::IntList(list)) => list.extend(items),
            (Parsed::AppendText(item), OptionValue::StringList(list)) => list.push(item),
            (Parsed::AppendInts(_) | Parsed::AppendText(_), _) | (Parsed::Trigger, _) => {}
        }
    }

    /// Parse and store a value. Does not mark the option as set or run the
    /// hook; that is the dispatch engine's job.
    pub fn apply(&mut self, token: &str) -> Result<(), GrammarError> {
        let parsed = self.parse(token)?;
        self.commit(parsed);
        Ok(())
    }

    /// Append one integer to an IntList, keeping the mask in step.
    pub fn add_value(&mut self, value: i32) {
        if let OptionValue::IntList(list) = &mut self.value {
            list.push(value);
        }
    }

    /// Start a list run. Entering a list in a new pass schedules the
    /// accumulated items for removal; they are only dropped once an item of
    /// the new pass parses, so a run that fails outright leaves them intact.
    pub(crate) fn begin_list(&mut self, pass: u64) {
        if self.list_pass != Some(pass) {
            self.list_pass = Some(pass);
            self.clear_pending = true;
        }
    }

    pub(crate) fn mark_set(&mut self) {
        self.is_set = true;
        if let Some(hook) = self.on_set.as_mut() {
            hook(&self.value);
        }
    }

    /// Restore the constructed default and clear `is_set`.
    pub fn reset(&mut self) {
        self.value = self.default.clone();
        self.is_set = false;
        self.list_pass = None;
        self.clear_pending = false;
    }
}

impl fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind())
            .field("value", &self.value)
            .field("is_set", &self.is_set)
            .field("has_hook", &self.on_set.is_some())
            .finish()
    }
}
