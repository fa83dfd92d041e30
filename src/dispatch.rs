//! Token dispatch: walks a token stream against the registry.
//!
//! Per token:
//!
//! 1. Strip up to two leading `-`.
//! 2. Split at the first `=` into name and value (no `=` means value `""`).
//! 3. Every option with that name receives the token, in registration order.
//! 4. List options ignore the value and consume the *following* tokens until
//!    one fails their grammar and names a known option (or, for option-free
//!    lists, until one names a known option at all).
//! 5. Scalar options parse the value string. Aliases re-dispatch their
//!    template instead.
//! 6. Each successful application marks the option set and runs its hook.
//!
//! Every failure comes back as an [`OptionsError`]; deciding whether that
//! aborts the process is left to the reporting layer.

use tracing::debug;

use crate::alias;
use crate::error::OptionsError;
use crate::registry::Registry;
use crate::types::{OptionAction, OptionKind, OptionValue};
use crate::usage::OptionsResult;

/// Program-name placeholder for streams built from a single string.
const PARSE_STRING_PROGRAM: &str = "parse_string";

/// Split a token into `(name, value)` after stripping up to two dashes.
pub(crate) fn split_token(token: &str) -> (&str, &str) {
    let stripped = match token.strip_prefix('-') {
        Some(rest) => rest.strip_prefix('-').unwrap_or(rest),
        None => token,
    };
    stripped.split_once('=').unwrap_or((stripped, ""))
}

impl Registry {
    /// Dispatch process-style arguments. Element 0 is the program name.
    pub fn try_parse_args<I, S>(&mut self, args: I) -> Result<(), OptionsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();
        self.pass += 1;
        self.dispatch(&tokens)
    }

    /// Dispatch a space-separated command line as if it were real arguments.
    pub fn try_parse_str(&mut self, command_line: &str) -> Result<(), OptionsError> {
        let tokens = alias::synthetic_stream(PARSE_STRING_PROGRAM, command_line);
        self.pass += 1;
        self.dispatch(&tokens)
    }

    /// Handle an [`OptionAction`] (usage / list / parse).
    pub fn handle(&mut self, action: &OptionAction) -> Result<OptionsResult, OptionsError> {
        match action {
            OptionAction::Usage => Ok(OptionsResult::Usage(self.usage_text())),
            OptionAction::List => Ok(OptionsResult::Listing(self.listing())),
            OptionAction::Parse { tokens } => {
                let argv = std::iter::once(PARSE_STRING_PROGRAM.to_string()).chain(tokens.iter().cloned());
                self.try_parse_args(argv)?;
                Ok(OptionsResult::Parsed)
            }
        }
    }

    fn dispatch(&mut self, tokens: &[String]) -> Result<(), OptionsError> {
        let mut pos = 1;
        while pos < tokens.len() {
            let token = tokens[pos].as_str();
            let (name, value) = split_token(token);
            let matched: Vec<usize> = self.matching(name).collect();
            if matched.is_empty() {
                return Err(OptionsError::UnknownOption {
                    name: name.to_string(),
                });
            }

            let mut next = pos + 1;
            for index in matched {
                if self.options[index].is_list() {
                    next = next.max(self.consume_list(index, tokens, pos + 1)?);
                } else {
                    self.apply_scalar(index, value)?;
                }
                self.options[index].mark_set();
            }
            pos = next;
        }
        Ok(())
    }

    /// Feed tokens from `start` to a list option. Returns the position of the
    /// first token the list did not consume.
    fn consume_list(&mut self, index: usize, tokens: &[String], start: usize) -> Result<usize, OptionsError> {
        self.options[index].begin_list(self.pass);
        let mut pos = start;
        while pos < tokens.len() {
            let item = tokens[pos].as_str();
            let option = &self.options[index];
            if option.is_option_free_list() && self.matches_an_option(item) {
                break;
            }
            match option.parse(item) {
                Ok(parsed) => {
                    self.options[index].commit(parsed);
                    pos += 1;
                }
                Err(_) if self.matches_an_option(item) => break,
                Err(err) => {
                    let err = OptionsError::MalformedListItem {
                        option: option.name().to_string(),
                        kind: option.kind(),
                        token: item.to_string(),
                        hint: err.hint,
                    };
                    // Items committed before the bad one stay applied.
                    if pos > start {
                        self.options[index].mark_set();
                    }
                    return Err(err);
                }
            }
        }
        debug!(
            option = self.options[index].name(),
            consumed = pos - start,
            "end of list"
        );
        self.end_of_list(index, pos - start)?;
        Ok(pos)
    }

    fn apply_scalar(&mut self, index: usize, value: &str) -> Result<(), OptionsError> {
        let option = &self.options[index];
        if option.kind() == OptionKind::Alias {
            let name = option.name().to_string();
            let template = option.usage().to_string();
            return self.expand_alias(&name, &template);
        }
        let parsed = option.parse(value).map_err(|err| OptionsError::MalformedValue {
            option: option.name().to_string(),
            kind: option.kind(),
            value: value.to_string(),
            hint: err.hint,
        })?;
        self.options[index].commit(parsed);
        debug!(
            option = self.options[index].name(),
            value = %self.options[index].value(),
            "option applied"
        );
        Ok(())
    }

    /// Apply one value outside of a token stream (environment seeding). List
    /// options take it as a single item.
    pub(crate) fn apply_single(&mut self, index: usize, token: &str, value: &str) -> Result<(), OptionsError> {
        if !self.options[index].is_list() {
            return self.apply_scalar(index, value);
        }
        self.options[index].begin_list(self.pass);
        let option = &self.options[index];
        let parsed = option.parse(value).map_err(|err| OptionsError::MalformedListItem {
            option: option.name().to_string(),
            kind: option.kind(),
            token: token.to_string(),
            hint: err.hint,
        })?;
        self.options[index].commit(parsed);
        self.end_of_list(index, 1)
    }

    /// `consumed` is the number of items the run just appended.
    fn end_of_list(&mut self, index: usize, consumed: usize) -> Result<(), OptionsError> {
        let option = &self.options[index];
        if option.kind() != OptionKind::AliasList {
            return Ok(());
        }
        let run: &[String] = match option.value() {
            OptionValue::StringList(items) => &items[items.len().saturating_sub(consumed)..],
            _ => &[],
        };
        let command_line = alias::substitute(option.usage(), run);
        let name = option.name().to_string();
        self.expand_alias(&name, &command_line)
    }

    /// Re-enter dispatch on an alias expansion, within the current pass.
    fn expand_alias(&mut self, name: &str, command_line: &str) -> Result<(), OptionsError> {
        if self.expanding.iter().any(|n| n == name) {
            let mut chain = self.expanding.clone();
            chain.push(name.to_string());
            return Err(OptionsError::AliasCycle {
                chain: chain.join(" -> "),
            });
        }
        if self.expanding.len() >= self.max_alias_depth {
            return Err(OptionsError::AliasDepthExceeded {
                alias: name.to_string(),
                depth: self.max_alias_depth,
            });
        }
        debug!(alias = name, expansion = command_line, "expanding alias");
        let tokens = alias::synthetic_stream(name, command_line);
        self.expanding.push(name.to_string());
        let result = self.dispatch(&tokens);
        self.expanding.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OptionDescriptor;
    use crate::enum_table::EnumTable;
    use crate::fixtures::test::sample_registry;
    use crate::types::IntRange;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn split_token_forms() {
        assert_eq!(split_token("name"), ("name", ""));
        assert_eq!(split_token("-name=1"), ("name", "1"));
        assert_eq!(split_token("--name=a=b"), ("name", "a=b"));
        assert_eq!(split_token("---name"), ("-name", ""));
        assert_eq!(split_token("--"), ("", ""));
    }

    #[test]
    fn scalar_options_from_args() {
        let (mut registry, ids) = sample_registry();
        registry
            .try_parse_args([
                "prog",
                "--some_bool",
                "-some_int=0x10",
                "some_uint=10",
                "--some_double=11/20",
                "some_string=hello",
                "some_int64=-5",
                "some_uint64=0xffffffffffffffff",
            ])
            .unwrap();
        assert_eq!(registry[ids.some_bool].value().as_bool(), Some(true));
        assert_eq!(registry[ids.some_int].value().as_i32(), Some(16));
        assert_eq!(registry[ids.some_uint].value().as_u32(), Some(10));
        assert_eq!(registry[ids.some_double].value().as_f64(), Some(0.55));
        assert_eq!(registry[ids.some_string].value().as_str(), Some("hello"));
        assert_eq!(registry[ids.some_int64].value().as_i64(), Some(-5));
        assert_eq!(registry[ids.some_uint64].value().as_u64(), Some(u64::MAX));
        assert!(registry[ids.some_int].is_set());
        assert!(!registry[ids.some_enum].is_set());
    }

    #[test]
    fn program_name_is_skipped() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_args(["some_bool=0"]).unwrap();
        assert!(!registry[ids.some_bool].is_set());
    }

    #[test]
    fn unknown_option_is_reported() {
        let (mut registry, _) = sample_registry();
        let err = registry.try_parse_args(["prog", "--nope=1"]).unwrap_err();
        assert_eq!(err, OptionsError::UnknownOption { name: "nope".into() });
    }

    #[test]
    fn bare_double_dash_is_unknown() {
        let (mut registry, _) = sample_registry();
        let err = registry.try_parse_args(["prog", "--"]).unwrap_err();
        assert_eq!(err, OptionsError::UnknownOption { name: String::new() });
    }

    #[test]
    fn malformed_value_leaves_earlier_options_applied() {
        let (mut registry, ids) = sample_registry();
        let err = registry
            .try_parse_args(["prog", "some_uint=7", "some_int=0xq", "some_bool"])
            .unwrap_err();
        assert!(matches!(
            err,
            OptionsError::MalformedValue { ref option, kind: OptionKind::Int32, ref value, .. }
                if option == "some_int" && value == "0xq"
        ));
        assert_eq!(registry[ids.some_uint].value().as_u32(), Some(7));
        assert_eq!(registry[ids.some_int].value().as_i32(), Some(0));
        assert!(!registry[ids.some_int].is_set());
        assert!(!registry[ids.some_bool].is_set());
    }

    #[test]
    fn enum_tokens() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_str("some_enum=THREE").unwrap();
        assert_eq!(registry[ids.some_enum].value().as_u32(), Some(3));
        registry.try_parse_str("some_enum=7").unwrap();
        assert_eq!(registry[ids.some_enum].value().as_u32(), Some(7));
        let err = registry.try_parse_str("some_enum=bogus").unwrap_err();
        let hint = err.hint().unwrap();
        assert!(hint.contains("zero") && hint.contains("four"));
        assert_eq!(registry[ids.some_enum].value().as_u32(), Some(7));
    }

    #[test]
    fn int_range_token() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_str("some_intrange=0x100..0x108").unwrap();
        assert_eq!(
            registry[ids.some_intrange].value().as_int_range(),
            Some(IntRange {
                start: 256,
                end: 264,
                size: 8
            })
        );
    }

    #[test]
    fn int_list_consumes_until_known_option() {
        let (mut registry, ids) = sample_registry();
        registry
            .try_parse_str("some_intList 0x40+2 3 some_bool=1")
            .unwrap();
        let list = registry[ids.some_int_list].value().as_int_list().unwrap();
        assert_eq!(list.values, vec![0x40, 0x44, 3]);
        assert_eq!(list.mask, 1 << 3);
        assert!(registry[ids.some_int_list].is_set());
        assert!(registry[ids.some_bool].is_set());
    }

    #[test]
    fn int_list_malformed_item_is_an_error() {
        let (mut registry, _) = sample_registry();
        let err = registry.try_parse_str("some_intList 1 2 junk").unwrap_err();
        match err {
            OptionsError::MalformedListItem { option, token, hint, .. } => {
                assert_eq!(option, "some_intList");
                assert_eq!(token, "junk");
                assert!(hint.contains("start..end"));
            }
            other => panic!("Expected MalformedListItem, got {other:?}"),
        }
    }

    #[test]
    fn empty_list_at_end_of_stream() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_str("some_intList").unwrap();
        assert!(registry[ids.some_int_list].is_set());
        assert!(registry[ids.some_int_list].value().as_int_list().unwrap().values.is_empty());
    }

    #[test]
    fn string_list_swallows_everything() {
        let (mut registry, ids) = sample_registry();
        registry
            .try_parse_str("some_stringlist a --some_bool b")
            .unwrap();
        assert_eq!(
            registry[ids.some_stringlist].value().as_string_list().unwrap(),
            ["a", "--some_bool", "b"]
        );
        assert!(!registry[ids.some_bool].is_set());
    }

    #[test]
    fn option_free_list_stops_at_known_option() {
        let mut registry = Registry::new();
        let list = registry.register(OptionDescriptor::option_free_string_list("listopt", "files"));
        let other = registry.register(OptionDescriptor::bool("other", false, "other"));
        registry
            .try_parse_args(["prog", "listopt", "a", "b", "--other"])
            .unwrap();
        assert_eq!(registry[list].value().as_string_list().unwrap(), ["a", "b"]);
        assert_eq!(registry[other].value().as_bool(), Some(true));
    }

    #[test]
    fn lists_append_within_a_pass_and_clear_across_passes() {
        let (mut registry, ids) = sample_registry();
        registry
            .try_parse_str("some_intList 1 some_bool some_intList 2")
            .unwrap();
        assert_eq!(
            registry[ids.some_int_list].value().as_int_list().unwrap().values,
            vec![1, 2]
        );
        registry.try_parse_str("some_intList 9").unwrap();
        assert_eq!(
            registry[ids.some_int_list].value().as_int_list().unwrap().values,
            vec![9]
        );
    }

    #[test]
    fn failed_list_pass_keeps_previous_items() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_str("some_intList 9").unwrap();
        assert!(registry.try_parse_str("some_intList junk").is_err());
        assert_eq!(
            registry[ids.some_int_list].value().as_int_list().unwrap().values,
            vec![9]
        );
    }

    #[test]
    fn list_failing_on_first_item_is_not_set() {
        let (mut registry, ids) = sample_registry();
        assert!(registry.try_parse_str("some_intList junk").is_err());
        assert!(!registry[ids.some_int_list].is_set());
        assert!(registry[ids.some_int_list].value().as_int_list().unwrap().values.is_empty());
    }

    #[test]
    fn partial_list_failure_marks_set_and_runs_hook() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut registry = Registry::new();
        let lanes = registry.register(
            OptionDescriptor::int_list("lanes", "lanes", 1).on_set(move |_| counter.set(counter.get() + 1)),
        );
        let err = registry.try_parse_str("lanes 1 junk").unwrap_err();
        assert!(matches!(err, OptionsError::MalformedListItem { .. }));
        assert_eq!(registry[lanes].value().as_int_list().unwrap().values, vec![1]);
        assert!(registry[lanes].is_set());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn alias_list_runs_in_one_pass_substitute_their_own_tokens() {
        let mut registry = Registry::new();
        let addr = registry.register(OptionDescriptor::uint32("addr", 0, "address"));
        let verbose = registry.register(OptionDescriptor::bool("verbose", false, "verbose"));
        registry.register(OptionDescriptor::alias_list("at", "addr=%0"));
        registry.try_parse_str("at 1 verbose at 2").unwrap();
        assert_eq!(registry[addr].value().as_u32(), Some(2));
        assert!(registry[verbose].is_set());
    }

    #[test]
    fn alias_expands_template() {
        let mut registry = Registry::new();
        let foo = registry.register(OptionDescriptor::int32("foo", 0, "foo"));
        let bar = registry.register(OptionDescriptor::int32("bar", 0, "bar"));
        let fast = registry.register(OptionDescriptor::alias("fast", "foo=1 bar=2"));
        registry.try_parse_args(["prog", "--fast"]).unwrap();
        assert!(registry[foo].is_set());
        assert_eq!(registry[foo].value().as_i32(), Some(1));
        assert!(registry[bar].is_set());
        assert_eq!(registry[bar].value().as_i32(), Some(2));
        assert!(registry[fast].is_set());
    }

    #[test]
    fn sample_alias_sets_four_options() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_str("some_alias some_int=9").unwrap();
        assert_eq!(registry[ids.some_bool].value().as_bool(), Some(true));
        assert_eq!(registry[ids.some_enum].value().as_u32(), Some(2));
        assert_eq!(registry[ids.some_int].value().as_i32(), Some(9));
        assert_eq!(registry[ids.some_double].value().as_f64(), Some(4.0));
    }

    #[test]
    fn nested_aliases_expand() {
        let mut registry = Registry::new();
        let level = registry.register(OptionDescriptor::uint32("level", 0, "level"));
        registry.register(OptionDescriptor::alias("inner", "level=3"));
        registry.register(OptionDescriptor::alias("outer", "inner"));
        registry.try_parse_str("outer").unwrap();
        assert_eq!(registry[level].value().as_u32(), Some(3));
    }

    #[test]
    fn alias_cycle_is_detected() {
        let mut registry = Registry::new();
        registry.register(OptionDescriptor::alias("ping", "pong"));
        registry.register(OptionDescriptor::alias("pong", "ping"));
        let err = registry.try_parse_str("ping").unwrap_err();
        assert_eq!(
            err,
            OptionsError::AliasCycle {
                chain: "ping -> pong -> ping".into()
            }
        );
        assert!(registry.expanding.is_empty());
    }

    #[test]
    fn alias_depth_is_bounded() {
        let mut registry = Registry::builder().max_alias_depth(2).build();
        registry.register(OptionDescriptor::bool("leaf", false, "leaf"));
        registry.register(OptionDescriptor::alias("a", "leaf"));
        registry.register(OptionDescriptor::alias("b", "a"));
        registry.register(OptionDescriptor::alias("c", "b"));
        registry.try_parse_str("b").unwrap();
        let err = registry.try_parse_str("c").unwrap_err();
        assert!(matches!(err, OptionsError::AliasDepthExceeded { ref alias, depth: 2 } if alias == "a"));
    }

    #[test]
    fn alias_used_twice_is_not_a_cycle() {
        let mut registry = Registry::new();
        let hits = registry.register(OptionDescriptor::int_list("hits", "hits", 1));
        registry.register(OptionDescriptor::alias("one", "hits 1"));
        registry.try_parse_str("one one").unwrap();
        assert_eq!(registry[hits].value().as_int_list().unwrap().values, vec![1, 1]);
    }

    #[test]
    fn alias_list_substitutes_consumed_tokens() {
        let mut registry = Registry::new();
        let addr = registry.register(OptionDescriptor::uint32("addr", 0, "address"));
        let count = registry.register(OptionDescriptor::uint32("count", 0, "count"));
        let verbose = registry.register(OptionDescriptor::bool("verbose", false, "verbose"));
        let read = registry.register(OptionDescriptor::alias_list("read", "addr=%0 count=%1"));
        registry
            .try_parse_str("read 0x40 8 verbose")
            .unwrap();
        assert_eq!(registry[addr].value().as_u32(), Some(0x40));
        assert_eq!(registry[count].value().as_u32(), Some(8));
        assert!(registry[verbose].is_set());
        assert_eq!(registry[read].value().as_string_list().unwrap(), ["0x40", "8"]);
    }

    #[test]
    fn alias_list_star_placeholder() {
        let mut registry = Registry::new();
        let files = registry.register(OptionDescriptor::option_free_string_list("files", "files"));
        registry.register(OptionDescriptor::alias_list("open", "files %*"));
        registry.try_parse_str("open a b c").unwrap();
        assert_eq!(registry[files].value().as_string_list().unwrap(), ["a", "b", "c"]);
    }

    #[test]
    fn duplicate_names_all_receive_the_value() {
        let mut registry = Registry::new();
        let first = registry.register(OptionDescriptor::int32("dup", 0, "first"));
        let second = registry.register(OptionDescriptor::uint64("dup", 0, "second"));
        registry.try_parse_str("dup=0x20").unwrap();
        assert_eq!(registry[first].value().as_i32(), Some(32));
        assert_eq!(registry[second].value().as_u64(), Some(32));
        assert!(registry[first].is_set() && registry[second].is_set());
    }

    #[test]
    fn duplicate_names_fail_if_any_grammar_rejects() {
        let mut registry = Registry::new();
        let first = registry.register(OptionDescriptor::string("dup", "", "first"));
        registry.register(OptionDescriptor::int32("dup", 0, "second"));
        assert!(registry.try_parse_str("dup=abc").is_err());
        assert_eq!(registry[first].value().as_str(), Some("abc"));
    }

    #[test]
    fn duplicate_list_names_resume_after_longest_run() {
        let mut registry = Registry::new();
        let ints = registry.register(OptionDescriptor::int_list("items", "ints", 1));
        let strings = registry.register(OptionDescriptor::option_free_string_list("items", "strings"));
        let flag = registry.register(OptionDescriptor::bool("flag", false, "flag"));
        registry.try_parse_str("items 1 2 flag").unwrap();
        assert_eq!(registry[ints].value().as_int_list().unwrap().values, vec![1, 2]);
        assert_eq!(registry[strings].value().as_string_list().unwrap(), ["1", "2"]);
        assert!(registry[flag].is_set());
    }

    #[test]
    fn hook_runs_after_each_application() {
        let threshold = Rc::new(Cell::new(0));
        let mirror = Rc::clone(&threshold);
        let mut registry = Registry::new();
        let levels = EnumTable::new().variant(0, "error", "").variant(3, "debug", "");
        registry.register(
            OptionDescriptor::enumeration("log_level", 0, "log threshold", levels)
                .on_set(move |v| mirror.set(v.as_u32().unwrap_or(0))),
        );
        registry.try_parse_str("log_level=debug").unwrap();
        assert_eq!(threshold.get(), 3);
    }

    #[test]
    fn same_token_twice_is_idempotent() {
        let (mut registry, ids) = sample_registry();
        registry.try_parse_str("some_double=11/20").unwrap();
        let once = registry[ids.some_double].value().clone();
        registry.try_parse_str("some_double=11/20").unwrap();
        assert_eq!(registry[ids.some_double].value(), &once);
    }

    #[test]
    fn explicit_token_overrides_env_seed() {
        let mut registry = Registry::builder()
            .env_prefix("APP")
            .env_vars([("APP_level".to_string(), "4".to_string())])
            .build();
        let level = registry.register(OptionDescriptor::int32("level", 1, "level"));
        assert_eq!(registry[level].value().as_i32(), Some(4));
        registry.try_parse_str("level=7").unwrap();
        assert_eq!(registry[level].value().as_i32(), Some(7));
    }

    #[test]
    fn handle_parse_and_usage() {
        let (mut registry, ids) = sample_registry();
        let result = registry
            .handle(&OptionAction::Parse {
                tokens: vec!["some_int=3".into()],
            })
            .unwrap();
        assert!(matches!(result, OptionsResult::Parsed));
        assert_eq!(registry[ids.some_int].value().as_i32(), Some(3));

        match registry.handle(&OptionAction::Usage).unwrap() {
            OptionsResult::Usage(text) => assert!(text.contains("some_int")),
            other => panic!("Expected Usage, got {other:?}"),
        }
    }
}
