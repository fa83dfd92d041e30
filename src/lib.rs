//! Typed options for Rust programs, resolved from compiled defaults,
//! environment variables, and command-line style tokens.
//!
//! Tokopt keeps an ordered registry of option descriptors. Each descriptor
//! has a name, a usage line, a kind with its own value grammar, a default,
//! and a current value. Registering a descriptor seeds it from the
//! environment; dispatching a token stream then overwrites whatever the
//! tokens name.
//!
//! ```ignore
//! let mut registry = Registry::builder().env_prefix("PROJECT_NAME").build();
//! let verbose = registry.register(OptionDescriptor::bool("verbose", false, "chatty output"));
//! let level = registry.register(OptionDescriptor::uint32("level", 1, "detail level"));
//! registry.parse_args(std::env::args());
//!
//! if registry[verbose].value().as_bool() == Some(true) { /* ... */ }
//! ```
//!
//! # Layer precedence
//!
//! ```text
//! Compiled defaults     OptionDescriptor::uint32("level", 1, ...)
//!        ↑ overridden by
//! Environment vars      PROJECT_NAME_level, then PROJECT_NAME_LEVEL
//!        ↑ overridden by
//! Tokens                level=3
//! ```
//!
//! Seeding happens once, at registration. Later tokens simply overwrite the
//! value again, so the order above holds without any merge step. Aliases
//! are never seeded.
//!
//! # Token grammar
//!
//! A token is `name`, `name=value`, `-name=value` or `--name=value`. Up to
//! two leading dashes are stripped and the first `=` splits name from value.
//! A bare `name` passes the empty string, which booleans read as `true`.
//!
//! Every option sharing the token's name receives the value, in registration
//! order. Names are unique by convention only.
//!
//! | Kind | Accepts |
//! |------|---------|
//! | bool | `""`, `1`, `on`, `yes`, `true` / `0`, `no`, `off`, `false` |
//! | int, uint, int64, uint64 | decimal, or `0x` hex |
//! | Double | float literal, or `numerator/denominator` |
//! | string | anything |
//! | enum | a table label (any case) or a raw uint |
//! | enum pair | a pair label, or `first.second` |
//! | IntRange | `start..end` or `start+count` |
//!
//! # Lists
//!
//! List kinds ignore the token's value and consume the *following* tokens.
//! An IntList item is a value, `start..end`, `start+count` or
//! `start+count/step`. The run ends at the first token that fails the item
//! grammar and names a known option; a token that fails and names nothing
//! is an error. Option-free lists stop at any known option name, even one
//! their grammar would accept.
//!
//! Lists accumulate across repeated mentions within one dispatch call and
//! start over in the next call once its first item parses. Items parsed
//! before a malformed one are kept.
//!
//! # Aliases
//!
//! An alias's usage text is a command line. Setting the alias dispatches
//! that line in place. An alias list consumes a run of tokens like an
//! option-free list, substitutes them into `%0`..`%N` and `%*` in its
//! template, then dispatches the result. Cycles and runaway nesting are
//! reported instead of recursing forever.
//!
//! # Reporting
//!
//! Every dispatch entry point comes in three shapes:
//!
//! - [`try_parse_args`](Registry::try_parse_args) /
//!   [`try_parse_str`](Registry::try_parse_str) return
//!   `Result<(), OptionsError>`.
//! - [`parse_args`](Registry::parse_args) / [`parse_str`](Registry::parse_str)
//!   are strict: any failure prints a diagnostic and the usage listing to
//!   stdout and exits with status 255.
//! - [`parse_args_or_error`](Registry::parse_args_or_error) /
//!   [`parse_str_or_error`](Registry::parse_str_or_error) are recoverable:
//!   the diagnostic goes to a caller-supplied sink and `false` comes back.
//!   Values applied before the failure are kept.
//!
//! An environment value that fails its grammar is always fatal under
//! [`Registry::register`]; use [`Registry::try_register`] to handle it.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default), [`OptionArgs`] flattens into an
//! application's parser and yields an [`OptionAction`], which
//! [`Registry::handle`] turns into an [`OptionsResult`]. Without clap:
//!
//! ```toml
//! tokopt = { version = "...", default-features = false }
//! ```
//!
//! # Logging
//!
//! Tokopt emits [`tracing`](https://docs.rs/tracing) events and never
//! installs a subscriber: environment seeding at `info`, applied values and
//! alias expansions at `debug`, duplicate registrations at `warn`.

pub mod error;
pub mod grammar;
pub mod types;

mod alias;
#[cfg(feature = "clap")]
mod cli;
mod descriptor;
mod dispatch;
mod enum_table;
mod env;
mod registry;
mod report;
mod usage;

#[cfg(test)]
mod fixtures;

#[cfg(feature = "clap")]
pub use cli::OptionArgs;
pub use descriptor::{OptionDescriptor, SetHook};
pub use enum_table::{EnumEntry, EnumTable, PairEntry, PairTable};
pub use error::{GrammarError, OptionsError};
pub use registry::{OptionId, Registry, RegistryBuilder};
pub use report::{ReportingMode, diagnostic};
pub use types::{EnumPair, IntList, IntRange, OptionAction, OptionKind, OptionValue};
pub use usage::{Listing, ListingEntry, OptionsResult};
