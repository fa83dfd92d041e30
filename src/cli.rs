//! Clap adapter for tokopt.
//!
//! Compiled only with the `clap` feature (on by default). [`OptionArgs`]
//! flattens into an application's own `#[derive(Parser)]` struct and collects
//! everything after the app's own flags as option tokens, so a program can
//! keep its clap surface and still accept `name=value` style options.
//!
//! The only bridge to the core is [`OptionArgs::into_action()`]. From there,
//! everything flows through [`Registry::handle()`](crate::Registry::handle).
//! Programs without clap construct [`OptionAction`] values directly.

use clap::Args;

use crate::types::OptionAction;

/// Clap-derived args that carry option tokens.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     options: OptionArgs,
/// }
/// ```
#[derive(Debug, Args)]
pub struct OptionArgs {
    /// Print every registered option with its description.
    #[arg(long = "options-help")]
    pub options_help: bool,

    /// Print every option's current value.
    #[arg(long = "options-list")]
    pub options_list: bool,

    /// Option tokens, e.g. `verbose level=3 --files a b`.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub options: Vec<String>,
}

impl OptionArgs {
    /// Convert clap-parsed args into an [`OptionAction`].
    ///
    /// `--options-help` wins over `--options-list`; with neither, the tokens
    /// are dispatched (an empty token list is a successful no-op).
    pub fn into_action(self) -> OptionAction {
        if self.options_help {
            OptionAction::Usage
        } else if self.options_list {
            OptionAction::List
        } else {
            OptionAction::Parse {
                tokens: self.options,
            }
        }
    }
}
