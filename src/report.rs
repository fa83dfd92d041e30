//! Reporting modes: what happens to a failed dispatch.
//!
//! Dispatch itself only returns [`OptionsError`]. The decision to abort the
//! process or hand the failure back is made once, here, per entry point.

use std::fmt;

use tracing::warn;

use crate::error::OptionsError;
use crate::registry::Registry;

const ABORT_STATUS: i32 = 255;

/// Failure policy for a dispatch pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportingMode {
    /// Print the diagnostic and the full usage listing to stdout, then exit.
    #[default]
    Strict,
    /// Append the diagnostic to a caller-supplied sink and return `false`.
    /// Values applied before the failure are kept.
    Recoverable,
}

impl ReportingMode {
    /// Apply this policy to a dispatch result. Returns `true` on success.
    pub fn settle(
        self,
        registry: &Registry,
        result: Result<(), OptionsError>,
        sink: &mut impl fmt::Write,
    ) -> bool {
        let Err(err) = result else {
            return true;
        };
        match self {
            ReportingMode::Strict => abort(registry, &err),
            ReportingMode::Recoverable => {
                let mut text = diagnostic(registry, &err);
                if matches!(err, OptionsError::UnknownOption { .. }) {
                    text.push_str(&registry.usage_text());
                }
                if let Err(e) = sink.write_str(&text) {
                    warn!(error = %e, "failed to write option diagnostic to sink");
                }
                false
            }
        }
    }
}

/// Human-readable description of a failure, including the option's usage
/// text and the grammar hint where there is one.
pub fn diagnostic(registry: &Registry, err: &OptionsError) -> String {
    let (headline, option, hint) = match err {
        OptionsError::MalformedValue {
            option,
            kind,
            value,
            hint,
        } => (
            format!("error parsing '{value}'\n for {kind} option '{option}'"),
            option,
            hint,
        ),
        OptionsError::MalformedListItem {
            option,
            kind,
            token,
            hint,
        } => (
            format!("error parsing list item '{token}'\n for {kind} option '{option}'"),
            option,
            hint,
        ),
        OptionsError::EnvironmentValueInvalid {
            option,
            var,
            value,
            hint,
        } => (
            format!("error parsing '{value}' from {var}\n for option '{option}'"),
            option,
            hint,
        ),
        OptionsError::UnknownOption { .. }
        | OptionsError::AliasCycle { .. }
        | OptionsError::AliasDepthExceeded { .. } => return format!("{err}\n"),
    };
    let mut out = headline;
    out.push('\n');
    if let Some(found) = registry.find(option) {
        out.push_str(&format!(" option description: {}\n", found.usage()));
    }
    out.push_str(hint);
    out.push('\n');
    out
}

/// Strict-mode exit: diagnostic, full usage, status 255.
pub(crate) fn abort(registry: &Registry, err: &OptionsError) -> ! {
    print!("{}", diagnostic(registry, err));
    registry.print_usage();
    std::process::exit(ABORT_STATUS)
}

impl Registry {
    /// Dispatch process-style arguments in strict mode. Any failure prints a
    /// diagnostic and the usage listing, then exits the process.
    pub fn parse_args<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Err(err) = self.try_parse_args(args) {
            abort(self, &err);
        }
    }

    /// Strict-mode dispatch of a space-separated command line.
    pub fn parse_str(&mut self, command_line: &str) {
        if let Err(err) = self.try_parse_str(command_line) {
            abort(self, &err);
        }
    }

    /// Recoverable dispatch. On failure the diagnostic is appended to `sink`
    /// and `false` is returned.
    pub fn parse_args_or_error<I, S>(&mut self, args: I, sink: &mut impl fmt::Write) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let result = self.try_parse_args(args);
        ReportingMode::Recoverable.settle(self, result, sink)
    }

    pub fn parse_str_or_error(&mut self, command_line: &str, sink: &mut impl fmt::Write) -> bool {
        let result = self.try_parse_str(command_line);
        ReportingMode::Recoverable.settle(self, result, sink)
    }
}
