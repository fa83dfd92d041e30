//! Alias templates.
//!
//! An alias's usage text doubles as a command line. Plain aliases replay it
//! verbatim; alias lists first substitute the tokens they consumed:
//! `%0`..`%N` is the Nth consumed token (zero-based) and `%*` is all of them
//! joined by spaces. A placeholder with no matching token expands to nothing.

/// Split a command-line string on single spaces, dropping empty tokens.
pub(crate) fn split_space_string(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(' ').filter(|t| !t.is_empty()).map(str::to_string)
}

/// Build the synthetic stream for a re-entrant dispatch: the alias's own name
/// stands in as the program name.
pub(crate) fn synthetic_stream(program: &str, command_line: &str) -> Vec<String> {
    let mut tokens = vec![program.to_string()];
    tokens.extend(split_space_string(command_line));
    tokens
}

pub(crate) fn substitute(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(at) = rest.find('%') {
        out.push_str(&rest[..at]);
        let after = &rest[at + 1..];
        if let Some(tail) = after.strip_prefix('*') {
            out.push_str(&args.join(" "));
            rest = tail;
            continue;
        }
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            out.push('%');
            rest = after;
            continue;
        }
        if let Some(arg) = after[..digits].parse::<usize>().ok().and_then(|i| args.get(i)) {
            out.push_str(arg);
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    out
}
