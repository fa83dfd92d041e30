//! Per-kind value grammars.
//!
//! Every grammar turns one token into a typed value or a [`GrammarError`]
//! carrying a format hint. Grammars are pure: they never touch descriptor
//! state, so a rejected token can never clobber a previously applied value.
//!
//! Integers accept a `0x`/`0X` prefix for hexadecimal, otherwise decimal, and
//! the whole token must be consumed. The prefix scanners (`split_int`,
//! `split_float`) return the unconsumed remainder so compound grammars
//! (`start..end`, `11/20`) can be built on top of them.

use tracing::debug;

use crate::enum_table::{EnumTable, PairTable};
use crate::error::GrammarError;
use crate::types::{EnumPair, IntRange};

const BOOL_HINT: &str = "valid values are 0,1,no,yes,off,on,false,true";
const INT_HINT: &str = "integers are decimal, or hexadecimal with a leading 0x";
const DOUBLE_HINT: &str = "double is a floating point literal, or numerator/denominator\n   e.g. 11/20";
const RANGE_HINT: &str = "range formats are:\n   start..end e.g. 0xd00380..0xd00388\n   start+count e.g. 0xd00380+2 (that's 0xd00380,0xd00384)";

/// Integer widths the grammar can produce.
pub trait Integer: Copy {
    const SIGNED: bool;
    fn from_decimal(text: &str) -> Option<Self>;
    /// Hex digits are read as the same-width unsigned bit pattern.
    fn from_hex(digits: &str, negative: bool) -> Option<Self>;
}

macro_rules! impl_integer {
    ($($t:ty => $bits:ty),* $(,)?) => {$(
        impl Integer for $t {
            const SIGNED: bool = <$t>::MIN != 0;

            fn from_decimal(text: &str) -> Option<Self> {
                text.parse().ok()
            }

            fn from_hex(digits: &str, negative: bool) -> Option<Self> {
                let raw = <$bits>::from_str_radix(digits, 16).ok()? as $t;
                Some(if negative { raw.wrapping_neg() } else { raw })
            }
        }
    )*};
}

impl_integer!(i32 => u32, u32 => u32, i64 => u64, u64 => u64);

/// Scan the longest integer prefix of `s`.
pub(crate) fn split_int<T: Integer>(s: &str) -> Option<(T, &str)> {
    let mut sign_len = 0;
    let mut negative = false;
    if T::SIGNED && let Some(c @ (b'-' | b'+')) = s.bytes().next() {
        negative = c == b'-';
        sign_len = 1;
    }
    let body = &s[sign_len..];

    if let Some(hex) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        let len = hex.bytes().take_while(u8::is_ascii_hexdigit).count();
        if len > 0 {
            let value = T::from_hex(&hex[..len], negative)?;
            return Some((value, &hex[len..]));
        }
    }

    let len = body.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }
    let value = T::from_decimal(&s[..sign_len + len])?;
    Some((value, &body[len..]))
}

pub fn parse_int<T: Integer>(s: &str) -> Result<T, GrammarError> {
    match split_int(s) {
        Some((value, "")) => Ok(value),
        _ => Err(GrammarError::new(INT_HINT)),
    }
}

pub fn parse_bool(s: &str) -> Result<bool, GrammarError> {
    const TRUE: [&str; 5] = ["", "1", "on", "yes", "true"];
    const FALSE: [&str; 4] = ["0", "no", "off", "false"];
    if TRUE.iter().any(|t| t.eq_ignore_ascii_case(s)) {
        Ok(true)
    } else if FALSE.iter().any(|f| f.eq_ignore_ascii_case(s)) {
        Ok(false)
    } else {
        Err(GrammarError::new(BOOL_HINT))
    }
}

/// Scan the longest floating point literal prefix of `s`:
/// `[sign] digits [. digits] [e|E [sign] digits]`.
fn split_float(s: &str) -> Option<(f64, &str)> {
    let bytes = s.as_bytes();
    let digits_from = |at: usize| bytes[at.min(bytes.len())..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let whole = digits_from(end);
    end += whole;
    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(end + 1);
        if whole + fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole + fraction == 0 {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digits_from(exp);
        if exp_digits > 0 {
            end = exp + exp_digits;
        }
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// A float literal, optionally followed by `/denominator`.
pub fn parse_double(s: &str) -> Result<f64, GrammarError> {
    let err = || GrammarError::new(DOUBLE_HINT);
    let (numerator, rest) = split_float(s).ok_or_else(err)?;
    let (value, rest) = match rest.strip_prefix('/') {
        Some(tail) => {
            let (denominator, rest) = split_float(tail).ok_or_else(err)?;
            let quotient = numerator / denominator;
            debug!(numerator, denominator, quotient, "evaluated ratio");
            (quotient, rest)
        }
        None => (numerator, rest),
    };
    if rest.is_empty() { Ok(value) } else { Err(err()) }
}

/// `start..end` or `start+count`.
pub fn parse_int_range(s: &str) -> Result<IntRange, GrammarError> {
    let err = || GrammarError::new(RANGE_HINT);
    let (start, rest) = split_int::<i32>(s).ok_or_else(err)?;
    if let Some(count) = rest.strip_prefix('+') {
        let size = parse_int::<i32>(count).map_err(|_| err())?;
        let end = start.checked_add(size).ok_or_else(err)?;
        return Ok(IntRange { start, end, size });
    }
    if let Some(end) = rest.strip_prefix("..") {
        let end = parse_int::<i32>(end).map_err(|_| err())?;
        let size = end.checked_sub(start).ok_or_else(err)?;
        return Ok(IntRange { start, end, size });
    }
    Err(err())
}

/// Upper bound on the values a single IntList item may expand to.
pub const MAX_LIST_ITEM_VALUES: usize = 1 << 16;

fn int_list_hint(default_step: i32) -> String {
    let formats = if default_step == 4 {
        "list formats are:\n   start..end       e.g. 0xd00380..0xd00388\n   start+count      e.g. 0xd00380+2 (that's 0xd00380 0xd00384)\n   start+count/skip e.g. 0xd00380+2/0x20 (that's 0xd00380 0xd003a0)"
    } else {
        "list formats are:\n   value            e.g. 5\n   start..end       e.g. 0..10\n   start+count      e.g. 5+2 (that's 5 6)\n   start+count/skip e.g. 11+3/100 (that's 11 111 211)"
    };
    format!("{formats}\none item expands to at most {MAX_LIST_ITEM_VALUES} values")
}

/// One IntList item: a bare integer, `start..end` (stepping by
/// `default_step`, end inclusive), or `start+count[/step]`. Items expanding
/// to more than [`MAX_LIST_ITEM_VALUES`] values are rejected.
pub fn parse_int_list_item(s: &str, default_step: i32) -> Result<Vec<i32>, GrammarError> {
    let err = || GrammarError::new(int_list_hint(default_step));
    let (start, rest) = split_int::<i32>(s).ok_or_else(err)?;
    if rest.is_empty() {
        return Ok(vec![start]);
    }

    if let Some(tail) = rest.strip_prefix('+') {
        let (count, rest) = split_int::<i32>(tail).ok_or_else(err)?;
        let step = match rest.strip_prefix('/') {
            Some(step) => parse_int::<i32>(step).map_err(|_| err())?,
            None if rest.is_empty() => default_step,
            None => return Err(err()),
        };
        if step <= 0 || count < 0 || count as usize > MAX_LIST_ITEM_VALUES {
            return Err(err());
        }
        return (0..i64::from(count))
            .map(|i| i32::try_from(i64::from(start) + i * i64::from(step)).map_err(|_| err()))
            .collect();
    }

    if let Some(end) = rest.strip_prefix("..") {
        let end = parse_int::<i32>(end).map_err(|_| err())?;
        let step = usize::try_from(default_step).ok().filter(|s| *s > 0).ok_or_else(err)?;
        let values = match usize::try_from(i64::from(end) - i64::from(start)) {
            Ok(distance) => distance / step + 1,
            Err(_) => 0,
        };
        if values > MAX_LIST_ITEM_VALUES {
            return Err(err());
        }
        return Ok((start..=end).step_by(step).collect());
    }

    Err(err())
}

/// Label lookup with a raw integer fallback.
pub fn parse_enum(table: &EnumTable, s: &str) -> Result<u32, GrammarError> {
    if let Some(value) = table.lookup(s) {
        return Ok(value);
    }
    parse_int::<u32>(s)
        .map_err(|_| GrammarError::new(format!("valid enumerations are:\n{}", table.listing())))
}

/// A registered pair label, or `first.second` where `first` resolves like an
/// enum and `second` is a plain integer.
pub fn parse_enum_pair(first: &EnumTable, pairs: &PairTable, s: &str) -> Result<EnumPair, GrammarError> {
    if let Some(pair) = pairs.lookup(s) {
        return Ok(pair);
    }
    if let Some((left, right)) = s.split_once('.') {
        let first_value = first
            .lookup(left)
            .or_else(|| parse_int::<u32>(left).ok());
        if let (Some(first_value), Ok(second)) = (first_value, parse_int::<u32>(right)) {
            return Ok(EnumPair {
                first: first_value,
                second,
            });
        }
    }
    Err(GrammarError::new(format!(
        "pair formats are:\n   label\n   first.second\nvalid first values are:\n{}valid pairs are:\n{}",
        first.listing(),
        pairs.listing()
    )))
}
