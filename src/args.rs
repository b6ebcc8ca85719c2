//! Command line tokenizer and typed argument readers
//!
//! A command line is a keyword followed by space-separated arguments. Some
//! commands end with a free-text argument that is taken verbatim, spaces
//! included (`print Hello world`).
//!
//! ## Example
//!
//! ```
//! use serial_tft::args::{split, Args};
//! use serial_tft::CommandError;
//!
//! let (keyword, rest) = split("setCursor 10 20");
//! assert_eq!(keyword, "setCursor");
//!
//! let mut args = Args::new(rest);
//! assert_eq!(args.int(), Ok(10));
//! assert_eq!(args.int(), Ok(20));
//! assert_eq!(args.finish(), Ok(()));
//!
//! let mut args = Args::new(split("setCursor 10").1);
//! assert_eq!(args.int(), Ok(10));
//! assert_eq!(args.int(), Err(CommandError::MissingArgument));
//! ```

use crate::error::CommandError;

const DELIMITER: char = ' ';

/// Split a line into its first token and the remainder
///
/// Leading spaces are skipped. The remainder starts right after the single
/// space that ends the first token; it is `None` when it is empty or blank.
pub fn split(line: &str) -> (&str, Option<&str>) {
    let line = line.trim_start_matches(DELIMITER);
    match line.split_once(DELIMITER) {
        Some((token, rest)) => (token, non_blank(rest)),
        None => (line, None),
    }
}

fn non_blank(rest: &str) -> Option<&str> {
    if rest.trim_matches(DELIMITER).is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Parse an integer the way C's `atoi` does
///
/// Leading spaces, an optional sign, then decimal digits up to the first
/// non-digit. Text without digits parses as 0. Values outside the `i32`
/// range saturate.
pub fn parse_int(token: &str) -> i32 {
    let bytes = token.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Reader over the arguments that follow a command keyword
///
/// Each reader consumes from the front. The first failing reader returns an
/// error that handlers propagate with `?`, so no side effect happens for a
/// malformed command.
#[derive(Clone, Copy, Debug)]
pub struct Args<'a> {
    rest: Option<&'a str>,
}

impl<'a> Args<'a> {
    /// Wrap the remainder returned by [`split`]
    pub fn new(rest: Option<&'a str>) -> Self {
        Self { rest }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        let rest = self.rest?;
        let (token, rest) = split(rest);
        self.rest = rest;
        Some(token)
    }

    /// Read a required integer
    pub fn int(&mut self) -> Result<i32, CommandError> {
        self.next_token()
            .map(parse_int)
            .ok_or(CommandError::MissingArgument)
    }

    /// Read an optional integer, falling back to `default` when absent
    pub fn int_or(&mut self, default: i32) -> i32 {
        self.next_token().map_or(default, parse_int)
    }

    /// Read a required boolean (zero is false, anything else true)
    pub fn flag(&mut self) -> Result<bool, CommandError> {
        self.int().map(|v| v != 0)
    }

    /// Read an optional boolean, falling back to `default` when absent
    pub fn bool_or(&mut self, default: bool) -> bool {
        if self.rest.is_none() {
            return default;
        }
        self.int_or(i32::from(default)) != 0
    }

    /// Take the whole remainder verbatim as a text argument
    pub fn text(&mut self) -> Result<&'a str, CommandError> {
        self.rest.take().ok_or(CommandError::MissingArgument)
    }

    /// Check that every argument has been consumed
    pub fn finish(&self) -> Result<(), CommandError> {
        match self.rest {
            Some(_) => Err(CommandError::ExtraArgument),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_keyword_only() {
        assert_eq!(split("width"), ("width", None));
    }

    #[test]
    fn test_split_trailing_space_has_no_remainder() {
        assert_eq!(split("width "), ("width", None));
        assert_eq!(split("width    "), ("width", None));
    }

    #[test]
    fn test_split_keeps_text_verbatim() {
        assert_eq!(split("print  two  spaces "), ("print", Some(" two  spaces ")));
    }

    #[test]
    fn test_split_skips_leading_spaces() {
        assert_eq!(split("  home"), ("home", None));
    }

    #[test]
    fn test_split_empty_line() {
        assert_eq!(split(""), ("", None));
    }

    #[test]
    fn test_parse_int_like_atoi() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("-17"), -17);
        assert_eq!(parse_int("+8"), 8);
        assert_eq!(parse_int("12abc"), 12);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("-"), 0);
    }

    #[test]
    fn test_parse_int_saturates() {
        assert_eq!(parse_int("99999999999"), i32::MAX);
        assert_eq!(parse_int("-99999999999"), i32::MIN);
        assert_eq!(parse_int("-2147483648"), i32::MIN);
    }

    #[test]
    fn test_int_missing() {
        let mut args = Args::new(None);
        assert_eq!(args.int(), Err(CommandError::MissingArgument));
    }

    #[test]
    fn test_int_or_default_when_absent() {
        let mut args = Args::new(Some("7"));
        assert_eq!(args.int(), Ok(7));
        assert_eq!(args.int_or(100), 100);
        assert_eq!(args.finish(), Ok(()));
    }

    #[test]
    fn test_finish_reports_extra() {
        let mut args = Args::new(Some("1 2"));
        assert_eq!(args.int(), Ok(1));
        assert_eq!(args.finish(), Err(CommandError::ExtraArgument));
    }

    #[test]
    fn test_bool_or_short_circuits() {
        let mut args = Args::new(None);
        assert!(args.bool_or(true));
        assert!(!args.bool_or(false));

        let mut args = Args::new(Some("0"));
        assert!(!args.bool_or(true));
        assert_eq!(args.finish(), Ok(()));
    }

    #[test]
    fn test_flag() {
        let mut args = Args::new(Some("5"));
        assert_eq!(args.flag(), Ok(true));
        let mut args = Args::new(Some("0"));
        assert_eq!(args.flag(), Ok(false));
    }

    #[test]
    fn test_text_takes_everything() {
        let mut args = Args::new(Some("10 Hello world"));
        assert_eq!(args.int(), Ok(10));
        assert_eq!(args.text(), Ok("Hello world"));
        assert_eq!(args.finish(), Ok(()));
    }

    #[test]
    fn test_text_missing() {
        let mut args = Args::new(Some("10"));
        assert_eq!(args.int(), Ok(10));
        assert_eq!(args.text(), Err(CommandError::MissingArgument));
    }

    proptest! {
        #[test]
        fn prop_readers_never_panic(line in "\\PC{0,80}", reads in 0usize..12) {
            let (_, rest) = split(&line);
            let mut args = Args::new(rest);
            for _ in 0..reads {
                let _ = args.int();
            }
            let _ = args.text();
            prop_assert_eq!(args.finish(), Ok(()));
        }

        #[test]
        fn prop_int_roundtrips_decimal(v in any::<i32>()) {
            let text = alloc::format!("{v}");
            prop_assert_eq!(parse_int(&text), v);
        }
    }
}
