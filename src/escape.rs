//! In-place backslash unescaping for incoming command lines
//!
//! Hosts cannot send a raw newline inside a command (it terminates the line),
//! so text arguments use C-style escapes that are resolved before the line is
//! tokenized:
//!
//! | Escape | Result          |
//! |--------|-----------------|
//! | `\n`   | line feed       |
//! | `\t`   | horizontal tab  |
//! | `\\`   | backslash       |
//! | `\x`   | `x` (verbatim)  |
//!
//! ## Example
//!
//! ```
//! use serial_tft::escape::unescape;
//!
//! let mut line = *b"print a\\nb";
//! let len = unescape(&mut line);
//! assert_eq!(&line[..len], b"print a\nb");
//! ```

/// Resolve backslash escapes in `buf`, in place
///
/// Processing stops at the first NUL byte or at the end of the buffer. A
/// trailing lone backslash is dropped.
///
/// Returns the length of the unescaped content, which is never larger than
/// the input length.
pub fn unescape(buf: &mut [u8]) -> usize {
    let mut from = 0;
    let mut to = 0;

    while from < buf.len() && buf[from] != 0 {
        let byte = if buf[from] == b'\\' {
            from += 1;
            match buf.get(from) {
                None | Some(0) => break,
                Some(b'n') => b'\n',
                Some(b't') => b'\t',
                Some(&other) => other,
            }
        } else {
            buf[from]
        };
        buf[to] = byte;
        from += 1;
        to += 1;
    }

    to
}
