//! Reply to one command line
//!
//! Every interpreted line yields exactly one [`Response`]. Its [`Display`]
//! implementation is the wire text, without the line terminator.
//!
//! [`Display`]: core::fmt::Display
//!
//! ## Example
//!
//! ```
//! use serial_tft::{CommandError, Response};
//!
//! assert_eq!(Response::Ok.encode(), "OK");
//! assert_eq!(Response::Number(240).encode(), "240");
//! assert_eq!(Response::Error(CommandError::ExtraArgument).encode(), "ERROR extra arg");
//! ```

use core::fmt::Write;

use heapless::String;

use crate::button::{Label, Levels};
use crate::canvas::TextBounds;
use crate::error::CommandError;

/// Longest possible encoded response
pub const RESPONSE_CAPACITY: usize = 32;

/// Line terminator appended after every response
pub const LINE_ENDING: &str = "\r\n";

/// Outcome of interpreting one line
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    /// `OK`
    Ok,
    /// `OK` followed by the pressed buttons (`autoReadButtons 1`)
    OkLevels(Levels),
    /// A bare number
    Number(i32),
    /// `x y w h`
    Bounds(TextBounds),
    /// Pressed buttons or `NONE`
    Levels(Levels),
    /// Button that produced the awaited edge, or `NONE`
    Button(Option<Label>),
    /// Empty line; the payload was streamed while the command ran
    Silent,
    /// `ERROR <reason>`
    Error(CommandError),
}

impl Response {
    /// Whether the command was rejected
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Render the wire text into a bounded string
    pub fn encode(&self) -> String<RESPONSE_CAPACITY> {
        let mut out = String::new();
        if write!(out, "{self}").is_err() {
            log::warn!("response truncated: {:?}", self);
        }
        out
    }
}

impl From<CommandError> for Response {
    fn from(err: CommandError) -> Self {
        Self::Error(err)
    }
}

impl core::fmt::Display for Response {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::OkLevels(levels) => write!(f, "OK {levels}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bounds(b) => write!(f, "{} {} {} {}", b.x, b.y, b.w, b.h),
            Self::Levels(levels) => write!(f, "{levels}"),
            Self::Button(Some(label)) => write!(f, "{label}"),
            Self::Button(None) => f.write_str("NONE"),
            Self::Silent => Ok(()),
            Self::Error(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_with_levels() {
        let mut levels = Levels::default();
        assert_eq!(Response::OkLevels(levels).encode(), "OK NONE");
        levels.insert(Label::A);
        levels.insert(Label::C);
        assert_eq!(Response::OkLevels(levels).encode(), "OK AC");
    }

    #[test]
    fn test_bounds() {
        let bounds = TextBounds {
            x: -3,
            y: 10,
            w: 60,
            h: 8,
        };
        assert_eq!(Response::Bounds(bounds).encode(), "-3 10 60 8");
    }

    #[test]
    fn test_widest_bounds_fit() {
        let bounds = TextBounds {
            x: i16::MIN,
            y: i16::MIN,
            w: u16::MAX,
            h: u16::MAX,
        };
        assert_eq!(Response::Bounds(bounds).encode(), "-32768 -32768 65535 65535");
    }

    #[test]
    fn test_button() {
        assert_eq!(Response::Button(Some(Label::B)).encode(), "B");
        assert_eq!(Response::Button(None).encode(), "NONE");
    }

    #[test]
    fn test_silent_is_empty() {
        assert_eq!(Response::Silent.encode(), "");
    }

    #[test]
    fn test_error() {
        let response = Response::from(CommandError::UnknownCommand);
        assert!(response.is_error());
        assert_eq!(response.encode(), "ERROR unknown cmd");
    }
}
