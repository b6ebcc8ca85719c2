//! Error types for the command server
//!
//! - [`CommandError`] - Client input errors, reported back over the wire
//! - [`BuilderError`] - Errors during configuration construction
//! - [`ServeError`] - Transport failures while serving the serial link
//!
//! ## Example
//!
//! ```
//! use serial_tft::{Builder, BuilderError, CommandError, Dimensions};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Wire text of a validation failure
//! assert_eq!(CommandError::MissingArgument.as_str(), "ERROR missing arg");
//! ```

/// Why a command line was rejected
///
/// Every variant is a client input error: nothing is mutated when one is
/// returned, and the device keeps serving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// A required argument was not supplied
    MissingArgument,
    /// More arguments were supplied than the command accepts
    ExtraArgument,
    /// The keyword does not name a known command
    UnknownCommand,
}

impl CommandError {
    /// Wire representation of the error
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingArgument => "ERROR missing arg",
            Self::ExtraArgument => "ERROR extra arg",
            Self::UnknownCommand => "ERROR unknown cmd",
        }
    }
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::error::Error for CommandError {}

/// Errors that can occur when building configuration
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Width or height is zero
    InvalidDimensions {
        /// Requested width in pixels
        width: u16,
        /// Requested height in pixels
        height: u16,
    },
    /// The polling tick must be at least one millisecond
    InvalidTick,
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "Invalid dimensions {width}x{height} (both must be non-zero)")
            }
            Self::InvalidTick => write!(f, "Tick must be at least 1ms"),
        }
    }
}

impl core::error::Error for BuilderError {}

/// Errors raised by the serve loop
///
/// Generic over the transport error type so callers can match on the
/// underlying UART error.
#[derive(Debug)]
pub enum ServeError<E> {
    /// Reading from or writing to the serial port failed
    Transport(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for ServeError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Serial transport error: {e:?}"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for ServeError<E> {}
