//! Serial TFT command server
//!
//! Firmware core for a small TFT with three push buttons, driven by a host
//! over a serial line. The host sends one text command per line (`drawPixel
//! 10 20 1`, `print Hello`, `waitButton 5000 0`) and gets exactly one
//! response line back (`OK`, a number, a button label or `ERROR <reason>`).
//!
//! ## Features
//!
//! - `no_std` compatible, no allocator
//! - `embedded-hal` v1.0 button pins and delays
//! - `embedded-io` serial transport
//! - Batched drawing: commands are queued and shown together on `display`
//! - Debounced buttons with blocking wait, watch and monitor protocols
//! - `embedded-graphics` reference display (with `graphics` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_graphics::mock_display::MockDisplay;
//! use embedded_graphics::pixelcolor::Rgb565;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::digital::InputPin;
//! use serial_tft::{Builder, Clock, Controller, Dimensions, GraphicsCanvas, Rotation};
//!
//! # struct MockPin;
//! # impl embedded_hal::digital::ErrorType for MockPin { type Error = Infallible; }
//! # impl InputPin for MockPin {
//! #     fn is_high(&mut self) -> Result<bool, Self::Error> { Ok(true) }
//! #     fn is_low(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # struct MockClock;
//! # impl Clock for MockClock { fn now_ms(&mut self) -> u32 { 0 } }
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # struct MockUart;
//! # impl embedded_io::ErrorType for MockUart { type Error = Infallible; }
//! # impl embedded_io::Read for MockUart {
//! #     fn read(&mut self, _: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl embedded_io::ReadReady for MockUart {
//! #     fn read_ready(&mut self) -> Result<bool, Self::Error> { Ok(false) }
//! # }
//! # impl embedded_io::Write for MockUart {
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! let dims = match Dimensions::new(240, 135) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).rotation(Rotation::Rotate270).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut display: MockDisplay<Rgb565> = MockDisplay::new();
//! display.set_allow_overdraw(true);
//! let canvas = GraphicsCanvas::new(display);
//!
//! // small queue: the default one belongs in a `static`, see `controller`
//! let mut controller: Controller<_, _, _, _, _, 32> = Controller::new(
//!     config,
//!     canvas,
//!     [MockPin, MockPin, MockPin],
//!     MockClock,
//!     MockDelay,
//!     MockUart,
//! );
//! controller.begin();
//! let _ = controller.run();
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(test)]
extern crate alloc;

/// Drawing commands as queued values
pub mod action;
/// Command line tokenizer and argument readers
pub mod args;
/// Debounced button channels
pub mod button;
/// Display collaborator trait
pub mod canvas;
/// Colour flags and RGB565 packing
pub mod color;
/// Command keywords and dispatch table
pub mod command;
/// Controller configuration types and builder
pub mod config;
/// Command server
pub mod controller;
/// Error types
pub mod error;
/// Backslash escapes in command lines
pub mod escape;
/// Wire responses
pub mod response;
/// Coordinate rotation utilities
pub mod rotation;
/// Batched drawing queue
pub mod transaction;
/// Blocking button protocols
pub mod wait;

/// Graphics support via embedded-graphics (requires `graphics` feature)
#[cfg(feature = "graphics")]
pub mod graphics;

#[cfg(test)]
mod testing;

pub use button::{Label, Levels, Polarity};
pub use canvas::{Canvas, TextBounds};
pub use color::Ink;
pub use config::{Builder, Config, Dimensions, Rotation};
pub use controller::{Controller, LINE_CAPACITY};
pub use error::{BuilderError, CommandError, ServeError};
pub use response::Response;
pub use transaction::{QUEUE_CAPACITY, Transaction};
pub use wait::Clock;

#[cfg(feature = "graphics")]
pub use graphics::GraphicsCanvas;
