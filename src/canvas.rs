//! Display collaborator abstraction
//!
//! The command server never computes pixels. It decides which drawing
//! primitive to call, with which validated arguments, and when. The
//! [`Canvas`] trait is the seam to whatever actually draws: a TFT driver, a
//! framebuffer, or the [`GraphicsCanvas`](crate::GraphicsCanvas) adapter over
//! any `embedded-graphics` draw target.
//!
//! ## Implementing
//!
//! Arguments arrive already truncated to the widths the command set defines
//! (coordinates are `i16`, colour channels `u8`). Implementations own their
//! failure handling; a stalled display bus is not reported back to the host.

use crate::color::Ink;
use crate::config::Rotation;

/// Bounding box of a laid-out string
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBounds {
    /// Left edge
    pub x: i16,
    /// Top edge
    pub y: i16,
    /// Width in pixels
    pub w: u16,
    /// Height in pixels
    pub h: u16,
}

/// Drawing primitives and drawing state of the display
pub trait Canvas {
    /// Restore default colours, cursor and text settings, then clear
    ///
    /// Rotation is left alone; the caller sets it afterwards.
    fn reset(&mut self);

    /// Fill the screen with the background colour
    fn clear(&mut self);

    /// Render text at the cursor, advancing it
    fn print(&mut self, text: &str);

    /// Move the text cursor
    fn set_cursor(&mut self, x: i16, y: i16);

    /// Set the foreground colour
    fn set_fg_color(&mut self, r: u8, g: u8, b: u8);

    /// Set the background colour
    fn set_bg_color(&mut self, r: u8, g: u8, b: u8);

    /// Draw a single pixel
    fn draw_pixel(&mut self, x: i16, y: i16, ink: Ink);

    /// Change the display orientation
    fn set_rotation(&mut self, rotation: Rotation);

    /// Invert the display colours
    fn invert(&mut self, inverted: bool);

    /// Draw a vertical line of height `h`
    fn draw_fast_vline(&mut self, x: i16, y: i16, h: i16, ink: Ink);

    /// Draw a horizontal line of width `w`
    fn draw_fast_hline(&mut self, x: i16, y: i16, w: i16, ink: Ink);

    /// Fill the whole screen
    fn fill_screen(&mut self, ink: Ink);

    /// Draw a line between two points
    fn draw_line(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, ink: Ink);

    /// Draw a rectangle outline
    fn draw_rect(&mut self, x: i16, y: i16, w: i16, h: i16, ink: Ink);

    /// Draw a filled rectangle
    fn fill_rect(&mut self, x: i16, y: i16, w: i16, h: i16, ink: Ink);

    /// Draw a circle outline centred on (x, y)
    fn draw_circle(&mut self, x: i16, y: i16, r: i16, ink: Ink);

    /// Draw a filled circle centred on (x, y)
    fn fill_circle(&mut self, x: i16, y: i16, r: i16, ink: Ink);

    /// Draw a triangle outline
    fn draw_triangle(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, x2: i16, y2: i16, ink: Ink);

    /// Draw a filled triangle
    fn fill_triangle(&mut self, x0: i16, y0: i16, x1: i16, y1: i16, x2: i16, y2: i16, ink: Ink);

    /// Draw a rounded rectangle outline with corner radius `r`
    fn draw_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, ink: Ink);

    /// Draw a filled rounded rectangle with corner radius `r`
    fn fill_round_rect(&mut self, x: i16, y: i16, w: i16, h: i16, r: i16, ink: Ink);

    /// Draw one character cell with explicit inks and scale
    fn draw_char(&mut self, x: i16, y: i16, code: u8, fg: Ink, bg: Ink, size: u8);

    /// Set the text scale factors
    fn set_text_size(&mut self, sx: u8, sy: u8);

    /// Set the text colour
    fn set_text_color(&mut self, ink: Ink);

    /// Enable or disable wrapping at the right edge
    fn set_text_wrap(&mut self, wrap: bool);

    /// Bounds `text` would cover if printed with the cursor at (x, y)
    fn text_bounds(&mut self, text: &str, x: i16, y: i16) -> TextBounds;

    /// Current orientation
    fn rotation(&self) -> Rotation;

    /// Current text cursor as (x, y)
    fn cursor(&self) -> (i16, i16);
}
