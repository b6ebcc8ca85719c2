//! Deferred display effects
//!
//! An [`Action`] is a drawing command that has been parsed and validated but
//! not yet applied. The [`Opcode`] fixes how many numeric arguments the action
//! carries, so applying it only ever reads the slots that opcode defines.

use heapless::{String, Vec};

use crate::canvas::Canvas;
use crate::color::Ink;
use crate::config::Rotation;

/// Maximum number of numeric arguments of an action
pub const MAX_ARGS: usize = 8;
/// Maximum length of a `print` payload in bytes
pub const TEXT_CAPACITY: usize = 128;

/// Text payload of a `print` action
pub type Text = String<TEXT_CAPACITY>;

/// Display effect selector
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// Render text at the cursor
    Print,
    /// Fill with the background colour
    Clear,
    /// Move the cursor to the origin
    Home,
    /// r g b
    SetFgColor,
    /// r g b
    SetBgColor,
    /// x y ink
    DrawPixel,
    /// m
    SetRotation,
    /// inverted
    Invert,
    /// x y h ink
    DrawFastVLine,
    /// x y w ink
    DrawFastHLine,
    /// ink
    FillScreen,
    /// x0 y0 x1 y1 ink
    DrawLine,
    /// x y w h ink
    DrawRect,
    /// x y w h ink
    FillRect,
    /// x y r ink
    DrawCircle,
    /// x y r ink
    FillCircle,
    /// x0 y0 x1 y1 x2 y2 ink
    DrawTriangle,
    /// x0 y0 x1 y1 x2 y2 ink
    FillTriangle,
    /// x y w h r ink
    DrawRoundRect,
    /// x y w h r ink
    FillRoundRect,
    /// x y code fg bg size
    DrawChar,
    /// sx sy (sy < 0 means same as sx)
    SetTextSize,
    /// x y
    SetCursor,
    /// ink
    SetTextColor,
    /// wrap
    SetTextWrap,
}

impl Opcode {
    /// Number of numeric arguments the opcode takes
    pub const fn arity(self) -> usize {
        match self {
            Self::Print | Self::Clear | Self::Home => 0,
            Self::SetRotation
            | Self::Invert
            | Self::FillScreen
            | Self::SetTextColor
            | Self::SetTextWrap => 1,
            Self::SetTextSize | Self::SetCursor => 2,
            Self::SetFgColor | Self::SetBgColor | Self::DrawPixel => 3,
            Self::DrawFastVLine | Self::DrawFastHLine | Self::DrawCircle | Self::FillCircle => 4,
            Self::DrawLine | Self::DrawRect | Self::FillRect => 5,
            Self::DrawRoundRect | Self::FillRoundRect | Self::DrawChar => 6,
            Self::DrawTriangle | Self::FillTriangle => 7,
        }
    }
}

/// A validated display effect waiting to be applied
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    opcode: Opcode,
    args: Vec<i32, MAX_ARGS>,
    text: Text,
}

impl Action {
    /// Build a numeric action
    ///
    /// Returns `None` if `args` does not match the opcode's arity.
    pub fn new(opcode: Opcode, args: &[i32]) -> Option<Self> {
        if args.len() != opcode.arity() || opcode == Opcode::Print {
            return None;
        }
        Some(Self {
            opcode,
            args: Vec::from_slice(args).ok()?,
            text: Text::new(),
        })
    }

    /// Build a `print` action; text beyond [`TEXT_CAPACITY`] bytes is cut at a
    /// character boundary
    pub fn print(text: &str) -> Self {
        let mut payload = Text::new();
        for ch in text.chars() {
            if payload.push(ch).is_err() {
                log::warn!("print payload truncated to {} bytes", payload.len());
                break;
            }
        }
        Self {
            opcode: Opcode::Print,
            args: Vec::new(),
            text: payload,
        }
    }

    /// Effect selector
    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Numeric arguments, exactly `opcode().arity()` of them
    pub fn args(&self) -> &[i32] {
        &self.args
    }

    /// Text payload (empty unless the opcode is `Print`)
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Perform the effect on `canvas`
    pub fn apply<V: Canvas>(&self, canvas: &mut V) {
        log::trace!("apply {:?} {:?}", self.opcode, self.args.as_slice());

        let c = |v: i32| v as i16;
        let ink = Ink::from_flag;
        match (self.opcode, self.args.as_slice()) {
            (Opcode::Print, []) => canvas.print(&self.text),
            (Opcode::Clear, []) => canvas.clear(),
            (Opcode::Home, []) => canvas.set_cursor(0, 0),
            (Opcode::SetFgColor, &[r, g, b]) => canvas.set_fg_color(r as u8, g as u8, b as u8),
            (Opcode::SetBgColor, &[r, g, b]) => canvas.set_bg_color(r as u8, g as u8, b as u8),
            (Opcode::DrawPixel, &[x, y, i]) => canvas.draw_pixel(c(x), c(y), ink(i)),
            (Opcode::SetRotation, &[m]) => canvas.set_rotation(Rotation::from_index(m)),
            (Opcode::Invert, &[inv]) => canvas.invert(inv != 0),
            (Opcode::DrawFastVLine, &[x, y, h, i]) => {
                canvas.draw_fast_vline(c(x), c(y), c(h), ink(i));
            }
            (Opcode::DrawFastHLine, &[x, y, w, i]) => {
                canvas.draw_fast_hline(c(x), c(y), c(w), ink(i));
            }
            (Opcode::FillScreen, &[i]) => canvas.fill_screen(ink(i)),
            (Opcode::DrawLine, &[x0, y0, x1, y1, i]) => {
                canvas.draw_line(c(x0), c(y0), c(x1), c(y1), ink(i));
            }
            (Opcode::DrawRect, &[x, y, w, h, i]) => canvas.draw_rect(c(x), c(y), c(w), c(h), ink(i)),
            (Opcode::FillRect, &[x, y, w, h, i]) => canvas.fill_rect(c(x), c(y), c(w), c(h), ink(i)),
            (Opcode::DrawCircle, &[x, y, r, i]) => canvas.draw_circle(c(x), c(y), c(r), ink(i)),
            (Opcode::FillCircle, &[x, y, r, i]) => canvas.fill_circle(c(x), c(y), c(r), ink(i)),
            (Opcode::DrawTriangle, &[x0, y0, x1, y1, x2, y2, i]) => {
                canvas.draw_triangle(c(x0), c(y0), c(x1), c(y1), c(x2), c(y2), ink(i));
            }
            (Opcode::FillTriangle, &[x0, y0, x1, y1, x2, y2, i]) => {
                canvas.fill_triangle(c(x0), c(y0), c(x1), c(y1), c(x2), c(y2), ink(i));
            }
            (Opcode::DrawRoundRect, &[x, y, w, h, r, i]) => {
                canvas.draw_round_rect(c(x), c(y), c(w), c(h), c(r), ink(i));
            }
            (Opcode::FillRoundRect, &[x, y, w, h, r, i]) => {
                canvas.fill_round_rect(c(x), c(y), c(w), c(h), c(r), ink(i));
            }
            (Opcode::DrawChar, &[x, y, code, fg, bg, size]) => {
                canvas.draw_char(c(x), c(y), code as u8, ink(fg), ink(bg), size as u8);
            }
            (Opcode::SetTextSize, &[sx, sy]) => {
                let sy = if sy < 0 { sx } else { sy };
                canvas.set_text_size(sx as u8, sy as u8);
            }
            (Opcode::SetCursor, &[x, y]) => canvas.set_cursor(c(x), c(y)),
            (Opcode::SetTextColor, &[i]) => canvas.set_text_color(ink(i)),
            (Opcode::SetTextWrap, &[w]) => canvas.set_text_wrap(w != 0),
            (opcode, args) => {
                log::warn!("malformed action {:?} with {} args", opcode, args.len());
            }
        }
    }
}
