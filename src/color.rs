//! Colour model of the command set
//!
//! Drawing commands do not carry colours. They carry an [`Ink`] flag that
//! selects one of two palette entries, the foreground or the background
//! colour, which are themselves set with `setFgColor` / `setBgColor`.
//!
//! ## RGB565
//!
//! Palette colours are stored in the panel's 16-bit format:
//!
//! ```text
//! MSB rrrr.rggg gggb.bbbb LSB
//! ```
//!
//! ## Example
//!
//! ```
//! use serial_tft::color::{rgb565, Ink, Palette};
//!
//! assert_eq!(rgb565(255, 0, 0), 0xF800);
//!
//! let palette = Palette::default();
//! assert_eq!(palette.resolve(Ink::Foreground), 0xFFFF);
//! assert_eq!(palette.resolve(Ink::from_flag(0)), 0x0000);
//! ```

/// Which palette entry a drawing command uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ink {
    /// Current foreground colour
    #[default]
    Foreground,
    /// Current background colour
    Background,
}

impl Ink {
    /// Ink for a wire colour flag (non-zero is foreground)
    pub const fn from_flag(flag: i32) -> Self {
        if flag != 0 {
            Self::Foreground
        } else {
            Self::Background
        }
    }
}

/// White in RGB565
pub const WHITE: u16 = 0xFFFF;
/// Black in RGB565
pub const BLACK: u16 = 0x0000;

/// Pack an 8-bit-per-channel colour into RGB565, truncating low bits
pub const fn rgb565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r >> 3) as u16;
    let g6 = (g >> 2) as u16;
    let b5 = (b >> 3) as u16;
    (r5 << 11) | (g6 << 5) | b5
}

/// Foreground and background colours
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Foreground colour (RGB565)
    pub fg: u16,
    /// Background colour (RGB565)
    pub bg: u16,
}

impl Default for Palette {
    fn default() -> Self {
        Self { fg: WHITE, bg: BLACK }
    }
}

impl Palette {
    /// Colour selected by `ink`
    pub const fn resolve(&self, ink: Ink) -> u16 {
        match ink {
            Ink::Foreground => self.fg,
            Ink::Background => self.bg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_primaries() {
        assert_eq!(rgb565(255, 255, 255), 0xFFFF);
        assert_eq!(rgb565(255, 0, 0), 0xF800);
        assert_eq!(rgb565(0, 255, 0), 0x07E0);
        assert_eq!(rgb565(0, 0, 255), 0x001F);
    }

    #[test]
    fn test_rgb565_truncates_low_bits() {
        assert_eq!(rgb565(255 - 7, 255 - 3, 255 - 7), 0xFFFF);
        assert_eq!(rgb565(255 - 8, 255 - 4, 255 - 8), 0xF7DE);
        assert_eq!(rgb565(8, 4, 8), 0x0821);
        assert_eq!(rgb565(8 + 7, 4 + 3, 8 + 7), 0x0821);
        assert_eq!(rgb565(7, 3, 7), 0x0000);
    }

    #[test]
    fn test_rgb565_lowest_step_per_channel() {
        assert_eq!(rgb565(8, 0, 0), 0x0800);
        assert_eq!(rgb565(0, 4, 0), 0x0020);
        assert_eq!(rgb565(0, 0, 8), 0x0001);
    }

    #[test]
    fn test_ink_from_flag() {
        assert_eq!(Ink::from_flag(1), Ink::Foreground);
        assert_eq!(Ink::from_flag(-3), Ink::Foreground);
        assert_eq!(Ink::from_flag(0), Ink::Background);
    }
}
