//! Coordinate rotation utilities
//!
//! Drawing commands use logical coordinates, relative to the current
//! orientation chosen with `setRotation`. The panel itself is addressed in its
//! native orientation. This module maps one onto the other.
//!
//! ## Rotation Modes
//!
//! - **Rotate0**: Native orientation
//! - **Rotate90**: 90° clockwise, width and height swapped
//! - **Rotate180**: 180° rotation, origin at bottom-right
//! - **Rotate270**: 270° clockwise (or 90° counter-clockwise)
//!
//! ## Example
//!
//! ```
//! use serial_tft::{rotation::apply_rotation, Rotation};
//!
//! // 240x135 panel at native orientation: logical equals physical
//! assert_eq!(apply_rotation(10, 20, 240, 135, Rotation::Rotate0), (10, 20));
//!
//! // Upside down: the origin lands in the bottom-right corner
//! assert_eq!(apply_rotation(0, 0, 240, 135, Rotation::Rotate180), (239, 134));
//! ```

use crate::config::Rotation;

/// Map a logical point to native panel coordinates
///
/// # Arguments
///
/// * `x` - Logical X coordinate (column)
/// * `y` - Logical Y coordinate (row)
/// * `width` - Native panel width in pixels
/// * `height` - Native panel height in pixels
/// * `rotation` - Current orientation
///
/// Points outside the logical area map outside the native area; callers clip
/// afterwards.
pub fn apply_rotation(x: i32, y: i32, width: u32, height: u32, rotation: Rotation) -> (i32, i32) {
    let w = width as i32;
    let h = height as i32;
    match rotation {
        Rotation::Rotate0 => (x, y),
        Rotation::Rotate90 => (w - 1 - y, x),
        Rotation::Rotate180 => (w - 1 - x, h - 1 - y),
        Rotation::Rotate270 => (y, h - 1 - x),
    }
}

/// Logical size of a `width` x `height` panel under `rotation`
pub fn rotated_size(width: u32, height: u32, rotation: Rotation) -> (u32, u32) {
    if rotation.is_transposed() {
        (height, width)
    } else {
        (width, height)
    }
}
