//! Batched drawing
//!
//! With batching enabled, drawing commands are held in a bounded FIFO and
//! applied together on `display`, so a host can build a whole frame before any
//! of it becomes visible. With batching disabled, every action is applied as
//! soon as it is added.
//!
//! A full queue never drops work: the pending actions are applied first and
//! the new one starts the next batch.
//!
//! ## Example
//!
//! ```
//! use serial_tft::action::{Action, Opcode};
//! use serial_tft::transaction::Transaction;
//! # use serial_tft::{Canvas, Ink, Rotation, TextBounds};
//! # #[derive(Default)]
//! # struct Counter(usize);
//! # impl Canvas for Counter {
//! #     fn reset(&mut self) {}
//! #     fn clear(&mut self) {}
//! #     fn print(&mut self, _: &str) {}
//! #     fn set_cursor(&mut self, _: i16, _: i16) {}
//! #     fn set_fg_color(&mut self, _: u8, _: u8, _: u8) {}
//! #     fn set_bg_color(&mut self, _: u8, _: u8, _: u8) {}
//! #     fn draw_pixel(&mut self, _: i16, _: i16, _: Ink) { self.0 += 1; }
//! #     fn set_rotation(&mut self, _: Rotation) {}
//! #     fn invert(&mut self, _: bool) {}
//! #     fn draw_fast_vline(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_fast_hline(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_screen(&mut self, _: Ink) {}
//! #     fn draw_line(&mut self, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_circle(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_circle(&mut self, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_triangle(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_triangle(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_round_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn fill_round_rect(&mut self, _: i16, _: i16, _: i16, _: i16, _: i16, _: Ink) {}
//! #     fn draw_char(&mut self, _: i16, _: i16, _: u8, _: Ink, _: Ink, _: u8) {}
//! #     fn set_text_size(&mut self, _: u8, _: u8) {}
//! #     fn set_text_color(&mut self, _: Ink) {}
//! #     fn set_text_wrap(&mut self, _: bool) {}
//! #     fn text_bounds(&mut self, _: &str, x: i16, y: i16) -> TextBounds {
//! #         TextBounds { x, y, w: 0, h: 0 }
//! #     }
//! #     fn rotation(&self) -> Rotation { Rotation::Rotate0 }
//! #     fn cursor(&self) -> (i16, i16) { (0, 0) }
//! # }
//! let mut canvas = Counter::default();
//! let mut queue: Transaction<4> = Transaction::new();
//!
//! for x in 0..3 {
//!     if let Some(action) = Action::new(Opcode::DrawPixel, &[x, 0, 1]) {
//!         queue.add(action, &mut canvas);
//!     }
//! }
//! assert_eq!(canvas.0, 0);
//!
//! assert_eq!(queue.commit(&mut canvas), 3);
//! assert_eq!(canvas.0, 3);
//! ```

use heapless::Deque;

use crate::action::Action;
use crate::canvas::Canvas;

/// Default number of pending actions
pub const QUEUE_CAPACITY: usize = 1000;

/// Bounded FIFO of pending actions
#[derive(Debug)]
pub struct Transaction<const N: usize = QUEUE_CAPACITY> {
    queue: Deque<Action, N>,
    enabled: bool,
}

impl<const N: usize> Default for Transaction<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Transaction<N> {
    /// Empty queue with batching enabled
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            enabled: true,
        }
    }

    /// Queue `action`, or apply it right away when batching is off
    ///
    /// A full queue is committed before `action` is queued.
    pub fn add<V: Canvas>(&mut self, action: Action, canvas: &mut V) {
        if !self.enabled {
            action.apply(canvas);
            return;
        }

        if self.queue.is_full() {
            log::debug!("transaction full, committing {} actions", self.queue.len());
            self.commit(canvas);
        }

        // only fails for a zero-capacity queue
        if let Err(action) = self.queue.push_back(action) {
            action.apply(canvas);
        }
    }

    /// Apply every pending action in order, returning how many were applied
    pub fn commit<V: Canvas>(&mut self, canvas: &mut V) -> usize {
        let mut applied = 0;
        while let Some(action) = self.queue.pop_front() {
            action.apply(canvas);
            applied += 1;
        }
        if applied > 0 {
            log::info!("committed {} actions", applied);
        }
        applied
    }

    /// Drop every pending action without applying it
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Turn batching on or off
    ///
    /// Actions queued before batching was turned off stay pending until the
    /// next commit.
    pub fn enable(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether batching is on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of pending actions
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no action is pending
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of pending actions
    pub const fn capacity(&self) -> usize {
        N
    }
}
