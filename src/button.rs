//! Debounced digital inputs
//!
//! Three push buttons labelled `A`, `B` and `C` sit on GPIOs with different
//! pull resistors, so the same electrical level means "pressed" on one and
//! "released" on another. Each input is sampled through a [`Debouncer`] and
//! normalized by its [`Polarity`] into a logical pressed state.
//!
//! ## Debouncing
//!
//! A level change is accepted as soon as it is seen. Further changes are then
//! ignored for the debounce window. Every accepted change sets a single
//! "changed" flag that is consumed by whichever edge query observes it first.
//!
//! ## Example
//!
//! ```
//! use serial_tft::button::{Label, Levels};
//!
//! let mut levels = Levels::default();
//! assert_eq!(levels.to_string(), "NONE");
//!
//! levels.insert(Label::C);
//! levels.insert(Label::A);
//! assert_eq!(levels.to_string(), "AC");
//! ```

use embedded_hal::digital::InputPin;

use crate::config::Config;

/// Electrical meaning of a low level on an input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Polarity {
    /// Low is pressed (pull-up, switch to ground)
    Normal,
    /// High is pressed (pull-down, switch to supply)
    Inverted,
}

/// Button label as reported over the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// First button
    A,
    /// Second button
    B,
    /// Third button
    C,
}

impl Label {
    /// All labels in report order
    pub const ALL: [Self; 3] = [Self::A, Self::B, Self::C];

    /// Wire character
    pub const fn as_char(self) -> char {
        match self {
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::A => 0b001,
            Self::B => 0b010,
            Self::C => 0b100,
        }
    }
}

impl core::fmt::Display for Label {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use core::fmt::Write;
        f.write_char(self.as_char())
    }
}

/// Logical transition of a button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    /// Released to pressed
    Down,
    /// Pressed to released
    Up,
}

/// Set of currently pressed buttons
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Levels(u8);

impl Levels {
    /// Mark `label` as pressed
    pub fn insert(&mut self, label: Label) {
        self.0 |= label.bit();
    }

    /// Whether `label` is pressed
    pub const fn contains(self, label: Label) -> bool {
        self.0 & label.bit() != 0
    }

    /// Whether no button is pressed
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Pressed labels in report order
    pub fn iter(self) -> impl Iterator<Item = Label> {
        Label::ALL.into_iter().filter(move |&l| self.contains(l))
    }
}

impl core::fmt::Display for Levels {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        for label in self.iter() {
            write!(f, "{label}")?;
        }
        Ok(())
    }
}

/// Debounced view of one input pin
///
/// Tracks the electrical level; low is the debouncer's "active" level. The
/// initial state is high, matching an idle pulled-up input.
#[derive(Debug)]
pub struct Debouncer<P> {
    pin: P,
    low: bool,
    ignore_until: Option<u32>,
    changed: bool,
    window_ms: u32,
}

impl<P: InputPin> Debouncer<P> {
    /// Wrap `pin` with a debounce window of `window_ms`
    pub fn new(pin: P, window_ms: u32) -> Self {
        Self {
            pin,
            low: false,
            ignore_until: None,
            changed: false,
            window_ms,
        }
    }

    /// Sample the pin and return the debounced level (true = low)
    pub fn read(&mut self, now: u32) -> bool {
        if let Some(until) = self.ignore_until {
            // wrapping compare: `now` is still inside the window
            if (now.wrapping_sub(until) as i32) < 0 {
                return self.low;
            }
            self.ignore_until = None;
        }

        match self.pin.is_low() {
            Ok(low) if low != self.low => {
                self.low = low;
                self.changed = true;
                self.ignore_until = Some(now.wrapping_add(self.window_ms));
            }
            Ok(_) => {}
            Err(e) => log::warn!("input pin read failed: {e:?}"),
        }
        self.low
    }

    /// Consume the changed flag
    pub fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}

/// One labelled button: debouncer plus polarity
#[derive(Debug)]
pub struct Channel<P> {
    debouncer: Debouncer<P>,
    polarity: Polarity,
    label: Label,
}

impl<P: InputPin> Channel<P> {
    /// Create a channel
    pub fn new(pin: P, label: Label, polarity: Polarity, debounce_ms: u32) -> Self {
        Self {
            debouncer: Debouncer::new(pin, debounce_ms),
            polarity,
            label,
        }
    }

    /// Wire label
    pub fn label(&self) -> Label {
        self.label
    }

    /// Whether the button is logically pressed
    pub fn pressed(&mut self, now: u32) -> bool {
        let low = self.debouncer.read(now);
        match self.polarity {
            Polarity::Normal => low,
            Polarity::Inverted => !low,
        }
    }

    /// True once after the button went down
    pub fn down_event(&mut self, now: u32) -> bool {
        self.pressed(now) && self.debouncer.take_changed()
    }

    /// True once after the button went up
    pub fn up_event(&mut self, now: u32) -> bool {
        !self.pressed(now) && self.debouncer.take_changed()
    }

    /// Pending edge, if any; consumes it
    pub fn poll_edge(&mut self, now: u32) -> Option<Edge> {
        let pressed = self.pressed(now);
        if !self.debouncer.take_changed() {
            return None;
        }
        Some(if pressed { Edge::Down } else { Edge::Up })
    }

    fn take_edge(&mut self, edge: Edge, now: u32) -> bool {
        match edge {
            Edge::Down => self.down_event(now),
            Edge::Up => self.up_event(now),
        }
    }
}

/// The three buttons, in label order
#[derive(Debug)]
pub struct Buttons<P> {
    channels: [Channel<P>; 3],
}

impl<P: InputPin> Buttons<P> {
    /// Create the buttons from their pins, in label order
    pub fn new(pins: [P; 3], config: &Config) -> Self {
        let [a, b, c] = pins;
        let [pa, pb, pc] = config.polarities;
        let debounce = config.debounce_ms;
        Self {
            channels: [
                Channel::new(a, Label::A, pa, debounce),
                Channel::new(b, Label::B, pb, debounce),
                Channel::new(c, Label::C, pc, debounce),
            ],
        }
    }

    /// Discard every pending edge
    pub fn flush(&mut self, now: u32) {
        for channel in &mut self.channels {
            channel.up_event(now);
            channel.down_event(now);
        }
    }

    /// Currently pressed buttons
    pub fn levels(&mut self, now: u32) -> Levels {
        let mut levels = Levels::default();
        for channel in &mut self.channels {
            if channel.pressed(now) {
                levels.insert(channel.label());
            }
        }
        levels
    }

    /// First button, in label order, reporting `edge`; consumes that edge
    pub fn take_edge(&mut self, edge: Edge, now: u32) -> Option<Label> {
        self.channels
            .iter_mut()
            .find_map(|channel| channel.take_edge(edge, now).then(|| channel.label()))
    }

    /// Pending edges of every button, in label order
    pub fn edges(&mut self, now: u32) -> [Option<(Label, Edge)>; 3] {
        let mut out = [None; 3];
        for (slot, channel) in out.iter_mut().zip(&mut self.channels) {
            *slot = channel.poll_edge(now).map(|edge| (channel.label(), edge));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use crate::testing::MockPin;
    use alloc::string::ToString;

    fn buttons(pins: [MockPin; 3]) -> Buttons<MockPin> {
        let config = Builder::new()
            .dimensions(Dimensions::new(240, 135).unwrap())
            .build()
            .unwrap();
        Buttons::new(pins, &config)
    }

    #[test]
    fn test_levels_display() {
        let mut levels = Levels::default();
        assert_eq!(levels.to_string(), "NONE");
        levels.insert(Label::B);
        assert_eq!(levels.to_string(), "B");
        levels.insert(Label::A);
        levels.insert(Label::C);
        assert_eq!(levels.to_string(), "ABC");
    }

    #[test]
    fn test_normal_polarity() {
        let pin = MockPin::new(true);
        let mut channel = Channel::new(pin.clone(), Label::A, Polarity::Normal, 100);
        assert!(!channel.pressed(0));
        pin.set_level(false);
        assert!(channel.pressed(200));
    }

    #[test]
    fn test_inverted_polarity() {
        // pulled down: released reads low
        let pin = MockPin::new(false);
        let mut channel = Channel::new(pin.clone(), Label::B, Polarity::Inverted, 100);
        assert!(!channel.pressed(0));
        pin.set_level(true);
        assert!(channel.pressed(200));
    }

    #[test]
    fn test_inverted_initial_state_is_flushed() {
        let pins = [MockPin::new(true), MockPin::new(false), MockPin::new(false)];
        let mut buttons = buttons(pins);
        buttons.flush(0);
        assert_eq!(buttons.take_edge(Edge::Down, 1), None);
        assert_eq!(buttons.take_edge(Edge::Up, 1), None);
        assert!(buttons.levels(2).is_empty());
    }

    #[test]
    fn test_down_event_is_destructive() {
        let pin = MockPin::new(true);
        let mut channel = Channel::new(pin.clone(), Label::A, Polarity::Normal, 100);
        assert!(!channel.down_event(0));
        pin.set_level(false);
        assert!(channel.down_event(10));
        assert!(!channel.down_event(11));
        assert!(!channel.up_event(12));
    }

    #[test]
    fn test_debounce_window_ignores_bounce() {
        let pin = MockPin::new(true);
        let mut channel = Channel::new(pin.clone(), Label::A, Polarity::Normal, 100);
        pin.set_level(false);
        assert_eq!(channel.poll_edge(1000), Some(Edge::Down));

        pin.set_level(true);
        assert!(channel.pressed(1050));
        assert_eq!(channel.poll_edge(1060), None);

        assert!(!channel.pressed(1100));
        assert_eq!(channel.poll_edge(1101), Some(Edge::Up));
    }

    #[test]
    fn test_debounce_window_wraps() {
        let pin = MockPin::new(true);
        let mut channel = Channel::new(pin.clone(), Label::A, Polarity::Normal, 100);
        pin.set_level(false);
        assert!(channel.pressed(u32::MAX - 10));
        pin.set_level(true);
        assert!(channel.pressed(20));
        assert!(!channel.pressed(90));
    }

    #[test]
    fn test_pin_error_keeps_level() {
        let pin = MockPin::new(false);
        let mut channel = Channel::new(pin.clone(), Label::A, Polarity::Normal, 0);
        assert!(channel.pressed(0));
        pin.fail(true);
        assert!(channel.pressed(10));
        pin.fail(false);
        pin.set_level(true);
        assert!(!channel.pressed(20));
    }

    #[test]
    fn test_take_edge_label_order() {
        let pins = [MockPin::new(true), MockPin::new(false), MockPin::new(false)];
        let handles = pins.clone();
        let mut buttons = buttons(pins);
        buttons.flush(0);

        handles[2].set_level(true);
        handles[1].set_level(true);
        assert_eq!(buttons.take_edge(Edge::Down, 110), Some(Label::B));
        assert_eq!(buttons.take_edge(Edge::Down, 111), Some(Label::C));
        assert_eq!(buttons.take_edge(Edge::Down, 112), None);

        let levels = buttons.levels(113);
        assert_eq!(levels.to_string(), "BC");
    }

    #[test]
    fn test_edges_reports_each_channel() {
        let pins = [MockPin::new(true), MockPin::new(false), MockPin::new(false)];
        let handles = pins.clone();
        let mut buttons = buttons(pins);
        buttons.flush(0);

        handles[0].set_level(false);
        assert_eq!(
            buttons.edges(10),
            [Some((Label::A, Edge::Down)), None, None]
        );
        handles[0].set_level(true);
        assert_eq!(
            buttons.edges(200),
            [Some((Label::A, Edge::Up)), None, None]
        );
        assert_eq!(buttons.edges(201), [None, None, None]);
    }
}
