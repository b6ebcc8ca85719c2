//! Blocking button protocols
//!
//! `waitButton`, `watchButtons` and `monitorButtons` hold the serial link
//! while they sample the buttons. Each one runs in steps of one tick and gives
//! up as soon as the host sends anything, so a client can always regain
//! control by writing a new command.
//!
//! Time comes from an injected [`Clock`] and sleeping from an injected
//! [`DelayNs`], so the protocols run against a virtual clock in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::InputPin;
use embedded_io::{ReadReady, Write};

use crate::button::{Buttons, Edge, Label};

/// Free-running millisecond counter
///
/// The counter may wrap; elapsed time is computed with wrapping arithmetic.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch
    fn now_ms(&mut self) -> u32;
}

/// Borrowed time, sleep and serial resources for one protocol run
pub struct Session<'a, C, D, S> {
    clock: &'a mut C,
    delay: &'a mut D,
    serial: &'a mut S,
    tick_ms: u32,
}

impl<'a, C, D, S> Session<'a, C, D, S>
where
    C: Clock,
    D: DelayNs,
    S: ReadReady + Write,
{
    /// Bundle the resources; `tick_ms` is the polling step
    pub fn new(clock: &'a mut C, delay: &'a mut D, serial: &'a mut S, tick_ms: u32) -> Self {
        Self {
            clock,
            delay,
            serial,
            tick_ms: tick_ms.max(1),
        }
    }

    fn now(&mut self) -> u32 {
        self.clock.now_ms()
    }

    fn input_pending(&mut self) -> bool {
        // an unreadable port counts as pending input
        self.serial.read_ready().unwrap_or(true)
    }

    fn tick(&mut self) {
        self.delay.delay_ms(self.tick_ms);
    }

    /// Whether a run started at `start` with limit `duration_ms` must stop
    ///
    /// A zero duration never expires.
    fn finished(&mut self, start: u32, duration_ms: u32) -> bool {
        let expired = duration_ms != 0 && self.now().wrapping_sub(start) >= duration_ms;
        expired || self.input_pending()
    }

    fn ticks_per(&self, interval_ms: u32) -> u32 {
        (interval_ms / self.tick_ms).max(1)
    }

    /// Wait until a button reports `edge`
    ///
    /// Pending edges are discarded first. Returns the first button, in label
    /// order, that reports the edge, or `None` once `timeout_ms` has elapsed
    /// or input is pending. The buttons are always sampled at least once.
    pub fn wait_for_edge<P: InputPin>(
        &mut self,
        buttons: &mut Buttons<P>,
        timeout_ms: u32,
        edge: Edge,
    ) -> Option<Label> {
        let start = self.now();
        buttons.flush(start);

        loop {
            let now = self.now();
            if let Some(label) = buttons.take_edge(edge, now) {
                log::debug!("{:?} edge on {}", edge, label);
                return Some(label);
            }
            self.tick();
            let elapsed = self.now().wrapping_sub(start);
            if elapsed >= timeout_ms || self.input_pending() {
                return None;
            }
        }
    }

    /// Stream the pressed labels every `interval_ms`
    ///
    /// Nothing is written for a sample with no button pressed. Sleeps at most
    /// one tick at a time, so intervals that are not a multiple of the tick
    /// are kept. Runs for `duration_ms` (zero means until input arrives).
    pub fn watch<P: InputPin>(
        &mut self,
        buttons: &mut Buttons<P>,
        duration_ms: u32,
        interval_ms: u32,
    ) -> Result<(), S::Error> {
        let start = self.now();
        let interval_ms = interval_ms.max(1);
        let mut last = start;
        self.write_levels(buttons, start)?;

        loop {
            let since = self.now().wrapping_sub(last);
            let nap = interval_ms.saturating_sub(since).clamp(1, self.tick_ms);
            self.delay.delay_ms(nap);
            if self.finished(start, duration_ms) {
                return Ok(());
            }

            let now = self.now();
            if now.wrapping_sub(last) >= interval_ms {
                last = now;
                self.write_levels(buttons, now)?;
            }
        }
    }

    fn write_levels<P: InputPin>(&mut self, buttons: &mut Buttons<P>, now: u32) -> Result<(), S::Error> {
        for label in buttons.levels(now).iter() {
            self.serial.write_all(&[label.as_char() as u8])?;
        }
        Ok(())
    }

    /// Report edges every tick and levels every `interval_ms`
    ///
    /// Writes `DOWN X` / `UP X` lines as edges happen and `PRESSED X` lines
    /// for every pressed button each interval. Runs for `duration_ms` (zero
    /// means until input arrives).
    pub fn monitor<P: InputPin>(
        &mut self,
        buttons: &mut Buttons<P>,
        duration_ms: u32,
        interval_ms: u32,
    ) -> Result<(), S::Error> {
        let start = self.now();
        let every = self.ticks_per(interval_ms);
        let mut counter: u32 = 0;

        loop {
            let now = self.now();
            for (label, edge) in buttons.edges(now).into_iter().flatten() {
                let prefix = match edge {
                    Edge::Down => "DOWN",
                    Edge::Up => "UP",
                };
                self.report(prefix, label)?;
            }

            if counter % every == 0 {
                for label in buttons.levels(now).iter() {
                    self.report("PRESSED", label)?;
                }
            }
            counter = counter.wrapping_add(1);

            self.tick();
            if self.finished(start, duration_ms) {
                return Ok(());
            }
        }
    }

    fn report(&mut self, prefix: &str, label: Label) -> Result<(), S::Error> {
        self.serial.write_all(prefix.as_bytes())?;
        self.serial.write_all(&[b' ', label.as_char() as u8])?;
        self.serial.write_all(b"\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Builder, Dimensions};
    use crate::testing::{MockClock, MockDelay, MockPin, MockSerial};

    struct Rig {
        clock: MockClock,
        delay: MockDelay,
        serial: MockSerial,
        pins: [MockPin; 3],
        buttons: Buttons<MockPin>,
    }

    fn rig() -> Rig {
        let clock = MockClock::at(5_000);
        let pins = [MockPin::new(true), MockPin::new(false), MockPin::new(false)];
        let config = Builder::new()
            .dimensions(Dimensions::new(240, 135).unwrap())
            .build()
            .unwrap();
        let mut buttons = Buttons::new(pins.clone(), &config);
        buttons.flush(clock.get());
        Rig {
            delay: MockDelay::new(clock.clone()),
            clock,
            serial: MockSerial::default(),
            pins,
            buttons,
        }
    }

    impl Rig {
        fn session(&mut self) -> (Session<'_, MockClock, MockDelay, MockSerial>, &mut Buttons<MockPin>) {
            (
                Session::new(&mut self.clock, &mut self.delay, &mut self.serial, 10),
                &mut self.buttons,
            )
        }
    }

    #[test]
    fn test_wait_times_out() {
        let mut rig = rig();
        let (mut session, buttons) = rig.session();
        assert_eq!(session.wait_for_edge(buttons, 1000, Edge::Up), None);
        assert_eq!(rig.delay.slept_ms, 1000);
    }

    #[test]
    fn test_wait_reports_down_edge() {
        let mut rig = rig();
        let b = rig.pins[1].clone();
        rig.delay.at(5_300, move || b.set_level(true));
        let (mut session, buttons) = rig.session();
        assert_eq!(session.wait_for_edge(buttons, 1000, Edge::Down), Some(Label::B));
        assert_eq!(rig.clock.get(), 5_300);
    }

    #[test]
    fn test_wait_ignores_edges_before_start() {
        let mut rig = rig();
        rig.pins[0].set_level(false);
        rig.buttons.levels(5_000);
        rig.clock.advance(200);
        let (mut session, buttons) = rig.session();
        assert_eq!(session.wait_for_edge(buttons, 50, Edge::Down), None);
    }

    #[test]
    fn test_wait_aborts_on_input() {
        let mut rig = rig();
        let serial = rig.serial.clone();
        rig.delay.at(5_100, move || serial.feed(b"x"));
        let (mut session, buttons) = rig.session();
        assert_eq!(session.wait_for_edge(buttons, 60_000, Edge::Down), None);
        assert_eq!(rig.delay.slept_ms, 100);
        assert_eq!(rig.serial.pending(), 1);
    }

    #[test]
    fn test_wait_zero_timeout_samples_once() {
        let mut rig = rig();
        let (mut session, buttons) = rig.session();
        assert_eq!(session.wait_for_edge(buttons, 0, Edge::Down), None);
        assert_eq!(rig.delay.slept_ms, 10);
    }

    #[test]
    fn test_watch_streams_levels() {
        let mut rig = rig();
        rig.pins[0].set_level(false);
        let (mut session, buttons) = rig.session();
        session.watch(buttons, 300, 100).unwrap();
        assert_eq!(rig.serial.output(), "AAA");
        assert_eq!(rig.delay.slept_ms, 300);
    }

    #[test]
    fn test_watch_keeps_interval_between_ticks() {
        let mut rig = rig();
        rig.pins[0].set_level(false);
        let (mut session, buttons) = rig.session();
        session.watch(buttons, 45, 15).unwrap();
        assert_eq!(rig.serial.output(), "AAA");
        assert_eq!(rig.delay.slept_ms, 45);
    }

    #[test]
    fn test_watch_silent_when_released() {
        let mut rig = rig();
        let (mut session, buttons) = rig.session();
        session.watch(buttons, 300, 100).unwrap();
        assert_eq!(rig.serial.output(), "");
    }

    #[test]
    fn test_watch_unbounded_until_input() {
        let mut rig = rig();
        rig.pins[2].set_level(true);
        rig.clock.advance(100);
        let serial = rig.serial.clone();
        rig.delay.at(5_550, move || serial.feed(b"readButtons\n"));
        let (mut session, buttons) = rig.session();
        session.watch(buttons, 0, 100).unwrap();
        assert_eq!(rig.serial.output(), "CCCCC");
        assert_eq!(rig.delay.slept_ms, 450);
    }

    #[test]
    fn test_monitor_reports_edges_and_levels() {
        let mut rig = rig();
        let a = rig.pins[0].clone();
        let a2 = a.clone();
        rig.delay.at(5_020, move || a.set_level(false));
        rig.delay.at(5_250, move || a2.set_level(true));
        let (mut session, buttons) = rig.session();
        session.monitor(buttons, 300, 100).unwrap();
        assert_eq!(
            rig.serial.output(),
            "DOWN A\r\nPRESSED A\r\nPRESSED A\r\nUP A\r\n"
        );
    }

    #[test]
    fn test_monitor_minimum_interval_is_one_tick() {
        let mut rig = rig();
        rig.pins[1].set_level(true);
        rig.clock.advance(100);
        rig.buttons.flush(5_100);
        let (mut session, buttons) = rig.session();
        session.monitor(buttons, 30, 1).unwrap();
        assert_eq!(
            rig.serial.output(),
            "PRESSED B\r\nPRESSED B\r\nPRESSED B\r\n"
        );
    }

    #[test]
    fn test_monitor_stops_on_input() {
        let mut rig = rig();
        let serial = rig.serial.clone();
        rig.delay.at(5_030, move || serial.feed(b"\n"));
        let (mut session, buttons) = rig.session();
        session.monitor(buttons, 0, 100).unwrap();
        assert_eq!(rig.delay.slept_ms, 30);
    }
}
