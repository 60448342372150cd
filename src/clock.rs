use std::time::{Duration, Instant};

use crate::config::{Config, CLOCK_SPEED_STEP, MAX_CLOCK_SPEED, MIN_CLOCK_SPEED};

/// Don't try to catch up on more than this much lost time, e.g. after the
/// process was suspended.
const MAX_BACKLOG: Duration = Duration::from_secs(1);

/// How much work a driver owes the interpreter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Due {
    pub steps: u32,
    pub ticks: u32,
}

/// Turns wall-clock time into instruction steps and timer ticks.
///
/// Each kind of work accumulates elapsed time separately and pays it off in
/// whole periods, so running a little late just means running a few
/// periods at once.
#[derive(Debug)]
pub struct Clock {
    step_period: Duration,
    tick_period: Duration,
    step_backlog: Duration,
    tick_backlog: Duration,
    previous: Instant,
}

impl Clock {
    pub fn new(config: &Config) -> Self {
        Self {
            step_period: period(config.clock_speed),
            tick_period: period(config.timer_speed),
            step_backlog: Duration::ZERO,
            tick_backlog: Duration::ZERO,
            previous: Instant::now(),
        }
    }

    /// Instructions per second. Zero is treated as one.
    pub fn set_clock_speed(&mut self, hz: u32) {
        self.step_period = period(hz);
    }

    pub fn clock_speed(&self) -> u32 {
        (Duration::from_secs(1).as_nanos() / self.step_period.as_nanos()) as u32
    }

    /// Bump the clock speed up one step. Returns the new speed.
    pub fn faster(&mut self) -> u32 {
        let hz = self.clock_speed().saturating_add(CLOCK_SPEED_STEP);
        self.set_clock_speed(hz.clamp(MIN_CLOCK_SPEED, MAX_CLOCK_SPEED));
        self.clock_speed()
    }

    /// Bring the clock speed down one step. Returns the new speed.
    pub fn slower(&mut self) -> u32 {
        let hz = self.clock_speed().saturating_sub(CLOCK_SPEED_STEP);
        self.set_clock_speed(hz.clamp(MIN_CLOCK_SPEED, MAX_CLOCK_SPEED));
        self.clock_speed()
    }

    /// Forget any time that passed since the last poll, e.g. after a pause.
    pub fn restart(&mut self) {
        self.previous = Instant::now();
        self.step_backlog = Duration::ZERO;
        self.tick_backlog = Duration::ZERO;
    }

    /// Work due for the time since the previous call.
    pub fn poll(&mut self) -> Due {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.advance(elapsed)
    }

    /// Work due after another `elapsed` of wall-clock time.
    pub fn advance(&mut self, elapsed: Duration) -> Due {
        let steps = drain(&mut self.step_backlog, elapsed, self.step_period);
        let ticks = drain(&mut self.tick_backlog, elapsed, self.tick_period);
        Due { steps, ticks }
    }

    /// Time until at least one more step or tick is due.
    pub fn until_next(&self) -> Duration {
        let step = self.step_period.saturating_sub(self.step_backlog);
        let tick = self.tick_period.saturating_sub(self.tick_backlog);
        step.min(tick)
    }
}

/// Never zero, however high `hz` is.
fn period(hz: u32) -> Duration {
    (Duration::from_secs(1) / hz.max(1)).max(Duration::from_nanos(1))
}

fn drain(backlog: &mut Duration, elapsed: Duration, period: Duration) -> u32 {
    *backlog = (*backlog + elapsed).min(MAX_BACKLOG);

    let due = (backlog.as_nanos() / period.as_nanos()) as u32;
    *backlog -= period * due;
    due
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(clock_speed: u32) -> Clock {
        Clock::new(&Config {
            clock_speed,
            ..Config::default()
        })
    }

    #[test]
    fn pays_whole_periods() {
        let mut clock = clock(500);
        assert_eq!(clock.advance(Duration::from_millis(1)), Due::default());
        assert_eq!(
            clock.advance(Duration::from_millis(1)),
            Due { steps: 1, ticks: 0 }
        );
        assert_eq!(
            clock.advance(Duration::from_millis(17)),
            Due { steps: 8, ticks: 1 }
        );
    }

    #[test]
    fn one_second() {
        let mut clock = clock(700);
        let due = clock.advance(Duration::from_secs(1));
        assert_eq!(due, Due { steps: 700, ticks: 60 });
    }

    #[test]
    fn backlog_is_capped() {
        let mut clock = clock(100);
        let due = clock.advance(Duration::from_secs(3600));
        assert_eq!(due, Due { steps: 100, ticks: 60 });
    }

    #[test]
    fn speed_can_change() {
        let mut clock = clock(500);
        clock.set_clock_speed(1000);
        assert_eq!(clock.clock_speed(), 1000);
        assert_eq!(clock.advance(Duration::from_millis(5)).steps, 5);

        clock.set_clock_speed(0);
        assert_eq!(clock.clock_speed(), 1);
    }

    #[test]
    fn huge_clock_speed() {
        let mut clock = clock(2_000_000_000);
        assert_eq!(clock.clock_speed(), 1_000_000_000);
        let due = clock.advance(Duration::from_millis(1));
        assert_eq!(due.steps, 1_000_000);
        assert!(clock.until_next() <= Duration::from_nanos(1));
    }

    #[test]
    fn faster_and_slower() {
        let mut clock = clock(500);
        assert_eq!(clock.faster(), 550);
        assert_eq!(clock.slower(), 500);
        assert_eq!(clock.advance(Duration::from_millis(10)).steps, 5);

        let mut clock = self::clock(MIN_CLOCK_SPEED + 1);
        assert_eq!(clock.slower(), MIN_CLOCK_SPEED);
        assert_eq!(clock.slower(), MIN_CLOCK_SPEED);

        let mut clock = self::clock(MAX_CLOCK_SPEED);
        assert_eq!(clock.faster(), MAX_CLOCK_SPEED);
    }

    #[test]
    fn until_next_shrinks() {
        let mut clock = clock(100);
        assert_eq!(clock.until_next(), Duration::from_millis(10));
        clock.advance(Duration::from_millis(4));
        assert_eq!(clock.until_next(), Duration::from_millis(6));
    }
}
