//! Elapsed-time sources.
//!
//! A [`Timer`] reports the seconds elapsed since it was created or last
//! reset. Readings never decrease between resets.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;

/// Monotonic elapsed-time source.
pub trait Timer: Send + Sync {
    /// Rebases the start instant to now.
    fn reset(&self);

    /// Returns the seconds elapsed since construction or the last reset.
    fn elapsed(&self) -> f64;
}

/// Timer backed by the monotonic clock.
///
/// Uses `tokio::time::Instant`, so a paused tokio clock drives it in tests.
#[derive(Debug)]
pub struct ChronoTimer {
    start: Mutex<Instant>,
}

impl ChronoTimer {
    /// Creates a timer starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Mutex::new(Instant::now()),
        }
    }
}

impl Default for ChronoTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ChronoTimer {
    fn reset(&self) {
        *lock(&self.start) = Instant::now();
    }

    fn elapsed(&self) -> f64 {
        lock(&self.start).elapsed().as_secs_f64()
    }
}

/// Timer whose clock is advanced by hand.
#[derive(Debug, Default)]
pub struct ManualTimer {
    clock: Mutex<ManualClock>,
}

#[derive(Debug, Default, Clone, Copy)]
struct ManualClock {
    now: f64,
    start: f64,
}

impl ManualTimer {
    /// Creates a timer reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `seconds`. Negative or NaN steps are
    /// ignored so that readings never go backwards.
    pub fn advance(&self, seconds: f64) {
        if seconds > 0.0 {
            lock(&self.clock).now += seconds;
        }
    }

    /// Sets the absolute clock reading. Values behind the current reading
    /// are ignored.
    pub fn set_now(&self, seconds: f64) {
        let mut clock = lock(&self.clock);
        if seconds > clock.now {
            clock.now = seconds;
        }
    }
}

impl Timer for ManualTimer {
    fn reset(&self) {
        let mut clock = lock(&self.clock);
        clock.start = clock.now;
    }

    fn elapsed(&self) -> f64 {
        let clock = lock(&self.clock);
        clock.now - clock.start
    }
}

/// Available timer implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerType {
    /// [`ChronoTimer`].
    #[default]
    Chrono,
    /// [`ManualTimer`].
    Manual,
}

impl TimerType {
    /// Returns the identifier of this timer type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chrono => "chrono",
            Self::Manual => "manual",
        }
    }
}

impl std::fmt::Display for TimerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chrono" => Ok(Self::Chrono),
            "manual" => Ok(Self::Manual),
            other => Err(format!("unknown timer type '{other}'")),
        }
    }
}

/// Creates a timer of the given type.
#[must_use]
pub fn create_timer(kind: TimerType) -> Box<dyn Timer> {
    match kind {
        TimerType::Chrono => Box::new(ChronoTimer::new()),
        TimerType::Manual => Box::new(ManualTimer::new()),
    }
}

// Timer state is plain data; a panic while holding the lock cannot leave it
// half-written.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_manual_timer_starts_at_zero() {
        let timer = ManualTimer::new();
        assert!(timer.elapsed().abs() < f64::EPSILON);
    }

    #[test]
    fn test_manual_timer_advance_and_reset() {
        let timer = ManualTimer::new();
        timer.advance(1.5);
        assert!((timer.elapsed() - 1.5).abs() < f64::EPSILON);

        timer.reset();
        assert!(timer.elapsed().abs() < f64::EPSILON);

        timer.advance(0.25);
        assert!((timer.elapsed() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_manual_timer_never_goes_backwards() {
        let timer = ManualTimer::new();
        timer.set_now(3.0);
        timer.set_now(1.0);
        timer.advance(-2.0);
        timer.advance(f64::NAN);
        assert!((timer.elapsed() - 3.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chrono_timer_follows_clock() {
        let timer = ChronoTimer::new();
        tokio::time::advance(Duration::from_millis(1500)).await;
        assert!((timer.elapsed() - 1.5).abs() < 1e-6);

        timer.reset();
        assert!(timer.elapsed() < 1e-6);

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!((timer.elapsed() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_chrono_timer_is_monotonic() {
        let timer = ChronoTimer::new();
        let mut previous = timer.elapsed();
        for _ in 0..1000 {
            let now = timer.elapsed();
            assert!(now >= previous);
            assert!(now >= 0.0);
            previous = now;
        }
    }

    #[test]
    fn test_chrono_timer_real_clock() {
        let timer = ChronoTimer::new();
        std::thread::sleep(Duration::from_millis(20));
        assert!(timer.elapsed() >= 0.02);
    }

    #[test]
    fn test_timer_type_round_trip() {
        for kind in [TimerType::Chrono, TimerType::Manual] {
            assert_eq!(kind.as_str().parse::<TimerType>().unwrap(), kind);
        }
        assert!("wallclock".parse::<TimerType>().is_err());
    }

    #[test]
    fn test_create_timer() {
        let timer = create_timer(TimerType::Manual);
        assert!(timer.elapsed().abs() < f64::EPSILON);
        timer.reset();

        let timer = create_timer(TimerType::Chrono);
        assert!(timer.elapsed() >= 0.0);
    }
}
