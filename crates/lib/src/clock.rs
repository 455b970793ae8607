//! Time provider abstraction
//!
//! This module provides a [`Clock`] trait that abstracts over time sources,
//! allowing production code to use real system time while tests can use
//! controllable mock time.
//!
//! Besides the current instant, a clock also knows the local UTC offset: entry
//! keys are "seconds since local midnight", and "today" is a local day.
//!
//! # Example
//!
//! ```
//! use journo::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let millis = clock.now_millis();
//! let today = clock.today();
//! assert!(millis > 0);
//! assert_eq!(today.to_string().len(), 10);
//! ```

use std::fmt::Debug;

use chrono::{DateTime, FixedOffset, Local, NaiveTime, TimeZone, Utc};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

use crate::stamp::Stamp;

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> i64;

    /// The local offset from UTC right now.
    fn offset(&self) -> FixedOffset;

    /// The local offset in effect at the start of `day`. Differs from
    /// [`Clock::offset`] when `day` falls on the other side of a
    /// daylight saving change.
    fn offset_on(&self, _day: Stamp) -> FixedOffset {
        self.offset()
    }

    /// Current local date and time.
    fn now_local(&self) -> DateTime<FixedOffset> {
        DateTime::<Utc>::from_timestamp_millis(self.now_millis())
            .unwrap_or_default()
            .with_timezone(&self.offset())
    }

    /// The current local day.
    fn today(&self) -> Stamp {
        Stamp::from(self.now_local().date_naive())
    }
}

/// Production clock using real system time and the machine's local offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn offset(&self) -> FixedOffset {
        *Local::now().offset()
    }

    fn offset_on(&self, day: Stamp) -> FixedOffset {
        let midnight = day.date().and_time(NaiveTime::MIN);
        Local
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| *local.offset())
            .unwrap_or_else(|| self.offset())
    }
}

/// Test clock with auto-advancing time.
///
/// This clock auto-advances by one millisecond on each `now_millis()` call,
/// providing monotonically increasing timestamps. Use `hold()` to
/// temporarily freeze it. The offset defaults to UTC so tests do not depend
/// on the machine's time zone.
///
/// ```
/// use journo::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// let t1 = clock.now_millis();
/// let t2 = clock.now_millis();
/// assert!(t2 > t1);
///
/// {
///     let _hold = clock.hold();
///     assert_eq!(clock.now_millis(), clock.now_millis());
/// }
/// ```
#[cfg(any(test, feature = "testing"))]
pub struct FixedClock {
    state: Mutex<FixedClockState>,
}

#[cfg(any(test, feature = "testing"))]
struct FixedClockState {
    millis: i64,
    held: bool,
    offset: FixedOffset,
    day_offsets: Vec<(Stamp, FixedOffset)>,
}

/// RAII guard that freezes a [`FixedClock`] while held.
#[cfg(any(test, feature = "testing"))]
pub struct ClockHold<'a>(&'a FixedClock);

#[cfg(any(test, feature = "testing"))]
impl Drop for ClockHold<'_> {
    fn drop(&mut self) {
        self.0.state.lock().unwrap().held = false;
    }
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a new fixed clock at `millis`, in UTC.
    pub fn new(millis: i64) -> Self {
        Self {
            state: Mutex::new(FixedClockState {
                millis,
                held: false,
                offset: FixedOffset::east_opt(0).expect("zero offset is valid"),
                day_offsets: Vec::new(),
            }),
        }
    }

    /// Create a clock positioned at `hour:minute:second` local time on `day`.
    pub fn at(day: Stamp, hour: u32, minute: u32, second: u32) -> Self {
        let clock = Self::new(0);
        let offset = clock.offset();
        clock.set(day.midnight_millis(offset) + ((hour * 3600 + minute * 60 + second) as i64) * 1000);
        clock
    }

    /// Use a different local offset (in seconds east of UTC).
    pub fn with_offset_secs(self, secs: i32) -> Self {
        if let Some(offset) = FixedOffset::east_opt(secs) {
            self.state.lock().unwrap().offset = offset;
        }
        self
    }

    /// Use a different offset (in seconds east of UTC) for `day` only, as
    /// if a daylight saving change lay between it and now.
    pub fn with_offset_on(self, day: Stamp, secs: i32) -> Self {
        if let Some(offset) = FixedOffset::east_opt(secs) {
            self.state.lock().unwrap().day_offsets.push((day, offset));
        }
        self
    }

    /// Hold the clock, preventing auto-advance until the guard is dropped.
    pub fn hold(&self) -> ClockHold<'_> {
        self.state.lock().unwrap().held = true;
        ClockHold(self)
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: i64) {
        self.state.lock().unwrap().millis += ms;
    }

    /// Set the clock to a specific time in milliseconds.
    pub fn set(&self, ms: i64) {
        self.state.lock().unwrap().millis = ms;
    }

    /// Get the current time without advancing (even if not held).
    pub fn get(&self) -> i64 {
        self.state.lock().unwrap().millis
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        let mut state = self.state.lock().unwrap();
        if state.held {
            state.millis
        } else {
            let t = state.millis;
            state.millis += 1;
            t
        }
    }

    fn offset(&self) -> FixedOffset {
        self.state.lock().unwrap().offset
    }

    fn offset_on(&self, day: Stamp) -> FixedOffset {
        let state = self.state.lock().unwrap();
        state
            .day_offsets
            .iter()
            .find(|(d, _)| *d == day)
            .map_or(state.offset, |(_, offset)| *offset)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200_000)
    }
}

#[cfg(any(test, feature = "testing"))]
impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap();
        f.debug_struct("FixedClock")
            .field("millis", &state.millis)
            .field("held", &state.held)
            .field("offset", &state.offset)
            .finish()
    }
}
