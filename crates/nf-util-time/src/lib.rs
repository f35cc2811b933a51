//! Timestamps with nanosecond resolution.
//!
//! Filesystem times are reported as whole seconds since the UNIX epoch plus a
//! sub-second remainder in nanoseconds.  Freshness checks compare the seconds
//! first and only use the nanoseconds as a tie-break, which is exactly the
//! ordering of [`Timestamp`].

#![cfg_attr(not(feature = "std"), no_std)]

use core::fmt;

/// Seconds since the UNIX epoch.
pub type Time = i64;

/// Nanoseconds in one second.
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// A point in time as (seconds, nanoseconds) since the UNIX epoch.
///
/// The nanoseconds are always in `0..NANOS_PER_SEC`.  The derived ordering
/// compares the seconds before the nanoseconds.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    secs: Time,
    nanos: u32,
}

impl Timestamp {
    pub const EPOCH: Timestamp = Timestamp { secs: 0, nanos: 0 };

    /// Build a timestamp. Returns `None` if `nanos` is out of range.
    pub const fn new(secs: Time, nanos: u32) -> Option<Self> {
        if nanos >= NANOS_PER_SEC {
            return None;
        }
        Some(Self { secs, nanos })
    }

    /// Build a timestamp from a possibly denormalized `timespec`-like pair.
    ///
    /// Carries whole seconds out of `nsec`, so negative remainders borrow from
    /// the seconds.
    pub const fn normalized(secs: Time, nsec: i64) -> Self {
        let per_sec = NANOS_PER_SEC as i64;
        Self {
            secs: secs + nsec.div_euclid(per_sec),
            nanos: nsec.rem_euclid(per_sec) as u32,
        }
    }

    /// Whole seconds since the epoch.
    pub const fn secs(&self) -> Time {
        self.secs
    }

    /// Sub-second part in nanoseconds.
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Total nanoseconds since the epoch.
    pub const fn as_nanos(&self) -> i128 {
        self.secs as i128 * NANOS_PER_SEC as i128 + self.nanos as i128
    }

    /// Inverse of [`Timestamp::as_nanos`].  Saturates outside the `Time` range.
    pub fn from_nanos(nanos: i128) -> Self {
        let per_sec = NANOS_PER_SEC as i128;
        let secs = nanos.div_euclid(per_sec).clamp(Time::MIN as i128, Time::MAX as i128);
        Self {
            secs: secs as Time,
            nanos: nanos.rem_euclid(per_sec) as u32,
        }
    }

    /// Two-phase freshness check: seconds decide, nanoseconds break ties.
    pub fn is_newer_than(&self, other: &Timestamp) -> bool {
        if self.secs != other.secs {
            return self.secs > other.secs;
        }
        self.nanos > other.nanos
    }

    /// The calendar date in UTC.
    pub fn date(&self) -> DateTime {
        ts2date(self.secs)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "{}.{:09}", self.secs, self.nanos)
    }
}

#[cfg(feature = "std")]
impl From<std::time::SystemTime> for Timestamp {
    fn from(time: std::time::SystemTime) -> Self {
        match time.duration_since(std::time::UNIX_EPOCH) {
            Ok(d) => Self::from_nanos(d.as_nanos() as i128),
            Err(e) => Self::from_nanos(-(e.duration().as_nanos() as i128)),
        }
    }
}

#[cfg(feature = "std")]
impl From<Timestamp> for std::time::SystemTime {
    fn from(ts: Timestamp) -> Self {
        let since = std::time::Duration::new(ts.secs.unsigned_abs(), 0);
        let base = if ts.secs >= 0 {
            std::time::UNIX_EPOCH + since
        } else {
            std::time::UNIX_EPOCH - since
        };
        base + std::time::Duration::from_nanos(ts.nanos as u64)
    }
}

/// Broken-down UTC calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: i64,
    /// 1..=12
    pub month: u32,
    /// 1..=31
    pub mday: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl fmt::Display for DateTime {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            fmt,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.mday, self.hour, self.minute, self.second
        )
    }
}

///Is the given year a leap year?
pub fn is_leap(year: u32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Timestamp from date components.
///
/// mday in range 1..=31
/// month in range 1..=12
pub fn date2ts(mday: u32, month: u32, year: u32) -> Time {
    let days_per_month = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    let mut day_in_year = days_per_month[core::cmp::max(month as usize, 1) - 1] + mday as i32 - 1;
    if is_leap(year) && month < 3 {
        day_in_year -= 1
    };
    let year = year as Time;
    let days = day_in_year as Time + year * 365 + year / 4 - year / 100 + year / 400 - 719527;
    days * 24 * 60 * 60
}

/// Split seconds since the epoch into UTC calendar components.
///
/// Works on a proleptic gregorian calendar with eras of 400 years starting
/// on the first of March, so leap days end up at the end of an era-year.
pub fn ts2date(ts: Time) -> DateTime {
    let days = ts.div_euclid(86400);
    let rest = ts.rem_euclid(86400) as u32;

    let z = days + 719468;
    let era = z.div_euclid(146097);
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let mday = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + (month <= 2) as Time;

    DateTime {
        year,
        month,
        mday,
        hour: rest / 3600,
        minute: rest / 60 % 60,
        second: rest % 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const DAYS_PER_MONTH_LEAP: [u32; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

    #[test]
    fn test_zero() {
        assert_eq!(0, date2ts(1, 1, 1970));
        assert_eq!(
            DateTime { year: 1970, month: 1, mday: 1, hour: 0, minute: 0, second: 0 },
            ts2date(0)
        );
    }

    #[test]
    fn test_before_epoch() {
        let d = ts2date(-1);
        assert_eq!((1969, 12, 31, 23, 59, 59), (d.year, d.month, d.mday, d.hour, d.minute, d.second));
    }

    #[test]
    fn test_calendar_inverse() {
        for year in 1850..2120 {
            for month in 1..=12 {
                for day in 1..=DAYS_PER_MONTH_LEAP[month - 1] {
                    if day == 29 && month == 2 && !is_leap(year) {
                        continue;
                    }
                    let ts = date2ts(day, month as u32, year) + 13 * 3600 + 7 * 60 + 42;
                    let d = ts2date(ts);
                    assert_eq!(
                        (d.year, d.month, d.mday, d.hour, d.minute, d.second),
                        (year as i64, month as u32, day, 13, 7, 42),
                        "{}.{}.{}",
                        day,
                        month,
                        year
                    );
                }
            }
        }
    }

    #[test]
    fn test_ordering_seconds_first() {
        let a = Timestamp::new(10, 999_999_999).unwrap();
        let b = Timestamp::new(11, 0).unwrap();
        let c = Timestamp::new(11, 1).unwrap();
        assert!(a < b && b < c);
        assert!(b.is_newer_than(&a));
        assert!(c.is_newer_than(&b));
        assert!(!b.is_newer_than(&b));
        assert!(!a.is_newer_than(&c));
    }

    #[test]
    fn test_new_rejects_overflowing_nanos() {
        assert!(Timestamp::new(0, NANOS_PER_SEC).is_none());
        assert!(Timestamp::new(0, NANOS_PER_SEC - 1).is_some());
    }

    #[test]
    fn test_normalized() {
        assert_eq!(Timestamp::new(3, 500).unwrap(), Timestamp::normalized(2, 1_000_000_500));
        assert_eq!(Timestamp::new(-1, 999_999_000).unwrap(), Timestamp::normalized(0, -1000));
    }

    #[test]
    fn test_nanos() {
        let ts = Timestamp::new(-2, 250).unwrap();
        assert_eq!(-1_999_999_750, ts.as_nanos());
        assert_eq!(ts, Timestamp::from_nanos(ts.as_nanos()));
        assert_eq!(Time::MAX, Timestamp::from_nanos(i128::MAX).secs());
    }

    #[test]
    fn test_display() {
        let ts = Timestamp::new(1_700_000_000, 42).unwrap();
        assert_eq!("1700000000.000000042", ts.to_string());
        assert_eq!("2023-11-14 22:13:20", ts.date().to_string());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_system_time() {
        let ts = Timestamp::new(1_600_000_000, 123_456_789).unwrap();
        let st: std::time::SystemTime = ts.into();
        assert_eq!(ts, Timestamp::from(st));

        let before = Timestamp::new(-5, 1).unwrap();
        let st: std::time::SystemTime = before.into();
        assert_eq!(before, Timestamp::from(st));
    }
}
