use chrono::{Local, Offset, Timelike};
use std::fmt;

/// Hour and minute of a wall clock, always within `[0,23]×[0,59]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WallClock {
    pub hour: u32,
    pub minute: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Night,
}

impl WallClock {
    pub fn new(hour: u32, minute: u32) -> Self {
        debug_assert!(hour < 24 && minute < 60);
        Self { hour, minute }
    }

    pub fn from_timelike<T: Timelike>(t: &T) -> Self {
        Self::new(t.hour(), t.minute())
    }

    /// Current local time of the machine we run on.
    pub fn now() -> Self {
        Self::from_timelike(&Local::now())
    }

    /// `HH:MM`, zero padded.
    pub fn format_time(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// UTC offset of the local machine right now, in minutes.
pub fn local_utc_offset() -> i32 {
    Local::now().offset().fix().local_minus_utc() / 60
}

/// Shift `base`, expressed in `base_offset` minutes from UTC, into the zone
/// `zone_offset` minutes from UTC.
pub fn compute_local_time(base: WallClock, base_offset: i32, zone_offset: i32) -> WallClock {
    let delta = i64::from(zone_offset) - i64::from(base_offset);

    let mut hour = i64::from(base.hour) + delta / 60;
    let mut minute = i64::from(base.minute) + delta % 60;
    if minute >= 60 {
        minute -= 60;
        hour += 1;
    } else if minute < 0 {
        minute += 60;
        hour -= 1;
    }

    // Offsets are not bounded to a day, so wrap until in range.
    while hour >= 24 {
        hour -= 24;
    }
    while hour < 0 {
        hour += 24;
    }

    WallClock::new(hour as u32, minute as u32)
}

pub fn classify_day_night(hour: u32) -> Period {
    if hour > 17 || hour < 6 {
        Period::Night
    } else {
        Period::Day
    }
}

/// Parse an offset written as `+HH:MM`, `-HH:MM` or `+HH`.
pub fn parse_offset(s: &str) -> anyhow::Result<i32> {
    let s = s.trim();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1, &s[1..]),
        Some(b'-') => (-1, &s[1..]),
        _ => anyhow::bail!("Offset must start with + or -: {:?}", s),
    };
    let (h, m) = match rest.split_once(':') {
        Some((h, m)) => (h, m),
        None => (rest, "0"),
    };
    let hours: i32 = h.parse().map_err(|_| anyhow::anyhow!("Invalid offset hours in {:?}", s))?;
    let minutes: i32 = m.parse().map_err(|_| anyhow::anyhow!("Invalid offset minutes in {:?}", s))?;
    anyhow::ensure!((0..100).contains(&hours), "Offset hours out of range in {:?}", s);
    anyhow::ensure!((0..60).contains(&minutes), "Offset minutes out of range in {:?}", s);
    Ok(sign * (hours * 60 + minutes))
}
