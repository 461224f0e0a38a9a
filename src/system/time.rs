//! Time keeping and formatting

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};
use enumset::{EnumSet, EnumSetType};

use crate::Error;

/// Calendar units a tick can report as changed
#[derive(Debug, EnumSetType)]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

/// Units that differ between `previous` and `now`.
///
/// A change in a larger unit counts as a change of every smaller one.
pub fn units_changed(previous: &NaiveDateTime, now: &NaiveDateTime) -> EnumSet<TimeUnit> {
    let steps = [
        (TimeUnit::Year, previous.year() != now.year()),
        (TimeUnit::Month, previous.month() != now.month()),
        (TimeUnit::Day, previous.day() != now.day()),
        (TimeUnit::Hour, previous.hour() != now.hour()),
        (TimeUnit::Minute, previous.minute() != now.minute()),
        (TimeUnit::Second, previous.second() != now.second()),
    ];

    let mut changed = false;
    let mut units = EnumSet::empty();
    for (unit, differs) in steps {
        changed |= differs;
        if changed {
            units |= unit;
        }
    }
    units
}

/// A tick waiting to be delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTick {
    pub time: NaiveDateTime,
    pub units: EnumSet<TimeUnit>,
}

impl PendingTick {
    /// Fold an older undelivered tick into this one, keeping its units
    pub fn merge(self, older: Option<PendingTick>) -> Self {
        match older {
            Some(older) => Self {
                time: self.time,
                units: self.units | older.units,
            },
            None => self,
        }
    }
}

/// Format the time of day as `HH:MM` (24h) or `hh:MM` (12h)
pub fn format_time<'b>(
    buf: &'b mut [u8],
    time: &NaiveDateTime,
    use_24h: bool,
) -> Result<&'b str, Error> {
    let hour = if use_24h {
        time.hour()
    } else {
        time.hour12().1
    };
    Ok(format_no_std::show(
        buf,
        format_args!("{:02}:{:02}", hour, time.minute()),
    )?)
}

/// Format the date as `DD/MM/YY`
pub fn format_date<'b>(buf: &'b mut [u8], time: &NaiveDateTime) -> Result<&'b str, Error> {
    Ok(format_no_std::show(
        buf,
        format_args!(
            "{:02}/{:02}/{:02}",
            time.day(),
            time.month(),
            time.year().rem_euclid(100)
        ),
    )?)
}

/// Wall clock time at a known uptime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReference {
    /// Clock time
    time: NaiveDateTime,
    /// Related system uptime in milliseconds
    uptime_ms: u64,
}

/// 1970-01-01 00:00:00
fn epoch() -> NaiveDateTime {
    DateTime::<Utc>::UNIX_EPOCH.naive_utc()
}

impl Default for TimeReference {
    fn default() -> Self {
        Self {
            time: epoch(),
            uptime_ms: 0,
        }
    }
}

impl TimeReference {
    /// Create new time reference from NaiveDateTime
    pub fn from_datetime(time: NaiveDateTime, uptime_ms: u64) -> Self {
        Self { time, uptime_ms }
    }

    /// Create new time reference from a UNIX timestamp in seconds
    pub fn from_timestamp(secs: i64, uptime_ms: u64) -> Self {
        let time = DateTime::from_timestamp(secs, 0)
            .map(|t| t.naive_utc())
            .unwrap_or_else(epoch);
        Self { time, uptime_ms }
    }
}

/// Keeps wall clock time on top of the monotonic uptime
#[derive(Debug, Default)]
pub struct TimeManager {
    reference: TimeReference,
}

impl TimeManager {
    /// Initialize time measurement from a reference
    pub fn init(reference: TimeReference) -> Self {
        Self { reference }
    }

    /// Current time for the given uptime
    pub fn get_time(&self, uptime_ms: u64) -> NaiveDateTime {
        let elapsed = uptime_ms.saturating_sub(self.reference.uptime_ms);
        self.reference
            .time
            .checked_add_signed(Duration::milliseconds(elapsed as i64))
            .unwrap_or(self.reference.time)
    }

    /// Update time reference
    pub fn set_time(&mut self, reference: TimeReference) {
        self.reference = reference;
    }
}
