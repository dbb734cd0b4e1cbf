use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest DST gap we roll across when a trigger falls inside one.
const MAX_GAP_MINUTES: i64 = 180;

/// A wall-clock time of day, `HH:MM`, at which a job fires once per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DailyTrigger {
    hour: u32,
    minute: u32,
}

impl DailyTrigger {
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };
    pub const NOON: Self = Self { hour: 12, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> Result<Self, String> {
        if hour > 23 || minute > 59 {
            return Err(format!(
                "Invalid time of day '{:02}:{:02}'. Hours run 00-23 and minutes 00-59",
                hour, minute
            ));
        }
        Ok(Self { hour, minute })
    }

    /// Next instant strictly after `after` at which the local clock in `tz`
    /// reads this trigger's time.
    ///
    /// When that local time does not exist (spring-forward gap) the first
    /// valid instant after the gap is used. When it occurs twice
    /// (fall-back) the earlier occurrence is used.
    pub fn next_fire_after(&self, after: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
        let mut date = after.with_timezone(tz).date_naive();
        loop {
            if let Some(naive) = date.and_hms_opt(self.hour, self.minute, 0) {
                if let Some(candidate) = resolve_local(naive, tz) {
                    if candidate > after {
                        return candidate;
                    }
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => return after,
            };
        }
    }
}

fn resolve_local(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    for offset in 0..=MAX_GAP_MINUTES {
        let local = naive + Duration::minutes(offset);
        match tz.from_local_datetime(&local) {
            LocalResult::Single(t) => return Some(t.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => return Some(earliest.with_timezone(&Utc)),
            LocalResult::None => continue,
        }
    }
    None
}

impl FromStr for DailyTrigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid time of day '{}'. Expected HH:MM", s);
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for DailyTrigger {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DailyTrigger> for String {
    fn from(trigger: DailyTrigger) -> Self {
        trigger.to_string()
    }
}

impl fmt::Display for DailyTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
