//! Work-hours evaluation: active-day set plus a time-of-day window that may
//! wrap midnight (overnight shifts).

use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Weekday};

/// A work day, in the CLI's abbreviation vocabulary (M,T,W,Th,F,Sa,Su).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl WorkDay {
    pub fn abbrev(self) -> &'static str {
        match self {
            WorkDay::Mon => "M",
            WorkDay::Tue => "T",
            WorkDay::Wed => "W",
            WorkDay::Thu => "Th",
            WorkDay::Fri => "F",
            WorkDay::Sat => "Sa",
            WorkDay::Sun => "Su",
        }
    }

    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => WorkDay::Mon,
            Weekday::Tue => WorkDay::Tue,
            Weekday::Wed => WorkDay::Wed,
            Weekday::Thu => WorkDay::Thu,
            Weekday::Fri => WorkDay::Fri,
            Weekday::Sat => WorkDay::Sat,
            Weekday::Sun => WorkDay::Sun,
        }
    }
}

/// An immutable work schedule. The time window is parsed once at
/// construction; if either bound is unparseable under every accepted format
/// the schedule is invalid and every instant evaluates to false.
#[derive(Debug, Clone)]
pub struct Schedule {
    days: Vec<WorkDay>,
    window: Option<(NaiveTime, NaiveTime)>,
}

impl Schedule {
    pub fn new(start: &str, end: &str, days: &[WorkDay]) -> Self {
        let window = match (parse_time_of_day(start), parse_time_of_day(end)) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        };
        Self {
            days: days.to_vec(),
            window,
        }
    }

    /// False when either configured time failed to parse.
    pub fn is_valid(&self) -> bool {
        self.window.is_some()
    }

    /// Whether `instant` (in its own local zone) falls inside the schedule.
    ///
    /// A window whose end is at or before its start wraps midnight: the
    /// instant is in-window when `t >= start || t < end`. Otherwise the
    /// window is `start <= t < end`, end exclusive.
    pub fn contains<Z: TimeZone>(&self, instant: &DateTime<Z>) -> bool {
        let Some((start, end)) = self.window else {
            return false;
        };
        if !self.days.contains(&WorkDay::from_weekday(instant.weekday())) {
            return false;
        }
        let time = instant.time();
        if end <= start {
            time >= start || time < end
        } else {
            start <= time && time < end
        }
    }
}

/// Parse a time-of-day string, trying `HH:MM`, `hh:mmAM/PM`, `HH`, `hhAM/PM`
/// in that order. Case-insensitive; embedded spaces are stripped.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    for fmt in ["%H:%M", "%I:%M%p"] {
        if let Ok(time) = NaiveTime::parse_from_str(&cleaned, fmt) {
            return Some(time);
        }
    }

    // Bare-hour forms: "17" and "5PM". chrono refuses an hour without a
    // minute, so these are handled by hand.
    if let Ok(hour) = cleaned.parse::<u32>() {
        return NaiveTime::from_hms_opt(hour, 0, 0);
    }
    let (digits, meridiem) = if let Some(prefix) = cleaned.strip_suffix("AM") {
        (prefix, false)
    } else if let Some(prefix) = cleaned.strip_suffix("PM") {
        (prefix, true)
    } else {
        return None;
    };
    let hour: u32 = digits.parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    let hour24 = match (hour, meridiem) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };
    NaiveTime::from_hms_opt(hour24, 0, 0)
}
