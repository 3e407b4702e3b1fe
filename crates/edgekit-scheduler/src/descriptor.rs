//! Task descriptors and annotation-shape parsing.

use crate::error::ScheduleError;
use chrono::{NaiveDate, NaiveTime, Weekday};
use std::collections::HashSet;
use std::time::Duration;

/// Task cadence: a fixed interval, or calendar-monthly on the start date's
/// day of month (clamped to short months).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Fixed interval between fires.
    Every(Duration),
    /// Once per calendar month on the anchor day.
    Monthly,
}

impl Period {
    /// Parses the annotation form: a positive decimal followed by `w`, `d`,
    /// `h`, or `m`, or the literal `M` for monthly.
    pub fn parse(input: &str) -> Result<Period, ScheduleError> {
        if input == "M" {
            return Ok(Period::Monthly);
        }
        if !input.is_ascii() {
            return Err(ScheduleError::InvalidPeriod(input.to_string()));
        }
        let (digits, unit) = input.split_at(input.len().saturating_sub(1));
        let count: u64 = digits
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ScheduleError::InvalidPeriod(input.to_string()))?;
        let seconds = match unit {
            "w" => count * 7 * 24 * 3600,
            "d" => count * 24 * 3600,
            "h" => count * 3600,
            "m" => count * 60,
            _ => return Err(ScheduleError::InvalidPeriod(input.to_string())),
        };
        Ok(Period::Every(Duration::from_secs(seconds)))
    }
}

/// Parses `HH:MM` (24-hour).
pub fn parse_time(input: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(input, "%H:%M")
        .map_err(|_| ScheduleError::InvalidTime(input.to_string()))
}

/// Parses `YYYYMMDD`.
pub fn parse_date(input: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(input, "%Y%m%d")
        .map_err(|_| ScheduleError::InvalidDate(input.to_string()))
}

/// Parses a comma-separated day-of-week set (`MON,WED,FRI`); an empty
/// string yields the empty set, meaning "any day".
pub fn parse_days(input: &str) -> Result<HashSet<Weekday>, ScheduleError> {
    let mut days = HashSet::new();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let day = match token.to_ascii_uppercase().as_str() {
            "MON" | "MONDAY" => Weekday::Mon,
            "TUE" | "TUESDAY" => Weekday::Tue,
            "WED" | "WEDNESDAY" => Weekday::Wed,
            "THU" | "THURSDAY" => Weekday::Thu,
            "FRI" | "FRIDAY" => Weekday::Fri,
            "SAT" | "SATURDAY" => Weekday::Sat,
            "SUN" | "SUNDAY" => Weekday::Sun,
            _ => return Err(ScheduleError::InvalidDayOfWeek(token.to_string())),
        };
        days.insert(day);
    }
    Ok(days)
}

/// Everything the scheduler needs to know about one task.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    /// Unique task name.
    pub name: String,
    /// Time of day fires are aimed at.
    pub time: NaiveTime,
    /// Cadence.
    pub period: Period,
    /// Allowed fire days; empty means any day.
    pub days_of_week: HashSet<Weekday>,
    /// First day of the active window (also the monthly anchor).
    pub start_date: Option<NaiveDate>,
    /// Last day of the active window.
    pub end_date: Option<NaiveDate>,
    /// Disabled tasks are registered but never scheduled.
    pub enabled: bool,
    /// Free-form description, shown in the discovery log.
    pub description: String,
    /// Orders the discovery log; higher first.
    pub priority: i32,
}

impl TaskDescriptor {
    /// Creates a builder for the named task.
    pub fn builder(name: impl Into<String>) -> TaskDescriptorBuilder {
        TaskDescriptorBuilder::new(name)
    }

    /// True when `date` falls inside the start/end window.
    pub fn window_admits(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }

    /// True when fires are allowed on `day`.
    pub fn day_allowed(&self, day: Weekday) -> bool {
        self.days_of_week.is_empty() || self.days_of_week.contains(&day)
    }
}

/// Builder validating the descriptor invariants.
pub struct TaskDescriptorBuilder {
    name: String,
    time: NaiveTime,
    period: Period,
    days_of_week: HashSet<Weekday>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    enabled: bool,
    description: String,
    priority: i32,
}

impl TaskDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: NaiveTime::MIN,
            period: Period::Every(Duration::from_secs(24 * 3600)),
            days_of_week: HashSet::new(),
            start_date: None,
            end_date: None,
            enabled: true,
            description: String::new(),
            priority: 0,
        }
    }

    /// Sets the time of day, from the `HH:MM` annotation form.
    pub fn time(mut self, input: &str) -> Result<Self, ScheduleError> {
        self.time = parse_time(input)?;
        Ok(self)
    }

    /// Sets the time of day from a parsed value.
    pub fn time_of_day(mut self, time: NaiveTime) -> Self {
        self.time = time;
        self
    }

    /// Sets the cadence, from the `Nw|Nd|Nh|Nm|M` annotation form.
    pub fn period(mut self, input: &str) -> Result<Self, ScheduleError> {
        self.period = Period::parse(input)?;
        Ok(self)
    }

    /// Sets the cadence from a parsed value.
    pub fn cadence(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    /// Sets the allowed days, from the `MON,WED,FRI` annotation form.
    pub fn days_of_week(mut self, input: &str) -> Result<Self, ScheduleError> {
        self.days_of_week = parse_days(input)?;
        Ok(self)
    }

    /// Sets the window start, from the `YYYYMMDD` annotation form.
    pub fn start_day(mut self, input: &str) -> Result<Self, ScheduleError> {
        self.start_date = Some(parse_date(input)?);
        Ok(self)
    }

    /// Sets the window end, from the `YYYYMMDD` annotation form.
    pub fn end_day(mut self, input: &str) -> Result<Self, ScheduleError> {
        self.end_date = Some(parse_date(input)?);
        Ok(self)
    }

    /// Enables or disables the task.
    ///
    /// Default: enabled
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the free-form description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the discovery-log priority; higher logs first.
    ///
    /// Default: 0
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Validates the invariants and builds the descriptor.
    pub fn build(self) -> Result<TaskDescriptor, ScheduleError> {
        if self.period == Period::Monthly && self.start_date.is_none() {
            return Err(ScheduleError::MonthlyWithoutStartDate(self.name));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ScheduleError::WindowInverted(self.name));
            }
        }
        Ok(TaskDescriptor {
            name: self.name,
            time: self.time,
            period: self.period,
            days_of_week: self.days_of_week,
            start_date: self.start_date,
            end_date: self.end_date,
            enabled: self.enabled,
            description: self.description,
            priority: self.priority,
        })
    }
}
