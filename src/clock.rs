use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Source of "now" for attendance handlers.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current wall-clock time at second precision, as stored in the database.
    fn time_of_day(&self) -> NaiveTime {
        let now = self.now().time();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Server local time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[cfg(test)]
pub use fixed::FixedClock;
