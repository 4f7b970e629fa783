use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Source of "now" for everything date-dependent: task timestamps, the
/// due-today filter, overdue checks, streak days and reminders.
pub trait Clock {
    /// Current instant, for `createdAt` and generated ids
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current wall-clock time in the user's timezone
    fn now_local(&self) -> NaiveDateTime;

    /// Current local calendar date
    fn today(&self) -> NaiveDate {
        self.now_local().date()
    }
}

/// The real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now_local(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a given local time. The UTC instant treats the local
/// time as if it were UTC, which keeps tests independent of the host
/// timezone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    local: NaiveDateTime,
}

impl FixedClock {
    pub fn new(local: NaiveDateTime) -> Self {
        FixedClock { local }
    }

    /// Midday on the given date
    pub fn on(date: NaiveDate) -> Self {
        FixedClock {
            local: date.and_hms_opt(12, 0, 0).unwrap_or_default(),
        }
    }

    pub fn advance(&mut self, by: chrono::Duration) {
        self.local += by;
    }
}

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.local)
    }

    fn now_local(&self) -> NaiveDateTime {
        self.local
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now_utc(&self) -> DateTime<Utc> {
        (**self).now_utc()
    }

    fn now_local(&self) -> NaiveDateTime {
        (**self).now_local()
    }
}
