use chrono::{NaiveDateTime, Timelike};

use crate::model::task::Task;

/// Open tasks whose reminder falls in the same calendar minute as `now`.
pub fn due_reminders(tasks: &[Task], now: NaiveDateTime) -> Vec<&Task> {
    let minute = truncate_to_minute(now);
    tasks
        .iter()
        .filter(|t| !t.done)
        .filter(|t| t.reminder_time.map(truncate_to_minute) == Some(minute))
        .collect()
}

fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}
