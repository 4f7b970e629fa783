use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// One day on which every task got done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub date: NaiveDate,
    /// How many tasks the document held at that moment
    pub completed: usize,
}

/// Where the streak stands relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakStatus {
    /// Never completed a full list
    NoHistory,
    /// Last completion was today or yesterday
    Active,
    /// A full calendar day or more went by without a completion
    Broken,
}

/// What an observation did to the streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakEvent {
    Unchanged,
    Increased(u32),
    Reset,
}

/// Consecutive-day counter for "finished everything on the list".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Streak {
    pub count: u32,
    pub last_completion: Option<NaiveDate>,
    pub history: Vec<CompletionRecord>,
}

impl Streak {
    pub fn status(&self, today: NaiveDate) -> StreakStatus {
        match self.last_completion {
            None => StreakStatus::NoHistory,
            Some(last) if (today - last).num_days() > 1 => StreakStatus::Broken,
            Some(_) => StreakStatus::Active,
        }
    }

    /// Zero the counter if the streak has lapsed. Returns true when it did.
    pub fn refresh(&mut self, today: NaiveDate) -> bool {
        if self.status(today) == StreakStatus::Broken && self.count != 0 {
            log::info!(
                "streak reset: last completion {:?}, today {}",
                self.last_completion,
                today
            );
            self.count = 0;
            return true;
        }
        false
    }

    /// Look at the current document and count today if every task is done.
    /// Counts at most once per calendar day.
    pub fn observe(&mut self, tasks: &[Task], today: NaiveDate) -> StreakEvent {
        let reset = self.refresh(today);
        let all_done = !tasks.is_empty() && tasks.iter().all(|t| t.done);
        if all_done && self.last_completion != Some(today) {
            self.count += 1;
            self.last_completion = Some(today);
            self.history.push(CompletionRecord {
                date: today,
                completed: tasks.len(),
            });
            log::info!("streak increased to {}", self.count);
            return StreakEvent::Increased(self.count);
        }
        if reset {
            StreakEvent::Reset
        } else {
            StreakEvent::Unchanged
        }
    }
}
