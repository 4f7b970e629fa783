use serde::{Deserialize, Serialize};

use crate::model::config::PomodoroConfig;

/// Every fourth completed pomodoro earns a long break
pub const CYCLES_PER_LONG_BREAK: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Pomodoro => "pomodoro",
            TimerMode::ShortBreak => "short-break",
            TimerMode::LongBreak => "long-break",
        }
    }

    /// Accepts the persisted names plus `work`, `short` and `long`
    pub fn parse(s: &str) -> Option<TimerMode> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pomodoro" | "work" => Some(TimerMode::Pomodoro),
            "short-break" | "short" => Some(TimerMode::ShortBreak),
            "long-break" | "long" => Some(TimerMode::LongBreak),
            _ => None,
        }
    }
}

/// Length of each mode, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub work: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Durations::from(&PomodoroConfig::default())
    }
}

/// Longest configurable mode, one day
pub const MAX_MODE_MINUTES: u32 = 24 * 60;

fn minutes_to_seconds(minutes: u32) -> u32 {
    minutes.clamp(1, MAX_MODE_MINUTES) * 60
}

impl From<&PomodoroConfig> for Durations {
    fn from(config: &PomodoroConfig) -> Self {
        Durations {
            work: minutes_to_seconds(config.work_minutes),
            short_break: minutes_to_seconds(config.short_break_minutes),
            long_break: minutes_to_seconds(config.long_break_minutes),
        }
    }
}

impl Durations {
    pub fn of(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Pomodoro => self.work,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }
}

/// Emitted by `tick` when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    PomodoroComplete { cycles: u32 },
    BreakFinished,
}

/// Work/break countdown. Driven by one `tick` per second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroTimer {
    pub mode: TimerMode,
    pub running: bool,
    /// Seconds left in the current mode
    pub remaining: u32,
    /// Completed pomodoros
    pub cycles: u32,
    durations: Durations,
}

impl PomodoroTimer {
    pub fn new(durations: Durations) -> Self {
        PomodoroTimer {
            mode: TimerMode::Pomodoro,
            running: false,
            remaining: durations.work,
            cycles: 0,
            durations,
        }
    }

    /// Rebuild from persisted parts. A zero `remaining` is not a valid
    /// resting state and is replaced with the full mode length.
    pub fn restore(
        durations: Durations,
        mode: TimerMode,
        running: bool,
        remaining: u32,
        cycles: u32,
    ) -> Self {
        PomodoroTimer {
            mode,
            running,
            remaining: if remaining == 0 {
                durations.of(mode)
            } else {
                remaining
            },
            cycles,
            durations,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and rewind the current mode
    pub fn reset(&mut self) {
        self.remaining = self.durations.of(self.mode);
        self.running = false;
    }

    /// Switch mode, rewinding and stopping
    pub fn set_mode(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.reset();
    }

    /// Advance one second. Does nothing while paused.
    pub fn tick(&mut self) -> Option<TimerEvent> {
        if !self.running {
            return None;
        }
        if self.remaining > 1 {
            self.remaining -= 1;
            return None;
        }

        self.running = false;
        let (event, next) = match self.mode {
            TimerMode::Pomodoro => {
                self.cycles += 1;
                let next = if self.cycles % CYCLES_PER_LONG_BREAK == 0 {
                    TimerMode::LongBreak
                } else {
                    TimerMode::ShortBreak
                };
                (
                    TimerEvent::PomodoroComplete {
                        cycles: self.cycles,
                    },
                    next,
                )
            }
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                (TimerEvent::BreakFinished, TimerMode::Pomodoro)
            }
        };
        self.mode = next;
        self.remaining = self.durations.of(next);
        log::info!("timer finished: {:?}, next mode {}", event, next.as_str());
        Some(event)
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}
