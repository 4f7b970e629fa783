use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pomodoro: PomodoroConfig,
    #[serde(default)]
    pub goal: GoalConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PomodoroConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        PomodoroConfig {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
        }
    }
}

fn default_work_minutes() -> u32 {
    25
}

fn default_short_break_minutes() -> u32 {
    5
}

fn default_long_break_minutes() -> u32 {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Daily completion target used until one is set explicitly
    #[serde(default = "default_goal")]
    pub default: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        GoalConfig {
            default: default_goal(),
        }
    }
}

fn default_goal() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_true")]
    pub auto_backup: bool,
    #[serde(default = "default_interval_days")]
    pub interval_days: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            auto_backup: true,
            interval_days: default_interval_days(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_days() -> u32 {
    7
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// One line per task, no notes/tags row
    #[serde(default)]
    pub compact: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// flexi_logger spec, e.g. "info" or "focusspace=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
