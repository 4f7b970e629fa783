use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::project::INBOX_PROJECT_ID;

/// Text given to tasks added without any text
pub const DEFAULT_TASK_TEXT: &str = "New task";

/// Task priority label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    High,
    /// Unknown labels from older exports read as `normal`
    #[default]
    #[serde(other)]
    Normal,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Priority> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "normal" => Some(Priority::Normal),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

/// A single task record.
///
/// This is the persisted/exported shape: field names are camelCase and the
/// optional dates serialize as `null` when absent. Missing fields from older
/// records fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Stable identifier, never changed after creation
    #[serde(deserialize_with = "task_id::deserialize")]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    /// Local date-time, `YYYY-MM-DDTHH:MM`
    #[serde(default, with = "reminder_time")]
    pub reminder_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub starred: bool,
    #[serde(default = "default_project_id")]
    pub project_id: String,
    #[serde(default)]
    pub priority: Priority,
}

fn default_project_id() -> String {
    INBOX_PROJECT_ID.to_string()
}

impl Task {
    /// Create an incomplete, unstarred task in the inbox
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Task {
            id: id.into(),
            text: text.into(),
            done: false,
            created_at,
            due_date: None,
            reminder_time: None,
            notes: String::new(),
            tags: Vec::new(),
            starred: false,
            project_id: default_project_id(),
            priority: Priority::Normal,
        }
    }

    /// Case-insensitive match of an already lower-cased needle against
    /// text, tags and notes.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
            || self.notes.to_lowercase().contains(needle)
    }
}

/// Ids were plain numbers in early exports.
mod task_id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Float(f) => format!("{}", f),
        })
    }
}

pub mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Parse `YYYY-MM-DD`, ignoring any time suffix
    pub fn parse(s: &str) -> Result<NaiveDate, chrono::ParseError> {
        let head = s.get(..10).unwrap_or(s);
        NaiveDate::parse_from_str(head, FORMAT)
    }
}

pub mod reminder_time {
    use chrono::{NaiveDateTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";
    const SECOND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
    const FRACTION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S>(time: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&format(t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => parse(s).map(Some).map_err(serde::de::Error::custom),
        }
    }

    /// Minute precision unless the value carries seconds or a fraction
    pub fn format(t: &NaiveDateTime) -> String {
        if t.nanosecond() != 0 {
            t.format(FRACTION_FORMAT).to_string()
        } else if t.second() != 0 {
            t.format(SECOND_FORMAT).to_string()
        } else {
            t.format(MINUTE_FORMAT).to_string()
        }
    }

    /// Accepts `YYYY-MM-DDTHH:MM`, `YYYY-MM-DDTHH:MM:SS` and a space in
    /// place of the `T`.
    pub fn parse(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        let normalized = s.replacen(' ', "T", 1);
        NaiveDateTime::parse_from_str(&normalized, MINUTE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&normalized, SECOND_FORMAT))
            .or_else(|_| NaiveDateTime::parse_from_str(&normalized, FRACTION_FORMAT))
    }
}
