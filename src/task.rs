//! Task model and input form validation

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Category used when the form leaves it blank
pub const DEFAULT_CATEGORY: &str = "general";

/// Task priority, 1 (lowest) to 5 (highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: Priority = Priority(1);
    pub const MAX: Priority = Priority(5);

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority(3)
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Priority(value))
        } else {
            Err(TaskError::PriorityOutOfRange(value as i64))
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.0
    }
}

/// A validated task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    /// Calendar due date (no time of day)
    #[serde(default)]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_category")]
    pub category: String,
    /// Repeating tasks are relaunched instead of dismissed when clicked
    #[serde(default)]
    pub repeat: bool,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            due: None,
            priority: Priority::default(),
            category: DEFAULT_CATEGORY.to_string(),
            repeat: false,
        }
    }

    pub fn with_due(mut self, due: NaiveDate) -> Self {
        self.due = Some(due);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn repeating(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }
}

/// Raw values read from the input form
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub name: String,
    /// `YYYY-MM-DD` as produced by `<input type="date">`, or empty
    pub due: String,
    pub priority: String,
    pub category: String,
    pub repeat: bool,
}

impl TaskForm {
    /// Validate the form into a task
    pub fn parse(&self) -> Result<Task, TaskError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TaskError::EmptyName);
        }

        let due = match self.due.trim() {
            "" => None,
            raw => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| TaskError::InvalidDueDate(raw.to_string()))?,
            ),
        };

        let priority = match self.priority.trim() {
            "" => Priority::default(),
            raw => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| TaskError::InvalidPriority(raw.to_string()))?;
                u8::try_from(value)
                    .map_err(|_| TaskError::PriorityOutOfRange(value))
                    .and_then(Priority::try_from)?
            }
        };

        let category = match self.category.trim() {
            "" => DEFAULT_CATEGORY.to_string(),
            c => c.to_string(),
        };

        Ok(Task {
            name: name.to_string(),
            due,
            priority,
            category,
            repeat: self.repeat,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, due: &str, priority: &str, category: &str) -> TaskForm {
        TaskForm {
            name: name.to_string(),
            due: due.to_string(),
            priority: priority.to_string(),
            category: category.to_string(),
            repeat: false,
        }
    }

    #[test]
    fn test_parse_full_form() {
        let mut f = form("  Write report ", "2026-11-02", "5", " Work ");
        f.repeat = true;
        let task = f.parse().unwrap();
        assert_eq!(task.name, "Write report");
        assert_eq!(task.due, NaiveDate::from_ymd_opt(2026, 11, 2));
        assert_eq!(task.priority.get(), 5);
        assert_eq!(task.category, "Work");
        assert!(task.repeat);
    }

    #[test]
    fn test_parse_defaults() {
        let task = form("Laundry", "", "", "").parse().unwrap();
        assert_eq!(task.due, None);
        assert_eq!(task.priority, Priority::default());
        assert_eq!(task.category, DEFAULT_CATEGORY);
        assert!(!task.repeat);
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        assert_eq!(form("   ", "", "", "").parse(), Err(TaskError::EmptyName));
    }

    #[test]
    fn test_parse_rejects_bad_date() {
        assert_eq!(
            form("x", "11/02/2026", "", "").parse(),
            Err(TaskError::InvalidDueDate("11/02/2026".to_string()))
        );
        assert!(form("x", "2026-02-30", "", "").parse().is_err());
    }

    #[test]
    fn test_parse_rejects_bad_priority() {
        assert_eq!(
            form("x", "", "high", "").parse(),
            Err(TaskError::InvalidPriority("high".to_string()))
        );
        assert_eq!(
            form("x", "", "0", "").parse(),
            Err(TaskError::PriorityOutOfRange(0))
        );
        assert_eq!(
            form("x", "", "6", "").parse(),
            Err(TaskError::PriorityOutOfRange(6))
        );
        assert_eq!(
            form("x", "", "-3", "").parse(),
            Err(TaskError::PriorityOutOfRange(-3))
        );
    }

    #[test]
    fn test_priority_serde_rejects_out_of_range() {
        assert!(serde_json::from_str::<Priority>("4").is_ok());
        assert!(serde_json::from_str::<Priority>("9").is_err());
    }
}
