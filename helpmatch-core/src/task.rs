//! Candidate tasks: the units of work eligible for ranking.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use geo::Coord;
use thiserror::Error;

/// Opaque task identifier as issued by the task store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct TaskId(String);

impl TaskId {
    /// Wrap a raw identifier.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declared priority of a task.
///
/// # Examples
/// ```
/// use helpmatch_core::Priority;
///
/// assert_eq!(Priority::High.as_str(), "High");
/// assert_eq!("medium".parse::<Priority>(), Ok(Priority::Medium));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Priority {
    /// Nice to have.
    Low,
    /// The default for new tasks.
    #[default]
    Medium,
    /// Needs attention first.
    High,
}

/// Error returned when parsing an unknown [`Priority`] or [`TaskStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseLabelError {
    kind: &'static str,
    value: String,
}

impl Priority {
    /// Return the priority label as written by the task store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseLabelError {
                kind: "priority",
                value: s.to_owned(),
            }),
        }
    }
}

/// Lifecycle status of a task. Only [`TaskStatus::Open`] tasks are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskStatus {
    /// Waiting for a volunteer.
    #[default]
    Open,
    /// Claimed by a volunteer.
    Assigned,
    /// Being worked on.
    #[cfg_attr(feature = "serde", serde(rename = "In Progress"))]
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Return the status label as written by the task store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Report whether the task is still eligible for ranking.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "assigned" => Ok(Self::Assigned),
            "in progress" | "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseLabelError {
                kind: "task status",
                value: s.to_owned(),
            }),
        }
    }
}

/// A unit of work that may be offered to a requester.
///
/// When `required_skills` is empty the title and description act as the
/// semantic proxy for what the task needs.
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use helpmatch_core::{CandidateTask, Priority, lat_lon};
///
/// let deadline = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
/// let task = CandidateTask::new("t-1", "Deliver groceries", "Weekly shop", deadline)
///     .with_priority(Priority::High)
///     .with_skills(["driving"])
///     .with_location(lat_lon(51.5, -0.1));
/// assert_eq!(task.priority, Priority::High);
/// assert!(task.status.is_open());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CandidateTask {
    /// Unique identifier.
    pub id: TaskId,
    /// Short human-readable title.
    pub title: String,
    /// Free-text description.
    pub description: String,
    /// Category label, e.g. `"Groceries"`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: String,
    /// Declared priority.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: Priority,
    /// Whether the poster flagged the task as urgent.
    #[cfg_attr(feature = "serde", serde(default))]
    pub urgency: bool,
    /// Absolute deadline.
    pub deadline: DateTime<Utc>,
    /// Where the task takes place, if anywhere in particular.
    #[cfg_attr(
        feature = "serde",
        serde(default, with = "crate::location::lat_lon_serde")
    )]
    pub location: Option<Coord<f64>>,
    /// Skill labels the task calls for; may be empty.
    #[cfg_attr(feature = "serde", serde(default, alias = "skills"))]
    pub required_skills: BTreeSet<String>,
    /// Lifecycle status.
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: TaskStatus,
}

impl CandidateTask {
    /// Construct an open, medium-priority task with no skills or location.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskId::new(id),
            title: title.into(),
            description: description.into(),
            category: String::new(),
            priority: Priority::default(),
            urgency: false,
            deadline,
            location: None,
            required_skills: BTreeSet::new(),
            status: TaskStatus::default(),
        }
    }

    /// Set the category while returning `self` for chaining.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the priority while returning `self` for chaining.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the urgency flag while returning `self` for chaining.
    #[must_use]
    pub const fn with_urgency(mut self, urgency: bool) -> Self {
        self.urgency = urgency;
        self
    }

    /// Set the location while returning `self` for chaining.
    #[must_use]
    pub const fn with_location(mut self, location: Coord<f64>) -> Self {
        self.location = Some(location);
        self
    }

    /// Add required skills while returning `self` for chaining.
    #[must_use]
    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills
            .extend(skills.into_iter().map(Into::into));
        self
    }

    /// Set the lifecycle status while returning `self` for chaining.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }
}
