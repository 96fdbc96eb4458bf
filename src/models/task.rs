use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    Medium,
    /// High priority.
    High,
}

impl TaskPriority {
    /// Case-insensitive parse used by list filters.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(TaskPriority::Low),
            "medium" => Some(TaskPriority::Medium),
            "high" => Some(TaskPriority::High),
            _ => None,
        }
    }
}

/// Serde shim for the legacy `completed` wire format.
///
/// Clients historically send and receive the completion flag as the literal
/// strings `"Yes"`/`"No"`. Internally the flag is a genuine `bool`; the string
/// mapping happens only here, at the serialization boundary. Deserialization
/// accepts a boolean, or a string that counts as completed exactly when it is
/// a case-insensitive `"yes"`.
pub mod completed_flag {
    use serde::de::{self, Deserializer, Visitor};
    use serde::Serializer;
    use std::fmt;

    struct YesNoVisitor;

    impl<'de> Visitor<'de> for YesNoVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean or a \"Yes\"/\"No\" string")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            Ok(value.eq_ignore_ascii_case("yes"))
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "Yes" } else { "No" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_any(YesNoVisitor)
    }

    struct OptYesNoVisitor;

    impl<'de> Visitor<'de> for OptYesNoVisitor {
        type Value = Option<bool>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean, a \"Yes\"/\"No\" string, or null")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserialize(deserializer).map(Some)
        }
    }

    /// Variant for optional fields in partial updates.
    pub fn deserialize_opt<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<bool>, D::Error> {
        deserializer.deserialize_option(OptYesNoVisitor)
    }
}

/// Represents a task entity as stored by the task store and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task. Immutable after creation.
    pub owner_id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// The priority of the task.
    pub priority: Option<TaskPriority>,
    /// Calendar date the task is due.
    pub due_date: NaiveDate,
    /// Completion flag, exposed on the wire as "Yes"/"No".
    #[serde(with = "completed_flag")]
    pub completed: bool,
    /// Revision counter for compare-and-swap updates. Starts at 0 and is
    /// bumped on every successful update.
    pub revision: i64,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// The priority of the task.
    pub priority: Option<TaskPriority>,

    /// Calendar date the task is due. Required; must not lie in the past.
    pub due_date: NaiveDate,

    /// Completion flag; defaults to not completed.
    #[serde(default, deserialize_with = "completed_flag::deserialize")]
    pub completed: bool,
}

/// Input structure for updating a task. All fields are optional; only the
/// supplied ones are changed (partial update semantics). The owner is never
/// reassignable and does not appear here.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "completed_flag::deserialize_opt")]
    pub completed: Option<bool>,

    /// Expected current revision. When supplied, the update only applies if it
    /// matches the stored revision; a stale value is rejected with a conflict.
    pub revision: Option<i64>,
}

/// Represents query parameters accepted when listing tasks.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListTasksQuery {
    /// Filter name: `all`, `today`, `week`, or a priority level.
    /// Unrecognized values behave as `all`.
    pub filter: Option<String>,
}

/// A parsed list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    All,
    /// Due date falls on the current calendar day.
    Today,
    /// Due date within the next 7 days, inclusive of today.
    Week,
    Priority(TaskPriority),
}

impl TaskFilter {
    /// Case-insensitive parse; anything unrecognized falls back to `All`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "today" => TaskFilter::Today,
            "week" => TaskFilter::Week,
            other => match TaskPriority::parse(other) {
                Some(priority) => TaskFilter::Priority(priority),
                None => TaskFilter::All,
            },
        }
    }

    /// Whether `task` passes the filter relative to `today`.
    pub fn matches(&self, task: &Task, today: NaiveDate) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Today => task.due_date == today,
            TaskFilter::Week => {
                let days = (task.due_date - today).num_days();
                (0..=7).contains(&days)
            }
            TaskFilter::Priority(priority) => task.priority == Some(*priority),
        }
    }
}

/// Summary statistics derived from a task list. Computed on demand, never
/// persisted.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = Self {
            total: tasks.len(),
            completed: 0,
            low: 0,
            medium: 0,
            high: 0,
        };
        for task in tasks {
            if task.completed {
                stats.completed += 1;
            }
            match task.priority {
                Some(TaskPriority::Low) => stats.low += 1,
                Some(TaskPriority::Medium) => stats.medium += 1,
                Some(TaskPriority::High) => stats.high += 1,
                None => {}
            }
        }
        stats
    }
}

impl Task {
    /// Creates a new `Task` from a create request and the owner's id.
    /// Sets `created_at`/`updated_at` to now, `revision` to 0, and `id` to a
    /// fresh UUID.
    pub fn new(input: CreateTaskRequest, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description,
            priority: input.priority,
            due_date: input.due_date,
            completed: input.completed,
            revision: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges a partial update into the task, bumping the revision and the
    /// update timestamp. The caller is responsible for the revision
    /// compare-and-swap check before applying.
    pub fn apply(&mut self, input: UpdateTaskRequest) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(description) = input.description {
            self.description = Some(description);
        }
        if let Some(priority) = input.priority {
            self.priority = Some(priority);
        }
        if let Some(due_date) = input.due_date {
            self.due_date = due_date;
        }
        if let Some(completed) = input.completed {
            self.completed = completed;
        }
        self.revision += 1;
        self.updated_at = Utc::now();
    }
}
