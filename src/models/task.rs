/// Task model and create payload
///
/// Tasks are fetched per project, transformed by the query pipeline, and
/// created through the task workflow. The server assigns `id` and
/// `created_at`; the client never deletes tasks from this view.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::project::Member;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Converts status to its wire string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task ID
    #[serde(deserialize_with = "super::id::required")]
    pub id: i64,

    /// Project this task belongs to
    #[serde(deserialize_with = "super::id::required")]
    pub project_id: i64,

    /// Task title
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Workflow status
    pub status: TaskStatus,

    /// Assignee user id, if any
    #[serde(default, deserialize_with = "super::id::optional")]
    pub assigned_to: Option<i64>,

    /// Embedded assignee record, when the backend expands it
    #[serde(default)]
    pub user: Option<Member>,

    /// Server-assigned creation timestamp, as received
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Task {
    /// Assignee display name, empty when unassigned
    pub fn assignee_name(&self) -> &str {
        self.user.as_ref().map(|u| u.name.as_str()).unwrap_or("")
    }

    /// Creation time in milliseconds since epoch; missing or unparseable
    /// timestamps map to 0
    pub fn created_at_millis(&self) -> i64 {
        self.created_at
            .as_deref()
            .map(super::parse_timestamp_millis)
            .unwrap_or(0)
    }
}

/// Form state for the create-task workflow
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TaskDraft {
    /// Task title, required
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// Optional description
    pub description: String,

    /// Optional assignee
    pub assigned_to: Option<i64>,
}

impl TaskDraft {
    /// Builds the create payload for a project. New tasks always start
    /// in `todo`.
    pub fn into_payload(self, project_id: i64) -> NewTask {
        NewTask {
            project_id,
            title: self.title,
            description: self.description,
            assigned_to: self.assigned_to,
            status: TaskStatus::Todo,
        }
    }
}

/// Wire payload for `POST /tasks`
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    /// Project the task belongs to
    pub project_id: i64,

    /// Task title
    pub title: String,

    /// Description, empty string when not provided
    pub description: String,

    /// Optional assignee, serialized as null when absent
    pub assigned_to: Option<i64>,

    /// Initial status
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::Done.as_str(), "done");
    }

    #[test]
    fn test_task_deserializes_loose_shapes() {
        let task: Task = serde_json::from_str(
            r#"{"id": "10", "project_id": 1, "title": "T", "status": "in_progress",
                "assigned_to": "", "created_at": "2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(task.id, 10);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.assigned_to, None);
        assert!(task.created_at_millis() > 0);
        assert_eq!(task.assignee_name(), "");
    }

    #[test]
    fn test_draft_validation_requires_title() {
        let draft = TaskDraft::default();
        assert!(draft.validate().is_err());

        let draft = TaskDraft {
            title: "Write report".to_string(),
            ..TaskDraft::default()
        };
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_payload_starts_in_todo() {
        let payload = TaskDraft {
            title: "T".to_string(),
            description: String::new(),
            assigned_to: Some(4),
        }
        .into_payload(9);

        assert_eq!(payload.project_id, 9);
        assert_eq!(payload.status, TaskStatus::Todo);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "todo");
        assert_eq!(json["assigned_to"], 4);
    }
}
