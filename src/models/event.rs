/// Calendar event model and create payload
///
/// Events are fetched globally and filtered client-side by project. The
/// client keeps its event list sorted ascending by start time. The backend
/// is expected to keep `start_time <= end_time`, but fetched data is not
/// rejected when it does not.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::parse_timestamp_millis;

/// Calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Unique event ID
    #[serde(deserialize_with = "super::id::required")]
    pub id: i64,

    /// Project this event belongs to, absent for unscoped events
    #[serde(default, deserialize_with = "super::id::optional")]
    pub project_id: Option<i64>,

    /// Event title
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Start time, as received
    pub start_time: String,

    /// End time, as received
    pub end_time: String,
}

impl CalendarEvent {
    /// Start time in milliseconds since epoch, 0 when unparseable
    pub fn start_millis(&self) -> i64 {
        parse_timestamp_millis(&self.start_time)
    }
}

/// Sorts events ascending by start time. Stable, so events with equal or
/// unparseable start times keep their relative order.
pub fn sort_by_start(events: &mut [CalendarEvent]) {
    events.sort_by_key(|event| event.start_millis());
}

/// Form state for the create-event workflow
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct EventDraft {
    /// Event title, required
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// Optional description
    pub description: String,

    /// Start time, required
    #[validate(length(min = 1, message = "Start time is required"))]
    pub start_time: String,

    /// End time, required
    #[validate(length(min = 1, message = "End time is required"))]
    pub end_time: String,
}

impl EventDraft {
    /// Builds the create payload for a project
    pub fn into_payload(self, project_id: i64) -> NewEvent {
        NewEvent {
            project_id,
            title: self.title,
            description: self.description,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

/// Wire payload for `POST /events`
#[derive(Debug, Clone, Serialize)]
pub struct NewEvent {
    /// Project the event belongs to
    pub project_id: i64,

    /// Event title
    pub title: String,

    /// Description, empty string when not provided
    pub description: String,

    /// Start time
    pub start_time: String,

    /// End time
    pub end_time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, start: &str) -> CalendarEvent {
        CalendarEvent {
            id,
            project_id: Some(1),
            title: format!("event-{id}"),
            description: None,
            start_time: start.to_string(),
            end_time: start.to_string(),
        }
    }

    #[test]
    fn test_sort_by_start_ascending() {
        let mut events = vec![
            event(1, "2024-03-01T10:00:00Z"),
            event(2, "2024-01-01T10:00:00Z"),
            event(3, "2024-02-01T10:00:00Z"),
        ];
        sort_by_start(&mut events);
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_unparseable_start_sorts_first() {
        let mut events = vec![event(1, "2024-01-01T10:00:00Z"), event(2, "broken")];
        sort_by_start(&mut events);
        assert_eq!(events[0].id, 2);
    }

    #[test]
    fn test_event_tolerates_missing_project_id() {
        let event: CalendarEvent = serde_json::from_str(
            r#"{"id": 1, "title": "Standup",
                "start_time": "2024-01-01T10:00", "end_time": "2024-01-01T10:30"}"#,
        )
        .unwrap();
        assert_eq!(event.project_id, None);
    }

    #[test]
    fn test_draft_requires_times() {
        let draft = EventDraft {
            title: "Kickoff".to_string(),
            ..EventDraft::default()
        };
        assert!(draft.validate().is_err());

        let draft = EventDraft {
            title: "Kickoff".to_string(),
            description: String::new(),
            start_time: "2024-01-01T10:00".to_string(),
            end_time: "2024-01-01T11:00".to_string(),
        };
        assert!(draft.validate().is_ok());
    }
}
