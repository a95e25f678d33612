/// Guarded fetching primitives
///
/// Each fetched section of the screen owns a `Resource` (its loading /
/// error / data triple) and a `FetchGuard`. Starting a new fetch sequence
/// cancels the token of the previous one; a completion only commits its
/// result while its token is still live, so a slow stale response can
/// never overwrite newer state. Cancellation is soft: the network request
/// itself is not aborted, only its effect on state.
///
/// # Example
///
/// ```
/// use taskdeck::fetch::{FetchGuard, Resource};
///
/// let guard = FetchGuard::default();
/// let first = guard.start();
/// let second = guard.start();
///
/// assert!(first.is_cancelled());
/// assert!(!second.is_cancelled());
///
/// let mut slot: Resource<u32> = Resource::Loading;
/// if !first.is_cancelled() {
///     slot = Resource::Ready(1); // never happens, the response is stale
/// }
/// assert!(slot.is_loading());
/// ```

use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::api::Backend;
use crate::error::ApiResult;
use crate::models::event::sort_by_start;
use crate::models::{CalendarEvent, Task};

/// Page size for both task fetch strategies.
///
/// The fallback strategy fetches one unfiltered page of this size and
/// filters client-side, so a project with more tasks than fit in that page
/// can come back truncated. A full page is logged as a warning.
pub const TASK_FETCH_PAGE_SIZE: usize = 200;

/// State triple for one fetched section
///
/// Sections fail independently: one `Failed` slot never blocks another
/// section from rendering its data.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    /// Fetch in flight, show a loading indicator
    Loading,

    /// Data available
    Ready(T),

    /// The resource does not exist; rendered as a distinct empty state,
    /// not an error
    Missing,

    /// Fetch failed with a user-facing message
    Failed(String),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::Loading
    }
}

impl<T> Resource<T> {
    /// Whether a fetch is still in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    /// The data, if available
    pub fn value(&self) -> Option<&T> {
        match self {
            Resource::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if the fetch failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Resource::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Issues cancellation tokens for successive fetch sequences
///
/// Last-started wins: `start` cancels the previously issued token and
/// returns a fresh one for the new sequence.
#[derive(Debug, Default)]
pub struct FetchGuard {
    current: Mutex<CancellationToken>,
}

impl FetchGuard {
    /// Begins a new fetch sequence, invalidating any in-flight one
    pub fn start(&self) -> CancellationToken {
        let mut current = self.current.lock().expect("fetch guard lock poisoned");
        current.cancel();
        let fresh = CancellationToken::new();
        *current = fresh.clone();
        fresh
    }

    /// Cancels the current sequence without starting a new one
    pub fn cancel(&self) {
        self.current
            .lock()
            .expect("fetch guard lock poisoned")
            .cancel();
    }
}

/// Ordered task fetch strategies, tried in sequence; first success wins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFetchStrategy {
    /// `GET /tasks?project_id=...` — preferred, server-side filter
    ServerFiltered,

    /// `GET /tasks` unfiltered page, filtered client-side; used when the
    /// filtered route is absent
    FullPageClientFiltered,
}

/// Strategy order for loading a project's tasks
pub const TASK_FETCH_STRATEGIES: [TaskFetchStrategy; 2] = [
    TaskFetchStrategy::ServerFiltered,
    TaskFetchStrategy::FullPageClientFiltered,
];

/// Loads the tasks of one project, degrading to the client-filtered
/// fallback when the server-side filter is unavailable
pub async fn load_project_tasks(backend: &dyn Backend, project_id: i64) -> ApiResult<Vec<Task>> {
    let mut outcome = fetch_tasks_with(backend, project_id, TASK_FETCH_STRATEGIES[0]).await;

    for strategy in &TASK_FETCH_STRATEGIES[1..] {
        match outcome {
            Ok(_) => break,
            Err(err) => {
                tracing::debug!(
                    project_id,
                    strategy = ?strategy,
                    error = %err,
                    "task fetch strategy failed, trying next"
                );
                outcome = fetch_tasks_with(backend, project_id, *strategy).await;
            }
        }
    }

    outcome
}

async fn fetch_tasks_with(
    backend: &dyn Backend,
    project_id: i64,
    strategy: TaskFetchStrategy,
) -> ApiResult<Vec<Task>> {
    match strategy {
        TaskFetchStrategy::ServerFiltered => {
            let tasks = backend
                .list_tasks(Some(project_id), TASK_FETCH_PAGE_SIZE)
                .await?;
            if tasks.len() == TASK_FETCH_PAGE_SIZE {
                tracing::warn!(
                    project_id,
                    limit = TASK_FETCH_PAGE_SIZE,
                    "filtered task page is full; task list may be truncated"
                );
            }
            Ok(tasks)
        }
        TaskFetchStrategy::FullPageClientFiltered => {
            let all = backend.list_tasks(None, TASK_FETCH_PAGE_SIZE).await?;
            if all.len() == TASK_FETCH_PAGE_SIZE {
                tracing::warn!(
                    project_id,
                    limit = TASK_FETCH_PAGE_SIZE,
                    "unfiltered task page is full; project task list may be truncated"
                );
            }
            Ok(all
                .into_iter()
                .filter(|task| task.project_id == project_id)
                .collect())
        }
    }
}

/// Loads the events of one project: the backend offers no server-side
/// filter, so the full list is filtered client-side and sorted ascending
/// by start time
pub async fn load_project_events(
    backend: &dyn Backend,
    project_id: i64,
) -> ApiResult<Vec<CalendarEvent>> {
    let all = backend.list_events().await?;
    let mut events: Vec<CalendarEvent> = all
        .into_iter()
        .filter(|event| event.project_id == Some(project_id))
        .collect();
    sort_by_start(&mut events);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::models::TaskStatus;

    fn task(id: i64, project_id: i64) -> Task {
        Task {
            id,
            project_id,
            title: format!("task-{id}"),
            description: None,
            status: TaskStatus::Todo,
            assigned_to: None,
            user: None,
            created_at: None,
        }
    }

    #[test]
    fn test_resource_default_is_loading() {
        let resource: Resource<Vec<Task>> = Resource::default();
        assert!(resource.is_loading());
        assert!(resource.value().is_none());
        assert!(resource.error().is_none());
    }

    #[test]
    fn test_guard_cancels_previous_sequence() {
        let guard = FetchGuard::default();
        let first = guard.start();
        assert!(!first.is_cancelled());

        let second = guard.start();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        guard.cancel();
        assert!(second.is_cancelled());
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            TASK_FETCH_STRATEGIES,
            [
                TaskFetchStrategy::ServerFiltered,
                TaskFetchStrategy::FullPageClientFiltered,
            ]
        );
    }

    #[tokio::test]
    async fn test_server_filtered_strategy_wins_when_available() {
        let mock = MockBackend::new();
        mock.push_task(task(1, 7));
        mock.push_task(task(2, 8));

        let tasks = load_project_tasks(&mock, 7).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, 1);
        // Only the filtered route was hit
        assert_eq!(
            mock.calls(),
            vec!["GET /tasks?project_id=7&per_page=200"]
        );
    }

    #[tokio::test]
    async fn test_fallback_filters_client_side() {
        let mock = MockBackend::new();
        mock.push_task(task(1, 7));
        mock.push_task(task(2, 8));
        mock.push_task(task(3, 7));
        mock.fail("list_tasks_filtered", "route not found");

        let tasks = load_project_tasks(&mock, 7).await.unwrap();
        let ids: Vec<i64> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(
            mock.calls(),
            vec![
                "GET /tasks?project_id=7&per_page=200",
                "GET /tasks?per_page=200",
            ]
        );
    }

    #[tokio::test]
    async fn test_both_strategies_failing_returns_last_error() {
        let mock = MockBackend::new();
        mock.fail("list_tasks_filtered", "route not found");
        mock.fail("list_tasks", "database down");

        let err = load_project_tasks(&mock, 7).await.unwrap_err();
        assert_eq!(err.user_message("fallback"), "database down");
    }

    #[tokio::test]
    async fn test_events_filtered_and_sorted() {
        use crate::models::CalendarEvent;

        let mock = MockBackend::new();
        mock.push_event(CalendarEvent {
            id: 1,
            project_id: Some(7),
            title: "later".to_string(),
            description: None,
            start_time: "2024-03-01T10:00:00Z".to_string(),
            end_time: "2024-03-01T11:00:00Z".to_string(),
        });
        mock.push_event(CalendarEvent {
            id: 2,
            project_id: Some(8),
            title: "other project".to_string(),
            description: None,
            start_time: "2024-01-01T10:00:00Z".to_string(),
            end_time: "2024-01-01T11:00:00Z".to_string(),
        });
        mock.push_event(CalendarEvent {
            id: 3,
            project_id: Some(7),
            title: "earlier".to_string(),
            description: None,
            start_time: "2024-02-01T10:00:00Z".to_string(),
            end_time: "2024-02-01T11:00:00Z".to_string(),
        });

        let events = load_project_events(&mock, 7).await.unwrap();
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
