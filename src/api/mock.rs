/// Mock backend for tests and demos
///
/// Serves scripted data from memory and supports per-operation failure
/// injection and artificial latency, so tests can exercise fetch fallbacks,
/// stale-response guarding, and workflow error paths without a server.
/// Every handled request is appended to a call log in `METHOD /path` form
/// so tests can assert request ordering.
///
/// # Operation keys
///
/// Failures and delays are keyed by operation name:
/// `fetch_project`, `list_tasks_filtered`, `list_tasks`, `list_events`,
/// `list_users`, `create_task`, `create_event`, `attach_members`.
///
/// # Example
///
/// ```
/// use taskdeck::api::MockBackend;
///
/// let mock = MockBackend::new();
/// mock.fail("list_tasks_filtered", "route not found");
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::Backend;
use crate::error::{ApiError, ApiResult};
use crate::models::event::sort_by_start;
use crate::models::{CalendarEvent, Member, NewEvent, NewTask, Project, Task};

#[derive(Debug, Default)]
struct MockState {
    projects: HashMap<i64, Project>,
    tasks: Vec<Task>,
    events: Vec<CalendarEvent>,
    users: Vec<Member>,
    next_id: i64,
    failures: HashMap<&'static str, String>,
    delays: HashMap<&'static str, Duration>,
    calls: Vec<String>,
}

/// Scripted in-memory `Backend` implementation
#[derive(Debug, Default)]
pub struct MockBackend {
    inner: Mutex<MockState>,
}

impl MockBackend {
    /// Creates an empty mock backend
    pub fn new() -> Self {
        let backend = MockBackend::default();
        backend.lock().next_id = 1000;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().expect("mock state lock poisoned")
    }

    /// Seeds a project
    pub fn insert_project(&self, project: Project) {
        self.lock().projects.insert(project.id, project);
    }

    /// Seeds a task
    pub fn push_task(&self, task: Task) {
        self.lock().tasks.push(task);
    }

    /// Seeds an event
    pub fn push_event(&self, event: CalendarEvent) {
        self.lock().events.push(event);
    }

    /// Seeds the user directory
    pub fn set_users(&self, users: Vec<Member>) {
        self.lock().users = users;
    }

    /// Makes an operation fail with a server-reported message
    pub fn fail(&self, op: &'static str, message: &str) {
        self.lock().failures.insert(op, message.to_string());
    }

    /// Clears a scripted failure
    pub fn recover(&self, op: &'static str) {
        self.lock().failures.remove(op);
    }

    /// Delays an operation before it responds
    pub fn set_delay(&self, op: &'static str, delay: Duration) {
        self.lock().delays.insert(op, delay);
    }

    /// Removes all scripted delays
    pub fn clear_delays(&self) {
        self.lock().delays.clear();
    }

    /// Returns the call log so far
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Records the call, applies any delay, then surfaces any scripted
    /// failure for the operation
    async fn begin(&self, op: &'static str, call: String) -> ApiResult<()> {
        let (delay, failure) = {
            let mut state = self.lock();
            state.calls.push(call);
            (
                state.delays.get(op).copied(),
                state.failures.get(op).cloned(),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = failure {
            return Err(ApiError::Status {
                status: 500,
                message: Some(message),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn fetch_project(&self, id: i64) -> ApiResult<Project> {
        self.begin("fetch_project", format!("GET /projects/{id}"))
            .await?;
        self.lock()
            .projects
            .get(&id)
            .cloned()
            .ok_or(ApiError::NotFound { message: None })
    }

    async fn list_tasks(&self, project_id: Option<i64>, per_page: usize) -> ApiResult<Vec<Task>> {
        match project_id {
            Some(id) => {
                self.begin(
                    "list_tasks_filtered",
                    format!("GET /tasks?project_id={id}&per_page={per_page}"),
                )
                .await?;
                let state = self.lock();
                Ok(state
                    .tasks
                    .iter()
                    .filter(|t| t.project_id == id)
                    .take(per_page)
                    .cloned()
                    .collect())
            }
            None => {
                self.begin("list_tasks", format!("GET /tasks?per_page={per_page}"))
                    .await?;
                let state = self.lock();
                Ok(state.tasks.iter().take(per_page).cloned().collect())
            }
        }
    }

    async fn list_events(&self) -> ApiResult<Vec<CalendarEvent>> {
        self.begin("list_events", "GET /events".to_string()).await?;
        Ok(self.lock().events.clone())
    }

    async fn list_users(&self, per_page: usize) -> ApiResult<Vec<Member>> {
        self.begin("list_users", format!("GET /users?per_page={per_page}"))
            .await?;
        let state = self.lock();
        Ok(state.users.iter().take(per_page).cloned().collect())
    }

    async fn create_task(&self, payload: &NewTask) -> ApiResult<Task> {
        self.begin("create_task", "POST /tasks".to_string()).await?;
        let mut state = self.lock();
        state.next_id += 1;
        let user = payload
            .assigned_to
            .and_then(|uid| state.users.iter().find(|u| u.id == uid).cloned());
        let task = Task {
            id: state.next_id,
            project_id: payload.project_id,
            title: payload.title.clone(),
            description: if payload.description.is_empty() {
                None
            } else {
                Some(payload.description.clone())
            },
            status: payload.status,
            assigned_to: payload.assigned_to,
            user,
            created_at: Some(Utc::now().to_rfc3339()),
        };
        state.tasks.push(task.clone());
        Ok(task)
    }

    async fn create_event(&self, payload: &NewEvent) -> ApiResult<CalendarEvent> {
        self.begin("create_event", "POST /events".to_string())
            .await?;
        let mut state = self.lock();
        state.next_id += 1;
        let event = CalendarEvent {
            id: state.next_id,
            project_id: Some(payload.project_id),
            title: payload.title.clone(),
            description: if payload.description.is_empty() {
                None
            } else {
                Some(payload.description.clone())
            },
            start_time: payload.start_time.clone(),
            end_time: payload.end_time.clone(),
        };
        state.events.push(event.clone());
        sort_by_start(&mut state.events);
        Ok(event)
    }

    async fn attach_members(&self, project_id: i64, user_ids: &[i64]) -> ApiResult<()> {
        self.begin(
            "attach_members",
            format!("POST /projects/{project_id}/members"),
        )
        .await?;
        let mut state = self.lock();
        let members: Vec<Member> = state
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect();
        match state.projects.get_mut(&project_id) {
            Some(project) => {
                project.users = members;
                Ok(())
            }
            None => Err(ApiError::NotFound { message: None }),
        }
    }
}
