/// Project details view model
///
/// `ProjectScreen` owns all state the project details view renders: the
/// three independently fetched sections (project, tasks, events), the task
/// query state, the mutation workflow drafts, and the member picker. It is
/// the only writer of that state; fetched data is never shared across
/// screens.
///
/// # Concurrency
///
/// `load` starts the three fetch sequences concurrently; they complete in
/// any order and each commits through its own `FetchGuard` token, so a
/// stale completion (the identifier changed while it was in flight) is
/// silently dropped. Mutation workflows are serialized per workflow by a
/// busy flag.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskdeck::api::MockBackend;
/// use taskdeck::screen::ProjectScreen;
///
/// # async fn example() {
/// let backend = Arc::new(MockBackend::new());
/// let screen = ProjectScreen::new(backend);
/// screen.load(1).await;
///
/// let page = screen.visible_tasks();
/// println!("{} tasks match", page.total);
/// # }
/// ```

use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::api::Backend;
use crate::fetch::{load_project_events, load_project_tasks, FetchGuard, Resource};
use crate::models::{CalendarEvent, EventDraft, Member, Project, Role, Task, TaskDraft, TaskStatus};
use crate::permissions;
use crate::query::{QueryCache, QueryOutcome, SortDir, SortKey, TaskQuery};

/// Page size for the member picker's user directory fetch
pub const USER_PICKER_PAGE_SIZE: usize = 1000;

/// Mutation workflow error
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A submission for this workflow is already in flight
    #[error("another submission is in progress")]
    Busy,

    /// The draft is not submittable
    #[error("{0}")]
    Validation(String),

    /// The server rejected the submission; the message is user-facing
    #[error("{0}")]
    Rejected(String),
}

/// Member picker state for the attach-members workflow
#[derive(Debug, Clone, Default)]
pub struct MemberPicker {
    /// Whether the picker is open
    pub open: bool,

    /// Whether the user directory fetch is in flight
    pub loading: bool,

    /// Full user directory, as fetched
    pub users: Vec<Member>,

    /// Currently picked user ids
    pub picked: Vec<i64>,

    /// Free-text filter over the directory
    pub query: String,

    /// Whether an attach call is in flight
    pub busy: bool,
}

/// All state owned by the project details view
#[derive(Debug, Default)]
pub struct ScreenState {
    /// Identifier of the project being shown
    pub project_id: i64,

    /// Project section
    pub project: Resource<Project>,

    /// Tasks section
    pub tasks: Resource<Vec<Task>>,

    /// Events section, kept sorted ascending by start time
    pub events: Resource<Vec<CalendarEvent>>,

    /// Task list query state
    pub query: TaskQuery,

    /// Create-task form state
    pub task_draft: TaskDraft,

    /// Create-event form state
    pub event_draft: EventDraft,

    /// Attach-members workflow state
    pub picker: MemberPicker,

    /// Whether the create-task modal is open
    pub show_create_task: bool,

    /// Whether the create-event modal is open
    pub show_create_event: bool,

    /// Create-task submission in flight
    pub creating_task: bool,

    /// Create-event submission in flight
    pub creating_event: bool,

    /// Bumped on every change to the task collection
    pub(crate) tasks_revision: u64,

    /// Cached query pipeline result
    pub(crate) cache: QueryCache,
}

/// View model for the project details screen
pub struct ProjectScreen {
    backend: Arc<dyn Backend>,
    state: Mutex<ScreenState>,
    project_guard: FetchGuard,
    tasks_guard: FetchGuard,
    events_guard: FetchGuard,
}

impl ProjectScreen {
    /// Creates a screen bound to a backend
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        ProjectScreen {
            backend,
            state: Mutex::new(ScreenState::default()),
            project_guard: FetchGuard::default(),
            tasks_guard: FetchGuard::default(),
            events_guard: FetchGuard::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().expect("screen state lock poisoned")
    }

    /// Reads the screen state
    pub fn with_state<R>(&self, f: impl FnOnce(&ScreenState) -> R) -> R {
        f(&self.state())
    }

    /// Loads the screen for a project
    ///
    /// Starts the three independent fetch sequences concurrently. Calling
    /// this again (same or different id) invalidates any still-running
    /// sequences; their late completions will not be committed.
    pub async fn load(&self, project_id: i64) {
        {
            let mut state = self.state();
            state.project_id = project_id;
            state.project = Resource::Loading;
            state.tasks = Resource::Loading;
            state.events = Resource::Loading;
        }

        let project_token = self.project_guard.start();
        let tasks_token = self.tasks_guard.start();
        let events_token = self.events_guard.start();

        tokio::join!(
            self.load_project_section(project_id, project_token),
            self.load_tasks_section(project_id, tasks_token),
            self.load_events_section(project_id, events_token),
        );
    }

    async fn load_project_section(&self, project_id: i64, token: CancellationToken) {
        let result = self.backend.fetch_project(project_id).await;

        let mut state = self.state();
        if token.is_cancelled() {
            tracing::debug!(project_id, "dropping stale project response");
            return;
        }
        state.project = match result {
            Ok(project) => Resource::Ready(project),
            Err(err) if err.is_not_found() => Resource::Missing,
            Err(err) => Resource::Failed(err.user_message("Failed to load project.")),
        };
    }

    async fn load_tasks_section(&self, project_id: i64, token: CancellationToken) {
        let result = load_project_tasks(self.backend.as_ref(), project_id).await;

        let mut state = self.state();
        if token.is_cancelled() {
            tracing::debug!(project_id, "dropping stale tasks response");
            return;
        }
        match result {
            Ok(tasks) => {
                state.tasks = Resource::Ready(tasks);
                state.tasks_revision += 1;
            }
            Err(err) => {
                state.tasks = Resource::Failed(err.user_message("Failed to load tasks."));
            }
        }
    }

    async fn load_events_section(&self, project_id: i64, token: CancellationToken) {
        let result = load_project_events(self.backend.as_ref(), project_id).await;

        let mut state = self.state();
        if token.is_cancelled() {
            tracing::debug!(project_id, "dropping stale events response");
            return;
        }
        state.events = match result {
            Ok(events) => Resource::Ready(events),
            Err(err) => Resource::Failed(err.user_message("Failed to load events.")),
        };
    }

    /// Tasks for the current page, per the query pipeline
    ///
    /// Recomputed only when the task collection or the query changed since
    /// the last call. Empty while tasks are loading or failed.
    pub fn visible_tasks(&self) -> QueryOutcome {
        let mut state = self.state();
        let ScreenState {
            tasks,
            tasks_revision,
            query,
            cache,
            ..
        } = &mut *state;

        match tasks {
            Resource::Ready(items) => cache.get_or_compute(*tasks_revision, query, items).clone(),
            _ => QueryOutcome::default(),
        }
    }

    /// Whether the given user may manage the loaded project
    pub fn can_manage(&self, user_id: i64, role: Role) -> bool {
        self.state()
            .project
            .value()
            .map(|project| permissions::can_manage(user_id, role, project))
            .unwrap_or(false)
    }

    // ---- query state ------------------------------------------------------

    /// Sets the free-text task filter
    pub fn set_filter_text(&self, text: impl Into<String>) {
        self.state().query.set_text(text);
    }

    /// Sets the status filter
    pub fn set_status_filter(&self, status: Option<TaskStatus>) {
        self.state().query.set_status(status);
    }

    /// Sets the sort key
    pub fn set_sort_key(&self, key: SortKey) {
        self.state().query.set_sort_key(key);
    }

    /// Sets the sort direction
    pub fn set_sort_dir(&self, dir: SortDir) {
        self.state().query.set_sort_dir(dir);
    }

    /// Moves to a page
    pub fn set_page(&self, page: usize) {
        self.state().query.set_page(page);
    }

    /// Sets the page size
    pub fn set_page_size(&self, size: usize) {
        self.state().query.set_page_size(size);
    }

    // ---- create task workflow ---------------------------------------------

    /// Opens the create-task modal
    pub fn open_create_task(&self) {
        self.state().show_create_task = true;
    }

    /// Closes the create-task modal, keeping the draft
    pub fn close_create_task(&self) {
        self.state().show_create_task = false;
    }

    /// Replaces the create-task draft
    pub fn set_task_draft(&self, draft: TaskDraft) {
        self.state().task_draft = draft;
    }

    /// Submits the create-task draft
    ///
    /// On success the created task is prepended to the local collection
    /// when it belongs to the current project, and the draft and modal are
    /// reset. On failure the draft and modal are left untouched so the
    /// user can retry.
    pub async fn submit_task(&self) -> Result<Task, WorkflowError> {
        let payload = {
            let mut state = self.state();
            if state.creating_task {
                return Err(WorkflowError::Busy);
            }
            let project_id = state
                .project
                .value()
                .map(|p| p.id)
                .ok_or_else(|| WorkflowError::Validation("Project is not loaded".to_string()))?;
            state
                .task_draft
                .validate()
                .map_err(|err| WorkflowError::Validation(err.to_string()))?;
            state.creating_task = true;
            state.task_draft.clone().into_payload(project_id)
        };

        let result = self.backend.create_task(&payload).await;

        let mut state = self.state();
        state.creating_task = false;
        match result {
            Ok(created) => {
                if created.project_id == state.project_id {
                    let ScreenState {
                        tasks,
                        tasks_revision,
                        ..
                    } = &mut *state;
                    if let Resource::Ready(items) = tasks {
                        items.insert(0, created.clone());
                        *tasks_revision += 1;
                    }
                }
                state.task_draft = TaskDraft::default();
                state.show_create_task = false;
                Ok(created)
            }
            Err(err) => Err(WorkflowError::Rejected(
                err.user_message("Failed to create task."),
            )),
        }
    }

    /// Merges an externally edited task back into the local collection
    pub fn apply_task_update(&self, updated: Task) {
        let mut state = self.state();
        let ScreenState {
            tasks,
            tasks_revision,
            ..
        } = &mut *state;

        if let Resource::Ready(items) = tasks {
            let mut changed = false;
            for task in items.iter_mut() {
                if task.id == updated.id {
                    *task = updated.clone();
                    changed = true;
                }
            }
            if changed {
                *tasks_revision += 1;
            }
        }
    }

    // ---- create event workflow --------------------------------------------

    /// Opens the create-event modal
    pub fn open_create_event(&self) {
        self.state().show_create_event = true;
    }

    /// Closes the create-event modal, keeping the draft
    pub fn close_create_event(&self) {
        self.state().show_create_event = false;
    }

    /// Replaces the create-event draft
    pub fn set_event_draft(&self, draft: EventDraft) {
        self.state().event_draft = draft;
    }

    /// Submits the create-event draft
    ///
    /// On success the created event is inserted and the list re-sorted
    /// ascending by start time; the draft and modal are reset. On failure
    /// both are left untouched.
    pub async fn submit_event(&self) -> Result<CalendarEvent, WorkflowError> {
        let payload = {
            let mut state = self.state();
            if state.creating_event {
                return Err(WorkflowError::Busy);
            }
            state
                .event_draft
                .validate()
                .map_err(|err| WorkflowError::Validation(err.to_string()))?;
            state.creating_event = true;
            state.event_draft.clone().into_payload(state.project_id)
        };

        let result = self.backend.create_event(&payload).await;

        let mut state = self.state();
        state.creating_event = false;
        match result {
            Ok(created) => {
                if let Resource::Ready(events) = &mut state.events {
                    events.push(created.clone());
                    crate::models::event::sort_by_start(events);
                }
                state.event_draft = EventDraft::default();
                state.show_create_event = false;
                Ok(created)
            }
            Err(err) => Err(WorkflowError::Rejected(
                err.user_message("Failed to create event"),
            )),
        }
    }

    // ---- attach members workflow ------------------------------------------

    /// Opens the member picker and loads the user directory
    ///
    /// Picks are seeded from the current membership snapshot. A directory
    /// fetch failure leaves the picker open with an empty list.
    pub async fn open_member_picker(&self) {
        {
            let mut state = self.state();
            let picked = state
                .project
                .value()
                .map(|p| p.member_ids())
                .unwrap_or_default();
            state.picker.open = true;
            state.picker.loading = true;
            state.picker.users.clear();
            state.picker.picked = picked;
        }

        let result = self.backend.list_users(USER_PICKER_PAGE_SIZE).await;

        let mut state = self.state();
        state.picker.loading = false;
        state.picker.users = match result {
            Ok(users) => users,
            Err(err) => {
                tracing::debug!(error = %err, "failed to load users for member picker");
                Vec::new()
            }
        };
    }

    /// Closes the member picker
    pub fn close_member_picker(&self) {
        self.state().picker.open = false;
    }

    /// Toggles one user in the picked set
    pub fn toggle_pick(&self, user_id: i64) {
        let mut state = self.state();
        let picked = &mut state.picker.picked;
        if let Some(index) = picked.iter().position(|id| *id == user_id) {
            picked.remove(index);
        } else {
            picked.push(user_id);
        }
    }

    /// Sets the picker's free-text filter
    pub fn set_member_query(&self, query: impl Into<String>) {
        self.state().picker.query = query.into();
    }

    /// User directory filtered by the picker query
    pub fn filtered_members(&self) -> Vec<Member> {
        let state = self.state();
        filter_members(&state.picker.users, &state.picker.query)
    }

    /// Saves the picked members
    ///
    /// Attaching is a replace-style operation, so instead of merging
    /// locally the project is refetched afterwards and the membership
    /// snapshot replaced wholesale.
    pub async fn save_members(&self) -> Result<(), WorkflowError> {
        let (project_id, picked) = {
            let mut state = self.state();
            if state.picker.busy {
                return Err(WorkflowError::Busy);
            }
            let project_id = state
                .project
                .value()
                .map(|p| p.id)
                .ok_or_else(|| WorkflowError::Validation("Project is not loaded".to_string()))?;
            state.picker.busy = true;
            (project_id, state.picker.picked.clone())
        };

        let result = async {
            self.backend.attach_members(project_id, &picked).await?;
            self.backend.fetch_project(project_id).await
        }
        .await;

        let mut state = self.state();
        state.picker.busy = false;
        match result {
            Ok(project) => {
                state.project = Resource::Ready(project);
                state.picker.open = false;
                state.picker.query.clear();
                Ok(())
            }
            Err(err) => Err(WorkflowError::Rejected(err.user_message(
                "Failed to attach members. Ensure the backend route exists.",
            ))),
        }
    }
}

/// Case-insensitive filter over the user directory: matches name, email,
/// or position
pub fn filter_members(users: &[Member], query: &str) -> Vec<Member> {
    let needle = query.to_lowercase();
    users
        .iter()
        .filter(|user| {
            user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
                || user
                    .position
                    .as_deref()
                    .unwrap_or("")
                    .to_lowercase()
                    .contains(&needle)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i64, name: &str, email: &str, position: Option<&str>) -> Member {
        Member {
            id,
            name: name.to_string(),
            email: email.to_string(),
            role: Role::Member,
            position: position.map(|p| p.to_string()),
        }
    }

    #[test]
    fn test_filter_members_matches_any_field() {
        let users = vec![
            member(1, "Dana", "dana@example.com", Some("Designer")),
            member(2, "Erik", "erik@example.com", Some("Backend engineer")),
            member(3, "Farah", "farah@design.io", None),
        ];

        let by_name = filter_members(&users, "dana");
        assert_eq!(by_name.len(), 1);

        let by_position = filter_members(&users, "ENGINEER");
        assert_eq!(by_position.len(), 1);
        assert_eq!(by_position[0].id, 2);

        let by_email = filter_members(&users, "design.io");
        assert_eq!(by_email.len(), 1);
        assert_eq!(by_email[0].id, 3);

        assert_eq!(filter_members(&users, "").len(), 3);
    }
}
