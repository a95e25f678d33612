/// Remote data client
///
/// The `Backend` trait is the single seam between the view model and the
/// REST backend. The production implementation is `HttpBackend` (reqwest);
/// `MockBackend` provides scripted responses for tests and demos.
///
/// Both bare-array and `{data: [...]}` envelope list responses are
/// normalized here, before anything reaches the query pipeline.

pub mod http;
pub mod mock;
pub mod payload;

pub use http::HttpBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::{CalendarEvent, Member, NewEvent, NewTask, Project, Task};

/// Contract for the REST backend
///
/// All list results are already normalized to plain vectors. Implementations
/// must be shareable across concurrently running fetch sequences.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Fetches a single project with its membership snapshot
    async fn fetch_project(&self, id: i64) -> ApiResult<Project>;

    /// Lists tasks, optionally server-filtered by project
    async fn list_tasks(&self, project_id: Option<i64>, per_page: usize) -> ApiResult<Vec<Task>>;

    /// Lists all events (the backend offers no project filter)
    async fn list_events(&self) -> ApiResult<Vec<CalendarEvent>>;

    /// Lists users for the member picker
    async fn list_users(&self, per_page: usize) -> ApiResult<Vec<Member>>;

    /// Creates a task, returning the server's authoritative record
    async fn create_task(&self, payload: &NewTask) -> ApiResult<Task>;

    /// Creates an event, returning the server's authoritative record
    async fn create_event(&self, payload: &NewEvent) -> ApiResult<CalendarEvent>;

    /// Replaces a project's membership with the given user ids
    ///
    /// No response body is assumed beyond the status; callers refetch the
    /// project afterwards.
    async fn attach_members(&self, project_id: i64, user_ids: &[i64]) -> ApiResult<()>;
}
