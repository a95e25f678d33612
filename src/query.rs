/// List query pipeline
///
/// Pure, deterministic filter → sort → paginate chain over an in-memory
/// task collection. The pipeline is idempotent: re-running it with
/// unchanged inputs yields an identical ordered sequence. `QueryCache`
/// makes recomputation lazy by keying the last result on the task
/// collection revision and a snapshot of the query.
///
/// Page reset rule: changing filter text, status, sort key, sort direction,
/// or page size resets the current page to 1. Changing the page itself does
/// not, so paging can never trigger a reset loop.

use std::cmp::Ordering;

use crate::models::{Task, TaskStatus};

/// Default number of tasks per page
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Sortable columns of the task list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Server-assigned creation time
    CreatedAt,

    /// Task title
    Title,

    /// Workflow status
    Status,

    /// Assignee display name
    Assignee,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    /// Ascending
    Asc,

    /// Descending
    Desc,
}

/// Transient, UI-only query state for the task list
///
/// Fields are private so every change goes through a setter and the page
/// reset rule cannot be bypassed.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    text: String,
    status: Option<TaskStatus>,
    sort_key: SortKey,
    sort_dir: SortDir,
    page: usize,
    page_size: usize,
}

impl Default for TaskQuery {
    fn default() -> Self {
        TaskQuery {
            text: String::new(),
            status: None,
            sort_key: SortKey::CreatedAt,
            sort_dir: SortDir::Desc,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TaskQuery {
    /// Sets the free-text filter and resets to page 1
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.page = 1;
    }

    /// Sets the status filter (`None` = no constraint) and resets to page 1
    pub fn set_status(&mut self, status: Option<TaskStatus>) {
        self.status = status;
        self.page = 1;
    }

    /// Sets the sort key and resets to page 1
    pub fn set_sort_key(&mut self, key: SortKey) {
        self.sort_key = key;
        self.page = 1;
    }

    /// Sets the sort direction and resets to page 1
    pub fn set_sort_dir(&mut self, dir: SortDir) {
        self.sort_dir = dir;
        self.page = 1;
    }

    /// Sets the page size and resets to page 1
    pub fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
        self.page = 1;
    }

    /// Moves to a page; does not participate in the reset rule
    pub fn set_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    /// Current free-text filter
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current status filter
    pub fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Current sort key
    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Current sort direction
    pub fn sort_dir(&self) -> SortDir {
        self.sort_dir
    }

    /// Current page, 1-based
    pub fn page(&self) -> usize {
        self.page
    }

    /// Current page size
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Runs the full pipeline: filter, sort, then slice out the current page
    pub fn run(&self, tasks: &[Task]) -> QueryOutcome {
        let filtered = filter(tasks, &self.text, self.status);
        let sorted = sort(filtered, self.sort_key, self.sort_dir);
        let items = page_slice(&sorted, self.page, self.page_size).to_vec();
        QueryOutcome {
            total: sorted.len(),
            items,
        }
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Number of tasks matching the filter, across all pages
    pub total: usize,

    /// Tasks on the current page, in sort order
    pub items: Vec<Task>,
}

/// Whether a task matches the free-text and status filters
///
/// Text matches case-insensitively against title, description, or assignee
/// name; the status constraint applies only when set.
pub fn matches(task: &Task, text: &str, status: Option<TaskStatus>) -> bool {
    let needle = text.to_lowercase();
    let in_text = task.title.to_lowercase().contains(&needle)
        || task
            .description
            .as_deref()
            .unwrap_or("")
            .to_lowercase()
            .contains(&needle)
        || task.assignee_name().to_lowercase().contains(&needle);
    let in_status = status.map(|s| task.status == s).unwrap_or(true);
    in_text && in_status
}

/// Filter stage
pub fn filter(tasks: &[Task], text: &str, status: Option<TaskStatus>) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| matches(task, text, status))
        .cloned()
        .collect()
}

/// Comparator for one sort key, ascending
///
/// String keys compare case-insensitively with missing values treated as
/// empty; `created_at` compares parsed timestamps with missing or broken
/// values treated as epoch 0.
pub fn compare(a: &Task, b: &Task, key: SortKey) -> Ordering {
    match key {
        SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortKey::Status => a.status.as_str().cmp(b.status.as_str()),
        SortKey::CreatedAt => a.created_at_millis().cmp(&b.created_at_millis()),
        SortKey::Assignee => a
            .assignee_name()
            .to_lowercase()
            .cmp(&b.assignee_name().to_lowercase()),
    }
}

/// Sort stage; stable, so equal keys keep their incoming order
pub fn sort(mut tasks: Vec<Task>, key: SortKey, dir: SortDir) -> Vec<Task> {
    tasks.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match dir {
            SortDir::Asc => ordering,
            SortDir::Desc => ordering.reverse(),
        }
    });
    tasks
}

/// Pagination stage: the half-open window `[(page-1)*size, page*size)`
/// clamped to the collection bounds
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page = page.max(1);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Lazily recomputed pipeline result
///
/// Keyed on the task collection revision and the query snapshot; the
/// pipeline only reruns when either changed.
#[derive(Debug, Default)]
pub struct QueryCache {
    key: Option<(u64, TaskQuery)>,
    outcome: QueryOutcome,
}

impl QueryCache {
    /// Returns the cached outcome, recomputing it first if the revision or
    /// the query changed since the last run
    pub fn get_or_compute(
        &mut self,
        revision: u64,
        query: &TaskQuery,
        tasks: &[Task],
    ) -> &QueryOutcome {
        let stale = self
            .key
            .as_ref()
            .map_or(true, |(rev, q)| *rev != revision || q != query);

        if stale {
            self.outcome = query.run(tasks);
            self.key = Some((revision, query.clone()));
        }

        &self.outcome
    }
}
