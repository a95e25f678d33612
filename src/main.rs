//! # taskdeck demo binary
//!
//! Loads one project screen against a live backend and logs what the view
//! would render: the project summary, the first page of tasks, and the
//! upcoming events.
//!
//! ## Usage
//!
//! ```bash
//! TASKDECK_API_URL=http://localhost:8080 cargo run -- 1
//! ```

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskdeck::api::HttpBackend;
use taskdeck::config::Config;
use taskdeck::screen::ProjectScreen;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("taskdeck v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    let project_id: i64 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(1);

    let backend = Arc::new(HttpBackend::new(&config)?);
    let screen = ProjectScreen::new(backend);
    screen.set_page_size(config.task_page_size);
    screen.load(project_id).await;

    screen.with_state(|state| {
        match state.project.value() {
            Some(project) => tracing::info!(
                project_id = project.id,
                name = %project.name,
                members = project.users.len(),
                "project loaded"
            ),
            None => tracing::warn!(project_id, "project unavailable"),
        }

        if let Some(events) = state.events.value() {
            for event in events {
                tracing::info!(event_id = event.id, title = %event.title, start = %event.start_time, "event");
            }
        }
    });

    let page = screen.visible_tasks();
    tracing::info!(total = page.total, "tasks matching current query");
    for task in &page.items {
        tracing::info!(
            task_id = task.id,
            title = %task.title,
            status = task.status.as_str(),
            assignee = task.assignee_name(),
            "task"
        );
    }

    Ok(())
}
