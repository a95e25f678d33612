/// HTTP implementation of the remote data client
///
/// Thin reqwest wrapper over the backend's REST endpoints. Every response
/// is read as text first so that non-success statuses can be mapped to the
/// error taxonomy with their server-supplied message, and success bodies
/// can be decoded with a real decode error instead of a transport error.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::payload::{ErrorBody, ListPayload};
use super::Backend;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{CalendarEvent, Member, NewEvent, NewTask, Project, Task};

/// reqwest-backed `Backend` implementation
#[derive(Debug, Clone)]
pub struct HttpBackend {
    /// Shared HTTP client
    http: Client,

    /// Base URL, without trailing slash
    base_url: String,
}

impl HttpBackend {
    /// Creates a backend from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(HttpBackend {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let response = self.http.post(&url).json(body).send().await?;
        decode(response).await
    }
}

/// Decodes a response, mapping non-success statuses to typed errors
async fn decode<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }

    Ok(serde_json::from_str(&body)?)
}

/// Checks a response status, ignoring any success body
async fn expect_success(response: Response) -> ApiResult<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await?;
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::into_message);

    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound { message }
    } else {
        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn fetch_project(&self, id: i64) -> ApiResult<Project> {
        self.get_json(&format!("/projects/{id}"), &[]).await
    }

    async fn list_tasks(&self, project_id: Option<i64>, per_page: usize) -> ApiResult<Vec<Task>> {
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(id) = project_id {
            query.push(("project_id", id.to_string()));
        }
        let payload: ListPayload<Task> = self.get_json("/tasks", &query).await?;
        Ok(payload.into_items())
    }

    async fn list_events(&self) -> ApiResult<Vec<CalendarEvent>> {
        let payload: ListPayload<CalendarEvent> = self.get_json("/events", &[]).await?;
        Ok(payload.into_items())
    }

    async fn list_users(&self, per_page: usize) -> ApiResult<Vec<Member>> {
        let query = [("per_page", per_page.to_string())];
        let payload: ListPayload<Member> = self.get_json("/users", &query).await?;
        Ok(payload.into_items())
    }

    async fn create_task(&self, payload: &NewTask) -> ApiResult<Task> {
        self.post_json("/tasks", payload).await
    }

    async fn create_event(&self, payload: &NewEvent) -> ApiResult<CalendarEvent> {
        self.post_json("/events", payload).await
    }

    async fn attach_members(&self, project_id: i64, user_ids: &[i64]) -> ApiResult<()> {
        let url = self.url(&format!("/projects/{project_id}/members"));
        tracing::debug!(%url, count = user_ids.len(), "POST");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "user_ids": user_ids }))
            .send()
            .await?;
        expect_success(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = Config {
            api_url: "http://localhost:8080/".to_string(),
            ..Config::default()
        };
        let backend = HttpBackend::new(&config).unwrap();
        assert_eq!(backend.url("/tasks"), "http://localhost:8080/tasks");
    }

    #[test]
    fn test_status_error_maps_not_found() {
        let err = status_error(StatusCode::NOT_FOUND, r#"{"message": "no such project"}"#);
        assert!(err.is_not_found());
        assert_eq!(err.user_message("fallback"), "no such project");
    }

    #[test]
    fn test_status_error_keeps_status_and_message() {
        let err = status_error(StatusCode::UNPROCESSABLE_ENTITY, r#"{"error": "bad title"}"#);
        match err {
            ApiError::Status { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message.as_deref(), Some("bad title"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_with_unparseable_body() {
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        assert_eq!(err.user_message("Failed to load tasks."), "Failed to load tasks.");
    }
}
