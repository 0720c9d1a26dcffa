//! The todo service: payload types, the `TodoApi` collaborator trait, and
//! the HTTP implementation the binary uses.
//!
//! The screen only ever sees the `TodoApi` trait, so tests drive it with an
//! in-memory fake while the real program talks JSON over HTTP.

// `Future` is the trait behind every `async` value. It is named here only
// because `TodoApi` spells out its return type as `impl Future<...>`.
use std::future::Future;
use std::time::Duration;

// `Serialize`/`Deserialize` are derive macros (with the "derive" feature) that
// generate the JSON mapping for the wire types below.
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Public placeholder API the original mobile app was written against.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

// ── Wire types ───────────────────────────────────────────────────────────────

/// Request body for creating a todo.
///
/// `rename_all = "camelCase"` maps `user_id` to the `userId` key the REST API
/// expects, so Rust code keeps snake_case names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPayload {
    pub title: String,
    pub completed: bool,
    pub user_id: i64,
}

/// The record the API sends back. Only `id` is required; the echoed fields
/// are optional because servers differ in what they return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTodo {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

// ── Collaborator trait ───────────────────────────────────────────────────────

/// Anything that can create a todo.
///
/// `Ok(None)` means the call went through but produced no record; the screen
/// treats that differently from a failed call.
///
/// The method returns `impl Future + Send` rather than being an `async fn` so
/// the `Send` bound is part of the contract: the event loop moves the future
/// into `tokio::spawn`, which requires it.
pub trait TodoApi {
    fn create_todo(
        &self,
        payload: TodoPayload,
    ) -> impl Future<Output = Result<Option<CreatedTodo>, ApiError>> + Send;
}

// ── HTTP implementation ──────────────────────────────────────────────────────

/// `TodoApi` over HTTP: `POST {base_url}/todos` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpTodoApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpTodoApi {
    /// Build a client for `base_url`. A trailing slash is stripped.
    ///
    /// `timeout` of `None` leaves reqwest's default (no overall timeout), so
    /// a call runs until the server answers or the connection fails.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }
}

// An `async fn` in the impl satisfies the trait's `-> impl Future + Send`
// signature, provided the future it produces really is `Send`. The compiler
// checks that here, at the impl.
impl TodoApi for HttpTodoApi {
    async fn create_todo(&self, payload: TodoPayload) -> Result<Option<CreatedTodo>, ApiError> {
        let url = self.todos_url();
        debug!(%url, "POST");

        // `.json()` serializes the payload and sets `Content-Type: application/json`.
        let res = self.http.post(&url).json(&payload).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // An empty body or a literal `null` is a successful call with no
        // record. Deserializing into `Option<_>` handles `null` for free.
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }
        Ok(serde_json::from_str::<Option<CreatedTodo>>(body)?)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> TodoPayload {
        TodoPayload {
            title: "Buy milk".into(),
            completed: false,
            user_id: 1,
        }
    }

    #[test]
    fn payload_uses_camel_case_user_id() {
        let value = serde_json::to_value(payload()).unwrap();
        assert_eq!(value, json!({"title": "Buy milk", "completed": false, "userId": 1}));
    }

    #[test]
    fn created_todo_only_requires_id() {
        let todo: CreatedTodo = serde_json::from_str(r#"{"id": 201}"#).unwrap();
        assert_eq!(todo.id, 201);
        assert!(todo.title.is_none());
        assert!(todo.user_id.is_none());
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let api = HttpTodoApi::new("http://localhost:3000/", None).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.todos_url(), "http://localhost:3000/todos");
    }

    #[test]
    fn base_url_without_scheme_is_rejected() {
        let err = HttpTodoApi::new("localhost:3000", None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
    }

    #[tokio::test]
    async fn create_posts_json_and_parses_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"title": "Buy milk", "completed": false, "userId": 1})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 201,
                "title": "Buy milk",
                "completed": false,
                "userId": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri(), None).unwrap();
        let created = api.create_todo(payload()).await.unwrap().unwrap();
        assert_eq!(created.id, 201);
        assert_eq!(created.title.as_deref(), Some("Buy milk"));
        assert_eq!(created.user_id, Some(1));
    }

    #[tokio::test]
    async fn empty_body_is_no_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri(), None).unwrap();
        assert!(api.create_todo(payload()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn null_body_is_no_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri(), None).unwrap();
        assert!(api.create_todo(payload()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri(), None).unwrap();
        let err = api.create_todo(payload()).await.unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn garbage_body_maps_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/todos"))
            .respond_with(ResponseTemplate::new(201).set_body_string("<html>"))
            .mount(&server)
            .await;

        let api = HttpTodoApi::new(&server.uri(), None).unwrap();
        let err = api.create_todo(payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn unreachable_server_maps_to_transport() {
        // Bind then drop a listener so the port is known to be closed.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = HttpTodoApi::new(&format!("http://127.0.0.1:{port}"), None).unwrap();
        let err = api.create_todo(payload()).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
