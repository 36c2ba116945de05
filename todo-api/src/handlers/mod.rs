//! HTTP layer
//!
//! Handlers translate requests into model calls and model outcomes into
//! status codes and JSON envelopes.
//!
//! # Features
//!
//! - **CRUD endpoints**: [`crud::routes`] mounts list, create, show, update and
//!   delete for any [`Resource`](crate::resources::Resource)
//! - **Error mapping**: [`ApiError`] renders every failure as `{"error": ...}`
//! - **List parameters**: [`ListQuery`] parses paging and sort input

pub mod crud;
pub mod error;
pub mod health;
pub mod query;
pub mod response;

use axum::http::Method;
use axum::routing::get;
use axum::Router;

pub use error::{ApiError, ApiErrorKind, ErrorDetail};
pub use query::ListQuery;
pub use response::Envelope;

use crate::resources::{Organization, Todo};
use crate::state::AppState;

/// The complete API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/healthcheck", get(health::healthcheck))
        .merge(crud::routes::<Todo>())
        .merge(crud::routes::<Organization>())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::method_not_allowed(&method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header::{CONTENT_TYPE, LOCATION};
    use axum::http::{HeaderMap, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::handlers::error::{EDIT_CONFLICT_MESSAGE, NOT_FOUND_MESSAGE};

    struct Reply {
        status: StatusCode,
        headers: HeaderMap,
        body: Value,
    }

    fn app() -> Router {
        router(AppState::in_memory())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Reply {
        send_raw(app, method, uri, body.map(|b| b.to_string()), &[]).await
    }

    async fn send_raw(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<String>,
        headers: &[(&str, &str)],
    ) -> Reply {
        let mut request = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let request = match body {
            Some(body) => request
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body)),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        Reply {
            status,
            headers,
            body,
        }
    }

    fn todo_body(task_name: &str, status: &[&str]) -> Value {
        json!({
            "task_name": task_name,
            "description": "Pull the numbers together",
            "notes": "Finance has the export",
            "category": "work",
            "priority": "high",
            "status": status,
        })
    }

    fn organization_body(name: &str, mode: &[&str]) -> Value {
        json!({
            "name": name,
            "level": "University",
            "contact": "Registrar",
            "phone": "501-822-3680",
            "email": "registrar@example.edu",
            "website": "https://example.edu",
            "address": "1 College Road",
            "mode": mode,
        })
    }

    #[tokio::test]
    async fn test_healthcheck() {
        let reply = send(&app(), Method::GET, "/v1/healthcheck", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["status"], "available");
        assert_eq!(reply.body["system_info"]["environment"], "development");
        assert_eq!(reply.body["system_info"]["version"], crate::VERSION);
    }

    #[tokio::test]
    async fn test_create_todo() {
        let app = app();
        let reply = send(
            &app,
            Method::POST,
            "/v1/todoitems",
            Some(todo_body("Write report", &["open"])),
        )
        .await;

        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.headers[LOCATION], "/v1/todoitems/1");
        assert_eq!(reply.body["todo"]["id"], 1);
        assert_eq!(reply.body["todo"]["version"], 1);
        assert_eq!(reply.body["todo"]["task_name"], "Write report");
        assert!(reply.body["todo"]["created_at"].is_string());
    }

    #[tokio::test]
    async fn test_create_validation_failure() {
        let reply = send(
            &app(),
            Method::POST,
            "/v1/todoitems",
            Some(json!({"task_name": "", "status": ["a", "a"]})),
        )
        .await;

        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.body["error"]["task_name"], "must be provided");
        assert_eq!(reply.body["error"]["description"], "must be provided");
        assert_eq!(
            reply.body["error"]["status"],
            "must not contain duplicate entries"
        );
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_json() {
        let reply = send_raw(
            &app(),
            Method::POST,
            "/v1/todoitems",
            Some("{\"task_name\": ".to_string()),
            &[],
        )
        .await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.body["error"].is_string());
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_fields() {
        let mut body = todo_body("Write report", &["open"]);
        body["version"] = json!(7);
        let reply = send(&app(), Method::POST, "/v1/todoitems", Some(body)).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.body["error"]
            .as_str()
            .is_some_and(|m| m.contains("unknown field")));
    }

    #[tokio::test]
    async fn test_show_round_trip_and_bad_ids() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/v1/todoitems",
            Some(todo_body("Write report", &["open"])),
        )
        .await;

        let reply = send(&app, Method::GET, "/v1/todoitems/1", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["todo"]["task_name"], "Write report");

        for uri in ["/v1/todoitems/2", "/v1/todoitems/0", "/v1/todoitems/-3", "/v1/todoitems/abc"] {
            let reply = send(&app, Method::GET, uri, None).await;
            assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(reply.body, json!({"error": NOT_FOUND_MESSAGE}));
        }
    }

    #[tokio::test]
    async fn test_patch_updates_present_fields_and_bumps_version() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/v1/todoitems",
            Some(todo_body("Write report", &["open"])),
        )
        .await;

        let reply = send(
            &app,
            Method::PATCH,
            "/v1/todoitems/1",
            Some(json!({"priority": "low"})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["todo"]["version"], 2);
        assert_eq!(reply.body["todo"]["priority"], "low");
        assert_eq!(reply.body["todo"]["task_name"], "Write report");
    }

    #[tokio::test]
    async fn test_patch_with_stale_expected_version_conflicts() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/v1/todoitems",
            Some(todo_body("Write report", &["open"])),
        )
        .await;
        send(
            &app,
            Method::PATCH,
            "/v1/todoitems/1",
            Some(json!({"notes": "first"})),
        )
        .await;

        let reply = send_raw(
            &app,
            Method::PATCH,
            "/v1/todoitems/1",
            Some(json!({"notes": "second"}).to_string()),
            &[("X-Expected-Version", "1")],
        )
        .await;
        assert_eq!(reply.status, StatusCode::CONFLICT);
        assert_eq!(reply.body, json!({"error": EDIT_CONFLICT_MESSAGE}));

        let reply = send_raw(
            &app,
            Method::PATCH,
            "/v1/todoitems/1",
            Some(json!({"notes": "second"}).to_string()),
            &[("X-Expected-Version", "2")],
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["todo"]["version"], 3);
    }

    #[tokio::test]
    async fn test_patch_validation_and_missing_item() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/v1/todoitems",
            Some(todo_body("Write report", &["open"])),
        )
        .await;

        let reply = send(
            &app,
            Method::PATCH,
            "/v1/todoitems/1",
            Some(json!({"status": []})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.body["error"]["status"], "must contain at least 1 entry");

        let reply = send(
            &app,
            Method::PATCH,
            "/v1/todoitems/99",
            Some(json!({"notes": "x"})),
        )
        .await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = app();
        send(
            &app,
            Method::POST,
            "/v1/todoitems",
            Some(todo_body("Write report", &["open"])),
        )
        .await;

        let reply = send(&app, Method::DELETE, "/v1/todoitems/1", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, json!({"message": "todo item successfully deleted"}));

        let reply = send(&app, Method::DELETE, "/v1/todoitems/1", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);

        let reply = send(&app, Method::DELETE, "/v1/todoitems/999999", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let app = app();
        for i in 0..25 {
            send(
                &app,
                Method::POST,
                "/v1/todoitems",
                Some(todo_body(&format!("Task {i}"), &["open"])),
            )
            .await;
        }

        let reply = send(&app, Method::GET, "/v1/todoitems", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["todos"].as_array().map(Vec::len), Some(20));
        assert_eq!(
            reply.body["metadata"],
            json!({
                "current_page": 1,
                "page_size": 20,
                "first_page": 1,
                "last_page": 2,
                "total_records": 25,
            })
        );

        let reply = send(&app, Method::GET, "/v1/todoitems?page=2&sort=-id", None).await;
        let ids: Vec<i64> = reply.body["todos"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let reply = send(&app(), Method::GET, "/v1/todoitems", None).await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body, json!({"todos": [], "metadata": {}}));
    }

    #[tokio::test]
    async fn test_list_rejects_bad_parameters() {
        let app = app();
        let reply = send(
            &app,
            Method::GET,
            "/v1/todoitems?page=abc&page_size=0&sort=created_at",
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.body["error"]["page"], "must be an integer value");
        assert_eq!(reply.body["error"]["page_size"], "must be greater than zero");
        assert_eq!(reply.body["error"]["sort"], "invalid sort value");
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = app();
        for (name, status) in [
            ("Write report", vec!["urgent"]),
            ("Review report", vec!["urgent", "blocked"]),
            ("Buy milk", vec!["blocked"]),
        ] {
            send(
                &app,
                Method::POST,
                "/v1/todoitems",
                Some(todo_body(name, &status)),
            )
            .await;
        }

        let reply = send(&app, Method::GET, "/v1/todoitems?status=urgent", None).await;
        assert_eq!(reply.body["metadata"]["total_records"], 2);

        let reply = send(
            &app,
            Method::GET,
            "/v1/todoitems?status=urgent,blocked",
            None,
        )
        .await;
        assert_eq!(reply.body["todos"][0]["task_name"], "Review report");
        assert_eq!(reply.body["metadata"]["total_records"], 1);

        let reply = send(&app, Method::GET, "/v1/todoitems?task_name=REPORT", None).await;
        assert_eq!(reply.body["metadata"]["total_records"], 2);
    }

    #[tokio::test]
    async fn test_organizations() {
        let app = app();
        let reply = send(
            &app,
            Method::POST,
            "/v1/organizations",
            Some(organization_body("Example College", &["online"])),
        )
        .await;
        assert_eq!(reply.status, StatusCode::CREATED);
        assert_eq!(reply.headers[LOCATION], "/v1/organizations/1");
        assert_eq!(reply.body["organization"]["mode"], json!(["online"]));

        send(
            &app,
            Method::POST,
            "/v1/organizations",
            Some(organization_body("Example Institute", &["face-to-face"])),
        )
        .await;

        let reply = send(
            &app,
            Method::GET,
            "/v1/organizations?mode=online&sort=-name",
            None,
        )
        .await;
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["organizations"][0]["name"], "Example College");
        assert_eq!(reply.body["metadata"]["total_records"], 1);

        let reply = send(&app, Method::DELETE, "/v1/organizations/2", None).await;
        assert_eq!(reply.body, json!({"message": "organization successfully deleted"}));
    }

    #[tokio::test]
    async fn test_organization_contact_validation() {
        let mut body = organization_body("Example College", &["online"]);
        body["email"] = json!("registrar");
        let reply = send(&app(), Method::POST, "/v1/organizations", Some(body)).await;
        assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(reply.body["error"]["email"], "must be a valid email address");
    }

    #[tokio::test]
    async fn test_unsupported_method() {
        let reply = send(&app(), Method::PUT, "/v1/todoitems/1", Some(json!({}))).await;
        assert_eq!(reply.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            reply.body["error"],
            "the PUT method is not supported for this resource"
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let reply = send(&app(), Method::GET, "/v2/todoitems", None).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND);
        assert_eq!(reply.body, json!({"error": NOT_FOUND_MESSAGE}));
    }
}
