//! API client tests against a mock HTTP server.

use taskdeck::api::{ApiClient, ApiError, LoginRequest, RegisterRequest};
use taskdeck::session::{Session, SessionStore, User};
use taskdeck::task::{TaskDraft, TaskPatch, TaskStatus};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user() -> User {
    User {
        id: "u1".to_string(),
        email: "ana@example.com".to_string(),
        name: "Ana Souza".to_string(),
    }
}

fn store(dir: &tempfile::TempDir) -> SessionStore {
    SessionStore::new(dir.path().join("session.json"))
}

/// A client whose store already holds a valid session for `tok-123`.
fn authed_client(base_url: &str, dir: &tempfile::TempDir) -> ApiClient {
    let store = store(dir);
    store.save(&Session::new("tok-123".to_string(), user()));
    ApiClient::new(base_url, store)
}

fn task_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": "Buy milk",
        "description": "2 liters",
        "dueDate": "2024-01-15T03:00:00.000Z",
        "status": status,
        "userId": "u1",
    })
}

#[tokio::test]
async fn login_stores_the_session_and_returns_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "ana@example.com",
            "password": "secret",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "user": { "id": "u1", "email": "ana@example.com", "name": "Ana Souza" },
            "token": "tok-123",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    let mut client = ApiClient::new(server.uri(), store.clone());
    assert!(!client.is_authenticated());

    let session = client
        .login(LoginRequest {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "tok-123");
    assert_eq!(session.user, user());
    assert!(client.is_authenticated());

    let stored = store.load().expect("session persisted to disk");
    assert_eq!(stored.token, "tok-123");
    assert_eq!(stored.user, user());
}

#[tokio::test]
async fn login_failure_surfaces_the_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut client = ApiClient::new(server.uri(), store(&dir));

    let err = client
        .login(LoginRequest {
            email: "ana@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert!(!client.is_authenticated());
}

#[tokio::test]
async fn login_failure_without_a_body_falls_back_to_a_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut client = ApiClient::new(server.uri(), store(&dir));

    let err = client
        .login(LoginRequest {
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn register_creates_the_session_like_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(serde_json::json!({
            "name": "Ana Souza",
            "email": "ana@example.com",
            "password": "secret",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "user": { "id": "u1", "email": "ana@example.com", "name": "Ana Souza" },
            "token": "tok-456",
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut client = ApiClient::new(server.uri(), store(&dir));

    let session = client
        .register(RegisterRequest {
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(session.token, "tok-456");
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn list_maps_server_statuses_to_client_form() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            task_json("t1", "PENDING"),
            task_json("t2", "DONE"),
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = authed_client(&server.uri(), &dir);

    let tasks = client.list_tasks().await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].status, TaskStatus::Pending);
    assert_eq!(tasks[1].status, TaskStatus::Completed);
    assert_eq!(tasks[0].id, "t1");
    assert_eq!(tasks[0].user_id, "u1");
}

#[tokio::test]
async fn create_sends_server_status_and_maps_the_response_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(body_json(serde_json::json!({
            "title": "Buy milk",
            "description": "",
            "dueDate": "2024-01-01T03:00:00.000Z",
            "status": "PENDING",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json("t9", "PENDING")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = authed_client(&server.uri(), &dir);

    let created = client
        .create_task(&TaskDraft {
            title: "Buy milk".to_string(),
            description: String::new(),
            due_date: "2024-01-01T03:00:00.000Z".to_string(),
            status: TaskStatus::Pending,
        })
        .await
        .unwrap();

    // The response comes back in client form, same as the list path.
    assert_eq!(created.id, "t9");
    assert_eq!(created.status, TaskStatus::Pending);
}

#[tokio::test]
async fn update_sends_only_the_provided_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .and(header("Authorization", "Bearer tok-123"))
        .and(body_json(serde_json::json!({ "status": "DONE" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = authed_client(&server.uri(), &dir);

    client
        .update_task("t1", &TaskPatch::status_only(TaskStatus::Completed))
        .await
        .unwrap();
}

#[tokio::test]
async fn full_update_carries_every_field_in_server_form() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tasks/t1"))
        .and(body_json(serde_json::json!({
            "title": "Buy oat milk",
            "description": "1 liter",
            "dueDate": "2024-02-01T03:00:00.000Z",
            "status": "DONE",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("t1", "DONE")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = authed_client(&server.uri(), &dir);

    let draft = TaskDraft {
        title: "Buy oat milk".to_string(),
        description: "1 liter".to_string(),
        due_date: "2024-02-01T03:00:00.000Z".to_string(),
        status: TaskStatus::Completed,
    };
    client
        .update_task("t1", &TaskPatch::from_draft(&draft))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_hits_the_task_route() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/tasks/t1"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = authed_client(&server.uri(), &dir);

    client.delete_task("t1").await.unwrap();
}

#[tokio::test]
async fn authenticated_calls_without_a_session_never_reach_the_server() {
    let server = MockServer::start().await;
    // Any request at all would fail the test.
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = ApiClient::new(server.uri(), store(&dir));

    assert!(matches!(
        client.list_tasks().await,
        Err(ApiError::MissingToken)
    ));
    let draft = TaskDraft {
        title: "Buy milk".to_string(),
        description: String::new(),
        due_date: "2024-01-01T03:00:00.000Z".to_string(),
        status: TaskStatus::Pending,
    };
    assert!(matches!(
        client.create_task(&draft).await,
        Err(ApiError::MissingToken)
    ));
    assert!(matches!(
        client
            .update_task("t1", &TaskPatch::status_only(TaskStatus::Pending))
            .await,
        Err(ApiError::MissingToken)
    ));
    assert!(matches!(
        client.delete_task("t1").await,
        Err(ApiError::MissingToken)
    ));
}

#[tokio::test]
async fn logout_clears_the_context_and_the_stored_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = store(&dir);
    store.save(&Session::new("tok-123".to_string(), user()));
    let mut client = ApiClient::new("http://127.0.0.1:9", store.clone());
    assert!(client.is_authenticated());

    client.logout();

    assert!(!client.is_authenticated());
    assert!(store.load().is_none());
    assert!(matches!(
        client.list_tasks().await,
        Err(ApiError::MissingToken)
    ));
}

#[tokio::test]
async fn server_error_on_list_surfaces_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tasks"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "message": "database is down"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let client = authed_client(&server.uri(), &dir);

    let err = client.list_tasks().await.unwrap_err();
    assert_eq!(err.to_string(), "database is down");
}
