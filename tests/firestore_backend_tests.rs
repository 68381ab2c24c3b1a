//! Integration Tests for the Firestore Backend
//!
//! Runs the Firestore store against a local mock of the Firestore REST API.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Map, Value};
use student_records::{
    api::create_router,
    config::FirestoreSettings,
    error::StoreError,
    models::{StudentFields, StudentRecord},
    AppState, FirestoreStore, Locale, StudentStore,
};
use tower::ServiceExt;

/// Reserved characters make the mock check that query values arrive encoded.
const API_KEY: &str = "test key+/=&";
const PROJECT: &str = "demo-project";
const MOCK_PAGE_SIZE: usize = 2;

// == Mock Firestore ==

#[derive(Default)]
struct MockDb {
    documents: BTreeMap<String, Map<String, Value>>,
    next_id: u64,
    list_calls: usize,
}

type Db = Arc<Mutex<MockDb>>;

fn params(query: &Option<String>) -> Vec<(String, String)> {
    let query = query.as_deref().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn error(status: StatusCode, message: &str) -> Response {
    let body = json!({
        "error": { "code": status.as_u16(), "message": message, "status": "ERROR" }
    });
    (status, Json(body)).into_response()
}

fn denied() -> Response {
    error(StatusCode::FORBIDDEN, "Missing or insufficient permissions.")
}

fn unknown_database(project: &str, database: &str) -> Response {
    error(
        StatusCode::NOT_FOUND,
        &format!("The database {database} does not exist for project {project}"),
    )
}

fn document_json(path: &str, id: &str, fields: &Map<String, Value>) -> Value {
    json!({
        "name": format!("{path}/{id}"),
        "fields": fields,
        "createTime": "2024-03-01T00:00:00.000000Z",
        "updateTime": "2024-03-01T00:00:00.000000Z"
    })
}

fn collection_path(project: &str, database: &str, collection: &str) -> String {
    format!("projects/{project}/databases/{database}/documents/{collection}")
}

async fn list_documents(
    State(db): State<Db>,
    Path((project, database, collection)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = params(&query);
    if param(&params, "key") != Some(API_KEY) {
        return denied();
    }
    if project != PROJECT {
        return unknown_database(&project, &database);
    }

    let mut db = db.lock().unwrap();
    db.list_calls += 1;

    let offset: usize = param(&params, "pageToken")
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);
    let path = collection_path(&project, &database, &collection);
    let documents: Vec<Value> = db
        .documents
        .iter()
        .skip(offset)
        .take(MOCK_PAGE_SIZE)
        .map(|(id, fields)| document_json(&path, id, fields))
        .collect();

    let mut body = Map::new();
    if !documents.is_empty() {
        body.insert("documents".into(), Value::Array(documents));
    }
    if offset + MOCK_PAGE_SIZE < db.documents.len() {
        body.insert(
            "nextPageToken".into(),
            Value::from((offset + MOCK_PAGE_SIZE).to_string()),
        );
    }
    Json(Value::Object(body)).into_response()
}

async fn create_document(
    State(db): State<Db>,
    Path((project, database, collection)): Path<(String, String, String)>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response {
    if param(&params(&query), "key") != Some(API_KEY) {
        return denied();
    }

    let mut db = db.lock().unwrap();
    db.next_id += 1;
    let id = format!("doc{:04}", db.next_id);
    let fields = body["fields"].as_object().cloned().unwrap_or_default();
    db.documents.insert(id.clone(), fields.clone());

    let path = collection_path(&project, &database, &collection);
    Json(document_json(&path, &id, &fields)).into_response()
}

async fn update_document(
    State(db): State<Db>,
    Path((project, database, collection, id)): Path<(String, String, String, String)>,
    RawQuery(query): RawQuery,
    Json(body): Json<Value>,
) -> Response {
    let params = params(&query);
    if param(&params, "key") != Some(API_KEY) {
        return denied();
    }
    if project != PROJECT {
        return unknown_database(&project, &database);
    }

    let path = collection_path(&project, &database, &collection);
    let mut db = db.lock().unwrap();
    let must_exist = param(&params, "currentDocument.exists") == Some("true");
    if must_exist && !db.documents.contains_key(&id) {
        return error(
            StatusCode::NOT_FOUND,
            &format!("No document to update: {path}/{id}"),
        );
    }

    let incoming = body["fields"].as_object().cloned().unwrap_or_default();
    let stored = db.documents.entry(id.clone()).or_default();
    for (name, path) in params.iter() {
        if name != "updateMask.fieldPaths" {
            continue;
        }
        match incoming.get(path) {
            Some(value) => {
                stored.insert(path.clone(), value.clone());
            }
            None => {
                stored.remove(path);
            }
        }
    }
    let fields = stored.clone();

    Json(document_json(&path, &id, &fields)).into_response()
}

async fn delete_document(
    State(db): State<Db>,
    Path((_project, _database, _collection, id)): Path<(String, String, String, String)>,
    RawQuery(query): RawQuery,
) -> Response {
    if param(&params(&query), "key") != Some(API_KEY) {
        return denied();
    }

    db.lock().unwrap().documents.remove(&id);
    Json(json!({})).into_response()
}

async fn spawn_mock() -> (String, Db) {
    let db: Db = Arc::new(Mutex::new(MockDb::default()));
    let app = Router::new()
        .route(
            "/v1/projects/:project/databases/:database/documents/:collection",
            get(list_documents).post(create_document),
        )
        .route(
            "/v1/projects/:project/databases/:database/documents/:collection/:id",
            patch(update_document).delete(delete_document),
        )
        .with_state(db.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), db)
}

fn settings(base_url: &str, api_key: Option<&str>) -> FirestoreSettings {
    FirestoreSettings {
        project_id: PROJECT.to_string(),
        database: "(default)".to_string(),
        api_key: api_key.map(str::to_string),
        base_url: base_url.to_string(),
    }
}

/// Builds a store that talks to `base_url` directly, ignoring proxy variables.
fn direct_store(base_url: &str, api_key: Option<&str>) -> FirestoreStore {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    FirestoreStore::with_client(client, &settings(base_url, api_key), "students").unwrap()
}

/// A store pointed at a project the mock does not serve.
fn other_project_store(base_url: &str) -> FirestoreStore {
    let mut wrong = settings(base_url, Some(API_KEY));
    wrong.project_id = "other-project".to_string();
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    FirestoreStore::with_client(client, &wrong, "students").unwrap()
}

async fn mock_store() -> (FirestoreStore, Db) {
    let (base_url, db) = spawn_mock().await;
    (direct_store(&base_url, Some(API_KEY)), db)
}

fn kim() -> StudentFields {
    StudentFields::new("Kim", "010-1111-2222", "010-3333-4444")
}

// == Store Tests ==

#[tokio::test]
async fn test_firestore_lifecycle() {
    let (store, db) = mock_store().await;

    assert!(store.list().await.unwrap().is_empty());

    let id = store.insert(kim()).await.unwrap();
    assert_eq!(id, "doc0001");

    let students = store.list().await.unwrap();
    assert_eq!(students, vec![StudentRecord::from_fields(id.clone(), kim())]);

    let replacement = StudentFields::new("Kim2", Value::Null, 7);
    store.update_by_id(&id, replacement.clone()).await.unwrap();
    let students = store.list().await.unwrap();
    assert_eq!(students, vec![StudentRecord::from_fields(id.clone(), replacement)]);

    store.delete_by_id(&id).await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
    assert!(db.lock().unwrap().documents.is_empty());
}

#[tokio::test]
async fn test_firestore_stores_typed_values() {
    let (store, db) = mock_store().await;

    let id = store.insert(kim()).await.unwrap();

    let db = db.lock().unwrap();
    let stored = &db.documents[&id];
    assert_eq!(stored["name"], json!({"stringValue": "Kim"}));
    assert_eq!(
        stored["mother_phone"],
        json!({"stringValue": "010-3333-4444"})
    );
}

#[tokio::test]
async fn test_firestore_list_follows_pages() {
    let (store, db) = mock_store().await;
    for i in 0..5 {
        store
            .insert(StudentFields::new(format!("student {i}"), Value::Null, Value::Null))
            .await
            .unwrap();
    }

    let students = store.list().await.unwrap();
    let ids: Vec<&str> = students.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["doc0001", "doc0002", "doc0003", "doc0004", "doc0005"]);
    assert_eq!(students[4].get("name"), Some(&json!("student 4")));
    assert_eq!(db.lock().unwrap().list_calls, 3);
}

#[tokio::test]
async fn test_firestore_update_missing_is_not_found() {
    let (store, db) = mock_store().await;

    let result = store.update_by_id("ghost", kim()).await;
    assert!(matches!(result, Err(StoreError::NotFound(id)) if id == "ghost"));
    assert!(db.lock().unwrap().documents.is_empty());
}

#[tokio::test]
async fn test_firestore_unknown_project_is_backend_error() {
    let (base_url, _db) = spawn_mock().await;
    let store = other_project_store(&base_url);

    match store.update_by_id("ghost", kim()).await {
        Err(StoreError::Backend { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("other-project"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_firestore_delete_missing_succeeds() {
    let (store, _db) = mock_store().await;
    assert!(store.delete_by_id("ghost").await.is_ok());
}

#[tokio::test]
async fn test_firestore_rejected_key() {
    let (base_url, _db) = spawn_mock().await;
    let store = direct_store(&base_url, Some("wrong"));

    match store.list().await {
        Err(StoreError::Backend { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "Missing or insufficient permissions.");
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_firestore_unreachable() {
    let store = direct_store("http://127.0.0.1:1/v1", None);

    let result = store.insert(kim()).await;
    assert!(matches!(result, Err(StoreError::Transport(_))));
}

// == Through the HTTP API ==

async fn send(app: &Router, method: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri("/api/students")
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => request.body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_api_over_firestore() {
    let (store, _db) = mock_store().await;
    let app = create_router(AppState::new(Arc::new(store), Locale::En));

    let (status, created) = send(
        &app,
        "POST",
        Some(json!({
            "name": "Kim",
            "student_phone": "010-1111-2222",
            "mother_phone": "010-3333-4444"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        "PUT",
        Some(json!({
            "id": id,
            "name": "Kim2",
            "student_phone": "010-1111-2222",
            "mother_phone": "010-3333-4444"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, students) = send(&app, "GET", None).await;
    assert_eq!(
        students,
        json!([{
            "id": id,
            "name": "Kim2",
            "student_phone": "010-1111-2222",
            "mother_phone": "010-3333-4444"
        }])
    );

    let (status, json) = send(
        &app,
        "PUT",
        Some(json!({
            "id": "ghost",
            "name": "Ghost",
            "student_phone": null,
            "mother_phone": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "student information not found");

    let (status, _) = send(&app, "DELETE", Some(json!({ "id": id }))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, students) = send(&app, "GET", None).await;
    assert_eq!(students, json!([]));
}

#[tokio::test]
async fn test_api_over_unreachable_firestore() {
    let store = direct_store("http://127.0.0.1:1/v1", None);
    let app = create_router(AppState::new(Arc::new(store), Locale::En));

    let (status, json) = send(&app, "GET", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "failed to load student information" }));
}

#[tokio::test]
async fn test_api_lists_stored_documents_as_is() {
    let (store, db) = mock_store().await;
    {
        let mut db = db.lock().unwrap();
        let legacy = json!({
            "name": {"stringValue": "Lee"},
            "grade": {"integerValue": "3"}
        });
        db.documents
            .insert("legacy01".to_string(), legacy.as_object().cloned().unwrap());
    }
    let app = create_router(AppState::new(Arc::new(store), Locale::En));

    let (status, students) = send(&app, "GET", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(students, json!([{ "id": "legacy01", "name": "Lee", "grade": 3 }]));
}

#[tokio::test]
async fn test_api_update_on_unknown_project_fails() {
    let (base_url, _db) = spawn_mock().await;
    let store = other_project_store(&base_url);
    let app = create_router(AppState::new(Arc::new(store), Locale::En));

    let (status, json) = send(
        &app,
        "PUT",
        Some(json!({
            "id": "doc0001",
            "name": "Kim",
            "student_phone": null,
            "mother_phone": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, json!({ "error": "failed to update student information" }));
}
