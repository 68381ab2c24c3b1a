//! API Handlers
//!
//! HTTP request handlers for the students resource. Each handler makes
//! exactly one store call and maps its outcome to a JSON response.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use tracing::info;

use crate::config::{Config, StoreBackend};
use crate::error::{ApiError, ApiResult, ServiceError, StoreResult};
use crate::messages::{Locale, Operation};
use crate::models::{
    parse_body, CreateStudentRequest, CreatedResponse, DeleteStudentRequest, HealthResponse,
    StudentRecord, SuccessResponse, UpdateStudentRequest,
};
use crate::store::{FirestoreStore, MemoryStore, StudentStore};

/// Application state shared across all handlers.
///
/// Holds the injected store; handlers keep no state of their own.
#[derive(Clone)]
pub struct AppState {
    /// Backing document store
    pub store: Arc<dyn StudentStore>,
    /// Language of public error messages
    pub locale: Locale,
}

impl AppState {
    /// Creates a new AppState around the given store.
    pub fn new(store: Arc<dyn StudentStore>, locale: Locale) -> Self {
        Self { store, locale }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the store backend selected by the Config.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        let store: Arc<dyn StudentStore> = match &config.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Firestore(settings) => {
                Arc::new(FirestoreStore::new(settings, &config.collection)?)
            }
        };
        Ok(Self::new(store, config.locale))
    }

    fn fail(&self, operation: Operation, cause: impl Into<ServiceError>) -> ApiError {
        ApiError::new(operation, self.locale, cause)
    }
}

/// Handler for GET /api/students
///
/// Returns every student in store order.
pub async fn list_students(State(state): State<AppState>) -> ApiResult<Json<Vec<StudentRecord>>> {
    let students = state
        .store
        .list()
        .await
        .map_err(|err| state.fail(Operation::List, err))?;

    Ok(Json(students))
}

/// Handler for POST /api/students
///
/// Stores the three student fields as sent and returns the new id.
pub async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<CreatedResponse>> {
    let req: CreateStudentRequest =
        parse_body(&body).map_err(|err| state.fail(Operation::Create, err))?;

    let id = state
        .store
        .insert(req.fields)
        .await
        .map_err(|err| state.fail(Operation::Create, err))?;

    info!(id = %id, "student created");
    Ok(Json(CreatedResponse::new(id)))
}

/// Handler for PUT /api/students
///
/// Overwrites all three fields of the student with the given id.
pub async fn update_student(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<SuccessResponse>> {
    let req: UpdateStudentRequest =
        parse_body(&body).map_err(|err| state.fail(Operation::Update, err))?;

    state
        .store
        .update_by_id(&req.id, req.fields)
        .await
        .map_err(|err| state.fail(Operation::Update, err))?;

    info!(id = %req.id, "student updated");
    Ok(Json(SuccessResponse::ok()))
}

/// Handler for DELETE /api/students
///
/// Removes the student with the given id. Unknown ids are not an error.
pub async fn delete_student(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<SuccessResponse>> {
    let req: DeleteStudentRequest =
        parse_body(&body).map_err(|err| state.fail(Operation::Delete, err))?;

    state
        .store
        .delete_by_id(&req.id)
        .await
        .map_err(|err| state.fail(Operation::Delete, err))?;

    info!(id = %req.id, "student deleted");
    Ok(Json(SuccessResponse::ok()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
