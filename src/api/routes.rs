//! API Routes
//!
//! Configures the Axum router with all student records endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_student, delete_student, health_handler, list_students, update_student, AppState,
};

/// Path of the students resource.
pub const STUDENTS_PATH: &str = "/api/students";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET|POST|PUT|DELETE /api/students` - Student records
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            STUDENTS_PATH,
            get(list_students)
                .post(create_student)
                .put(update_student)
                .delete(delete_student),
        )
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
