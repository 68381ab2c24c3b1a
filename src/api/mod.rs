//! API Module
//!
//! HTTP handlers and routing for the student records REST API.
//!
//! # Endpoints
//! - `GET /api/students` - List every student
//! - `POST /api/students` - Create a student
//! - `PUT /api/students` - Overwrite a student
//! - `DELETE /api/students` - Delete a student
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
