//! Request and Response models for the student records API
//!
//! This module defines the student record itself and the DTOs used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;
pub mod student;

// Re-export commonly used types
pub use requests::{parse_body, CreateStudentRequest, DeleteStudentRequest, UpdateStudentRequest};
pub use responses::{CreatedResponse, ErrorResponse, HealthResponse, SuccessResponse};
pub use student::{StudentFields, StudentRecord, STUDENT_FIELD_NAMES};
