//! Request DTOs for the student records API
//!
//! Defines the structure of incoming HTTP request bodies. Bodies are
//! parsed by hand from raw bytes so that a bad body fails the operation
//! like any other error, whatever its content type.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::models::StudentFields;

/// Parses a JSON request body.
pub fn parse_body<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    serde_json::from_slice(body)
}

/// Request body for creating a student (POST /api/students)
///
/// # Fields
/// - `name`, `student_phone`, `mother_phone`: required keys, values stored as sent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStudentRequest {
    #[serde(flatten)]
    pub fields: StudentFields,
}

/// Request body for overwriting a student (PUT /api/students)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStudentRequest {
    /// Id of the document to overwrite
    pub id: String,
    #[serde(flatten)]
    pub fields: StudentFields,
}

/// Request body for deleting a student (DELETE /api/students)
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteStudentRequest {
    /// Id of the document to delete
    pub id: String,
}
