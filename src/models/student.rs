//! Student Record Module
//!
//! The shape of a student document as the store holds it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Names of the persisted fields, in wire order.
pub const STUDENT_FIELD_NAMES: [&str; 3] = ["name", "student_phone", "mother_phone"];

// == Student Fields ==
/// The three fields written by a create or an update.
///
/// Values are stored exactly as the caller sent them, `null` included.
/// Nothing checks that they are strings, but each key must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentFields {
    /// Student's name
    pub name: Value,
    /// Student's phone number
    pub student_phone: Value,
    /// Mother's phone number
    pub mother_phone: Value,
}

impl StudentFields {
    /// Creates a new set of fields.
    pub fn new(
        name: impl Into<Value>,
        student_phone: impl Into<Value>,
        mother_phone: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            student_phone: student_phone.into(),
            mother_phone: mother_phone.into(),
        }
    }

    /// Iterates over `(field name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        STUDENT_FIELD_NAMES
            .into_iter()
            .zip([&self.name, &self.student_phone, &self.mother_phone])
    }

    /// Converts into a document field map.
    pub fn into_map(self) -> Map<String, Value> {
        STUDENT_FIELD_NAMES
            .into_iter()
            .map(str::to_string)
            .zip([self.name, self.student_phone, self.mother_phone])
            .collect()
    }
}

// == Student Record ==
/// A stored student document together with its store-assigned id.
///
/// `data` holds the document fields as stored, so documents written by
/// other clients keep their extra or missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Store-assigned document id
    pub id: String,
    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl StudentRecord {
    /// Creates a record from raw document data.
    ///
    /// A stored field named `id` is dropped; the document id wins.
    pub fn new(id: impl Into<String>, mut data: Map<String, Value>) -> Self {
        data.remove("id");
        Self {
            id: id.into(),
            data,
        }
    }

    /// Creates a record holding exactly the three student fields.
    pub fn from_fields(id: impl Into<String>, fields: StudentFields) -> Self {
        Self::new(id, fields.into_map())
    }

    /// Returns a stored field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.data.get(field)
    }
}
