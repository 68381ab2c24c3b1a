//! Student Records - A small REST service for student contact records
//!
//! Exposes list/create/update/delete on `/api/students` over a pluggable
//! document store (in-memory or Cloud Firestore).

pub mod api;
pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod store;

pub use api::AppState;
pub use config::Config;
pub use messages::Locale;
pub use store::{FirestoreStore, MemoryStore, StudentStore};
