//! Public Messages Module
//!
//! Fixed, user-facing error messages for each student operation.
//! Failure detail never reaches the client; only these strings do.

use std::fmt;

// == Operation ==
/// The four operations exposed on the students resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Stable name used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Locale ==
/// Language of the public error messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Ko,
}

impl Locale {
    /// Parses a locale tag such as `en`, `ko` or `ko-KR`.
    ///
    /// Returns None for unsupported languages.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let language = tag.split(['-', '_']).next().unwrap_or_default();
        match language.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "ko" => Some(Locale::Ko),
            _ => None,
        }
    }

    /// Message returned when `operation` fails for any reason.
    pub fn failure_message(self, operation: Operation) -> &'static str {
        match (self, operation) {
            (Locale::En, Operation::List) => "failed to load student information",
            (Locale::En, Operation::Create) => "failed to save student information",
            (Locale::En, Operation::Update) => "failed to update student information",
            (Locale::En, Operation::Delete) => "failed to delete student information",
            (Locale::Ko, Operation::List) => "학생 정보를 불러오는데 실패했습니다.",
            (Locale::Ko, Operation::Create) => "학생 정보를 저장하는데 실패했습니다.",
            (Locale::Ko, Operation::Update) => "학생 정보를 수정하는데 실패했습니다.",
            (Locale::Ko, Operation::Delete) => "학생 정보를 삭제하는데 실패했습니다.",
        }
    }

    /// Message returned when an update targets an unknown id.
    pub fn not_found_message(self) -> &'static str {
        match self {
            Locale::En => "student information not found",
            Locale::Ko => "학생 정보를 찾을 수 없습니다.",
        }
    }
}
