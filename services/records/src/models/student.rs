//! Student record model and wire payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Enrollment status of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    Enrolled,
    Leave,
    Graduated,
    Inactive,
}

impl StudentStatus {
    /// Parse a trimmed, lowercased status string
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "enrolled" => Some(Self::Enrolled),
            "leave" => Some(Self::Leave),
            "graduated" => Some(Self::Graduated),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }

    /// Coerce arbitrary input to a known status; anything unrecognized
    /// becomes `Enrolled` rather than a rejection
    pub fn coerce(value: &str) -> Self {
        Self::parse(value).unwrap_or(Self::Enrolled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Leave => "leave",
            Self::Graduated => "graduated",
            Self::Inactive => "inactive",
        }
    }
}

/// Student entity as returned from the store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: i64,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Empty string when no contact number is on file
    pub contact_number: String,
    pub program: String,
    pub year_level: i32,
    pub admission_date: NaiveDate,
    pub status: StudentStatus,
    pub updated_at: DateTime<Utc>,
}

/// Untrusted create/update request body
///
/// Every field is optional on the wire; `year_level` arrives as either a
/// JSON number or a numeric string, so it is kept raw until validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudentDraft {
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub program: String,
    pub year_level: serde_json::Value,
    pub admission_date: String,
    pub status: String,
}

/// Canonical student payload produced by validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact_number: String,
    pub program: String,
    pub year_level: i32,
    pub admission_date: NaiveDate,
    pub status: StudentStatus,
}

/// One status bucket in the summary breakdown
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// One program bucket in the summary top list
#[derive(Debug, Clone, Serialize)]
pub struct ProgramCount {
    pub program: String,
    pub count: i64,
}

/// Aggregate statistics over the whole students table
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub total: i64,
    pub status_breakdown: Vec<StatusCount>,
    pub top_programs: Vec<ProgramCount>,
}
