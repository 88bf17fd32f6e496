//! Validation and normalization of untrusted student payloads
//!
//! A single pure function turns a request body into a canonical
//! [`StudentPayload`] or the first failure encountered. Create and update
//! both go through it, and feeding a payload's own fields back through
//! yields the same payload.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::student::{StudentDraft, StudentPayload, StudentStatus};

/// Why a student payload was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required.")]
    MissingFields,
    #[error("Please provide a valid school email address.")]
    InvalidEmail,
    #[error("Year level must be a number between 1 and 6.")]
    InvalidYearLevel,
    #[error("Admission date is invalid.")]
    InvalidAdmissionDate,
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Failed to compile email regex")
    })
}

/// Validate and normalize an untrusted draft
///
/// Checks run in a fixed order so the reported failure is always the first
/// one: required fields, email shape, year level, admission date. An
/// unrecognized status is not a failure; it coerces to `enrolled`. The
/// contact number may be empty.
pub fn validate_student(draft: &StudentDraft) -> Result<StudentPayload, ValidationError> {
    let student_number = draft.student_number.trim();
    let first_name = draft.first_name.trim();
    let last_name = draft.last_name.trim();
    let email = draft.email.trim().to_lowercase();
    let contact_number = draft.contact_number.trim();
    let program = draft.program.trim();
    let admission_date = draft.admission_date.trim();
    let status = draft.status.trim().to_lowercase();

    if student_number.is_empty()
        || first_name.is_empty()
        || last_name.is_empty()
        || program.is_empty()
        || status.is_empty()
        || email.is_empty()
        || admission_date.is_empty()
    {
        return Err(ValidationError::MissingFields);
    }

    if !email_regex().is_match(&email) {
        return Err(ValidationError::InvalidEmail);
    }

    let year_level =
        parse_year_level(&draft.year_level).ok_or(ValidationError::InvalidYearLevel)?;

    let admission_date =
        parse_admission_date(admission_date).ok_or(ValidationError::InvalidAdmissionDate)?;

    Ok(StudentPayload {
        student_number: student_number.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email,
        contact_number: contact_number.to_string(),
        program: program.to_string(),
        year_level,
        admission_date,
        status: StudentStatus::coerce(&status),
    })
}

/// Year level arrives as a JSON number or a numeric string; anything that is
/// not an integer in [1, 6] is rejected
fn parse_year_level(value: &serde_json::Value) -> Option<i32> {
    let level = match value {
        serde_json::Value::Number(n) => n.as_i64()?,
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (1..=6).contains(&level).then_some(level as i32)
}

/// Accepts `YYYY-MM-DD`, `MM/DD/YYYY`, or an RFC 3339 timestamp
fn parse_admission_date(input: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%m/%d/%Y") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}
