//! Records service models

pub mod student;
pub mod user;

// Re-export for convenience
pub use student::{
    ProgramCount, StatusCount, StudentDraft, StudentPayload, StudentRecord, StudentStatus,
    StudentSummary,
};
pub use user::{Role, UserAccount};
