//! Repositories owning the students and users tables
//!
//! Callers never touch SQL or store error codes; conflicts and misses come
//! back as typed outcomes.

pub mod student;
pub mod user;

// Re-export for convenience
pub use student::{StudentRepository, StudentStoreError};
pub use user::UserRepository;
