//! Shared infrastructure for the student records application
//!
//! This crate provides the pieces the records service builds on: PostgreSQL
//! connection pooling, the Redis-backed session cache, and the typed
//! infrastructure errors both expose.

pub mod cache;
pub mod database;
pub mod error;
