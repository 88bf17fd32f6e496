//! Student records service
//!
//! A small REST API over a relational store of student records. Users sign
//! in manually (username + Argon2-hashed password) or through Google
//! federation; signed session tokens gate the student routes, with record
//! mutations restricted to admin and registrar roles.

pub mod error;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod state;
pub mod validation;
