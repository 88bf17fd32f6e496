//! Application state shared across handlers

use crate::{
    jwt::JwtService,
    oauth::GoogleVerifier,
    rate_limiter::RateLimiter,
    repositories::{StudentRepository, UserRepository},
    session::SessionManager,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub students: StudentRepository,
    pub users: UserRepository,
    pub jwt: JwtService,
    pub sessions: SessionManager,
    pub google: GoogleVerifier,
    pub login_limiter: RateLimiter,
}
