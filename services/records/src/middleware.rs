//! Bearer-token middleware guarding the student routes

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::error;

use crate::{
    error::ApiError,
    session::{BearerToken, SessionContext},
    state::AppState,
};

/// Validate the session token and inject a [`SessionContext`]
///
/// Tokens revoked by logout are treated the same as invalid ones.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let claims = state.jwt.validate(&token).map_err(|e| {
        error!("Failed to validate session token: {}", e);
        ApiError::Unauthorized
    })?;

    let revoked = state.sessions.is_revoked(&token).await.map_err(|e| {
        error!("Failed to check token revocation: {}", e);
        ApiError::Internal
    })?;

    if revoked {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(SessionContext {
        user_id: claims.sub,
        full_name: claims.fullname,
        role: claims.role,
    });
    req.extensions_mut().insert(BearerToken(token));

    Ok(next.run(req).await)
}

/// Record mutations are restricted to admin and registrar
pub fn require_staff(ctx: &SessionContext) -> Result<(), ApiError> {
    if ctx.role.is_staff() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;
    use uuid::Uuid;

    fn ctx(role: Role) -> SessionContext {
        SessionContext {
            user_id: Uuid::new_v4(),
            full_name: "Ana Reyes".to_string(),
            role,
        }
    }

    #[test]
    fn staff_pass_the_mutation_gate() {
        assert!(require_staff(&ctx(Role::Admin)).is_ok());
        assert!(require_staff(&ctx(Role::Registrar)).is_ok());
    }

    #[test]
    fn students_are_forbidden_from_mutations() {
        assert!(matches!(
            require_staff(&ctx(Role::Student)),
            Err(ApiError::Forbidden)
        ));
    }
}
