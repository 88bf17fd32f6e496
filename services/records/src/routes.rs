//! Records service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{
    error::ApiError,
    identity::{self, Authenticated, LoginOutcome, RegisterOutcome},
    jwt::unix_now,
    middleware::{auth_middleware, require_staff},
    models::student::StudentDraft,
    models::user::Role,
    session::{self, BearerToken, SessionContext},
    state::AppState,
    validation::validate_student,
};

/// Request for manual account registration
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct RegisterRequest {
    pub fullname: String,
    pub username: String,
    pub password: String,
    pub role: Option<String>,
}

/// Request for manual login
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request for federated login
#[derive(Deserialize, Default)]
#[serde(default)]
pub struct GoogleLoginRequest {
    pub token: String,
}

/// Response for both login paths
///
/// Field names follow the legacy wire contract; the token and landing route
/// are additions the redesigned session model needs.
#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(rename = "redirectTo", skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    pub message: String,
}

impl LoginResponse {
    fn authenticated(auth: &Authenticated, token: String, redirect_to: &str, message: &str) -> Self {
        Self {
            success: true,
            fullname: Some(auth.full_name.clone()),
            role: Some(auth.role),
            token: Some(token),
            redirect_to: Some(redirect_to.to_string()),
            message: message.to_string(),
        }
    }

    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            fullname: None,
            role: None,
            token: None,
            redirect_to: None,
            message: message.to_string(),
        }
    }
}

/// Create the router for the records service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/students", get(list_students).post(create_student))
        .route("/students/summary", get(student_summary))
        .route(
            "/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/logout", post(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/google-login", post(google_login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "records-service"
    }))
}

/// Create a manual account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.fullname.is_empty() || payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("All fields are required.".to_string()));
    }

    let outcome = identity::register(
        &state.users,
        &payload.fullname,
        &payload.username,
        &payload.password,
        payload.role.as_deref(),
    )
    .await
    .map_err(|e| {
        error!("Registration error: {}", e);
        ApiError::Internal
    })?;

    match outcome {
        RegisterOutcome::Created => Ok(Json(json!({
            "success": true,
            "message": "Registration successful!"
        }))),
        RegisterOutcome::UsernameTaken => Ok(Json(json!({
            "success": false,
            "message": "Username already exists."
        }))),
    }
}

/// Manual login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required.".to_string(),
        ));
    }

    let allowed = state
        .login_limiter
        .is_allowed(&payload.username)
        .await
        .map_err(|e| {
            error!("Rate limiter error: {}", e);
            ApiError::Internal
        })?;
    if !allowed {
        return Err(ApiError::TooManyRequests);
    }

    info!("Login attempt for user: {}", payload.username);

    let outcome = identity::resolve_manual(&state.users, &payload.username, &payload.password)
        .await
        .map_err(|e| {
            error!("Login error: {}", e);
            ApiError::Internal
        })?;

    match outcome {
        LoginOutcome::Authenticated(auth) => {
            let response = open_session(
                &state,
                &auth,
                session::landing_route(auth.role),
                "Login successful!",
            )
            .await?;
            Ok(Json(response))
        }
        LoginOutcome::Rejected(message) => Ok(Json(LoginResponse::rejected(message))),
    }
}

/// Federated login via a Google ID token
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let identity_assertion = state
        .google
        .verify_id_token(&payload.token)
        .await
        .map_err(|e| {
            error!("Google login error: {}", e);
            ApiError::Internal
        })?;

    let auth = identity::resolve_federated(&state.users, &identity_assertion)
        .await
        .map_err(|e| {
            error!("Google login error: {}", e);
            ApiError::Internal
        })?;

    let response = open_session(
        &state,
        &auth,
        session::federated_landing_route(auth.role),
        "Google login successful!",
    )
    .await?;
    Ok(Json(response))
}

/// Issue a session token and record the session
async fn open_session(
    state: &AppState,
    auth: &Authenticated,
    redirect_to: &str,
    message: &str,
) -> Result<LoginResponse, ApiError> {
    let token = state
        .jwt
        .issue(auth.user_id, &auth.full_name, auth.role)
        .map_err(|e| {
            error!("Failed to issue session token: {}", e);
            ApiError::Internal
        })?;

    state.sessions.open(auth.user_id, &token).await.map_err(|e| {
        error!("Failed to open session: {}", e);
        ApiError::Internal
    })?;

    Ok(LoginResponse::authenticated(auth, token, redirect_to, message))
}

/// Tear down the current session
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
) -> Result<impl IntoResponse, ApiError> {
    let claims = state
        .jwt
        .validate(&token.0)
        .map_err(|_| ApiError::Unauthorized)?;

    let now = unix_now().map_err(|e| {
        error!("Failed to get current time: {}", e);
        ApiError::Internal
    })?;

    let remaining = claims.exp.saturating_sub(now);
    state
        .sessions
        .close(claims.sub, &token.0, remaining)
        .await
        .map_err(|e| {
            error!("Failed to close session: {}", e);
            ApiError::Internal
        })?;

    Ok(Json(json!({
        "success": true,
        "message": "Logged out successfully"
    })))
}

/// List every student, newest first
pub async fn list_students(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let students = state.students.list_all().await.map_err(ApiError::from)?;
    Ok(Json(students))
}

/// Fetch one student
pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let student = state
        .students
        .get_by_id(id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    Ok(Json(student))
}

/// Create a student record
pub async fn create_student(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Json(draft): Json<StudentDraft>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&ctx)?;

    let payload =
        validate_student(&draft).map_err(|e| ApiError::Validation(e.to_string()))?;

    state.students.create(&payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Student added successfully"
    })))
}

/// Replace every field of a student record
pub async fn update_student(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<i64>,
    Json(draft): Json<StudentDraft>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&ctx)?;

    let payload =
        validate_student(&draft).map_err(|e| ApiError::Validation(e.to_string()))?;

    state.students.update(id, &payload).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Student updated successfully"
    })))
}

/// Delete a student record
pub async fn delete_student(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_staff(&ctx)?;

    state.students.delete(id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Student deleted successfully"
    })))
}

/// Aggregate statistics over the students table
pub async fn student_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.students.summary().await.map_err(ApiError::from)?;
    Ok(Json(summary))
}
