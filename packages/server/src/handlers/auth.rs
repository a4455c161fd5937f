use axum::{Json, extract::State, http::StatusCode};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{admin, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AdminLoginRequest, ChangePasswordRequest, LoginResponse, MeResponse, ROLE_ADMIN, ROLE_STUDENT,
    StudentLoginRequest, permissions_for, validate_admin_login, validate_change_password,
    validate_student_login,
};
use crate::state::AppState;
use crate::utils::student::{find_student, find_student_by_roll, normalize_roll_number};
use crate::utils::{hash, jwt};

fn issue_token(
    state: &AppState,
    id: i32,
    subject: String,
    role: &str,
) -> Result<LoginResponse, AppError> {
    let permissions = permissions_for(role);
    let token = jwt::sign(
        id,
        &subject,
        role,
        permissions.clone(),
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(LoginResponse {
        token,
        id,
        subject,
        role: role.to_string(),
        permissions,
    })
}

fn check_password(password: &str, hash: &str) -> Result<(), AppError> {
    let is_valid = hash::verify_password(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if is_valid {
        Ok(())
    } else {
        Err(AppError::InvalidCredentials)
    }
}

#[utoipa::path(
    post,
    path = "/admin/login",
    tag = "Auth",
    operation_id = "adminLogin",
    summary = "Log in as an administrator",
    description = "Authenticates an administrator and returns a JWT valid for 7 days.",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong username or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn admin_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<AdminLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_admin_login(&payload)?;

    let admin = admin::Entity::find()
        .filter(admin::Column::Username.eq(payload.username.trim()))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    check_password(&payload.password, &admin.password)?;

    Ok(Json(issue_token(&state, admin.id, admin.username, ROLE_ADMIN)?))
}

#[utoipa::path(
    post,
    path = "/student/login",
    tag = "Auth",
    operation_id = "studentLogin",
    summary = "Log in as a student",
    description = "Authenticates a student by roll number. Until changed, the password is the date of birth as `YYYYMMDD`.",
    request_body = StudentLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong roll number or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(roll_number = %payload.roll_number))]
pub async fn student_login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<StudentLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_student_login(&payload)?;

    let roll_number = normalize_roll_number(&payload.roll_number);
    let student = find_student_by_roll(&state.db, &roll_number)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    check_password(&payload.password, &student.password)?;

    Ok(Json(issue_token(
        &state,
        student.id,
        student.roll_number,
        ROLE_STUDENT,
    )?))
}

#[utoipa::path(
    post,
    path = "/student/password",
    tag = "Auth",
    operation_id = "changeStudentPassword",
    summary = "Change the current student's password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized or wrong current password (TOKEN_MISSING, TOKEN_INVALID, INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 403, description = "Not a student token (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = auth_user.id))]
pub async fn change_password(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    let student_id = auth_user.student_id()?;
    validate_change_password(&payload)?;

    let student = find_student(&state.db, student_id).await?;
    check_password(&payload.current_password, &student.password)?;

    let hash = hash::hash_password(&payload.new_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let mut active: student::ActiveModel = student.into();
    active.password = Set(hash);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    tracing::info!("Student password changed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    operation_id = "getCurrentUser",
    summary = "Get the authenticated principal",
    responses(
        (status = 200, description = "Current principal", body = MeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(id = auth_user.id, role = %auth_user.role))]
pub async fn me(auth_user: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: auth_user.id,
        subject: auth_user.subject,
        role: auth_user.role,
        permissions: auth_user.permissions,
    })
}
