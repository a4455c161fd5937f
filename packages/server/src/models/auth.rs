use crate::error::AppError;
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";

/// Static role-permission mapping embedded into issued tokens.
const ROLE_PERMISSIONS: &[(&str, &str)] = &[
    (ROLE_ADMIN, "student:manage"),
    (ROLE_ADMIN, "course:manage"),
    (ROLE_ADMIN, "result:manage"),
    (ROLE_ADMIN, "result:publish"),
    (ROLE_ADMIN, "query:reply"),
    (ROLE_STUDENT, "result:view_own"),
    (ROLE_STUDENT, "query:create"),
];

/// Permissions granted to a role.
pub fn permissions_for(role: &str) -> Vec<String> {
    ROLE_PERMISSIONS
        .iter()
        .filter(|(r, _)| *r == role)
        .map(|(_, p)| p.to_string())
        .collect()
}

/// Request body for administrator login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AdminLoginRequest {
    #[schema(example = "registrar")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_admin_login(payload: &AdminLoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Request body for student login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct StudentLoginRequest {
    #[schema(example = "CS21B001")]
    pub roll_number: String,
    /// Defaults to the date of birth as `YYYYMMDD` until changed.
    #[schema(example = "20020515")]
    pub password: String,
}

pub fn validate_student_login(payload: &StudentLoginRequest) -> Result<(), AppError> {
    if payload.roll_number.trim().is_empty() {
        return Err(AppError::Validation("Roll number must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Request body for a student changing their own password.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    /// New password (8-128 characters).
    pub new_password: String,
}

pub fn validate_change_password(payload: &ChangePasswordRequest) -> Result<(), AppError> {
    if payload.new_password.len() < 8 || payload.new_password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token valid for 7 days.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    /// Admin or student ID.
    #[schema(example = 42)]
    pub id: i32,
    /// Username for admins, roll number for students.
    #[schema(example = "CS21B001")]
    pub subject: String,
    #[schema(example = "student")]
    pub role: String,
    #[schema(example = json!(["result:view_own"]))]
    pub permissions: Vec<String>,
}

/// Current authenticated principal.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "CS21B001")]
    pub subject: String,
    #[schema(example = "student")]
    pub role: String,
    #[schema(example = json!(["result:view_own"]))]
    pub permissions: Vec<String>,
}
