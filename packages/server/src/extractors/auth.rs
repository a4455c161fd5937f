use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};

use crate::error::AppError;
use crate::models::auth::{ROLE_ADMIN, ROLE_STUDENT};
use crate::state::AppState;
use crate::utils::jwt::{self, Claims};

/// Authenticated principal extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication.
/// Permission checks happen via `require_permission()` in the handler body.
pub struct AuthUser {
    /// Admin ID or student ID depending on `role`.
    pub id: i32,
    /// Username for admins, roll number for students.
    pub subject: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Returns `Ok(())` if the user has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.permissions.iter().any(|p| p == permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// The student ID behind a student token, `PermissionDenied` for admins.
    pub fn student_id(&self) -> Result<i32, AppError> {
        if self.role == ROLE_STUDENT {
            Ok(self.id)
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

/// Decode the bearer token in `headers`.
pub fn bearer_claims(headers: &HeaderMap, secret: &str) -> Result<Claims, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::TokenMissing)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;

    jwt::verify(token, secret).map_err(|_| AppError::TokenInvalid)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = bearer_claims(&parts.headers, &state.config.auth.jwt_secret)?;

        Ok(AuthUser {
            id: claims.uid,
            subject: claims.sub,
            role: claims.role,
            permissions: claims.permissions,
        })
    }
}
