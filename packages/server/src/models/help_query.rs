use chrono::{DateTime, Utc};
use common::QueryStatus;
use serde::{Deserialize, Serialize};

use super::shared::validate_text;
use crate::entity::help_query;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateQueryRequest {
    #[schema(example = "Marks missing for CS301")]
    pub subject: String,
    pub message: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReplyQueryRequest {
    pub reply: String,
    /// Defaults to `Resolved`.
    pub status: Option<QueryStatus>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct QueryListQuery {
    pub status: Option<QueryStatus>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct QueryResponse {
    pub id: i32,
    pub student_id: i32,
    pub subject: String,
    pub message: String,
    pub reply: Option<String>,
    pub status: QueryStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<help_query::Model> for QueryResponse {
    fn from(m: help_query::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            subject: m.subject,
            message: m.message,
            reply: m.reply,
            status: m.status,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_query(req: &CreateQueryRequest) -> Result<(), AppError> {
    validate_text("subject", &req.subject, 200)?;
    validate_text("message", &req.message, 5000)
}

pub fn validate_reply_query(req: &ReplyQueryRequest) -> Result<(), AppError> {
    validate_text("reply", &req.reply, 5000)
}
