use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{validate_academic_year, validate_semester, validate_text};
use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PublishAction {
    Publish,
    Unpublish,
}

impl PublishAction {
    pub fn target(self) -> bool {
        matches!(self, Self::Publish)
    }
}

/// Publish or unpublish every result of a cohort.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct BulkPublishRequest {
    #[schema(example = 3)]
    pub semester: i32,
    /// Restrict to students of this department.
    #[schema(example = "Computer Science")]
    pub department: Option<String>,
    #[schema(example = "2024-25")]
    pub academic_year: Option<String>,
    pub action: PublishAction,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BulkPublishResponse {
    /// Number of results whose publication flag actually changed.
    #[schema(example = 12)]
    pub modified: u64,
}

/// Publication state after a toggle.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PublicationResponse {
    pub id: i32,
    pub is_published: bool,
    pub declared_date: Option<DateTime<Utc>>,
}

pub fn validate_bulk_publish(req: &BulkPublishRequest) -> Result<(), AppError> {
    validate_semester(req.semester)?;
    if let Some(ref department) = req.department {
        validate_text("department", department, 128)?;
    }
    if let Some(ref year) = req.academic_year {
        validate_academic_year(year)?;
    }
    Ok(())
}
