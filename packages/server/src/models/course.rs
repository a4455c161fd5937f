use chrono::{DateTime, Utc};
use common::grading::{MAX_CREDITS, MAX_SUBJECT_MARKS};
use serde::{Deserialize, Serialize};

use super::shared::{validate_semester, validate_text};
use crate::entity::course;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    /// Unique course code. Stored uppercased.
    #[schema(example = "CS301")]
    pub code: String,
    #[schema(example = "Operating Systems")]
    pub name: String,
    #[schema(example = 4)]
    pub credits: i32,
    #[schema(example = "Computer Science")]
    pub department: String,
    #[schema(example = 5)]
    pub semester: i32,
    /// Defaults to 100.
    pub max_marks: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateCourseRequest {
    pub name: Option<String>,
    pub credits: Option<i32>,
    pub department: Option<String>,
    pub semester: Option<i32>,
    pub max_marks: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CourseListQuery {
    pub department: Option<String>,
    pub semester: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub credits: i32,
    pub department: String,
    pub semester: i32,
    pub max_marks: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<course::Model> for CourseResponse {
    fn from(m: course::Model) -> Self {
        Self {
            id: m.id,
            code: m.code,
            name: m.name,
            credits: m.credits,
            department: m.department,
            semester: m.semester,
            max_marks: m.max_marks,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_credits(credits: i32) -> Result<(), AppError> {
    if !(0..=MAX_CREDITS).contains(&credits) {
        return Err(AppError::Validation(format!(
            "Credits must be between 0 and {MAX_CREDITS}"
        )));
    }
    Ok(())
}

fn validate_max_marks(max_marks: i32) -> Result<(), AppError> {
    if !(1..=MAX_SUBJECT_MARKS).contains(&max_marks) {
        return Err(AppError::Validation(format!(
            "max_marks must be between 1 and {MAX_SUBJECT_MARKS}"
        )));
    }
    Ok(())
}

pub fn validate_create_course(req: &CreateCourseRequest) -> Result<(), AppError> {
    validate_text("code", &req.code, 16)?;
    if !req.code.trim().chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::Validation(
            "Course code may contain only letters and digits".into(),
        ));
    }
    validate_text("name", &req.name, 128)?;
    validate_credits(req.credits)?;
    validate_text("department", &req.department, 128)?;
    validate_semester(req.semester)?;
    if let Some(max) = req.max_marks {
        validate_max_marks(max)?;
    }
    Ok(())
}

pub fn validate_update_course(req: &UpdateCourseRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("name", name, 128)?;
    }
    if let Some(credits) = req.credits {
        validate_credits(credits)?;
    }
    if let Some(ref department) = req.department {
        validate_text("department", department, 128)?;
    }
    if let Some(semester) = req.semester {
        validate_semester(semester)?;
    }
    if let Some(max) = req.max_marks {
        validate_max_marks(max)?;
    }
    Ok(())
}
