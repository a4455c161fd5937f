use chrono::{DateTime, Utc};
use common::{ExamType, ResultOutcome};
use serde::{Deserialize, Serialize};

use super::result::full_name;
use super::shared::{validate_academic_year, validate_semester};
use crate::entity::{exam_result, student};
use crate::error::AppError;

pub const DEFAULT_MERIT_LIMIT: usize = 10;
pub const MAX_MERIT_LIMIT: usize = 100;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct MeritListQuery {
    pub semester: Option<i32>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    /// Number of ranked entries (1-100, default 10).
    pub limit: Option<usize>,
}

impl MeritListQuery {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_MERIT_LIMIT)
    }
}

/// One ranked line of a merit list.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeritEntry {
    /// 1-based rank.
    #[schema(example = 1)]
    pub rank: usize,
    pub result_id: i32,
    pub roll_number: String,
    pub student_name: String,
    pub department: String,
    pub semester: i32,
    pub academic_year: String,
    pub sgpa: Option<f64>,
    pub percentage: f64,
    pub total_marks: i32,
    pub max_marks: i32,
}

impl MeritEntry {
    pub fn new(rank: usize, result: exam_result::Model, student: student::Model) -> Self {
        Self {
            rank,
            result_id: result.id,
            roll_number: result.roll_number,
            student_name: full_name(&student.first_name, &student.last_name),
            department: student.department,
            semester: result.semester,
            academic_year: result.academic_year,
            sgpa: result.sgpa,
            percentage: result.percentage,
            total_marks: result.total_marks,
            max_marks: result.max_marks,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct GazetteQuery {
    pub semester: i32,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    /// Defaults to `true`.
    pub published_only: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GazetteEntry {
    pub roll_number: String,
    pub student_name: Option<String>,
    pub father_name: Option<String>,
    pub department: Option<String>,
    pub exam_type: ExamType,
    pub academic_year: String,
    pub total_marks: i32,
    pub max_marks: i32,
    pub percentage: f64,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub outcome: ResultOutcome,
    pub is_published: bool,
    pub declared_date: Option<DateTime<Utc>>,
}

impl GazetteEntry {
    pub fn new(result: exam_result::Model, student: Option<student::Model>) -> Self {
        let (student_name, father_name, department) = match student {
            Some(s) => (
                Some(full_name(&s.first_name, &s.last_name)),
                s.father_name,
                Some(s.department),
            ),
            None => (None, None, None),
        };
        Self {
            roll_number: result.roll_number,
            student_name,
            father_name,
            department,
            exam_type: result.exam_type,
            academic_year: result.academic_year,
            total_marks: result.total_marks,
            max_marks: result.max_marks,
            percentage: result.percentage,
            sgpa: result.sgpa,
            cgpa: result.cgpa,
            outcome: result.outcome,
            is_published: result.is_published,
            declared_date: result.declared_date,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GazetteResponse {
    pub semester: i32,
    pub total: usize,
    pub passed: usize,
    pub data: Vec<GazetteEntry>,
}

/// Headline counters for the admin dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub students: u64,
    pub courses: u64,
    pub results: u64,
    pub published_results: u64,
    pub unpublished_results: u64,
    pub open_queries: u64,
}

pub fn validate_merit_query(query: &MeritListQuery) -> Result<(), AppError> {
    if let Some(semester) = query.semester {
        validate_semester(semester)?;
    }
    if let Some(ref year) = query.academic_year {
        validate_academic_year(year)?;
    }
    if !(1..=MAX_MERIT_LIMIT).contains(&query.limit()) {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_MERIT_LIMIT}"
        )));
    }
    Ok(())
}

pub fn validate_gazette_query(query: &GazetteQuery) -> Result<(), AppError> {
    validate_semester(query.semester)?;
    if let Some(ref year) = query.academic_year {
        validate_academic_year(year)?;
    }
    Ok(())
}
