use chrono::{DateTime, Utc};
use common::{ExamType, Gender, ResultOutcome, SubjectInput, SubjectLine};
use serde::{Deserialize, Serialize};

use super::shared::{
    Pagination, validate_academic_year, validate_bulk_ids, validate_semester, validate_text,
};
use super::student::StudentSummary;
use crate::entity::{exam_result, student};
use crate::error::AppError;
use crate::utils::student::parse_date_of_birth;

/// Admin result listings use a fixed page size.
pub const RESULTS_PAGE_SIZE: u64 = 10;

/// Upper bound on subjects in one result.
const MAX_SUBJECTS: usize = 20;

/// Request body for manual result entry.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ManualResultRequest {
    #[schema(example = "CS21B001")]
    pub roll_number: String,
    #[schema(example = 3)]
    pub semester: i32,
    #[schema(example = "2024-25")]
    pub academic_year: String,
    /// Defaults to `Regular`.
    pub exam_type: Option<ExamType>,
    /// Required only when the student does not exist yet; enables auto-registration.
    #[schema(example = "1999-01-01")]
    pub date_of_birth: Option<String>,
    /// Display name used when auto-registering ("First Rest...").
    #[schema(example = "Asha Verma")]
    pub name: Option<String>,
    /// Department for auto-registration. Defaults to `General`.
    pub department: Option<String>,
    /// Gender for auto-registration. Defaults to `Other`.
    pub gender: Option<Gender>,
    pub subjects: Vec<SubjectInput>,
}

/// Allow-listed result fields an administrator may change. Replacing the
/// subjects recomputes every aggregate; publication state is not writable here.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateResultRequest {
    pub semester: Option<i32>,
    pub academic_year: Option<String>,
    pub exam_type: Option<ExamType>,
    pub subjects: Option<Vec<SubjectInput>>,
}

impl UpdateResultRequest {
    pub fn is_empty(&self) -> bool {
        self.semester.is_none()
            && self.academic_year.is_none()
            && self.exam_type.is_none()
            && self.subjects.is_none()
    }
}

/// Public result check: roll number plus date of birth.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CheckResultRequest {
    #[schema(example = "CS21B001")]
    pub roll_number: String,
    /// Only the `YYYY-MM-DD` portion is compared.
    #[schema(example = "2002-05-15")]
    pub date_of_birth: String,
    pub semester: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ResultListQuery {
    pub page: Option<u64>,
    /// Case-insensitive roll number match.
    pub search: Option<String>,
    pub semester: Option<i32>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    /// `true` for the published partition, `false` for drafts, absent for both.
    pub published: Option<bool>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct BulkDeleteResultsRequest {
    /// Result IDs to delete (1-500, unique).
    pub ids: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BulkItemError {
    pub id: i32,
    pub error: String,
}

/// Per-record outcome of a bulk delete.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BulkDeleteResultsResponse {
    pub deleted: Vec<i32>,
    pub errors: Vec<BulkItemError>,
}

/// A stored result with decoded subject lines.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultResponse {
    pub id: i32,
    pub student_id: i32,
    #[schema(example = "CS21B001")]
    pub roll_number: String,
    pub semester: i32,
    pub academic_year: String,
    pub exam_type: ExamType,
    pub subjects: Vec<SubjectLine>,
    pub total_marks: i32,
    pub max_marks: i32,
    #[schema(example = 66.67)]
    pub percentage: f64,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub total_credits: i32,
    pub credits_earned: i32,
    pub outcome: ResultOutcome,
    pub is_published: bool,
    pub declared_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<exam_result::Model> for ResultResponse {
    type Error = AppError;

    fn try_from(m: exam_result::Model) -> Result<Self, Self::Error> {
        let subjects: Vec<SubjectLine> = serde_json::from_value(m.subjects).map_err(|e| {
            AppError::Internal(format!("Result {} has malformed subjects: {e}", m.id))
        })?;
        Ok(Self {
            id: m.id,
            student_id: m.student_id,
            roll_number: m.roll_number,
            semester: m.semester,
            academic_year: m.academic_year,
            exam_type: m.exam_type,
            subjects,
            total_marks: m.total_marks,
            max_marks: m.max_marks,
            percentage: m.percentage,
            sgpa: m.sgpa,
            cgpa: m.cgpa,
            total_credits: m.total_credits,
            credits_earned: m.credits_earned,
            outcome: m.outcome,
            is_published: m.is_published,
            declared_date: m.declared_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

/// Convert a batch of stored results, failing on the first malformed row.
pub fn result_responses(models: Vec<exam_result::Model>) -> Result<Vec<ResultResponse>, AppError> {
    models.into_iter().map(ResultResponse::try_from).collect()
}

/// Response to manual result entry. `student_created` reports auto-registration.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ManualResultResponse {
    pub result: ResultResponse,
    pub student_created: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckResultResponse {
    pub student: StudentSummary,
    pub results: Vec<ResultResponse>,
}

/// Row of the admin result listing.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminResultItem {
    pub id: i32,
    pub roll_number: String,
    /// Absent when the owning student has been deleted.
    pub student_name: Option<String>,
    pub department: Option<String>,
    pub semester: i32,
    pub academic_year: String,
    pub exam_type: ExamType,
    pub total_marks: i32,
    pub max_marks: i32,
    pub percentage: f64,
    pub sgpa: Option<f64>,
    pub outcome: ResultOutcome,
    pub is_published: bool,
    pub declared_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl AdminResultItem {
    pub fn new(result: exam_result::Model, student: Option<student::Model>) -> Self {
        let (student_name, department) = match student {
            Some(s) => (
                Some(full_name(&s.first_name, &s.last_name)),
                Some(s.department),
            ),
            None => (None, None),
        };
        Self {
            id: result.id,
            roll_number: result.roll_number,
            student_name,
            department,
            semester: result.semester,
            academic_year: result.academic_year,
            exam_type: result.exam_type,
            total_marks: result.total_marks,
            max_marks: result.max_marks,
            percentage: result.percentage,
            sgpa: result.sgpa,
            outcome: result.outcome,
            is_published: result.is_published,
            declared_date: result.declared_date,
            created_at: result.created_at,
        }
    }
}

/// "First Last", dropping the `.` placeholder last name.
pub fn full_name(first: &str, last: &str) -> String {
    if last.is_empty() || last == "." {
        first.to_string()
    } else {
        format!("{first} {last}")
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultListResponse {
    pub data: Vec<AdminResultItem>,
    pub pagination: Pagination,
}

fn validate_subject_count(subjects: &[SubjectInput]) -> Result<(), AppError> {
    if subjects.is_empty() || subjects.len() > MAX_SUBJECTS {
        return Err(AppError::Validation(format!(
            "A result must have 1-{MAX_SUBJECTS} subjects"
        )));
    }
    Ok(())
}

pub fn validate_manual_result(req: &ManualResultRequest) -> Result<(), AppError> {
    validate_text("roll_number", &req.roll_number, 32)?;
    validate_semester(req.semester)?;
    validate_academic_year(&req.academic_year)?;
    validate_subject_count(&req.subjects)?;
    if let Some(ref dob) = req.date_of_birth {
        parse_date_of_birth(dob)?;
    }
    if let Some(ref department) = req.department {
        validate_text("department", department, 128)?;
    }
    Ok(())
}

pub fn validate_update_result(req: &UpdateResultRequest) -> Result<(), AppError> {
    if let Some(semester) = req.semester {
        validate_semester(semester)?;
    }
    if let Some(ref year) = req.academic_year {
        validate_academic_year(year)?;
    }
    if let Some(ref subjects) = req.subjects {
        validate_subject_count(subjects)?;
    }
    Ok(())
}

pub fn validate_check_result(req: &CheckResultRequest) -> Result<(), AppError> {
    if req.roll_number.trim().is_empty() {
        return Err(AppError::Validation("Roll number is required".into()));
    }
    if req.date_of_birth.trim().is_empty() {
        return Err(AppError::Validation("Date of birth is required".into()));
    }
    if let Some(semester) = req.semester {
        validate_semester(semester)?;
    }
    Ok(())
}

pub fn validate_bulk_delete_results(req: &BulkDeleteResultsRequest) -> Result<(), AppError> {
    validate_bulk_ids(&req.ids, "ids", 500)
}
