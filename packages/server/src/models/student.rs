use chrono::{DateTime, Utc};
use common::Gender;
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, double_option, validate_semester, validate_text};
use crate::entity::student;
use crate::error::AppError;
use crate::utils::student::parse_date_of_birth;

/// Request body for registering a student.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    /// Unique roll number. Stored uppercased.
    #[schema(example = "CS21B001")]
    pub roll_number: String,
    #[schema(example = "Asha")]
    pub first_name: String,
    /// Defaults to `.` when omitted.
    #[schema(example = "Verma")]
    pub last_name: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339.
    #[schema(example = "2002-05-15")]
    pub date_of_birth: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub gender: Gender,
    #[schema(example = "Computer Science")]
    pub department: String,
    #[schema(example = "B.Tech")]
    pub program: Option<String>,
    #[schema(example = 3)]
    pub semester: i32,
    #[schema(example = "2021-2025")]
    pub batch: Option<String>,
    #[schema(example = 2021)]
    pub admission_year: Option<i32>,
    /// Initial password. Defaults to the date of birth as `YYYYMMDD`.
    pub password: Option<String>,
}

/// Allow-listed student fields an administrator may change.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub father_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub mother_name: Option<Option<String>>,
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub category: Option<Option<String>>,
    pub gender: Option<Gender>,
    pub department: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub program: Option<Option<String>>,
    pub semester: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub batch: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub admission_year: Option<Option<i32>>,
    pub is_verified: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct StudentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive match on roll number or name.
    pub search: Option<String>,
    pub department: Option<String>,
    pub semester: Option<i32>,
}

/// Full student record for administrators.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub roll_number: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub date_of_birth: DateTime<Utc>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub category: Option<String>,
    pub gender: Gender,
    pub department: String,
    pub program: Option<String>,
    pub semester: i32,
    pub batch: Option<String>,
    pub admission_year: Option<i32>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<student::Model> for StudentResponse {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            roll_number: m.roll_number,
            first_name: m.first_name,
            last_name: m.last_name,
            father_name: m.father_name,
            mother_name: m.mother_name,
            date_of_birth: m.date_of_birth,
            email: m.email,
            phone: m.phone,
            category: m.category,
            gender: m.gender,
            department: m.department,
            program: m.program,
            semester: m.semester,
            batch: m.batch,
            admission_year: m.admission_year,
            is_verified: m.is_verified,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Identity block printed on a marksheet. Contains nothing sensitive.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentSummary {
    pub id: i32,
    #[schema(example = "CS21B001")]
    pub roll_number: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub department: String,
    pub program: Option<String>,
    pub semester: i32,
    pub batch: Option<String>,
}

impl From<student::Model> for StudentSummary {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            roll_number: m.roll_number,
            first_name: m.first_name,
            last_name: m.last_name,
            father_name: m.father_name,
            mother_name: m.mother_name,
            department: m.department,
            program: m.program,
            semester: m.semester,
            batch: m.batch,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<StudentResponse>,
    pub pagination: Pagination,
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = email.len() <= 254
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation("Email address is invalid".into()));
    }
    Ok(())
}

fn validate_phone(phone: &str) -> Result<(), AppError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .trim()
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' '));
    if !allowed || !(7..=15).contains(&digits) {
        return Err(AppError::Validation("Phone number is invalid".into()));
    }
    Ok(())
}

fn validate_admission_year(year: i32) -> Result<(), AppError> {
    if !(1950..=2100).contains(&year) {
        return Err(AppError::Validation(
            "admission_year must be between 1950 and 2100".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_student(req: &CreateStudentRequest) -> Result<(), AppError> {
    validate_text("roll_number", &req.roll_number, 32)?;
    if !req
        .roll_number
        .trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '/'))
    {
        return Err(AppError::Validation(
            "roll_number may contain only letters, digits, '-' and '/'".into(),
        ));
    }
    validate_text("first_name", &req.first_name, 64)?;
    if let Some(ref last) = req.last_name {
        validate_text("last_name", last, 64)?;
    }
    parse_date_of_birth(&req.date_of_birth)?;
    validate_text("department", &req.department, 128)?;
    validate_semester(req.semester)?;
    if let Some(ref email) = req.email {
        validate_email(email)?;
    }
    if let Some(ref phone) = req.phone {
        validate_phone(phone)?;
    }
    if let Some(year) = req.admission_year {
        validate_admission_year(year)?;
    }
    if let Some(ref password) = req.password
        && (password.len() < 8 || password.len() > 128)
    {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_student(req: &UpdateStudentRequest) -> Result<(), AppError> {
    if let Some(ref first) = req.first_name {
        validate_text("first_name", first, 64)?;
    }
    if let Some(ref last) = req.last_name {
        validate_text("last_name", last, 64)?;
    }
    if let Some(ref dob) = req.date_of_birth {
        parse_date_of_birth(dob)?;
    }
    if let Some(Some(ref email)) = req.email {
        validate_email(email)?;
    }
    if let Some(Some(ref phone)) = req.phone {
        validate_phone(phone)?;
    }
    if let Some(ref department) = req.department {
        validate_text("department", department, 128)?;
    }
    if let Some(semester) = req.semester {
        validate_semester(semester)?;
    }
    if let Some(Some(year)) = req.admission_year {
        validate_admission_year(year)?;
    }
    Ok(())
}
