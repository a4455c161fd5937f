use std::collections::HashMap;

use chrono::Utc;
use common::grading::{cumulative_gpa, grade_result, normalize_code};
use common::{Aggregate, CourseLink, SubjectInput, SubjectLine};
use sea_orm::*;
use tracing::info;

use crate::entity::{course, exam_result, student};
use crate::error::AppError;
use crate::models::result::ManualResultRequest;
use crate::models::shared::clean_optional;
use crate::utils::hash;
use crate::utils::student::{
    default_password, find_student_by_roll, parse_date_of_birth, split_display_name,
};

/// Department assigned to students registered implicitly by result entry.
pub const DEFAULT_DEPARTMENT: &str = "General";

/// Find the student a manual result belongs to, registering them when absent
/// and a date of birth was supplied. Returns the student and whether it was
/// created by this call.
///
/// A concurrent registration of the same roll number surfaces as a unique
/// violation; the insert is rolled back to a savepoint and the winner's row is
/// used instead.
pub async fn resolve_or_register_student(
    txn: &DatabaseTransaction,
    roll_number: &str,
    req: &ManualResultRequest,
) -> Result<(student::Model, bool), AppError> {
    if let Some(existing) = find_student_by_roll(txn, roll_number).await? {
        return Ok((existing, false));
    }

    let Some(ref dob) = req.date_of_birth else {
        return Err(AppError::NotFound("Student not found".into()));
    };
    let date_of_birth = parse_date_of_birth(dob)?;
    let (first_name, last_name) = split_display_name(req.name.as_deref(), roll_number);
    let password = hash::hash_password(&default_password(date_of_birth))
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = Utc::now();
    let new_student = student::ActiveModel {
        roll_number: Set(roll_number.to_string()),
        first_name: Set(first_name),
        last_name: Set(last_name),
        date_of_birth: Set(date_of_birth),
        gender: Set(req.gender.unwrap_or_default()),
        department: Set(clean_optional(req.department.clone())
            .unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string())),
        semester: Set(req.semester),
        password: Set(password),
        is_verified: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let savepoint = txn.begin().await?;
    match new_student.insert(&savepoint).await {
        Ok(created) => {
            savepoint.commit().await?;
            info!(roll_number, student_id = created.id, "Auto-registered student");
            Ok((created, true))
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            savepoint.rollback().await?;
            tracing::debug!(roll_number, "Concurrent registration detected, re-reading student");
            let existing = find_student_by_roll(txn, roll_number).await?.ok_or_else(|| {
                AppError::Conflict("Student registration conflicted, please retry".into())
            })?;
            Ok((existing, false))
        }
        Err(e) => Err(e.into()),
    }
}

/// Catalog entries for every explicit subject code, keyed by normalized code.
pub async fn course_links<C: ConnectionTrait>(
    db: &C,
    subjects: &[SubjectInput],
) -> Result<HashMap<String, CourseLink>, AppError> {
    let codes: Vec<String> = subjects
        .iter()
        .filter_map(|s| normalize_code(s.code.as_deref()))
        .collect();
    if codes.is_empty() {
        return Ok(HashMap::new());
    }

    let courses = course::Entity::find()
        .filter(course::Column::Code.is_in(codes))
        .all(db)
        .await?;

    Ok(courses
        .into_iter()
        .map(|c| {
            (
                c.code,
                CourseLink {
                    id: c.id,
                    credits: c.credits,
                },
            )
        })
        .collect())
}

/// Grade subjects against the course catalog.
pub async fn grade_subjects<C: ConnectionTrait>(
    db: &C,
    subjects: &[SubjectInput],
) -> Result<(Vec<SubjectLine>, Aggregate), AppError> {
    let catalog = course_links(db, subjects).await?;
    Ok(grade_result(subjects, |code| catalog.get(code).copied())?)
}

/// CGPA over the current term and the student's earlier-semester results with
/// an SGPA. `None` when the current term has no SGPA.
pub async fn cumulative_for<C: ConnectionTrait>(
    db: &C,
    student_id: i32,
    semester: i32,
    exclude_id: Option<i32>,
    sgpa: Option<f64>,
    total_credits: i32,
) -> Result<Option<f64>, AppError> {
    let Some(sgpa) = sgpa else {
        return Ok(None);
    };

    let mut select = exam_result::Entity::find()
        .filter(exam_result::Column::StudentId.eq(student_id))
        .filter(exam_result::Column::Semester.lt(semester))
        .filter(exam_result::Column::Sgpa.is_not_null());
    if let Some(id) = exclude_id {
        select = select.filter(exam_result::Column::Id.ne(id));
    }
    let earlier = select.all(db).await?;

    let terms = earlier
        .iter()
        .filter_map(|r| r.sgpa.map(|s| (s, r.total_credits)))
        .chain(std::iter::once((sgpa, total_credits)));
    Ok(cumulative_gpa(terms))
}

/// Write graded lines and aggregates onto a result row.
pub fn apply_grading(
    model: &mut exam_result::ActiveModel,
    lines: &[SubjectLine],
    aggregate: &Aggregate,
    cgpa: Option<f64>,
) -> Result<(), AppError> {
    let subjects = serde_json::to_value(lines)
        .map_err(|e| AppError::Internal(format!("Failed to encode subjects: {}", e)))?;
    model.subjects = Set(subjects);
    model.total_marks = Set(aggregate.total_marks);
    model.max_marks = Set(aggregate.max_marks);
    model.percentage = Set(aggregate.percentage);
    model.sgpa = Set(aggregate.sgpa);
    model.cgpa = Set(cgpa);
    model.total_credits = Set(aggregate.total_credits);
    model.credits_earned = Set(aggregate.credits_earned);
    model.outcome = Set(aggregate.outcome);
    Ok(())
}

/// Map a duplicate `(student, semester, academic year, exam type)` insert to 409.
pub fn map_duplicate_result(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
            "A result for this student, semester, academic year and exam type already exists"
                .into(),
        ),
        _ => AppError::from(e),
    }
}

/// Look up a result by ID, returning 404 if not found.
pub async fn find_result<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<exam_result::Model, AppError> {
    exam_result::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".into()))
}

/// Look up a result by ID under a row lock.
pub async fn find_result_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<exam_result::Model, AppError> {
    use sea_orm::sea_query::LockType;
    exam_result::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".into()))
}
