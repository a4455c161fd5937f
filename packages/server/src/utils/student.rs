use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::student;
use crate::error::AppError;

/// Roll numbers are compared and stored trimmed and uppercased.
pub fn normalize_roll_number(roll_number: &str) -> String {
    roll_number.trim().to_uppercase()
}

/// Split a display name into first name (first token) and last name (the rest).
///
/// The last name is `"."` when the name has a single token. Without any name
/// the first name falls back to `fallback_first`.
pub fn split_display_name(name: Option<&str>, fallback_first: &str) -> (String, String) {
    let mut tokens = name.unwrap_or_default().split_whitespace();
    match tokens.next() {
        Some(first) => {
            let rest = tokens.collect::<Vec<_>>().join(" ");
            let last = if rest.is_empty() { ".".to_string() } else { rest };
            (first.to_string(), last)
        }
        None => (fallback_first.to_string(), ".".to_string()),
    }
}

/// The ISO date portion (`YYYY-MM-DD`) of a supplied date string, ignoring any
/// time component.
pub fn date_portion(input: &str) -> Option<NaiveDate> {
    let head = input.trim().get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Parse a date of birth for storage. Accepts `YYYY-MM-DD` (stored as midnight
/// UTC) or a full RFC 3339 timestamp.
pub fn parse_date_of_birth(input: &str) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::Validation("date_of_birth must be a YYYY-MM-DD date".into()))
}

/// Date-only comparison of a stored date of birth against a supplied string.
pub fn dob_matches(stored: DateTime<Utc>, supplied: &str) -> bool {
    date_portion(supplied).is_some_and(|d| d == stored.date_naive())
}

/// Initial password for a student: the date of birth as `YYYYMMDD`.
pub fn default_password(date_of_birth: DateTime<Utc>) -> String {
    date_of_birth.format("%Y%m%d").to_string()
}

/// Look up a student by ID, returning 404 if not found.
pub async fn find_student<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<student::Model, AppError> {
    student::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}

/// Look up a student by (already normalized) roll number.
pub async fn find_student_by_roll<C: ConnectionTrait>(
    db: &C,
    roll_number: &str,
) -> Result<Option<student::Model>, AppError> {
    Ok(student::Entity::find()
        .filter(student::Column::RollNumber.eq(roll_number))
        .one(db)
        .await?)
}
