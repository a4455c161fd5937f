use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 10)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 5)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Highest page number a listing accepts.
pub const MAX_PAGE: u64 = 100_000;

/// Resolve a requested 1-based page into `(page, offset)`.
pub fn page_offset(page: Option<u64>, per_page: u64) -> Result<(u64, u64), AppError> {
    let page = Ord::max(page.unwrap_or(1), 1);
    if page > MAX_PAGE {
        return Err(AppError::Validation(format!(
            "page must be between 1 and {MAX_PAGE}"
        )));
    }
    Ok((page, (page - 1) * per_page))
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

pub fn validate_semester(semester: i32) -> Result<(), AppError> {
    if !(1..=12).contains(&semester) {
        return Err(AppError::Validation(
            "Semester must be between 1 and 12".into(),
        ));
    }
    Ok(())
}

/// Academic years look like `2024`, `2024-25` or `2024-2025`.
pub fn validate_academic_year(year: &str) -> Result<(), AppError> {
    let year = year.trim();
    let valid = match year.split_once('-') {
        None => year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()),
        Some((start, end)) => {
            start.len() == 4
                && (end.len() == 2 || end.len() == 4)
                && start.chars().chain(end.chars()).all(|c| c.is_ascii_digit())
        }
    };
    if !valid {
        return Err(AppError::Validation(
            "academic_year must look like 2024-25".into(),
        ));
    }
    Ok(())
}

/// Validate a required free-text field (trimmed, 1..=max characters).
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// Trim an optional text field, mapping blank strings to `None`.
pub fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate an ID list for bulk operations (non-empty, no duplicates, max length).
pub fn validate_bulk_ids(ids: &[i32], name: &str, max: usize) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }
    if ids.len() > max {
        return Err(AppError::Validation(format!("Too many {name}: max {max}")));
    }
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate {name} ID: {id}")));
        }
    }
    Ok(())
}
