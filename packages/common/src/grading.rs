//! Result aggregation: raw per-subject marks in, graded subject lines and
//! result-level aggregates out. Pure functions, no I/O.

use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::exam::{ResultOutcome, SubjectStatus};

/// Max marks assumed when a subject does not specify a usable value.
pub const DEFAULT_MAX_MARKS: i32 = 100;

/// Minimum share of max marks, in percent, needed to pass a subject.
pub const PASS_PERCENT: i64 = 33;

/// Upper bound for per-subject credits.
pub const MAX_CREDITS: i32 = 30;

/// Upper bound for a subject's max marks.
pub const MAX_SUBJECT_MARKS: i32 = 1000;

/// Raw marks as submitted. Each value may be a JSON number or a numeric string.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct MarksInput {
    #[serde(default)]
    pub internal: Value,
    #[serde(default)]
    pub external: Value,
    #[serde(default, alias = "maxMarks")]
    pub max_marks: Value,
}

/// One subject of a manual result entry.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SubjectInput {
    /// Subject (course) name.
    #[schema(example = "Engineering Mathematics")]
    pub name: String,
    /// Course code. Matched against the catalog when present.
    #[schema(example = "MTH101")]
    pub code: Option<String>,
    /// Credit override. Falls back to the catalog course's credits.
    #[schema(example = 4)]
    pub credits: Option<i32>,
    #[serde(default)]
    pub marks: MarksInput,
}

/// Catalog data for a subject whose code matched a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseLink {
    pub id: i32,
    pub credits: i32,
}

/// A graded subject line as stored inside a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubjectLine {
    #[schema(example = "MTH101")]
    pub course_code: String,
    #[schema(example = "Engineering Mathematics")]
    pub course_name: String,
    /// Linked catalog course, absent for legacy or unmatched subjects.
    #[serde(default)]
    pub course_id: Option<i32>,
    pub internal_marks: i32,
    pub external_marks: i32,
    pub total_marks: i32,
    pub max_marks: i32,
    #[serde(default)]
    pub credits: i32,
    pub status: SubjectStatus,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub grade_point: Option<f64>,
}

/// Result-level aggregates computed from subject lines.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Aggregate {
    pub total_marks: i32,
    pub max_marks: i32,
    /// Percentage rounded to two decimals.
    pub percentage: f64,
    pub outcome: ResultOutcome,
    pub total_credits: i32,
    pub credits_earned: i32,
    /// Credit-weighted grade point average, `None` when no subject carries credits.
    pub sgpa: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GradingError {
    #[error("At least one subject is required")]
    NoSubjects,
    #[error("Subject name must not be empty")]
    MissingName,
    #[error("Marks for '{0}' must not be negative")]
    NegativeMarks(String),
    #[error("Max marks for '{0}' must be between 1 and 1000")]
    MaxMarksOutOfRange(String),
    #[error("Marks for '{subject}' exceed the maximum ({total} > {max})")]
    ExceedsMaximum { subject: String, total: i32, max: i32 },
    #[error("Credits for '{0}' must be between 0 and 30")]
    InvalidCredits(String),
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Coerce a submitted mark to an integer with `parseInt`-like leniency:
/// numbers are truncated, strings contribute their leading integer, anything
/// else counts as 0.
pub fn coerce_marks(value: &Value) -> i32 {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_int_prefix(s),
        _ => 0,
    };
    n.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn parse_int_prefix(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

/// A subject passes when it scores at least 33% of its max marks.
pub fn subject_passes(total: i32, max_marks: i32) -> bool {
    i64::from(total) * 100 >= PASS_PERCENT * i64::from(max_marks)
}

/// Letter grade and grade point on the 10-point scale.
pub fn grade_for_percentage(percentage: f64) -> (&'static str, f64) {
    match percentage {
        p if p >= 90.0 => ("O", 10.0),
        p if p >= 80.0 => ("A+", 9.0),
        p if p >= 70.0 => ("A", 8.0),
        p if p >= 60.0 => ("B+", 7.0),
        p if p >= 50.0 => ("B", 6.0),
        p if p >= 40.0 => ("C", 5.0),
        p if p >= PASS_PERCENT as f64 => ("P", 4.0),
        _ => ("F", 0.0),
    }
}

/// Display-only code for a subject submitted without one: the first three
/// uppercased characters of the name plus three random digits. Not unique.
pub fn fallback_code<R: Rng + ?Sized>(name: &str, rng: &mut R) -> String {
    let prefix: String = name
        .trim()
        .chars()
        .take(3)
        .flat_map(char::to_uppercase)
        .collect();
    format!("{prefix}{:03}", rng.random_range(0..1000))
}

/// Normalize a supplied course code, `None` when blank.
pub fn normalize_code(code: Option<&str>) -> Option<String> {
    code.map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty())
}

/// Grade one subject. `course` is the catalog match for the supplied code.
pub fn grade_subject(
    input: &SubjectInput,
    course: Option<CourseLink>,
) -> Result<SubjectLine, GradingError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(GradingError::MissingName);
    }

    let internal = coerce_marks(&input.marks.internal);
    let external = coerce_marks(&input.marks.external);
    let max_marks = match coerce_marks(&input.marks.max_marks) {
        m if m > 0 => m,
        _ => DEFAULT_MAX_MARKS,
    };
    if max_marks > MAX_SUBJECT_MARKS {
        return Err(GradingError::MaxMarksOutOfRange(name.to_string()));
    }
    if internal < 0 || external < 0 {
        return Err(GradingError::NegativeMarks(name.to_string()));
    }
    let total = internal.saturating_add(external);
    if total > max_marks {
        return Err(GradingError::ExceedsMaximum {
            subject: name.to_string(),
            total,
            max: max_marks,
        });
    }

    let credits = input
        .credits
        .or(course.map(|c| c.credits))
        .unwrap_or(0);
    if !(0..=MAX_CREDITS).contains(&credits) {
        return Err(GradingError::InvalidCredits(name.to_string()));
    }

    let status = if subject_passes(total, max_marks) {
        SubjectStatus::Pass
    } else {
        SubjectStatus::Fail
    };
    let (grade, grade_point) = match status {
        SubjectStatus::Pass => {
            grade_for_percentage(f64::from(total) / f64::from(max_marks) * 100.0)
        }
        SubjectStatus::Fail => ("F", 0.0),
    };

    let course_code = normalize_code(input.code.as_deref())
        .unwrap_or_else(|| fallback_code(name, &mut rand::rng()));

    Ok(SubjectLine {
        course_code,
        course_name: name.to_string(),
        course_id: course.map(|c| c.id),
        internal_marks: internal,
        external_marks: external,
        total_marks: total,
        max_marks,
        credits,
        status,
        grade: Some(grade.to_string()),
        grade_point: Some(grade_point),
    })
}

/// Sum graded lines into result-level aggregates.
pub fn aggregate(lines: &[SubjectLine]) -> Aggregate {
    let total_marks: i32 = lines.iter().map(|l| l.total_marks).sum();
    let max_marks: i32 = lines.iter().map(|l| l.max_marks).sum();
    let percentage = if max_marks == 0 {
        0.0
    } else {
        round2(f64::from(total_marks) / f64::from(max_marks) * 100.0)
    };
    let outcome = if lines.iter().all(|l| l.status.is_pass()) {
        ResultOutcome::Pass
    } else {
        ResultOutcome::Fail
    };

    let total_credits: i32 = lines.iter().map(|l| l.credits).sum();
    let credits_earned: i32 = lines
        .iter()
        .filter(|l| l.status.is_pass())
        .map(|l| l.credits)
        .sum();
    let weighted: f64 = lines
        .iter()
        .map(|l| l.grade_point.unwrap_or(0.0) * f64::from(l.credits))
        .sum();
    let sgpa = (total_credits > 0).then(|| round2(weighted / f64::from(total_credits)));

    Aggregate {
        total_marks,
        max_marks,
        percentage,
        outcome,
        total_credits,
        credits_earned,
        sgpa,
    }
}

/// Grade every subject and aggregate. `lookup` resolves a normalized course
/// code to its catalog entry; fallback codes are never looked up.
pub fn grade_result<F>(
    subjects: &[SubjectInput],
    mut lookup: F,
) -> Result<(Vec<SubjectLine>, Aggregate), GradingError>
where
    F: FnMut(&str) -> Option<CourseLink>,
{
    if subjects.is_empty() {
        return Err(GradingError::NoSubjects);
    }
    let lines = subjects
        .iter()
        .map(|s| {
            let course = normalize_code(s.code.as_deref()).and_then(|code| lookup(&code));
            grade_subject(s, course)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let aggregate = aggregate(&lines);
    Ok((lines, aggregate))
}

/// Credit-weighted mean over `(sgpa, credits)` terms, `None` without credits.
pub fn cumulative_gpa<I>(terms: I) -> Option<f64>
where
    I: IntoIterator<Item = (f64, i32)>,
{
    let (weighted, credits) = terms
        .into_iter()
        .filter(|(_, credits)| *credits > 0)
        .fold((0.0, 0i64), |(w, c), (gpa, credits)| {
            (w + gpa * f64::from(credits), c + i64::from(credits))
        });
    (credits > 0).then(|| round2(weighted / credits as f64))
}
