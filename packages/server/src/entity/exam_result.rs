use common::{ExamType, ResultOutcome};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exam_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,

    /// Denormalized copy of the student's roll number.
    pub roll_number: String,
    pub semester: i32,
    pub academic_year: String,
    pub exam_type: ExamType,

    /// Graded subject lines stored as a JSON array of `common::SubjectLine`.
    #[sea_orm(column_type = "JsonBinary")]
    pub subjects: serde_json::Value,

    pub total_marks: i32,
    pub max_marks: i32,
    pub percentage: f64,
    pub sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub total_credits: i32,
    pub credits_earned: i32,
    pub outcome: ResultOutcome,

    /// Visibility gate for students and public lookups.
    pub is_published: bool,
    /// First time the result was published. Kept when unpublished.
    pub declared_date: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
