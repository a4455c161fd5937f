use common::Gender;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Always stored trimmed and uppercased.
    #[sea_orm(unique)]
    pub roll_number: String,
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    /// Only the UTC date portion is meaningful.
    pub date_of_birth: DateTimeUtc,
    #[sea_orm(unique)]
    pub email: Option<String>,
    #[sea_orm(unique)]
    pub phone: Option<String>,
    pub category: Option<String>,
    pub gender: Gender,

    pub department: String,
    pub program: Option<String>,
    pub semester: i32,
    pub batch: Option<String>,
    pub admission_year: Option<i32>,

    /// Argon2 hash.
    pub password: String,
    pub is_verified: bool,

    #[sea_orm(has_many)]
    pub results: HasMany<super::exam_result::Entity>,

    #[sea_orm(has_many)]
    pub queries: HasMany<super::help_query::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
