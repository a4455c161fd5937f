#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pass/fail verdict of a single subject line.
///
/// When the `sea-orm` feature is enabled, the status enums in this module can be
/// used directly as SeaORM entity columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum SubjectStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pass"))]
    Pass,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Fail"))]
    Fail,
}

impl SubjectStatus {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Overall outcome of a result. `Fail` as soon as any subject failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum ResultOutcome {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Pass"))]
    Pass,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Fail"))]
    Fail,
}

/// Examination session a result belongs to.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum ExamType {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Regular"))]
    Regular,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Supplementary"))]
    Supplementary,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Improvement"))]
    Improvement,
}

impl ExamType {
    pub const ALL: &'static [ExamType] = &[Self::Regular, Self::Supplementary, Self::Improvement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Supplementary => "Supplementary",
            Self::Improvement => "Improvement",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown exam type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid exam type '{0}'. Valid values: Regular, Supplementary, Improvement")]
pub struct ParseExamTypeError(String);

impl FromStr for ExamType {
    type Err = ParseExamTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseExamTypeError(s.to_string()))
    }
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum Gender {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Male"))]
    Male,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Female"))]
    Female,
    /// Placeholder used when a student is auto-registered without demographics.
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Other"))]
    Other,
}

/// Lifecycle of a help-desk ticket.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum QueryStatus {
    #[default]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Open"))]
    Open,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "Resolved"))]
    Resolved,
}
