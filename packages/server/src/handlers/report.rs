use axum::Json;
use axum::extract::{Query, State};
use common::{QueryStatus, ResultOutcome};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{course, exam_result, help_query, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::report::*;
use crate::state::AppState;
use crate::utils::ranking::{MeritKey, rank_by_merit, sort_by_roll_number};

#[utoipa::path(
    get,
    path = "/results/merit-list",
    tag = "Reports",
    operation_id = "meritList",
    summary = "Rank top performers",
    description = "Ranks results by SGPA (missing SGPA last), then percentage, then roll number. Requires `result:manage` permission.",
    params(MeritListQuery),
    responses(
        (status = 200, description = "Ranked entries", body = Vec<MeritEntry>),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn merit_list(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MeritListQuery>,
) -> Result<Json<Vec<MeritEntry>>, AppError> {
    auth_user.require_permission("result:manage")?;
    validate_merit_query(&query)?;

    let mut select = exam_result::Entity::find().find_also_related(student::Entity);
    if let Some(semester) = query.semester {
        select = select.filter(exam_result::Column::Semester.eq(semester));
    }
    if let Some(ref department) = query.department {
        select = select.filter(student::Column::Department.eq(department.trim()));
    }
    if let Some(ref year) = query.academic_year {
        select = select.filter(exam_result::Column::AcademicYear.eq(year.trim()));
    }

    let mut rows: Vec<(exam_result::Model, student::Model)> = select
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(result, student)| student.map(|s| (result, s)))
        .collect();

    rank_by_merit(&mut rows, query.limit(), |(result, _)| MeritKey {
        sgpa: result.sgpa,
        percentage: result.percentage,
        roll_number: &result.roll_number,
    });

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(i, (result, student))| MeritEntry::new(i + 1, result, student))
        .collect();

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/results/gazette",
    tag = "Reports",
    operation_id = "gazette",
    summary = "Cohort result gazette",
    description = "Every result of a semester with student details, sorted by roll number. Only published results unless `published_only=false`. Requires `result:manage` permission.",
    params(GazetteQuery),
    responses(
        (status = 200, description = "Gazette", body = GazetteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(semester = query.semester))]
pub async fn gazette(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<GazetteQuery>,
) -> Result<Json<GazetteResponse>, AppError> {
    auth_user.require_permission("result:manage")?;
    validate_gazette_query(&query)?;

    let mut select = exam_result::Entity::find()
        .find_also_related(student::Entity)
        .filter(exam_result::Column::Semester.eq(query.semester));
    if query.published_only.unwrap_or(true) {
        select = select.filter(exam_result::Column::IsPublished.eq(true));
    }
    if let Some(ref department) = query.department {
        select = select.filter(student::Column::Department.eq(department.trim()));
    }
    if let Some(ref year) = query.academic_year {
        select = select.filter(exam_result::Column::AcademicYear.eq(year.trim()));
    }

    let mut rows = select.all(&state.db).await?;
    sort_by_roll_number(&mut rows, |(result, _)| result.roll_number.as_str());

    let data: Vec<GazetteEntry> = rows
        .into_iter()
        .map(|(result, student)| GazetteEntry::new(result, student))
        .collect();
    let passed = data
        .iter()
        .filter(|e| e.outcome == ResultOutcome::Pass)
        .count();

    Ok(Json(GazetteResponse {
        semester: query.semester,
        total: data.len(),
        passed,
        data,
    }))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "Reports",
    operation_id = "dashboardStats",
    summary = "Dashboard counters",
    responses(
        (status = 200, description = "Counters", body = DashboardStats),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn dashboard_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    auth_user.require_permission("result:manage")?;

    let students = student::Entity::find().count(&state.db).await?;
    let courses = course::Entity::find().count(&state.db).await?;
    let results = exam_result::Entity::find().count(&state.db).await?;
    let published_results = exam_result::Entity::find()
        .filter(exam_result::Column::IsPublished.eq(true))
        .count(&state.db)
        .await?;
    let open_queries = help_query::Entity::find()
        .filter(help_query::Column::Status.eq(QueryStatus::Open))
        .count(&state.db)
        .await?;

    Ok(Json(DashboardStats {
        students,
        courses,
        results,
        published_results,
        unpublished_results: results.saturating_sub(published_results),
        open_queries,
    }))
}
