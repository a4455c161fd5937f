use axum::Json;
use axum::extract::{Path, State};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{exam_result, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::publication::*;
use crate::state::AppState;
use crate::utils::publication::Publication;
use crate::utils::result::find_result_for_update;

#[utoipa::path(
    patch,
    path = "/{id}/publish",
    tag = "Publication",
    operation_id = "togglePublish",
    summary = "Toggle a result's publication",
    description = "Publishes an unpublished result or unpublishes a published one. The declaration date is stamped on first publication and kept afterwards, so toggling twice restores the original state. Requires `result:publish` permission.",
    params(("id" = i32, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Publication state after the toggle", body = PublicationResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn toggle_publish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PublicationResponse>, AppError> {
    auth_user.require_permission("result:publish")?;

    let txn = state.db.begin().await?;

    let existing = find_result_for_update(&txn, id).await?;
    let now = chrono::Utc::now();
    let next = Publication {
        is_published: existing.is_published,
        declared_date: existing.declared_date,
    }
    .toggle(now);

    let mut active: exam_result::ActiveModel = existing.into();
    active.is_published = Set(next.is_published);
    active.declared_date = Set(next.declared_date);
    active.updated_at = Set(now);
    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(is_published = model.is_published, "Result publication toggled");
    Ok(Json(PublicationResponse {
        id: model.id,
        is_published: model.is_published,
        declared_date: model.declared_date,
    }))
}

#[utoipa::path(
    post,
    path = "/results/publish/bulk",
    tag = "Publication",
    operation_id = "bulkPublish",
    summary = "Publish or unpublish a cohort",
    description = "Applies `action` to every result of the semester, optionally narrowed to one academic year and to students of one department. Only results whose state actually changes are touched and counted in `modified`. Requires `result:publish` permission.",
    request_body = BulkPublishRequest,
    responses(
        (status = 200, description = "Number of results changed", body = BulkPublishResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(semester = payload.semester, action = ?payload.action)
)]
pub async fn bulk_publish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkPublishRequest>,
) -> Result<Json<BulkPublishResponse>, AppError> {
    auth_user.require_permission("result:publish")?;
    validate_bulk_publish(&payload)?;

    let target = payload.action.target();
    let now = chrono::Utc::now();

    let txn = state.db.begin().await?;

    let mut cohort = Condition::all()
        .add(exam_result::Column::Semester.eq(payload.semester))
        .add(exam_result::Column::IsPublished.ne(target));
    if let Some(ref year) = payload.academic_year {
        cohort = cohort.add(exam_result::Column::AcademicYear.eq(year.trim()));
    }
    if let Some(ref department) = payload.department {
        let student_ids: Vec<i32> = student::Entity::find()
            .select_only()
            .column(student::Column::Id)
            .filter(student::Column::Department.eq(department.trim()))
            .into_tuple()
            .all(&txn)
            .await?;
        if student_ids.is_empty() {
            return Ok(Json(BulkPublishResponse { modified: 0 }));
        }
        cohort = cohort.add(exam_result::Column::StudentId.is_in(student_ids));
    }

    let mut modified = 0;

    // First publication stamps the declaration date.
    if target {
        let stamped = exam_result::Entity::update_many()
            .col_expr(exam_result::Column::IsPublished, Expr::value(true))
            .col_expr(exam_result::Column::DeclaredDate, Expr::value(now))
            .col_expr(exam_result::Column::UpdatedAt, Expr::value(now))
            .filter(cohort.clone())
            .filter(exam_result::Column::DeclaredDate.is_null())
            .exec(&txn)
            .await?;
        modified += stamped.rows_affected;
    }

    let flipped = exam_result::Entity::update_many()
        .col_expr(exam_result::Column::IsPublished, Expr::value(target))
        .col_expr(exam_result::Column::UpdatedAt, Expr::value(now))
        .filter(cohort)
        .exec(&txn)
        .await?;
    modified += flipped.rows_affected;

    txn.commit().await?;

    tracing::info!(modified, "Bulk publication finished");
    Ok(Json(BulkPublishResponse { modified }))
}
