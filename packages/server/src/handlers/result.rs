use std::collections::HashSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{exam_result, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::result::*;
use crate::models::shared::{Pagination, escape_like, page_offset};
use crate::state::AppState;
use crate::utils::result::{
    apply_grading, cumulative_for, find_result, find_result_for_update, grade_subjects,
    map_duplicate_result, resolve_or_register_student,
};
use crate::utils::student::{dob_matches, find_student_by_roll, normalize_roll_number};

#[utoipa::path(
    post,
    path = "/manual",
    tag = "Results",
    operation_id = "createManualResult",
    summary = "Enter a result manually",
    description = "Grades the submitted subjects and stores an unpublished result. Marks may be numbers or numeric strings. When the roll number is unknown and `date_of_birth` is given, the student is registered on the fly (`student_created` is then true). Requires `result:manage` permission.",
    request_body = ManualResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = ManualResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Unknown roll number and no date of birth (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Result already exists for this exam (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(
    skip(state, auth_user, payload),
    fields(roll_number = %payload.roll_number, semester = payload.semester)
)]
pub async fn create_manual_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ManualResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("result:manage")?;
    validate_manual_result(&payload)?;

    let roll_number = normalize_roll_number(&payload.roll_number);

    let txn = state.db.begin().await?;

    let (student, student_created) =
        resolve_or_register_student(&txn, &roll_number, &payload).await?;
    let (lines, aggregate) = grade_subjects(&txn, &payload.subjects).await?;
    let cgpa = cumulative_for(
        &txn,
        student.id,
        payload.semester,
        None,
        aggregate.sgpa,
        aggregate.total_credits,
    )
    .await?;

    let now = chrono::Utc::now();
    let mut new_result = exam_result::ActiveModel {
        student_id: Set(student.id),
        roll_number: Set(student.roll_number.clone()),
        semester: Set(payload.semester),
        academic_year: Set(payload.academic_year.trim().to_string()),
        exam_type: Set(payload.exam_type.unwrap_or_default()),
        is_published: Set(false),
        declared_date: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    apply_grading(&mut new_result, &lines, &aggregate, cgpa)?;

    let model = new_result
        .insert(&txn)
        .await
        .map_err(map_duplicate_result)?;
    txn.commit().await?;

    tracing::info!(
        result_id = model.id,
        student_created,
        outcome = ?model.outcome,
        "Result recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(ManualResultResponse {
            result: model.try_into()?,
            student_created,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/check",
    tag = "Results",
    operation_id = "checkResult",
    summary = "Public result lookup",
    description = "Returns the student's marksheet identity and published results when the roll number and date of birth match. Only the `YYYY-MM-DD` part of the date of birth is compared. Unpublished results are never returned. Rate limited per client.",
    request_body = CheckResultRequest,
    responses(
        (status = 200, description = "Published results, newest semester first", body = CheckResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Date of birth does not match (INVALID_CREDENTIALS)", body = ErrorBody),
        (status = 404, description = "Unknown roll number (NOT_FOUND)", body = ErrorBody),
        (status = 429, description = "Too many lookups (RATE_LIMITED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(roll_number = %payload.roll_number))]
pub async fn check_result(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckResultRequest>,
) -> Result<Json<CheckResultResponse>, AppError> {
    validate_check_result(&payload)?;

    let roll_number = normalize_roll_number(&payload.roll_number);
    let student = find_student_by_roll(&state.db, &roll_number)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))?;

    if !dob_matches(student.date_of_birth, &payload.date_of_birth) {
        return Err(AppError::InvalidCredentials);
    }

    let mut select = exam_result::Entity::find()
        .filter(exam_result::Column::StudentId.eq(student.id))
        .filter(exam_result::Column::IsPublished.eq(true));
    if let Some(semester) = payload.semester {
        select = select.filter(exam_result::Column::Semester.eq(semester));
    }
    let results = select
        .order_by_desc(exam_result::Column::Semester)
        .order_by_desc(exam_result::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(CheckResultResponse {
        student: student.into(),
        results: result_responses(results)?,
    }))
}

#[utoipa::path(
    get,
    path = "/my",
    tag = "Results",
    operation_id = "listMyResults",
    summary = "List the current student's published results",
    responses(
        (status = 200, description = "Published results, newest semester first", body = Vec<ResultResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a student token (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.id))]
pub async fn my_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ResultResponse>>, AppError> {
    auth_user.require_permission("result:view_own")?;
    let student_id = auth_user.student_id()?;

    let results = exam_result::Entity::find()
        .filter(exam_result::Column::StudentId.eq(student_id))
        .filter(exam_result::Column::IsPublished.eq(true))
        .order_by_desc(exam_result::Column::Semester)
        .order_by_desc(exam_result::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(result_responses(results)?))
}

#[utoipa::path(
    get,
    path = "/my/{id}",
    tag = "Results",
    operation_id = "getMyResult",
    summary = "Get one of the current student's published results",
    description = "Returns 404 for results of other students and for unpublished results.",
    params(("id" = i32, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result details", body = ResultResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not a student token (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.id, id))]
pub async fn my_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ResultResponse>, AppError> {
    auth_user.require_permission("result:view_own")?;
    let student_id = auth_user.student_id()?;

    let model = exam_result::Entity::find_by_id(id)
        .filter(exam_result::Column::StudentId.eq(student_id))
        .filter(exam_result::Column::IsPublished.eq(true))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Result not found".into()))?;

    Ok(Json(model.try_into()?))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Results",
    operation_id = "listResults",
    summary = "List results for administration",
    description = "Paginated (10 per page), newest first. `search` matches the roll number case-insensitively; `published` selects the published or draft partition. Requires `result:manage` permission.",
    params(ResultListQuery),
    responses(
        (status = 200, description = "List of results", body = ResultListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ResultListQuery>,
) -> Result<Json<ResultListResponse>, AppError> {
    auth_user.require_permission("result:manage")?;

    let per_page = RESULTS_PAGE_SIZE;
    let (page, offset) = page_offset(query.page, per_page)?;

    let mut select = exam_result::Entity::find().find_also_related(student::Entity);

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col((
                    exam_result::Entity,
                    exam_result::Column::RollNumber,
                ))))
                .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }
    if let Some(semester) = query.semester {
        select = select.filter(exam_result::Column::Semester.eq(semester));
    }
    if let Some(ref department) = query.department {
        select = select.filter(student::Column::Department.eq(department.trim()));
    }
    if let Some(ref year) = query.academic_year {
        select = select.filter(exam_result::Column::AcademicYear.eq(year.trim()));
    }
    if let Some(published) = query.published {
        select = select.filter(exam_result::Column::IsPublished.eq(published));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_desc(exam_result::Column::CreatedAt)
        .order_by_desc(exam_result::Column::Id)
        .offset(Some(offset))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|(result, student)| AdminResultItem::new(result, student))
        .collect();

    Ok(Json(ResultListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Results",
    operation_id = "getResult",
    summary = "Get any result by ID",
    description = "Returns a result regardless of publication state. Requires `result:manage` permission.",
    params(("id" = i32, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result details", body = ResultResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ResultResponse>, AppError> {
    auth_user.require_permission("result:manage")?;

    let model = find_result(&state.db, id).await?;
    Ok(Json(model.try_into()?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Results",
    operation_id = "updateResult",
    summary = "Update a result",
    description = "Changes `semester`, `academic_year`, `exam_type` or `subjects`. Replacing subjects regrades the result and recomputes every aggregate. Publication state is managed by the publish endpoints only. Requires `result:manage` permission.",
    params(("id" = i32, Path, description = "Result ID")),
    request_body = UpdateResultRequest,
    responses(
        (status = 200, description = "Result updated", body = ResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Another result already exists for this exam (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateResultRequest>,
) -> Result<Json<ResultResponse>, AppError> {
    auth_user.require_permission("result:manage")?;
    validate_update_result(&payload)?;

    if payload.is_empty() {
        let existing = find_result(&state.db, id).await?;
        return Ok(Json(existing.try_into()?));
    }

    let txn = state.db.begin().await?;

    let existing = find_result_for_update(&txn, id).await?;
    let student_id = existing.student_id;
    let semester = payload.semester.unwrap_or(existing.semester);
    let semester_changed = semester != existing.semester;
    let (current_sgpa, current_credits) = (existing.sgpa, existing.total_credits);
    let mut active: exam_result::ActiveModel = existing.into();

    if let Some(ref year) = payload.academic_year {
        active.academic_year = Set(year.trim().to_string());
    }
    if let Some(exam_type) = payload.exam_type {
        active.exam_type = Set(exam_type);
    }
    active.semester = Set(semester);

    if let Some(ref subjects) = payload.subjects {
        let (lines, aggregate) = grade_subjects(&txn, subjects).await?;
        let cgpa = cumulative_for(
            &txn,
            student_id,
            semester,
            Some(id),
            aggregate.sgpa,
            aggregate.total_credits,
        )
        .await?;
        apply_grading(&mut active, &lines, &aggregate, cgpa)?;
    } else if semester_changed {
        let cgpa = cumulative_for(
            &txn,
            student_id,
            semester,
            Some(id),
            current_sgpa,
            current_credits,
        )
        .await?;
        active.cgpa = Set(cgpa);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(map_duplicate_result)?;
    txn.commit().await?;

    Ok(Json(model.try_into()?))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Results",
    operation_id = "deleteResult",
    summary = "Delete a result",
    params(("id" = i32, Path, description = "Result ID")),
    responses(
        (status = 204, description = "Result deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("result:manage")?;

    let result = exam_result::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Result not found".into()));
    }

    tracing::info!("Result deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/results/bulk",
    tag = "Results",
    operation_id = "bulkDeleteResults",
    summary = "Delete many results at once",
    description = "Deletes every listed result that exists, in one transaction, and reports per-ID outcomes. IDs that do not exist are listed under `errors`. Requires `result:manage` permission.",
    request_body = BulkDeleteResultsRequest,
    responses(
        (status = 200, description = "Per-ID outcome", body = BulkDeleteResultsResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.ids.len()))]
pub async fn bulk_delete_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BulkDeleteResultsRequest>,
) -> Result<Json<BulkDeleteResultsResponse>, AppError> {
    auth_user.require_permission("result:manage")?;
    validate_bulk_delete_results(&payload)?;

    let txn = state.db.begin().await?;

    let existing: HashSet<i32> = exam_result::Entity::find()
        .select_only()
        .column(exam_result::Column::Id)
        .filter(exam_result::Column::Id.is_in(payload.ids.clone()))
        .lock(sea_orm::sea_query::LockType::Update)
        .into_tuple::<i32>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();

    if !existing.is_empty() {
        exam_result::Entity::delete_many()
            .filter(exam_result::Column::Id.is_in(existing.iter().copied()))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    let (deleted, missing): (Vec<i32>, Vec<i32>) =
        payload.ids.iter().copied().partition(|id| existing.contains(id));
    let errors = missing
        .into_iter()
        .map(|id| BulkItemError {
            id,
            error: "Result not found".into(),
        })
        .collect();

    tracing::info!(deleted = deleted.len(), "Bulk result delete finished");
    Ok(Json(BulkDeleteResultsResponse { deleted, errors }))
}
