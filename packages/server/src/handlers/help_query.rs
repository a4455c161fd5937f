use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::QueryStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::help_query;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::help_query::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Help Desk",
    operation_id = "createQuery",
    summary = "Raise a help-desk query",
    request_body = CreateQueryRequest,
    responses(
        (status = 201, description = "Query created", body = QueryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = auth_user.id))]
pub async fn create_query(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateQueryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("query:create")?;
    let student_id = auth_user.student_id()?;
    validate_create_query(&payload)?;

    let now = chrono::Utc::now();
    let new_query = help_query::ActiveModel {
        student_id: Set(student_id),
        subject: Set(payload.subject.trim().to_string()),
        message: Set(payload.message.trim().to_string()),
        reply: Set(None),
        status: Set(QueryStatus::Open),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let model = new_query.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(QueryResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/my",
    tag = "Help Desk",
    operation_id = "listMyQueries",
    summary = "List the current student's queries",
    responses(
        (status = 200, description = "Queries, newest first", body = Vec<QueryResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(student_id = auth_user.id))]
pub async fn my_queries(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<QueryResponse>>, AppError> {
    let student_id = auth_user.student_id()?;

    let queries = help_query::Entity::find()
        .filter(help_query::Column::StudentId.eq(student_id))
        .order_by_desc(help_query::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(queries.into_iter().map(QueryResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Help Desk",
    operation_id = "listQueries",
    summary = "List all help-desk queries",
    description = "Newest first, optionally filtered by status. Requires `query:reply` permission.",
    params(QueryListQuery),
    responses(
        (status = 200, description = "Queries", body = Vec<QueryResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_queries(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<QueryListQuery>,
) -> Result<Json<Vec<QueryResponse>>, AppError> {
    auth_user.require_permission("query:reply")?;

    let mut select = help_query::Entity::find();
    if let Some(status) = query.status {
        select = select.filter(help_query::Column::Status.eq(status));
    }
    let queries = select
        .order_by_desc(help_query::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(queries.into_iter().map(QueryResponse::from).collect()))
}

#[utoipa::path(
    patch,
    path = "/{id}/reply",
    tag = "Help Desk",
    operation_id = "replyQuery",
    summary = "Reply to a help-desk query",
    description = "Stores the reply and sets the status, `Resolved` unless given. Requires `query:reply` permission.",
    params(("id" = i32, Path, description = "Query ID")),
    request_body = ReplyQueryRequest,
    responses(
        (status = 200, description = "Query updated", body = QueryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Query not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn reply_query(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReplyQueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    auth_user.require_permission("query:reply")?;
    validate_reply_query(&payload)?;

    let existing = help_query::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Query not found".into()))?;

    let mut active: help_query::ActiveModel = existing.into();
    active.reply = Set(Some(payload.reply.trim().to_string()));
    active.status = Set(payload.status.unwrap_or(QueryStatus::Resolved));
    active.updated_at = Set(chrono::Utc::now());
    let model = active.update(&state.db).await?;

    Ok(Json(model.into()))
}
