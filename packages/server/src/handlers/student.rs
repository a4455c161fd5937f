use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{exam_result, help_query, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, clean_optional, escape_like, page_offset};
use crate::models::student::*;
use crate::state::AppState;
use crate::utils::hash;
use crate::utils::student::{
    default_password, find_student, normalize_roll_number, parse_date_of_birth,
};

fn map_unique_violation(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Roll number, email or phone is already registered".into())
        }
        _ => AppError::from(e),
    }
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Students",
    operation_id = "createStudent",
    summary = "Register a student",
    description = "Registers a student. The roll number is stored uppercased. When no password is given the initial password is the date of birth as `YYYYMMDD`. Requires `student:manage` permission.",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Roll number, email or phone already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(roll_number = %payload.roll_number))]
pub async fn create_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_create_student(&payload)?;

    let date_of_birth = parse_date_of_birth(&payload.date_of_birth)?;
    let plain = payload
        .password
        .clone()
        .unwrap_or_else(|| default_password(date_of_birth));
    let password = hash::hash_password(&plain)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let now = chrono::Utc::now();
    let new_student = student::ActiveModel {
        roll_number: Set(normalize_roll_number(&payload.roll_number)),
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(clean_optional(payload.last_name).unwrap_or_else(|| ".".into())),
        father_name: Set(clean_optional(payload.father_name)),
        mother_name: Set(clean_optional(payload.mother_name)),
        date_of_birth: Set(date_of_birth),
        email: Set(clean_optional(payload.email).map(|e| e.to_lowercase())),
        phone: Set(clean_optional(payload.phone)),
        category: Set(clean_optional(payload.category)),
        gender: Set(payload.gender),
        department: Set(payload.department.trim().to_string()),
        program: Set(clean_optional(payload.program)),
        semester: Set(payload.semester),
        batch: Set(clean_optional(payload.batch)),
        admission_year: Set(payload.admission_year),
        password: Set(password),
        is_verified: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_student
        .insert(&state.db)
        .await
        .map_err(map_unique_violation)?;

    tracing::info!(student_id = model.id, "Student registered");
    Ok((StatusCode::CREATED, Json(StudentResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Students",
    operation_id = "listStudents",
    summary = "List students",
    description = "Paginated student directory ordered by roll number. `search` matches roll number or name case-insensitively. Requires `student:manage` permission.",
    params(StudentListQuery),
    responses(
        (status = 200, description = "List of students", body = StudentListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<StudentListQuery>,
) -> Result<Json<StudentListResponse>, AppError> {
    auth_user.require_permission("student:manage")?;

    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let (page, offset) = page_offset(query.page, per_page)?;

    let mut select = student::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            let matches = |col: student::Column| {
                Expr::expr(Func::lower(Expr::col(col)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(matches(student::Column::RollNumber))
                    .add(matches(student::Column::FirstName))
                    .add(matches(student::Column::LastName)),
            );
        }
    }
    if let Some(ref department) = query.department {
        select = select.filter(student::Column::Department.eq(department.trim()));
    }
    if let Some(semester) = query.semester {
        select = select.filter(student::Column::Semester.eq(semester));
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;

    let data = select
        .order_by_asc(student::Column::RollNumber)
        .offset(Some(offset))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(StudentResponse::from)
        .collect();

    Ok(Json(StudentListResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Students",
    operation_id = "getStudent",
    summary = "Get a student by ID",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = StudentResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<StudentResponse>, AppError> {
    auth_user.require_permission("student:manage")?;

    let model = find_student(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Students",
    operation_id = "updateStudent",
    summary = "Update a student",
    description = "Partially updates allow-listed student fields. Nullable fields accept `null` to clear them. The roll number and password cannot be changed here. Requires `student:manage` permission.",
    params(("id" = i32, Path, description = "Student ID")),
    request_body = UpdateStudentRequest,
    responses(
        (status = 200, description = "Student updated", body = StudentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Email or phone already registered (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateStudentRequest>,
) -> Result<Json<StudentResponse>, AppError> {
    auth_user.require_permission("student:manage")?;
    validate_update_student(&payload)?;

    if payload == UpdateStudentRequest::default() {
        let existing = find_student(&state.db, id).await?;
        return Ok(Json(existing.into()));
    }

    let txn = state.db.begin().await?;

    let existing = find_student(&txn, id).await?;
    let mut active: student::ActiveModel = existing.into();

    if let Some(first) = payload.first_name {
        active.first_name = Set(first.trim().to_string());
    }
    if let Some(last) = payload.last_name {
        active.last_name = Set(clean_optional(Some(last)).unwrap_or_else(|| ".".into()));
    }
    if let Some(father) = payload.father_name {
        active.father_name = Set(clean_optional(father));
    }
    if let Some(mother) = payload.mother_name {
        active.mother_name = Set(clean_optional(mother));
    }
    if let Some(ref dob) = payload.date_of_birth {
        active.date_of_birth = Set(parse_date_of_birth(dob)?);
    }
    if let Some(email) = payload.email {
        active.email = Set(clean_optional(email).map(|e| e.to_lowercase()));
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(clean_optional(phone));
    }
    if let Some(category) = payload.category {
        active.category = Set(clean_optional(category));
    }
    if let Some(gender) = payload.gender {
        active.gender = Set(gender);
    }
    if let Some(department) = payload.department {
        active.department = Set(department.trim().to_string());
    }
    if let Some(program) = payload.program {
        active.program = Set(clean_optional(program));
    }
    if let Some(semester) = payload.semester {
        active.semester = Set(semester);
    }
    if let Some(batch) = payload.batch {
        active.batch = Set(clean_optional(batch));
    }
    if let Some(year) = payload.admission_year {
        active.admission_year = Set(year);
    }
    if let Some(verified) = payload.is_verified {
        active.is_verified = Set(verified);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(map_unique_violation)?;
    txn.commit().await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Students",
    operation_id = "deleteStudent",
    summary = "Delete a student",
    description = "Permanently deletes a student together with their help-desk queries. Requires `student:manage` permission. Returns 409 CONFLICT while results exist for the student.",
    params(("id" = i32, Path, description = "Student ID")),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Student still has results (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("student:manage")?;

    let txn = state.db.begin().await?;

    let _student = find_student_for_update(&txn, id).await?;

    let result_count = exam_result::Entity::find()
        .filter(exam_result::Column::StudentId.eq(id))
        .count(&txn)
        .await?;
    if result_count > 0 {
        return Err(AppError::Conflict(
            "Cannot delete a student with existing results".into(),
        ));
    }

    help_query::Entity::delete_many()
        .filter(help_query::Column::StudentId.eq(id))
        .exec(&txn)
        .await?;

    student::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!("Student deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn find_student_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<student::Model, AppError> {
    use sea_orm::sea_query::LockType;
    student::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}
