use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::BootstrapAdminConfig;
use crate::entity::{admin, exam_result};
use crate::utils::hash;

/// Create the configured administrator if no admin with that username exists.
pub async fn seed_bootstrap_admin(
    db: &DatabaseConnection,
    bootstrap: &BootstrapAdminConfig,
) -> anyhow::Result<()> {
    let username = bootstrap.username.trim();
    if username.is_empty() || bootstrap.password.is_empty() {
        anyhow::bail!("auth.bootstrap_admin requires a username and a password");
    }

    let exists = admin::Entity::find()
        .filter(admin::Column::Username.eq(username))
        .count(db)
        .await?
        > 0;
    if exists {
        return Ok(());
    }

    let password = hash::hash_password(&bootstrap.password)
        .map_err(|e| anyhow::anyhow!("Password hash error: {}", e))?;
    let model = admin::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = admin::Entity::insert(model)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(admin::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(username, "Seeded bootstrap administrator"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so we create them
/// manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One result per student, semester, academic year and exam type.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_exam_result_unique_exam")
        .table(exam_result::Entity)
        .col(exam_result::Column::StudentId)
        .col(exam_result::Column::Semester)
        .col(exam_result::Column::AcademicYear)
        .col(exam_result::Column::ExamType)
        .to_string(PostgresQueryBuilder);

    db.execute_unprepared(&stmt).await?;
    info!("Ensured index idx_exam_result_unique_exam exists");

    // Cohort queries: publish/unpublish and gazette by semester.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_exam_result_semester_published")
        .table(exam_result::Entity)
        .col(exam_result::Column::Semester)
        .col(exam_result::Column::IsPublished)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_exam_result_semester_published exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_exam_result_semester_published: {}",
                e
            );
        }
    }

    Ok(())
}
