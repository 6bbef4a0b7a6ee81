use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{course, lesson, role, role_permission};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "instructor", "student"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: review workflow and catalog administration
    ("admin", "category:create"),
    ("admin", "course:review"),
    ("admin", "dashboard:admin"),
    // Instructor: authoring
    ("instructor", "course:create"),
    ("instructor", "course:edit"),
    ("instructor", "course:delete"),
    ("instructor", "lesson:manage"),
    ("instructor", "dashboard:instructor"),
    // Student: browsing only, no elevated permissions
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Seed roles
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    // Seed role-permission mappings
    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so we create
/// them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Unique composite index backing the (course, order) lesson invariant.
    // Load-bearing: lesson creation relies on the unique violation, so a
    // failure to create it is fatal.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_lesson_course_order")
        .table(lesson::Entity)
        .col(lesson::Column::CourseId)
        .col(lesson::Column::Order)
        .unique()
        .to_string(PostgresQueryBuilder);

    db.execute_unprepared(&stmt).await?;
    info!("Ensured unique index idx_lesson_course_order exists");

    // Composite index for the instructor dashboard and own-course listings:
    // SELECT ... FROM course WHERE instructor_id = ? AND status = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_course_instructor_status")
        .table(course::Entity)
        .col(course::Column::InstructorId)
        .col(course::Column::Status)
        .to_string(PostgresQueryBuilder);

    let result = db.execute_unprepared(&stmt).await;
    match result {
        Ok(_) => {
            info!("Ensured index idx_course_instructor_status exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_course_instructor_status: {}", e);
        }
    }

    Ok(())
}
