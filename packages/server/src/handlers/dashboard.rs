use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::instrument;

use crate::entity::course::{self, CourseStatus};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::dashboard::{AdminDashboardStats, InstructorDashboardStats};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "Review",
    operation_id = "adminDashboardStats",
    summary = "Platform-wide course statistics",
    description = "Returns global course counts by status and the number of distinct instructors with courses. Recomputed on every call. Requires `dashboard:admin` permission.",
    responses(
        (status = 200, description = "Statistics", body = AdminDashboardStats),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn admin_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>, AppError> {
    auth_user.require_permission("dashboard:admin")?;

    let total_courses = course::Entity::find().count(&state.db).await?;
    let pending_courses = count_by_status(&state.db, CourseStatus::Pending).await?;
    let approved_courses = count_by_status(&state.db, CourseStatus::Approved).await?;
    let rejected_courses = count_by_status(&state.db, CourseStatus::Rejected).await?;

    let instructors: Vec<i32> = course::Entity::find()
        .select_only()
        .column(course::Column::InstructorId)
        .distinct()
        .into_tuple()
        .all(&state.db)
        .await?;

    Ok(Json(AdminDashboardStats {
        total_courses,
        pending_courses,
        approved_courses,
        rejected_courses,
        total_instructors: instructors.len() as u64,
    }))
}

#[utoipa::path(
    get,
    path = "/dashboard/stats",
    tag = "Instructor Courses",
    operation_id = "instructorDashboardStats",
    summary = "The caller's course statistics",
    description = "Returns the authenticated instructor's course counts by status. Recomputed on every call. Requires `dashboard:instructor` permission.",
    responses(
        (status = 200, description = "Statistics", body = InstructorDashboardStats),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn instructor_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<InstructorDashboardStats>, AppError> {
    auth_user.require_permission("dashboard:instructor")?;

    let own = course::Entity::find()
        .filter(course::Column::InstructorId.eq(auth_user.user_id));

    let total_courses = own.clone().count(&state.db).await?;
    let draft_courses = count_own_by_status(&own, CourseStatus::Draft, &state.db).await?;
    let pending_courses = count_own_by_status(&own, CourseStatus::Pending, &state.db).await?;
    let approved_courses = count_own_by_status(&own, CourseStatus::Approved, &state.db).await?;
    let rejected_courses = count_own_by_status(&own, CourseStatus::Rejected, &state.db).await?;

    Ok(Json(InstructorDashboardStats {
        total_courses,
        draft_courses,
        pending_courses,
        approved_courses,
        rejected_courses,
    }))
}

async fn count_by_status(
    db: &DatabaseConnection,
    status: CourseStatus,
) -> Result<u64, AppError> {
    Ok(course::Entity::find()
        .filter(course::Column::Status.eq(status))
        .count(db)
        .await?)
}

async fn count_own_by_status(
    own: &Select<course::Entity>,
    status: CourseStatus,
    db: &DatabaseConnection,
) -> Result<u64, AppError> {
    Ok(own
        .clone()
        .filter(course::Column::Status.eq(status))
        .count(db)
        .await?)
}
