use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::course::{self, CourseStatus};
use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::{
    CourseListResponse, CourseResponse, PendingCoursesQuery, ReviewCourseRequest,
    validate_review,
};
use crate::models::shared::Pagination;
use crate::state::AppState;
use crate::utils::course::{load_course_detail, load_list_items};

#[utoipa::path(
    get,
    path = "/courses/pending",
    tag = "Review",
    operation_id = "listPendingCourses",
    summary = "List courses awaiting review",
    description = "Returns all PENDING courses, newest first, optionally filtered by category or instructor and sorted by `created_at` (default, desc) or `title`. Requires `course:review` permission.",
    params(PendingCoursesQuery),
    responses(
        (status = 200, description = "List of pending courses", body = CourseListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_pending_courses(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PendingCoursesQuery>,
) -> Result<Json<CourseListResponse>, AppError> {
    auth_user.require_permission("course:review")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select =
        course::Entity::find().filter(course::Column::Status.eq(CourseStatus::Pending));

    if let Some(category_id) = query.category {
        select = select.filter(course::Column::CategoryId.eq(category_id));
    }
    if let Some(instructor_id) = query.instructor {
        select = select.filter(course::Column::InstructorId.eq(instructor_id));
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => course::Column::CreatedAt,
        "title" => course::Column::Title,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, title".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let courses = select
        .order_by(sort_column, sort_order)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let data = load_list_items(&state.db, courses).await?;

    Ok(Json(CourseListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Review",
    operation_id = "getPendingCourse",
    summary = "Get a pending course for review",
    description = "Returns the full detail of a PENDING course, lessons included. Courses in any other status are reported as not found. Requires `course:review` permission.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course detail", body = CourseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found in pending status (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_pending_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:review")?;

    let model = course::Entity::find_by_id(id)
        .filter(course::Column::Status.eq(CourseStatus::Pending))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found in pending status".into()))?;

    Ok(Json(load_course_detail(&state.db, model).await?))
}

#[utoipa::path(
    post,
    path = "/courses/{id}/review",
    tag = "Review",
    operation_id = "reviewCourse",
    summary = "Approve or reject a pending course",
    description = "Resolves a PENDING course to APPROVED or REJECTED. Rejection requires an admin comment. The status check runs on a locked row, so of two concurrent decisions only the first succeeds; the loser sees not-found. The instructor is notified by email, best-effort. Requires `course:review` permission.",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = ReviewCourseRequest,
    responses(
        (status = 200, description = "Course reviewed", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found in pending status (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, status = %payload.status))]
pub async fn review_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ReviewCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:review")?;
    let (status, comment) = validate_review(&payload)?;

    let txn = state.db.begin().await?;

    // Lock the row, then re-check the status: of two concurrent decisions
    // the second one blocks here and finds the course no longer pending.
    let existing = course::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .filter(|c| c.status == CourseStatus::Pending)
        .ok_or_else(|| AppError::NotFound("Course not found in pending status".into()))?;

    let instructor = user::Entity::find_by_id(existing.instructor_id)
        .one(&txn)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Instructor {} missing", existing.instructor_id))
        })?;

    let course_title = existing.title.clone();
    let mut active: course::ActiveModel = existing.into();
    active.status = Set(status);
    active.admin_comment = Set(comment.clone());
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    notify_instructor(&state, instructor.email, course_title, status, comment);

    Ok(Json(load_course_detail(&state.db, model).await?))
}

/// Send the review outcome to the instructor, fire-and-forget. Delivery
/// failures are logged and never affect the review response.
fn notify_instructor(
    state: &AppState,
    recipient: String,
    course_title: String,
    status: CourseStatus,
    comment: String,
) {
    let (action, subject) = match status {
        CourseStatus::Approved => ("approved", "Course Approved - SkillSphere"),
        _ => ("rejected", "Course Rejected - SkillSphere"),
    };
    let mut body = format!("Your course \"{}\" has been {}.", course_title, action);
    if !comment.is_empty() {
        body.push_str(&format!("\n\nAdmin comment: {}", comment));
    }

    let mailer = state.mailer.clone();
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&recipient, subject, &body).await {
            tracing::warn!(
                "Failed to deliver review notification to {}: {}",
                recipient,
                e
            );
        }
    });
}
