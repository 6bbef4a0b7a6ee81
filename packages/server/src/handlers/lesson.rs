use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{course, lesson};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, OptionalAuthUser};
use crate::extractors::json::AppJson;
use crate::models::lesson::{
    LessonPayload, LessonResponse, UpdateLessonRequest, validate_lesson_payload,
    validate_media_fields, validate_update_lesson,
};
use crate::state::AppState;
use crate::utils::course::{
    find_own_course_for_update, find_visible_course, require_draft,
};

#[utoipa::path(
    get,
    path = "/{course_id}/lessons",
    tag = "Lessons",
    operation_id = "listLessons",
    summary = "List a course's lessons",
    description = "Returns the lessons of a course in order. The parent course must be visible to the caller; lessons of invisible courses are reported as not found.",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "List of lessons", body = Vec<LessonResponse>),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(course_id = %course_id))]
pub async fn list_lessons(
    OptionalAuthUser(viewer): OptionalAuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<Vec<LessonResponse>>, AppError> {
    let course = find_visible_course(&state.db, viewer.as_ref(), course_id).await?;

    let lessons = lesson::Entity::find()
        .filter(lesson::Column::CourseId.eq(course.id))
        .order_by_asc(lesson::Column::Order)
        .all(&state.db)
        .await?
        .into_iter()
        .map(LessonResponse::from)
        .collect();

    Ok(Json(lessons))
}

#[utoipa::path(
    post,
    path = "/{course_id}/lessons",
    tag = "Lessons",
    operation_id = "createLesson",
    summary = "Add a lesson to a draft course",
    description = "Creates a lesson in a course owned by the caller. The course must be in DRAFT status, and the lesson's `order` must be unused within the course. Requires `lesson:manage` permission.",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    request_body = LessonPayload,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Order already taken, or course not in draft status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(course_id = %course_id))]
pub async fn create_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    AppJson(payload): AppJson<LessonPayload>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("lesson:manage")?;
    validate_lesson_payload(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let course = find_own_course_for_update(&txn, &auth_user, course_id).await?;
    require_draft(&course)?;

    let new_lesson = lesson::ActiveModel {
        id: Set(Uuid::new_v4()),
        course_id: Set(course.id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description.unwrap_or_default()),
        order: Set(payload.order),
        duration: Set(payload.duration.unwrap_or(0)),
        media_type: Set(payload.media_type),
        video_url: Set(payload.video_url),
        external_link: Set(payload.external_link),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_lesson.insert(&txn).await.map_err(order_conflict)?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(LessonResponse::from(model))))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "updateLesson",
    summary = "Update a lesson",
    description = "Partially updates a lesson using PATCH semantics. The parent course must be owned by the caller and in DRAFT status. `video_url` and `external_link` support three-state updates: omit to keep, null to clear, value to set. Requires `lesson:manage` permission.",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    request_body = UpdateLessonRequest,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Order already taken, or course not in draft status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateLessonRequest>,
) -> Result<Json<LessonResponse>, AppError> {
    auth_user.require_permission("lesson:manage")?;
    validate_update_lesson(&payload)?;

    let txn = state.db.begin().await?;

    let (existing, _course) = find_own_draft_lesson(&txn, &auth_user, id).await?;

    // Validate the media pairing against the merged state, since media_type
    // and the reference fields may change independently.
    let media_type = payload.media_type.unwrap_or(existing.media_type);
    let video_url = match payload.video_url {
        Some(ref v) => v.clone(),
        None => existing.video_url.clone(),
    };
    let external_link = match payload.external_link {
        Some(ref v) => v.clone(),
        None => existing.external_link.clone(),
    };
    validate_media_fields(media_type, &video_url, &external_link)?;

    let mut active: lesson::ActiveModel = existing.into();
    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(order) = payload.order {
        active.order = Set(order);
    }
    if let Some(duration) = payload.duration {
        active.duration = Set(duration);
    }
    active.media_type = Set(media_type);
    active.video_url = Set(video_url);
    active.external_link = Set(external_link);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await.map_err(order_conflict)?;
    txn.commit().await?;

    Ok(Json(LessonResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Lessons",
    operation_id = "deleteLesson",
    summary = "Delete a lesson",
    description = "Deletes a lesson. The parent course must be owned by the caller and in DRAFT status. Requires `lesson:manage` permission.",
    params(("id" = Uuid, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Lesson not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Course is not in draft status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_lesson(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("lesson:manage")?;

    let txn = state.db.begin().await?;

    let (existing, _course) = find_own_draft_lesson(&txn, &auth_user, id).await?;

    lesson::Entity::delete_by_id(existing.id).exec(&txn).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Look up a lesson whose parent course is owned by the caller and in
/// DRAFT status, locking the course row. An ownership miss is reported as
/// "Lesson not found", never as forbidden.
async fn find_own_draft_lesson(
    txn: &DatabaseTransaction,
    auth_user: &AuthUser,
    lesson_id: Uuid,
) -> Result<(lesson::Model, course::Model), AppError> {
    let lesson = lesson::Entity::find_by_id(lesson_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".into()))?;

    let course = course::Entity::find_by_id(lesson.course_id)
        .filter(course::Column::InstructorId.eq(auth_user.user_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Lesson not found".into()))?;

    require_draft(&course)?;

    Ok((lesson, course))
}

/// Map a unique violation on (course, order) to a CONFLICT response.
fn order_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(
            "A lesson with this order already exists in the course".into(),
        ),
        _ => AppError::from(e),
    }
}
