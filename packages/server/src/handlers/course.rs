use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::course::{self, CourseStatus};
use crate::entity::{category, lesson};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::course::*;
use crate::models::lesson::LessonPayload;
use crate::models::shared::Pagination;
use crate::state::AppState;
use crate::utils::course::{
    find_own_course, find_own_course_for_update, load_course_detail, load_list_items,
    require_draft,
};

#[utoipa::path(
    get,
    path = "/courses",
    tag = "Instructor Courses",
    operation_id = "listMyCourses",
    summary = "List the caller's own courses",
    description = "Returns all courses owned by the authenticated instructor, in every status, newest first. Requires `course:create` permission.",
    params(MyCoursesQuery),
    responses(
        (status = 200, description = "List of own courses", body = CourseListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_my_courses(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MyCoursesQuery>,
) -> Result<Json<CourseListResponse>, AppError> {
    auth_user.require_permission("course:create")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let select = course::Entity::find()
        .filter(course::Column::InstructorId.eq(auth_user.user_id));

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let courses = select
        .order_by_desc(course::Column::CreatedAt)
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
    post,
    path = "/courses",
    tag = "Instructor Courses",
    operation_id = "createCourse",
    summary = "Create a course",
    description = "Creates a new course in DRAFT status, optionally together with its lessons. Requires `course:create` permission.",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:create")?;
    validate_create_course(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    if let Some(category_id) = payload.category_id {
        check_category_exists(&txn, category_id).await?;
    }

    let new_course = course::ActiveModel {
        id: Set(Uuid::new_v4()),
        instructor_id: Set(auth_user.user_id),
        category_id: Set(payload.category_id),
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        syllabus: Set(payload.syllabus.unwrap_or_default()),
        price: Set(payload.price.unwrap_or(Decimal::ZERO)),
        thumbnail_url: Set(payload.thumbnail_url),
        status: Set(CourseStatus::Draft),
        admin_comment: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_course.insert(&txn).await?;

    if let Some(lessons) = payload.lessons {
        insert_lessons(&txn, model.id, lessons, now).await?;
    }

    txn.commit().await?;

    let detail = load_course_detail(&state.db, model).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/courses/{id}",
    tag = "Instructor Courses",
    operation_id = "getMyCourse",
    summary = "Get one of the caller's own courses",
    description = "Returns the full detail of a course owned by the caller, in any status. Requires `course:create` permission.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course detail", body = CourseResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn get_my_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:create")?;

    let model = find_own_course(&state.db, &auth_user, id).await?;
    Ok(Json(load_course_detail(&state.db, model).await?))
}

#[utoipa::path(
    patch,
    path = "/courses/{id}",
    tag = "Instructor Courses",
    operation_id = "updateCourse",
    summary = "Update a draft course",
    description = "Partially updates a course owned by the caller using PATCH semantics. Only DRAFT courses are editable. When `lessons` is supplied, the entire lesson set is replaced atomically. Requires `course:edit` permission.",
    params(("id" = Uuid, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Course is not in draft status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id))]
pub async fn update_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateCourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:edit")?;
    validate_update_course(&payload)?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let existing = find_own_course_for_update(&txn, &auth_user, id).await?;
    require_draft(&existing)?;

    if let Some(Some(category_id)) = payload.category_id {
        check_category_exists(&txn, category_id).await?;
    }

    let course_id = existing.id;
    let mut active: course::ActiveModel = existing.into();

    if let Some(ref title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(syllabus) = payload.syllabus {
        active.syllabus = Set(syllabus);
    }
    match payload.category_id {
        Some(Some(category_id)) => active.category_id = Set(Some(category_id)),
        Some(None) => active.category_id = Set(None),
        None => {}
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    match payload.thumbnail_url {
        Some(Some(url)) => active.thumbnail_url = Set(Some(url)),
        Some(None) => active.thumbnail_url = Set(None),
        None => {}
    }
    active.updated_at = Set(now);

    let model = active.update(&txn).await?;

    // Replace the full lesson set inside the same transaction, so readers
    // never observe a partially-replaced set.
    if let Some(lessons) = payload.lessons {
        lesson::Entity::delete_many()
            .filter(lesson::Column::CourseId.eq(course_id))
            .exec(&txn)
            .await?;
        insert_lessons(&txn, course_id, lessons, now).await?;
    }

    txn.commit().await?;

    Ok(Json(load_course_detail(&state.db, model).await?))
}

#[utoipa::path(
    delete,
    path = "/courses/{id}",
    tag = "Instructor Courses",
    operation_id = "deleteCourse",
    summary = "Delete a draft course",
    description = "Deletes a course owned by the caller along with all its lessons. Only DRAFT courses can be deleted. Requires `course:delete` permission.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Course is not in draft status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn delete_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("course:delete")?;

    let txn = state.db.begin().await?;

    let existing = find_own_course_for_update(&txn, &auth_user, id).await?;
    require_draft(&existing)?;

    lesson::Entity::delete_many()
        .filter(lesson::Column::CourseId.eq(existing.id))
        .exec(&txn)
        .await?;
    course::Entity::delete_by_id(existing.id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/courses/{id}/submit",
    tag = "Instructor Courses",
    operation_id = "submitCourse",
    summary = "Submit a draft course for review",
    description = "Moves a DRAFT course to PENDING. Title, description, category, and thumbnail must all be filled in; every missing field is reported. Requires `course:create` permission.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course submitted", body = CourseResponse),
        (status = 400, description = "Required fields missing (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Course is not in draft status (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id))]
pub async fn submit_course(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, AppError> {
    auth_user.require_permission("course:create")?;

    let txn = state.db.begin().await?;

    let existing = find_own_course_for_update(&txn, &auth_user, id).await?;
    if existing.status != CourseStatus::Draft {
        return Err(AppError::Conflict(
            "Only draft courses can be submitted for review".into(),
        ));
    }
    validate_submission(&existing)?;

    let mut active: course::ActiveModel = existing.into();
    active.status = Set(CourseStatus::Pending);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(load_course_detail(&state.db, model).await?))
}

async fn check_category_exists(
    txn: &DatabaseTransaction,
    category_id: Uuid,
) -> Result<(), AppError> {
    category::Entity::find_by_id(category_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::field("category_id", "Category does not exist"))?;
    Ok(())
}

/// Insert a validated lesson set for a course.
pub(crate) async fn insert_lessons(
    txn: &DatabaseTransaction,
    course_id: Uuid,
    lessons: Vec<LessonPayload>,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    for payload in lessons {
        let new_lesson = lesson::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
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
        new_lesson.insert(txn).await?;
    }
    Ok(())
}
