use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::course::{self, CourseStatus};
use crate::entity::{category, enrollment, lesson, user};
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::course::{CourseListItem, CourseResponse};
use crate::models::lesson::LessonResponse;

/// Courses the given (possibly anonymous) viewer may read.
///
/// Admins see every course; instructors see approved courses plus their
/// own in any status; everyone else sees approved courses only. Rows
/// outside this scope are indistinguishable from nonexistent ones.
pub fn visible_courses(viewer: Option<&AuthUser>) -> Select<course::Entity> {
    let select = course::Entity::find();
    match viewer {
        Some(user) if user.has_permission("course:review") => select,
        Some(user) if user.has_permission("course:create") => select.filter(
            Condition::any()
                .add(course::Column::Status.eq(CourseStatus::Approved))
                .add(course::Column::InstructorId.eq(user.user_id)),
        ),
        _ => select.filter(course::Column::Status.eq(CourseStatus::Approved)),
    }
}

/// Look up a course within the viewer's visible scope, returning 404 when
/// it is absent or out of scope.
pub async fn find_visible_course<C: ConnectionTrait>(
    db: &C,
    viewer: Option<&AuthUser>,
    id: Uuid,
) -> Result<course::Model, AppError> {
    visible_courses(viewer)
        .filter(course::Column::Id.eq(id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

/// Look up a course owned by the caller, in any status.
pub async fn find_own_course<C: ConnectionTrait>(
    db: &C,
    auth_user: &AuthUser,
    id: Uuid,
) -> Result<course::Model, AppError> {
    course::Entity::find_by_id(id)
        .filter(course::Column::InstructorId.eq(auth_user.user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

/// Like [`find_own_course`], but locks the row for the transaction.
pub async fn find_own_course_for_update(
    txn: &DatabaseTransaction,
    auth_user: &AuthUser,
    id: Uuid,
) -> Result<course::Model, AppError> {
    course::Entity::find_by_id(id)
        .filter(course::Column::InstructorId.eq(auth_user.user_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".into()))
}

/// Courses are editable only in draft status.
pub fn require_draft(course: &course::Model) -> Result<(), AppError> {
    if course.status != CourseStatus::Draft {
        return Err(AppError::Conflict(
            "Course can only be edited in draft status".into(),
        ));
    }
    Ok(())
}

/// Per-course lesson aggregates: (lesson_count, total_duration).
async fn load_lesson_stats<C: ConnectionTrait>(
    db: &C,
    course_ids: &[Uuid],
) -> Result<HashMap<Uuid, (i64, i64)>, AppError> {
    let rows: Vec<(Uuid, i64, Option<i64>)> = lesson::Entity::find()
        .filter(lesson::Column::CourseId.is_in(course_ids.iter().copied()))
        .select_only()
        .column(lesson::Column::CourseId)
        .column_as(lesson::Column::Id.count(), "lesson_count")
        .column_as(lesson::Column::Duration.sum(), "total_duration")
        .group_by(lesson::Column::CourseId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, count, total)| (id, (count, total.unwrap_or(0))))
        .collect())
}

/// Per-course enrollment counts.
async fn load_enrollment_counts<C: ConnectionTrait>(
    db: &C,
    course_ids: &[Uuid],
) -> Result<HashMap<Uuid, i64>, AppError> {
    let rows: Vec<(Uuid, i64)> = enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.is_in(course_ids.iter().copied()))
        .select_only()
        .column(enrollment::Column::CourseId)
        .column_as(enrollment::Column::UserId.count(), "enrollment_count")
        .group_by(enrollment::Column::CourseId)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Build list items for a page of courses, attaching instructor/category
/// names and the read-time aggregates in a fixed number of queries.
pub async fn load_list_items<C: ConnectionTrait>(
    db: &C,
    courses: Vec<course::Model>,
) -> Result<Vec<CourseListItem>, AppError> {
    let course_ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
    let instructor_ids: Vec<i32> = courses.iter().map(|c| c.instructor_id).collect();
    let category_ids: Vec<Uuid> = courses.iter().filter_map(|c| c.category_id).collect();

    let instructors: HashMap<i32, String> = user::Entity::find()
        .filter(user::Column::Id.is_in(instructor_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u.full_name))
        .collect();

    let categories: HashMap<Uuid, String> = category::Entity::find()
        .filter(category::Column::Id.is_in(category_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let lesson_stats = load_lesson_stats(db, &course_ids).await?;
    let enrollments = load_enrollment_counts(db, &course_ids).await?;

    Ok(courses
        .into_iter()
        .map(|c| {
            let (lesson_count, total_duration) =
                lesson_stats.get(&c.id).copied().unwrap_or((0, 0));
            CourseListItem {
                id: c.id,
                instructor_name: instructors
                    .get(&c.instructor_id)
                    .cloned()
                    .unwrap_or_default(),
                category_name: c.category_id.and_then(|id| categories.get(&id).cloned()),
                is_free: c.price == Decimal::ZERO,
                lesson_count,
                total_duration,
                enrollment_count: enrollments.get(&c.id).copied().unwrap_or(0),
                title: c.title,
                description: c.description,
                price: c.price,
                thumbnail_url: c.thumbnail_url,
                status: c.status,
                created_at: c.created_at,
            }
        })
        .collect())
}

/// Build the full detail response for one course, lessons included.
pub async fn load_course_detail<C: ConnectionTrait>(
    db: &C,
    course: course::Model,
) -> Result<CourseResponse, AppError> {
    let instructor = user::Entity::find_by_id(course.instructor_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Instructor {} missing", course.instructor_id))
        })?;

    let category = match course.category_id {
        Some(id) => category::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    let lessons: Vec<LessonResponse> = lesson::Entity::find()
        .filter(lesson::Column::CourseId.eq(course.id))
        .order_by_asc(lesson::Column::Order)
        .all(db)
        .await?
        .into_iter()
        .map(LessonResponse::from)
        .collect();

    let enrollment_count = enrollment::Entity::find()
        .filter(enrollment::Column::CourseId.eq(course.id))
        .count(db)
        .await?;

    let total_duration: i64 = lessons.iter().map(|l| i64::from(l.duration)).sum();

    Ok(CourseResponse {
        id: course.id,
        instructor: instructor.into(),
        category: category.map(Into::into),
        is_free: course.price == Decimal::ZERO,
        lesson_count: lessons.len() as i64,
        total_duration,
        enrollment_count: enrollment_count as i64,
        lessons,
        title: course.title,
        description: course.description,
        syllabus: course.syllabus,
        price: course.price,
        thumbnail_url: course.thumbnail_url,
        status: course.status,
        admin_comment: course.admin_comment,
        created_at: course.created_at,
        updated_at: course.updated_at,
    })
}
