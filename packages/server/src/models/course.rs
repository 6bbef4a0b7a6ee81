use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lesson::{LessonPayload, LessonResponse, validate_lesson_payload};
use super::shared::{Pagination, double_option, validate_title};
use crate::entity::course::{self, CourseStatus};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub syllabus: Option<String>,
    pub category_id: Option<Uuid>,
    /// Course price; 0 (the default) means free.
    pub price: Option<Decimal>,
    pub thumbnail_url: Option<String>,
    /// Lessons created together with the course.
    pub lessons: Option<Vec<LessonPayload>>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub syllabus: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<Uuid>>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail_url: Option<Option<String>>,
    /// When present, replaces the course's entire lesson set.
    pub lessons: Option<Vec<LessonPayload>>,
}

/// Request body for the admin review decision.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReviewCourseRequest {
    /// Target status: `APPROVED` or `REJECTED`.
    #[schema(example = "REJECTED")]
    pub status: String,
    /// Feedback for the instructor. Required when rejecting.
    pub admin_comment: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct MyCoursesQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct CatalogQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive search over title and description.
    pub search: Option<String>,
    /// Comma-separated category IDs; matches courses in any of them.
    pub category: Option<String>,
    /// true = only free courses, false = only paid courses. Omit for both.
    pub is_free: Option<bool>,
    /// One of: created_at (default), price, title.
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default desc).
    pub sort_order: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PendingCoursesQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Restrict to one category.
    pub category: Option<Uuid>,
    /// Restrict to one instructor by user ID.
    pub instructor: Option<i32>,
    /// One of: created_at (default), title.
    pub sort_by: Option<String>,
    /// "asc" or "desc" (default desc).
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
}

impl From<crate::entity::user::Model> for UserSummary {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            full_name: m.full_name,
            role: m.role,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

impl From<crate::entity::category::Model> for CategoryRef {
    fn from(m: crate::entity::category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
        }
    }
}

/// Full course detail, including lessons and read-time aggregates.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseResponse {
    pub id: Uuid,
    pub instructor: UserSummary,
    pub category: Option<CategoryRef>,
    pub title: String,
    pub description: String,
    pub syllabus: String,
    pub price: Decimal,
    pub is_free: bool,
    pub thumbnail_url: Option<String>,
    pub status: CourseStatus,
    pub admin_comment: String,
    pub lessons: Vec<LessonResponse>,
    pub lesson_count: i64,
    /// Sum of lesson durations in minutes.
    pub total_duration: i64,
    pub enrollment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Course summary used by all list views.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor_name: String,
    pub category_name: Option<String>,
    pub price: Decimal,
    pub is_free: bool,
    pub thumbnail_url: Option<String>,
    pub status: CourseStatus,
    pub lesson_count: i64,
    pub total_duration: i64,
    pub enrollment_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CourseListResponse {
    pub data: Vec<CourseListItem>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("Price must be non-negative".into()));
    }
    Ok(())
}

/// Validate a full lesson set supplied with a course create/update:
/// every payload must be valid and orders must not repeat.
pub fn validate_lesson_set(lessons: &[LessonPayload]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for payload in lessons {
        validate_lesson_payload(payload)?;
        if !seen.insert(payload.order) {
            return Err(AppError::Validation(format!(
                "Duplicate lesson order {} in lesson list",
                payload.order
            )));
        }
    }
    Ok(())
}

pub fn validate_create_course(req: &CreateCourseRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    if let Some(price) = req.price {
        validate_price(price)?;
    }
    if let Some(ref lessons) = req.lessons {
        validate_lesson_set(lessons)?;
    }
    Ok(())
}

pub fn validate_update_course(req: &UpdateCourseRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref description) = req.description
        && description.trim().is_empty()
    {
        return Err(AppError::Validation("Description must not be empty".into()));
    }
    if let Some(price) = req.price {
        validate_price(price)?;
    }
    if let Some(ref lessons) = req.lessons {
        validate_lesson_set(lessons)?;
    }
    Ok(())
}

/// Fields that must be filled in before a draft can be submitted for
/// review, with the presence check applied to the stored course.
const REQUIRED_FOR_SUBMISSION: &[(&str, fn(&course::Model) -> bool)] = &[
    ("title", |c| !c.title.trim().is_empty()),
    ("description", |c| !c.description.trim().is_empty()),
    ("category", |c| c.category_id.is_some()),
    ("thumbnail_url", |c| {
        matches!(&c.thumbnail_url, Some(t) if !t.trim().is_empty())
    }),
];

/// Check a draft against the submission requirements, reporting every
/// missing field at once.
pub fn validate_submission(course: &course::Model) -> Result<(), AppError> {
    let mut fields = BTreeMap::new();
    for (name, is_present) in REQUIRED_FOR_SUBMISSION {
        if !is_present(course) {
            fields.insert(
                name.to_string(),
                vec![format!("{name} is required when submitting for approval")],
            );
        }
    }
    if fields.is_empty() {
        Ok(())
    } else {
        Err(AppError::Fields(fields))
    }
}

/// Parse and validate a review decision. Returns the target status and the
/// trimmed admin comment.
pub fn validate_review(req: &ReviewCourseRequest) -> Result<(CourseStatus, String), AppError> {
    let status = match req.status.as_str() {
        "APPROVED" => CourseStatus::Approved,
        "REJECTED" => CourseStatus::Rejected,
        _ => {
            return Err(AppError::field(
                "status",
                "Status must be either APPROVED or REJECTED",
            ));
        }
    };

    let comment = req
        .admin_comment
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_string();
    if status == CourseStatus::Rejected && comment.is_empty() {
        return Err(AppError::field(
            "admin_comment",
            "Admin comment is required when rejecting a course",
        ));
    }

    Ok((status, comment))
}

/// Parse the comma-separated category filter of the catalog query.
pub fn parse_category_filter(raw: &Option<String>) -> Result<Option<Vec<Uuid>>, AppError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let mut ids = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let id = part.parse::<Uuid>().map_err(|_| {
            AppError::Validation(format!("Invalid category ID '{part}'"))
        })?;
        ids.push(id);
    }
    Ok(if ids.is_empty() { None } else { Some(ids) })
}
