use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{double_option, validate_title};
use crate::entity::lesson::{self, MediaType};
use crate::error::AppError;

/// A lesson supplied by an instructor, either standalone or nested in a
/// course create/update request.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LessonPayload {
    pub title: String,
    pub description: Option<String>,
    /// Position within the course. Must be unique per course.
    pub order: i32,
    /// Duration in minutes.
    pub duration: Option<i32>,
    pub media_type: MediaType,
    pub video_url: Option<String>,
    pub external_link: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateLessonRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<i32>,
    pub duration: Option<i32>,
    pub media_type: Option<MediaType>,
    #[serde(default, deserialize_with = "double_option")]
    pub video_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub external_link: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LessonResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,
    pub duration: i32,
    pub media_type: MediaType,
    pub video_url: Option<String>,
    pub external_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<lesson::Model> for LessonResponse {
    fn from(m: lesson::Model) -> Self {
        Self {
            id: m.id,
            course_id: m.course_id,
            title: m.title,
            description: m.description,
            order: m.order,
            duration: m.duration,
            media_type: m.media_type,
            video_url: m.video_url,
            external_link: m.external_link,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    match value {
        Some(s) => s.trim().is_empty(),
        None => true,
    }
}

/// Check the media-type/field pairing: VIDEO lessons need a video
/// reference, EXTERNAL lessons need a link.
pub fn validate_media_fields(
    media_type: MediaType,
    video_url: &Option<String>,
    external_link: &Option<String>,
) -> Result<(), AppError> {
    match media_type {
        MediaType::Video if is_blank(video_url) => Err(AppError::field(
            "video_url",
            "Video URL is required for video lessons",
        )),
        MediaType::External if is_blank(external_link) => Err(AppError::field(
            "external_link",
            "External link is required for external lessons",
        )),
        _ => Ok(()),
    }
}

pub fn validate_lesson_payload(payload: &LessonPayload) -> Result<(), AppError> {
    validate_title(&payload.title)?;
    if payload.order < 0 {
        return Err(AppError::Validation("Order must be >= 0".into()));
    }
    if let Some(duration) = payload.duration
        && duration < 0
    {
        return Err(AppError::Validation(
            "Duration must be >= 0 minutes".into(),
        ));
    }
    if let Some(ref link) = payload.external_link
        && link.chars().count() > 500
    {
        return Err(AppError::Validation(
            "External link must be at most 500 characters".into(),
        ));
    }
    validate_media_fields(
        payload.media_type,
        &payload.video_url,
        &payload.external_link,
    )
}

pub fn validate_update_lesson(req: &UpdateLessonRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(order) = req.order
        && order < 0
    {
        return Err(AppError::Validation("Order must be >= 0".into()));
    }
    if let Some(duration) = req.duration
        && duration < 0
    {
        return Err(AppError::Validation(
            "Duration must be >= 0 minutes".into(),
        ));
    }
    if let Some(Some(ref link)) = req.external_link
        && link.chars().count() > 500
    {
        return Err(AppError::Validation(
            "External link must be at most 500 characters".into(),
        ));
    }
    Ok(())
}
