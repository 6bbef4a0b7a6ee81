use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};

/// How a lesson's content is delivered.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    DeriveActiveEnum,
    EnumIter,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    /// Hosted video; `video_url` must be set.
    #[sea_orm(string_value = "VIDEO")]
    Video,
    /// Link to an external resource; `external_link` must be set.
    #[sea_orm(string_value = "EXTERNAL")]
    External,
    /// Text/document content.
    #[sea_orm(string_value = "DOCUMENT")]
    Document,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lesson")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub course_id: Uuid,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: HasOne<super::course::Entity>,

    pub title: String,
    pub description: String,
    /// Position within the course. Unique per course (enforced by index).
    pub order: i32,
    /// Duration in minutes.
    pub duration: i32,

    pub media_type: MediaType,
    pub video_url: Option<String>,
    pub external_link: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
