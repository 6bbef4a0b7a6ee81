use sea_orm::entity::prelude::*;
use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a course in the review workflow.
///
/// `Draft` is the initial state. Instructors submit `Draft` courses for
/// review (`Pending`); administrators resolve `Pending` courses to
/// `Approved` or `Rejected`. No transition leads out of the two terminal
/// states.
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
pub enum CourseStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "APPROVED")]
    Approved,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
}

impl CourseStatus {
    /// Returns the string representation (SCREAMING_SNAKE_CASE).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for CourseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning instructor. Immutable after creation.
    pub instructor_id: i32,
    #[sea_orm(belongs_to, from = "instructor_id", to = "id")]
    pub instructor: HasOne<super::user::Entity>,

    /// NULL when no category was set, or after the category was deleted.
    pub category_id: Option<Uuid>,
    #[sea_orm(belongs_to, from = "category_id", to = "id")]
    pub category: BelongsTo<Option<super::category::Entity>>,

    pub title: String,
    pub description: String,
    pub syllabus: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub thumbnail_url: Option<String>,

    pub status: CourseStatus,
    /// Non-empty whenever status is REJECTED.
    pub admin_comment: String,

    #[sea_orm(has_many)]
    pub lessons: HasMany<super::lesson::Entity>,

    #[sea_orm(has_many)]
    pub enrollments: HasMany<super::enrollment::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
