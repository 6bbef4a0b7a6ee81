use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's enrollment in a course. Managed elsewhere; this service
/// only counts rows for the derived `enrollment_count` field.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_id: Uuid,
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "course_id", to = "id")]
    pub course: BelongsTo<super::course::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub user: BelongsTo<super::user::Entity>,

    pub enrolled_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
