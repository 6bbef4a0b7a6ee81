use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    /// Unique category name (1-100 characters).
    #[schema(example = "Web Development")]
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
}

pub fn validate_create_category(req: &CreateCategoryRequest) -> Result<(), AppError> {
    let name = req.name.trim();
    if name.is_empty() || name.chars().count() > 100 {
        return Err(AppError::Validation(
            "Category name must be 1-100 characters".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Number of approved courses in this category. Computed at read time.
    pub course_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::category::Model> for CategoryResponse {
    fn from(m: crate::entity::category::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            course_count: 0,
            created_at: m.created_at,
        }
    }
}
