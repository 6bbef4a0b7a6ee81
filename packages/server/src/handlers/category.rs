use std::collections::HashMap;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::course::CourseStatus;
use crate::entity::{category, course};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::category::{
    CategoryResponse, CreateCategoryRequest, validate_create_category,
};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Returns all categories ordered by name. Each entry carries the number of approved courses in it, computed at read time.",
    responses(
        (status = 200, description = "List of categories", body = Vec<CategoryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let categories = category::Entity::find()
        .order_by_asc(category::Column::Name)
        .all(&state.db)
        .await?;

    // Approved-course counts per category, one grouped query.
    let counts: HashMap<Uuid, i64> = course::Entity::find()
        .filter(course::Column::Status.eq(CourseStatus::Approved))
        .filter(course::Column::CategoryId.is_not_null())
        .select_only()
        .column(course::Column::CategoryId)
        .column_as(course::Column::Id.count(), "course_count")
        .group_by(course::Column::CategoryId)
        .into_tuple::<(Option<Uuid>, i64)>()
        .all(&state.db)
        .await?
        .into_iter()
        .filter_map(|(id, count)| id.map(|id| (id, count)))
        .collect();

    let items = categories
        .into_iter()
        .map(|c| {
            let mut item = CategoryResponse::from(c);
            item.course_count = counts.get(&item.id).copied().unwrap_or(0);
            item
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Creates a new category. Requires `category:create` permission. Category names are unique.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Name already taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("category:create")?;
    validate_create_category(&payload)?;

    let new_category = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description.unwrap_or_default()),
        created_at: Set(chrono::Utc::now()),
    };

    let model = new_category
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::Conflict("Category name is already taken".into())
            }
            _ => AppError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from(model))))
}
