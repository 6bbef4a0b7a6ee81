use axum::Json;
use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::course::{self, CourseStatus};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::OptionalAuthUser;
use crate::models::course::{
    CatalogQuery, CourseListResponse, CourseResponse, parse_category_filter,
};
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::course::{find_visible_course, load_course_detail, load_list_items};

#[utoipa::path(
    get,
    path = "/",
    tag = "Catalog",
    operation_id = "listCatalog",
    summary = "Browse the public course catalog",
    description = "Returns approved courses. Supports case-insensitive search over title and description, filtering by one or more categories, a free/paid filter, and sorting by `created_at` (default, desc), `price`, or `title`.",
    params(CatalogQuery),
    responses(
        (status = 200, description = "List of approved courses", body = CourseListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_catalog(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CourseListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select =
        course::Entity::find().filter(course::Column::Status.eq(CourseStatus::Approved));

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(course::Column::Title)))
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col(course::Column::Description)))
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            );
        }
    }

    if let Some(category_ids) = parse_category_filter(&query.category)? {
        select = select.filter(course::Column::CategoryId.is_in(category_ids));
    }

    match query.is_free {
        Some(true) => select = select.filter(course::Column::Price.eq(Decimal::ZERO)),
        Some(false) => select = select.filter(course::Column::Price.ne(Decimal::ZERO)),
        None => {}
    }

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => course::Column::CreatedAt,
        "price" => course::Column::Price,
        "title" => course::Column::Title,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, price, title".into(),
            ));
        }
    };

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let courses = select
        .order_by(sort_column, sort_order)
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
    get,
    path = "/{id}",
    tag = "Catalog",
    operation_id = "getCatalogCourse",
    summary = "Get a course by ID",
    description = "Returns the full course detail, lessons included. Anonymous callers and students see approved courses only; instructors additionally see their own courses in any status; admins see everything. Courses outside the caller's scope are reported as not found.",
    params(("id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course detail", body = CourseResponse),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Course not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, viewer), fields(id = %id))]
pub async fn get_catalog_course(
    OptionalAuthUser(viewer): OptionalAuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CourseResponse>, AppError> {
    let model = find_visible_course(&state.db, viewer.as_ref(), id).await?;
    Ok(Json(load_course_detail(&state.db, model).await?))
}
