use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/categories", category_routes())
        .nest("/instructor", instructor_routes())
        .nest("/catalog", catalog_routes())
        .nest("/courses", course_lesson_routes())
        .nest("/lessons", lesson_routes())
        .nest("/admin", admin_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::category::list_categories,
        handlers::category::create_category
    ))
}

fn instructor_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::list_my_courses,
            handlers::course::create_course
        ))
        .routes(routes!(
            handlers::course::get_my_course,
            handlers::course::update_course,
            handlers::course::delete_course
        ))
        .routes(routes!(handlers::course::submit_course))
        .routes(routes!(handlers::dashboard::instructor_stats))
}

fn catalog_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::catalog::list_catalog))
        .routes(routes!(handlers::catalog::get_catalog_course))
}

fn course_lesson_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::lesson::list_lessons,
        handlers::lesson::create_lesson
    ))
}

fn lesson_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::lesson::update_lesson,
        handlers::lesson::delete_lesson
    ))
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::review::list_pending_courses))
        .routes(routes!(handlers::review::get_pending_course))
        .routes(routes!(handlers::review::review_course))
        .routes(routes!(handlers::dashboard::admin_stats))
}
