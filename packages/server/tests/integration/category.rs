use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn admin_can_create_a_category() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin1").await;

    let res = app
        .post_with_token(
            routes::CATEGORIES,
            &json!({"name": "Web Development", "description": "Frontend and backend"}),
            &admin,
        )
        .await;

    assert_eq!(res.status, 201);
    assert_eq!(res.body["name"], "Web Development");
    assert_eq!(res.body["course_count"], 0);
    assert!(res.body["id"].is_string());
}

#[tokio::test]
async fn instructor_cannot_create_a_category() {
    let app = TestApp::spawn().await;
    let token = app.create_instructor("inst1").await;

    let res = app
        .post_with_token(routes::CATEGORIES, &json!({"name": "Nope"}), &token)
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn duplicate_category_name_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin2").await;

    let first = app
        .post_with_token(routes::CATEGORIES, &json!({"name": "Data Science"}), &admin)
        .await;
    assert_eq!(first.status, 201);

    let second = app
        .post_with_token(routes::CATEGORIES, &json!({"name": "Data Science"}), &admin)
        .await;
    assert_eq!(second.status, 409);
    assert_eq!(second.body["code"], "CONFLICT");
}

#[tokio::test]
async fn list_is_public_and_counts_only_approved_courses() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("admin3").await;
    let instructor = app.create_instructor("inst2").await;
    let category_id = app.create_category("Programming").await;

    // One approved course and one draft course in the category; only the
    // approved one should be counted.
    app.create_approved_course(&instructor, &admin, "Rust Basics", category_id)
        .await;
    app.create_ready_course(&instructor, "Unfinished", category_id)
        .await;

    let res = app.get_without_token(routes::CATEGORIES).await;

    assert_eq!(res.status, 200);
    let items = res.body.as_array().unwrap();
    let programming = items
        .iter()
        .find(|c| c["name"] == "Programming")
        .expect("category listed");
    assert_eq!(programming["course_count"], 1);
}
