use serde_json::{Value, json};
use uuid::Uuid;

use crate::common::{TestApp, routes};

/// Create, submit, and approve a course with a custom payload, returning its id.
async fn approved_course(
    app: &TestApp,
    instructor: &str,
    admin: &str,
    category_id: Uuid,
    title: &str,
    price: &str,
) -> String {
    let res = app
        .post_with_token(
            routes::MY_COURSES,
            &json!({
                "title": title,
                "description": "An in-depth course.",
                "category_id": category_id,
                "thumbnail_url": "thumbnails/cover.jpg",
                "price": price,
            }),
            instructor,
        )
        .await;
    assert_eq!(res.status, 201, "course creation failed: {}", res.text);
    let id = res.id();
    app.submit_course(instructor, &id).await;
    app.approve_course(admin, &id).await;
    id
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn only_approved_courses_are_listed() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("cadmin1").await;
    let instructor = app.create_instructor("cinst1").await;
    let category_id = app.create_category("Catalog One").await;

    app.create_draft_course(&instructor, "Draft Course").await;
    let pending = app
        .create_ready_course(&instructor, "Pending Course", category_id)
        .await;
    app.submit_course(&instructor, &pending).await;
    approved_course(&app, &instructor, &admin, category_id, "Live Course", "0").await;

    let res = app.get_without_token(routes::CATALOG).await;

    assert_eq!(res.status, 200);
    assert_eq!(titles(&res.body), vec!["Live Course"]);
    assert_eq!(res.body["data"][0]["status"], "APPROVED");
}

#[tokio::test]
async fn is_free_filter_is_ternary() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("cadmin2").await;
    let instructor = app.create_instructor("cinst2").await;
    let category_id = app.create_category("Catalog Two").await;

    approved_course(&app, &instructor, &admin, category_id, "Free Course", "0").await;
    approved_course(&app, &instructor, &admin, category_id, "Paid Course", "49.99").await;

    let free = app
        .get_without_token(&format!("{}?is_free=true", routes::CATALOG))
        .await;
    assert_eq!(titles(&free.body), vec!["Free Course"]);
    assert_eq!(free.body["data"][0]["is_free"], true);

    let paid = app
        .get_without_token(&format!("{}?is_free=false", routes::CATALOG))
        .await;
    assert_eq!(titles(&paid.body), vec!["Paid Course"]);

    let both = app.get_without_token(routes::CATALOG).await;
    assert_eq!(both.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn multiple_categories_filter_with_or_semantics() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("cadmin3").await;
    let instructor = app.create_instructor("cinst3").await;
    let cat_a = app.create_category("Cat A").await;
    let cat_b = app.create_category("Cat B").await;
    let cat_c = app.create_category("Cat C").await;

    approved_course(&app, &instructor, &admin, cat_a, "In A", "0").await;
    approved_course(&app, &instructor, &admin, cat_b, "In B", "0").await;
    approved_course(&app, &instructor, &admin, cat_c, "In C", "0").await;

    let res = app
        .get_without_token(&format!(
            "{}?category={},{}&sort_by=title&sort_order=asc",
            routes::CATALOG,
            cat_a,
            cat_b
        ))
        .await;

    assert_eq!(res.status, 200);
    assert_eq!(titles(&res.body), vec!["In A", "In B"]);
}

#[tokio::test]
async fn search_covers_title_and_description() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("cadmin4").await;
    let instructor = app.create_instructor("cinst4").await;
    let category_id = app.create_category("Catalog Search").await;

    approved_course(&app, &instructor, &admin, category_id, "Rust Basics", "0").await;

    let res = app
        .post_with_token(
            routes::MY_COURSES,
            &json!({
                "title": "Systems Programming",
                "description": "Covers ownership and borrowing in depth.",
                "category_id": category_id,
                "thumbnail_url": "thumbnails/cover.jpg",
            }),
            &instructor,
        )
        .await;
    let id = res.id();
    app.submit_course(&instructor, &id).await;
    app.approve_course(&admin, &id).await;

    let by_title = app
        .get_without_token(&format!("{}?search=rust", routes::CATALOG))
        .await;
    assert_eq!(titles(&by_title.body), vec!["Rust Basics"]);

    let by_description = app
        .get_without_token(&format!("{}?search=Ownership", routes::CATALOG))
        .await;
    assert_eq!(titles(&by_description.body), vec!["Systems Programming"]);
}

#[tokio::test]
async fn catalog_sorts_by_price() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("cadmin5").await;
    let instructor = app.create_instructor("cinst5").await;
    let category_id = app.create_category("Catalog Sort").await;

    approved_course(&app, &instructor, &admin, category_id, "Mid", "25.00").await;
    approved_course(&app, &instructor, &admin, category_id, "Cheap", "5.00").await;
    approved_course(&app, &instructor, &admin, category_id, "Expensive", "99.00").await;

    let res = app
        .get_without_token(&format!(
            "{}?sort_by=price&sort_order=asc",
            routes::CATALOG
        ))
        .await;

    assert_eq!(titles(&res.body), vec!["Cheap", "Mid", "Expensive"]);
}

#[tokio::test]
async fn invalid_sort_field_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .get_without_token(&format!("{}?sort_by=price_per_minute", routes::CATALOG))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn list_items_carry_derived_fields() {
    let app = TestApp::spawn().await;
    let admin = app.create_admin("cadmin6").await;
    let instructor = app.create_instructor("cinst6").await;
    app.create_user("cstudent6", "student").await;
    let category_id = app.create_category("Catalog Derived").await;

    let res = app
        .post_with_token(
            routes::MY_COURSES,
            &json!({
                "title": "Derived Fields",
                "description": "Aggregates on list items.",
                "category_id": category_id,
                "thumbnail_url": "thumbnails/cover.jpg",
                "price": "10.00",
                "lessons": [
                    {"title": "First", "order": 1, "duration": 10, "media_type": "DOCUMENT"},
                    {"title": "Second", "order": 2, "duration": 20, "media_type": "DOCUMENT"},
                ],
            }),
            &instructor,
        )
        .await;
    let id = res.id();
    app.submit_course(&instructor, &id).await;
    app.approve_course(&admin, &id).await;

    let student_id = app.user_id("cstudent6").await;
    app.insert_enrollment(&id, student_id).await;

    let list = app.get_without_token(routes::CATALOG).await;
    let item = &list.body["data"][0];
    assert_eq!(item["lesson_count"], 2);
    assert_eq!(item["total_duration"], 30);
    assert_eq!(item["enrollment_count"], 1);
    assert_eq!(item["is_free"], false);
    assert_eq!(item["instructor_name"], "cinst6 Test");
    assert_eq!(item["category_name"], "Catalog Derived");
}

mod detail_visibility {
    use super::*;

    #[tokio::test]
    async fn anonymous_reader_gets_not_found_for_a_draft() {
        let app = TestApp::spawn().await;
        let instructor = app.create_instructor("vinst1").await;
        let id = app.create_draft_course(&instructor, "Invisible").await;

        let res = app.get_without_token(&routes::catalog_course(&id)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn owner_reads_own_draft_through_the_catalog() {
        let app = TestApp::spawn().await;
        let instructor = app.create_instructor("vinst2").await;
        let id = app.create_draft_course(&instructor, "Mine Though").await;

        let res = app
            .get_with_token(&routes::catalog_course(&id), &instructor)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Mine Though");
    }

    #[tokio::test]
    async fn other_instructor_cannot_read_a_draft() {
        let app = TestApp::spawn().await;
        let instructor_a = app.create_instructor("vinst3").await;
        let instructor_b = app.create_instructor("vinst4").await;
        let id = app.create_draft_course(&instructor_a, "Peers Blocked").await;

        let res = app
            .get_with_token(&routes::catalog_course(&id), &instructor_b)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn admin_reads_any_course() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("vadmin1").await;
        let instructor = app.create_instructor("vinst5").await;
        let id = app.create_draft_course(&instructor, "Admin Sees").await;

        let res = app.get_with_token(&routes::catalog_course(&id), &admin).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "Admin Sees");
    }

    #[tokio::test]
    async fn anonymous_reader_sees_approved_detail_with_lessons() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("vadmin2").await;
        let instructor = app.create_instructor("vinst6").await;
        let category_id = app.create_category("Catalog Detail").await;

        let res = app
            .post_with_token(
                routes::MY_COURSES,
                &json!({
                    "title": "Public Detail",
                    "description": "With lessons.",
                    "category_id": category_id,
                    "thumbnail_url": "thumbnails/cover.jpg",
                    "lessons": [
                        {"title": "Hello", "order": 1, "duration": 5, "media_type": "DOCUMENT"},
                    ],
                }),
                &instructor,
            )
            .await;
        let id = res.id();
        app.submit_course(&instructor, &id).await;
        app.approve_course(&admin, &id).await;

        let detail = app.get_without_token(&routes::catalog_course(&id)).await;

        assert_eq!(detail.status, 200);
        assert_eq!(detail.body["lessons"].as_array().unwrap().len(), 1);
        assert_eq!(detail.body["category"]["name"], "Catalog Detail");
        assert_eq!(detail.body["instructor"]["username"], "vinst6");
    }
}
