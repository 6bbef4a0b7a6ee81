use serde_json::json;

use crate::common::{TestApp, routes};

mod creation {
    use super::*;

    #[tokio::test]
    async fn owner_adds_a_lesson_to_a_draft_course() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("linst1").await;
        let course_id = app.create_draft_course(&token, "With Lessons").await;

        let res = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({
                    "title": "Getting Started",
                    "order": 1,
                    "duration": 12,
                    "media_type": "VIDEO",
                    "video_url": "videos/getting-started.mp4",
                }),
                &token,
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["title"], "Getting Started");
        assert_eq!(res.body["order"], 1);
        assert_eq!(res.body["media_type"], "VIDEO");
    }

    #[tokio::test]
    async fn duplicate_order_within_a_course_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("linst2").await;
        let course_id = app.create_draft_course(&token, "One Slot").await;

        let lesson = json!({
            "title": "Original",
            "order": 1,
            "media_type": "DOCUMENT",
        });
        let first = app
            .post_with_token(&routes::lessons(&course_id), &lesson, &token)
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({"title": "Usurper", "order": 1, "media_type": "DOCUMENT"}),
                &token,
            )
            .await;

        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn adding_to_a_pending_course_is_a_conflict() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("linst3").await;
        let category_id = app.create_category("Lesson Pending").await;
        let course_id = app
            .create_ready_course(&token, "Frozen", category_id)
            .await;
        app.submit_course(&token, &course_id).await;

        let res = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({"title": "Too Late", "order": 1, "media_type": "DOCUMENT"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn adding_to_someone_elses_course_is_not_found() {
        let app = TestApp::spawn().await;
        let token_a = app.create_instructor("linst4").await;
        let token_b = app.create_instructor("linst5").await;
        let course_id = app.create_draft_course(&token_a, "Private").await;

        let res = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({"title": "Intruder", "order": 1, "media_type": "DOCUMENT"}),
                &token_b,
            )
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn video_lesson_requires_a_video_reference() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("linst6").await;
        let course_id = app.create_draft_course(&token, "Media Rules").await;

        let res = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({"title": "No Video", "order": 1, "media_type": "VIDEO"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(res.body["fields"]["video_url"].is_array());
    }

    #[tokio::test]
    async fn external_lesson_requires_a_link() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("linst7").await;
        let course_id = app.create_draft_course(&token, "Link Rules").await;

        let res = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({"title": "No Link", "order": 1, "media_type": "EXTERNAL"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["external_link"].is_array());
    }
}

mod modification {
    use super::*;

    async fn draft_course_with_lesson(app: &TestApp, token: &str) -> (String, String) {
        let course_id = app.create_draft_course(token, "Editable").await;
        let res = app
            .post_with_token(
                &routes::lessons(&course_id),
                &json!({"title": "Before", "order": 1, "duration": 10, "media_type": "DOCUMENT"}),
                token,
            )
            .await;
        assert_eq!(res.status, 201);
        (course_id, res.id())
    }

    #[tokio::test]
    async fn owner_updates_a_lesson() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("lmod1").await;
        let (_, lesson_id) = draft_course_with_lesson(&app, &token).await;

        let res = app
            .patch_with_token(
                &routes::lesson(&lesson_id),
                &json!({"title": "After", "duration": 25}),
                &token,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["title"], "After");
        assert_eq!(res.body["duration"], 25);
    }

    #[tokio::test]
    async fn switching_media_type_revalidates_the_pairing() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("lmod2").await;
        let (_, lesson_id) = draft_course_with_lesson(&app, &token).await;

        let res = app
            .patch_with_token(
                &routes::lesson(&lesson_id),
                &json!({"media_type": "EXTERNAL"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 400);
        assert!(res.body["fields"]["external_link"].is_array());
    }

    #[tokio::test]
    async fn owner_deletes_a_lesson() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("lmod3").await;
        let (course_id, lesson_id) = draft_course_with_lesson(&app, &token).await;

        let res = app.delete_with_token(&routes::lesson(&lesson_id), &token).await;
        assert_eq!(res.status, 204);

        let list = app.get_with_token(&routes::lessons(&course_id), &token).await;
        assert_eq!(list.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn lessons_of_an_approved_course_are_locked() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("lmodadmin").await;
        let token = app.create_instructor("lmod4").await;
        let category_id = app.create_category("Lesson Locked").await;

        let create = app
            .post_with_token(
                routes::MY_COURSES,
                &json!({
                    "title": "Locked Lessons",
                    "description": "No edits after approval.",
                    "category_id": category_id,
                    "thumbnail_url": "thumbnails/cover.jpg",
                    "lessons": [
                        {"title": "Fixed", "order": 1, "media_type": "DOCUMENT"},
                    ],
                }),
                &token,
            )
            .await;
        let course_id = create.id();
        let lesson_id = create.body["lessons"][0]["id"].as_str().unwrap().to_string();
        app.submit_course(&token, &course_id).await;
        app.approve_course(&admin, &course_id).await;

        let res = app
            .patch_with_token(&routes::lesson(&lesson_id), &json!({"title": "Nope"}), &token)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn other_instructor_cannot_touch_the_lesson() {
        let app = TestApp::spawn().await;
        let token_a = app.create_instructor("lmod5").await;
        let token_b = app.create_instructor("lmod6").await;
        let (_, lesson_id) = draft_course_with_lesson(&app, &token_a).await;

        let res = app
            .patch_with_token(&routes::lesson(&lesson_id), &json!({"title": "Mine Now"}), &token_b)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod listing {
    use super::*;

    #[tokio::test]
    async fn anonymous_caller_lists_lessons_of_an_approved_course() {
        let app = TestApp::spawn().await;
        let admin = app.create_admin("llistadmin").await;
        let token = app.create_instructor("llist1").await;
        let category_id = app.create_category("Lesson Listing").await;

        let create = app
            .post_with_token(
                routes::MY_COURSES,
                &json!({
                    "title": "Listed",
                    "description": "Lessons in order.",
                    "category_id": category_id,
                    "thumbnail_url": "thumbnails/cover.jpg",
                    "lessons": [
                        {"title": "Second", "order": 2, "media_type": "DOCUMENT"},
                        {"title": "First", "order": 1, "media_type": "DOCUMENT"},
                    ],
                }),
                &token,
            )
            .await;
        let course_id = create.id();
        app.submit_course(&token, &course_id).await;
        app.approve_course(&admin, &course_id).await;

        let res = app.get_without_token(&routes::lessons(&course_id)).await;

        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 2);
        // Ordered by `order`, not insertion.
        assert_eq!(items[0]["title"], "First");
        assert_eq!(items[1]["title"], "Second");
    }

    #[tokio::test]
    async fn draft_course_lessons_are_hidden_from_anonymous_callers() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("llist2").await;
        let course_id = app.create_draft_course(&token, "Hidden Lessons").await;

        let res = app.get_without_token(&routes::lessons(&course_id)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn owner_lists_draft_course_lessons() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("llist3").await;
        let course_id = app.create_draft_course(&token, "Own Lessons").await;

        let res = app.get_with_token(&routes::lessons(&course_id), &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);
    }
}
