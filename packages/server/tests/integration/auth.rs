use serde_json::json;

use crate::common::{TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn instructor_can_register() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "alice",
                    "email": "alice@example.com",
                    "full_name": "Alice Wonder",
                    "password": "password123",
                    "role": "instructor",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["username"], "alice");
        assert_eq!(res.body["email"], "alice@example.com");
        assert_eq!(res.body["full_name"], "Alice Wonder");
        assert_eq!(res.body["role"], "instructor");
        assert!(res.body["id"].is_number());
    }

    #[tokio::test]
    async fn role_defaults_to_student() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "bob",
                    "email": "bob@example.com",
                    "full_name": "Bob Builder",
                    "password": "password123",
                }),
            )
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["role"], "student");
    }

    #[tokio::test]
    async fn cannot_register_as_admin() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "mallory",
                    "email": "mallory@example.com",
                    "full_name": "Mallory M",
                    "password": "password123",
                    "role": "admin",
                }),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_instructor("carol").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "carol",
                    "email": "carol2@example.com",
                    "full_name": "Another Carol",
                    "password": "password123",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let app = TestApp::spawn().await;
        app.create_instructor("dave").await;

        let res = app
            .post_without_token(
                routes::REGISTER,
                &json!({
                    "username": "dave2",
                    "email": "dave@example.com",
                    "full_name": "Second Dave",
                    "password": "password123",
                }),
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "EMAIL_TAKEN");
    }
}

mod login {
    use super::*;

    #[tokio::test]
    async fn login_returns_token_and_permissions() {
        let app = TestApp::spawn().await;
        app.create_instructor("erin").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "erin", "password": "password123"}),
            )
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].is_string());
        assert_eq!(res.body["role"], "instructor");
        let permissions = res.body["permissions"].as_array().unwrap();
        assert!(permissions.contains(&json!("course:create")));
        assert!(permissions.contains(&json!("lesson:manage")));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = TestApp::spawn().await;
        app.create_instructor("frank").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "frank", "password": "not-the-password"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn me_returns_current_profile() {
        let app = TestApp::spawn().await;
        let token = app.create_instructor("grace").await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["username"], "grace");
        assert_eq!(res.body["role"], "instructor");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }
}
