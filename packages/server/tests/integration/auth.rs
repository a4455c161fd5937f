use serde_json::json;

use crate::common::{TestApp, routes};

mod admin_login {
    use super::*;

    #[tokio::test]
    async fn admin_can_log_in_and_receives_admin_permissions() {
        let app = TestApp::spawn().await;
        let token = app.admin_token().await;

        let res = app.get_with_token(routes::ME, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "admin");
        assert_eq!(res.body["subject"], "registrar");
        let perms = res.body["permissions"].as_array().unwrap();
        assert!(perms.iter().any(|p| p == "result:publish"));
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_invalid_credentials() {
        let app = TestApp::spawn().await;
        app.admin_token().await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": "registrar", "password": "nope-nope"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn unknown_admin_is_indistinguishable_from_wrong_password() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": "ghost", "password": "whatever1"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn empty_username_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::ADMIN_LOGIN,
                &json!({"username": "  ", "password": "whatever1"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod student_login {
    use super::*;

    #[tokio::test]
    async fn default_password_is_date_of_birth_without_dashes() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "cs21b001", "2002-05-15", "Computer Science")
            .await;

        // Roll number lookup is case-insensitive.
        let res = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"roll_number": "CS21B001", "password": "20020515"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["role"], "student");
        assert_eq!(res.body["subject"], "CS21B001");
    }

    #[tokio::test]
    async fn student_can_change_password_and_old_one_stops_working() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B002", "2001-12-31", "Physics")
            .await;
        let token = app.student_token("CS21B002", "20011231").await;

        let res = app
            .post_with_token(
                routes::STUDENT_PASSWORD,
                &json!({"current_password": "20011231", "new_password": "brand-new-pass"}),
                &token,
            )
            .await;
        assert_eq!(res.status, 204, "{}", res.text);

        let old = app
            .post_without_token(
                routes::STUDENT_LOGIN,
                &json!({"roll_number": "CS21B002", "password": "20011231"}),
            )
            .await;
        assert_eq!(old.status, 401);

        app.student_token("CS21B002", "brand-new-pass").await;
    }

    #[tokio::test]
    async fn password_change_requires_the_current_password() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B003", "2001-01-01", "Physics")
            .await;
        let token = app.student_token("CS21B003", "20010101").await;

        let res = app
            .post_with_token(
                routes::STUDENT_PASSWORD,
                &json!({"current_password": "wrong", "new_password": "brand-new-pass"}),
                &token,
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn admin_token_cannot_change_a_student_password() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::STUDENT_PASSWORD,
                &json!({"current_password": "x", "new_password": "brand-new-pass"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod tokens {
    use super::*;

    #[tokio::test]
    async fn missing_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::ME).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::ME, "not.a.jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }

    #[tokio::test]
    async fn student_token_cannot_reach_admin_routes() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B004", "2002-02-02", "Physics")
            .await;
        let token = app.student_token("CS21B004", "20020202").await;

        let res = app.get_with_token(routes::STUDENTS, &token).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}
