use serde_json::json;

use crate::common::{TestApp, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn roll_number_is_stored_uppercased() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::STUDENTS,
                &json!({
                    "roll_number": "  me22b017 ",
                    "first_name": "Kiran",
                    "date_of_birth": "2003-07-09",
                    "gender": "Male",
                    "department": "Mechanical",
                    "semester": 1,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["roll_number"], "ME22B017");
        assert_eq!(res.body["last_name"], ".");
        assert_eq!(res.body["is_verified"], false);
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn duplicate_roll_number_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;

        let res = app
            .post_with_token(
                routes::STUDENTS,
                &json!({
                    "roll_number": "cs21b001",
                    "first_name": "Other",
                    "date_of_birth": "2002-01-01",
                    "gender": "Male",
                    "department": "Physics",
                    "semester": 1,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn malformed_date_of_birth_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::STUDENTS,
                &json!({
                    "roll_number": "CS21B009",
                    "first_name": "Asha",
                    "date_of_birth": "15/05/2002",
                    "gender": "Female",
                    "department": "Physics",
                    "semester": 1,
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod directory {
    use super::*;

    #[tokio::test]
    async fn search_matches_roll_number_or_name_and_orders_by_roll() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "EE20B002", "2002-01-01", "Electrical")
            .await;
        app.create_student(&admin, "EE20B001", "2002-01-02", "Electrical")
            .await;
        app.create_student(&admin, "CS20B001", "2002-01-03", "Computer Science")
            .await;

        let res = app
            .get_with_token(&format!("{}?search=ee20", routes::STUDENTS), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let rolls: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["roll_number"].as_str().unwrap())
            .collect();
        assert_eq!(rolls, vec!["EE20B001", "EE20B002"]);
        assert_eq!(res.body["pagination"]["total"], 2);
    }

    #[tokio::test]
    async fn department_filter_and_pagination_are_applied() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        for i in 1..=3 {
            app.create_student(&admin, &format!("PH{i:03}"), "2002-01-01", "Physics")
                .await;
        }
        app.create_student(&admin, "CH001", "2002-01-01", "Chemistry")
            .await;

        let res = app
            .get_with_token(
                &format!("{}?department=Physics&per_page=2&page=2", routes::STUDENTS),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(res.body["data"][0]["roll_number"], "PH003");
        assert_eq!(res.body["pagination"]["total"], 3);
        assert_eq!(res.body["pagination"]["total_pages"], 2);
    }

    #[tokio::test]
    async fn page_beyond_the_limit_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?page=18446744073709551615", routes::STUDENTS), &admin)
            .await;

        assert_eq!(res.status, 400, "{}", res.text);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod editing {
    use super::*;

    #[tokio::test]
    async fn partial_update_changes_only_given_fields() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app
            .create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;

        let res = app
            .patch_with_token(
                &routes::student(id),
                &json!({"semester": 4, "email": "asha@example.edu"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["semester"], 4);
        assert_eq!(res.body["email"], "asha@example.edu");
        assert_eq!(res.body["department"], "Computer Science");

        let cleared = app
            .patch_with_token(&routes::student(id), &json!({"email": null}), &admin)
            .await;
        assert_eq!(cleared.status, 200, "{}", cleared.text);
        assert!(cleared.body["email"].is_null());
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.get_with_token(&routes::student(9999), &admin).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}

mod deletion {
    use super::*;

    #[tokio::test]
    async fn student_without_results_can_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app
            .create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;

        let res = app.delete_with_token(&routes::student(id), &admin).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let gone = app.get_with_token(&routes::student(id), &admin).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn student_with_results_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app
            .create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        app.enter_result(&admin, "CS21B001", 1, (20, 50)).await;

        let res = app.delete_with_token(&routes::student(id), &admin).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}
