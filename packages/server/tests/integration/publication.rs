use serde_json::json;

use crate::common::{TestApp, routes};

mod toggle {
    use super::*;

    #[tokio::test]
    async fn first_publish_stamps_declared_date_and_unpublish_keeps_it() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        let id = app.enter_result(&admin, "CS21B001", 1, (30, 40)).await;

        let published = app
            .patch_with_token(&routes::publish(id), &json!({}), &admin)
            .await;
        assert_eq!(published.status, 200, "{}", published.text);
        assert_eq!(published.body["is_published"], true);
        let declared = published.body["declared_date"].clone();
        assert!(declared.is_string());

        let unpublished = app
            .patch_with_token(&routes::publish(id), &json!({}), &admin)
            .await;
        assert_eq!(unpublished.body["is_published"], false);
        assert_eq!(unpublished.body["declared_date"], declared);

        let republished = app
            .patch_with_token(&routes::publish(id), &json!({}), &admin)
            .await;
        assert_eq!(republished.body["is_published"], true);
        assert_eq!(republished.body["declared_date"], declared);
    }

    #[tokio::test]
    async fn unknown_result_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .patch_with_token(&routes::publish(4242), &json!({}), &admin)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn students_cannot_publish() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        let id = app.enter_result(&admin, "CS21B001", 1, (30, 40)).await;
        let student = app.student_token("CS21B001", "20020515").await;

        let res = app
            .patch_with_token(&routes::publish(id), &json!({}), &student)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod bulk {
    use super::*;

    async fn cohort(app: &TestApp, admin: &str) {
        app.create_student(admin, "CS001", "2002-01-01", "Computer Science")
            .await;
        app.create_student(admin, "CS002", "2002-01-02", "Computer Science")
            .await;
        app.create_student(admin, "ME001", "2002-01-03", "Mechanical")
            .await;
        for roll in ["CS001", "CS002", "ME001"] {
            app.enter_result(admin, roll, 3, (30, 40)).await;
        }
        app.enter_result(admin, "CS001", 4, (30, 40)).await;
    }

    #[tokio::test]
    async fn department_filter_limits_the_cohort() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        cohort(&app, &admin).await;

        let res = app
            .post_with_token(
                routes::BULK_PUBLISH,
                &json!({"semester": 3, "department": "Computer Science", "action": "publish"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["modified"], 2);

        let published = app
            .get_with_token(&format!("{}?published=true", routes::RESULTS), &admin)
            .await;
        assert_eq!(published.body["pagination"]["total"], 2);
        for item in published.body["data"].as_array().unwrap() {
            assert_eq!(item["department"], "Computer Science");
            assert_eq!(item["semester"], 3);
            assert!(item["declared_date"].is_string());
        }
    }

    #[tokio::test]
    async fn repeating_an_action_modifies_nothing() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        cohort(&app, &admin).await;
        let body = json!({"semester": 3, "action": "publish"});

        let first = app
            .post_with_token(routes::BULK_PUBLISH, &body, &admin)
            .await;
        assert_eq!(first.body["modified"], 3);

        let second = app
            .post_with_token(routes::BULK_PUBLISH, &body, &admin)
            .await;
        assert_eq!(second.body["modified"], 0);

        let unpublish = app
            .post_with_token(
                routes::BULK_PUBLISH,
                &json!({"semester": 3, "action": "unpublish"}),
                &admin,
            )
            .await;
        assert_eq!(unpublish.body["modified"], 3);
    }

    #[tokio::test]
    async fn unknown_department_modifies_nothing() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        cohort(&app, &admin).await;

        let res = app
            .post_with_token(
                routes::BULK_PUBLISH,
                &json!({"semester": 3, "department": "Astronomy", "action": "publish"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["modified"], 0);
    }

    #[tokio::test]
    async fn unknown_action_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(
                routes::BULK_PUBLISH,
                &json!({"semester": 3, "action": "archive"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
    }
}
