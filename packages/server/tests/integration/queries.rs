use serde_json::json;

use crate::common::{TestApp, routes};

mod help_desk {
    use super::*;

    #[tokio::test]
    async fn student_raises_a_query_and_admin_resolves_it() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        let student = app.student_token("CS21B001", "20020515").await;

        let created = app
            .post_with_token(
                routes::QUERIES,
                &json!({"subject": "Marks missing", "message": "Physics internal marks are blank."}),
                &student,
            )
            .await;
        assert_eq!(created.status, 201, "{}", created.text);
        assert_eq!(created.body["status"], "Open");
        assert!(created.body["reply"].is_null());
        let id = created.id();

        let open = app
            .get_with_token(&format!("{}?status=Open", routes::QUERIES), &admin)
            .await;
        assert_eq!(open.status, 200, "{}", open.text);
        assert_eq!(open.body.as_array().unwrap().len(), 1);

        let replied = app
            .patch_with_token(
                &routes::reply_query(id),
                &json!({"reply": "Corrected, please check again."}),
                &admin,
            )
            .await;
        assert_eq!(replied.status, 200, "{}", replied.text);
        assert_eq!(replied.body["status"], "Resolved");

        let mine = app.get_with_token(routes::MY_QUERIES, &student).await;
        assert_eq!(mine.status, 200);
        assert_eq!(mine.body[0]["reply"], "Corrected, please check again.");

        let still_open = app
            .get_with_token(&format!("{}?status=Open", routes::QUERIES), &admin)
            .await;
        assert_eq!(still_open.body.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn students_only_see_their_own_queries() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        app.create_student(&admin, "CS21B002", "2002-06-16", "Computer Science")
            .await;
        let first = app.student_token("CS21B001", "20020515").await;
        let second = app.student_token("CS21B002", "20020616").await;

        app.post_with_token(
            routes::QUERIES,
            &json!({"subject": "Question", "message": "When are results out?"}),
            &first,
        )
        .await;

        let res = app.get_with_token(routes::MY_QUERIES, &second).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body.as_array().unwrap().len(), 0);

        let res = app.get_with_token(routes::QUERIES, &first).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        let student = app.student_token("CS21B001", "20020515").await;

        let res = app
            .post_with_token(
                routes::QUERIES,
                &json!({"subject": "Question", "message": "   "}),
                &student,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn replying_to_a_missing_query_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .patch_with_token(&routes::reply_query(77), &json!({"reply": "Hi"}), &admin)
            .await;

        assert_eq!(res.status, 404);
    }
}
