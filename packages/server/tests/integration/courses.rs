use serde_json::json;

use crate::common::{TestApp, routes};

fn course_body(code: &str, credits: i32) -> serde_json::Value {
    json!({
        "code": code,
        "name": "Operating Systems",
        "credits": credits,
        "department": "Computer Science",
        "semester": 5,
    })
}

mod catalog {
    use super::*;

    #[tokio::test]
    async fn course_is_created_with_default_max_marks() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(routes::COURSES, &course_body("cs301", 4), &admin)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["code"], "CS301");
        assert_eq!(res.body["max_marks"], 100);
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let first = app
            .post_with_token(routes::COURSES, &course_body("CS301", 4), &admin)
            .await;
        assert_eq!(first.status, 201, "{}", first.text);

        let res = app
            .post_with_token(routes::COURSES, &course_body("cs301", 3), &admin)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn credits_out_of_range_are_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(routes::COURSES, &course_body("CS302", 31), &admin)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn students_can_read_but_not_write_the_catalog() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.post_with_token(routes::COURSES, &course_body("CS301", 4), &admin)
            .await;
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;
        let student = app.student_token("CS21B001", "20020515").await;

        let list = app.get_with_token(routes::COURSES, &student).await;
        assert_eq!(list.status, 200, "{}", list.text);
        assert_eq!(list.body.as_array().unwrap().len(), 1);

        let res = app
            .post_with_token(routes::COURSES, &course_body("CS999", 2), &student)
            .await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn update_and_delete_round_out_the_lifecycle() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let id = app
            .post_with_token(routes::COURSES, &course_body("CS301", 4), &admin)
            .await
            .id();

        let res = app
            .patch_with_token(&routes::course(id), &json!({"credits": 3}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["credits"], 3);

        let res = app.delete_with_token(&routes::course(id), &admin).await;
        assert_eq!(res.status, 204);

        let res = app.delete_with_token(&routes::course(id), &admin).await;
        assert_eq!(res.status, 404);
    }
}

mod grading_link {
    use super::*;

    #[tokio::test]
    async fn catalog_credits_apply_when_a_subject_omits_them() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let course_id = app
            .post_with_token(routes::COURSES, &course_body("CS301", 4), &admin)
            .await
            .id();
        app.create_student(&admin, "CS21B001", "2002-05-15", "Computer Science")
            .await;

        let res = app
            .post_with_token(
                routes::MANUAL_RESULT,
                &json!({
                    "roll_number": "CS21B001",
                    "semester": 5,
                    "academic_year": "2024-25",
                    "subjects": [
                        {"name": "Operating Systems", "code": "cs301",
                         "marks": {"internal": 45, "external": 46}}
                    ]
                }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        let line = &res.body["result"]["subjects"][0];
        assert_eq!(line["course_code"], "CS301");
        assert_eq!(line["course_id"], course_id);
        assert_eq!(line["credits"], 4);
        assert_eq!(line["grade"], "O");
        assert_eq!(res.body["result"]["sgpa"], 10.0);
    }
}
