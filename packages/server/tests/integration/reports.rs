use crate::common::{TestApp, routes};

/// Five semester-1 students. R001 and R003 tie on both SGPA and percentage.
/// Everyone except R001 is published; R005 failed.
async fn seed_cohort(app: &TestApp, admin: &str) {
    let entries = [
        ("R004", (40, 50)), // sgpa 8.71, 75.0%
        ("R003", (40, 45)), // sgpa 8.14, 72.5%
        ("R002", (40, 49)), // sgpa 8.14, 74.5%
        ("R001", (40, 45)), // sgpa 8.14, 72.5%
        ("R005", (5, 10)),  // fails Mathematics
    ];
    for (roll, marks) in entries {
        let department = if roll == "R005" { "Physics" } else { "Computer Science" };
        app.create_student(admin, roll, "2002-01-01", department)
            .await;
        let id = app.enter_result(admin, roll, 1, marks).await;
        if roll != "R001" {
            app.toggle_publish(admin, id).await;
        }
    }
}

mod merit_list {
    use super::*;

    #[tokio::test]
    async fn ranks_by_sgpa_then_percentage_then_roll_number() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        seed_cohort(&app, &admin).await;

        let res = app
            .get_with_token(&format!("{}?semester=1&limit=4", routes::MERIT_LIST), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let entries = res.body.as_array().unwrap();
        let rolls: Vec<&str> = entries
            .iter()
            .map(|e| e["roll_number"].as_str().unwrap())
            .collect();
        assert_eq!(rolls, vec!["R004", "R002", "R001", "R003"]);
        let ranks: Vec<i64> = entries.iter().map(|e| e["rank"].as_i64().unwrap()).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(entries[0]["sgpa"], 8.71);
    }

    #[tokio::test]
    async fn department_filter_applies_to_the_student() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        seed_cohort(&app, &admin).await;

        let res = app
            .get_with_token(&format!("{}?department=Physics", routes::MERIT_LIST), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let entries = res.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["roll_number"], "R005");
    }

    #[tokio::test]
    async fn limit_outside_bounds_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .get_with_token(&format!("{}?limit=0", routes::MERIT_LIST), &admin)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod gazette {
    use super::*;

    #[tokio::test]
    async fn lists_published_results_by_roll_number_with_counts() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        seed_cohort(&app, &admin).await;

        let res = app
            .get_with_token(&format!("{}?semester=1", routes::GAZETTE), &admin)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["semester"], 1);
        assert_eq!(res.body["total"], 4);
        assert_eq!(res.body["passed"], 3);
        let rolls: Vec<&str> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["roll_number"].as_str().unwrap())
            .collect();
        assert_eq!(rolls, vec!["R002", "R003", "R004", "R005"]);
    }

    #[tokio::test]
    async fn drafts_are_included_on_request() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        seed_cohort(&app, &admin).await;

        let res = app
            .get_with_token(
                &format!("{}?semester=1&published_only=false", routes::GAZETTE),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["total"], 5);
        assert_eq!(res.body["data"][0]["roll_number"], "R001");
        assert_eq!(res.body["data"][0]["is_published"], false);
    }

    #[tokio::test]
    async fn semester_is_required() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app.get_with_token(routes::GAZETTE, &admin).await;

        assert_eq!(res.status, 400);
    }
}

mod dashboard {
    use super::*;

    #[tokio::test]
    async fn counters_reflect_the_stored_records() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        seed_cohort(&app, &admin).await;

        let res = app.get_with_token(routes::STATS, &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["students"], 5);
        assert_eq!(res.body["courses"], 0);
        assert_eq!(res.body["results"], 5);
        assert_eq!(res.body["published_results"], 4);
        assert_eq!(res.body["unpublished_results"], 1);
        assert_eq!(res.body["open_queries"], 0);
    }
}
