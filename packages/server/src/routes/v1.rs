use axum::middleware::from_fn_with_state;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::middleware::limit_public_check;
use crate::state::AppState;

pub fn routes(state: &AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/students", student_routes())
        .nest("/courses", course_routes())
        .nest("/results", result_routes(state))
        .nest("/admin", admin_routes())
        .nest("/queries", query_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::admin_login))
        .routes(routes!(handlers::auth::student_login))
        .routes(routes!(handlers::auth::change_password))
        .routes(routes!(handlers::auth::me))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::student::list_students,
            handlers::student::create_student
        ))
        .routes(routes!(
            handlers::student::get_student,
            handlers::student::update_student,
            handlers::student::delete_student
        ))
}

fn course_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::course::list_courses,
            handlers::course::create_course
        ))
        .routes(routes!(
            handlers::course::get_course,
            handlers::course::update_course,
            handlers::course::delete_course
        ))
}

fn result_routes(state: &AppState) -> OpenApiRouter<AppState> {
    // Only the unauthenticated lookup is rate limited.
    let public = OpenApiRouter::new()
        .routes(routes!(handlers::result::check_result))
        .route_layer(from_fn_with_state(state.clone(), limit_public_check));

    OpenApiRouter::new()
        .routes(routes!(handlers::result::list_results))
        .routes(routes!(handlers::result::create_manual_result))
        .routes(routes!(handlers::result::my_results))
        .routes(routes!(handlers::result::my_result))
        .routes(routes!(
            handlers::result::get_result,
            handlers::result::update_result,
            handlers::result::delete_result
        ))
        .routes(routes!(handlers::publication::toggle_publish))
        .merge(public)
}

fn admin_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::publication::bulk_publish))
        .routes(routes!(handlers::result::bulk_delete_results))
        .routes(routes!(handlers::report::merit_list))
        .routes(routes!(handlers::report::gazette))
        .routes(routes!(handlers::report::dashboard_stats))
}

fn query_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::help_query::list_queries,
            handlers::help_query::create_query
        ))
        .routes(routes!(handlers::help_query::my_queries))
        .routes(routes!(handlers::help_query::reply_query))
}
