//! API router.
//!
//! Everything under `/api` requires bearer auth except signup and login.
//! Handlers use `State<AppState>`; the auth middleware reads the same state
//! from an `Extension` layer, which therefore sits outermost.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    // NOTE: path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/users", get(endpoints::users::list))
        .route("/therapists", get(endpoints::users::therapists))
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/:id/overview", get(endpoints::patients::overview))
        .route(
            "/patients/:id/sessions/upcoming",
            get(endpoints::patients::upcoming_sessions),
        )
        .route(
            "/patients/:id/reports",
            get(endpoints::patients::list_reports).post(endpoints::patients::add_report),
        )
        .route("/patients/:id/allocate", post(endpoints::patients::allocate))
        .route(
            "/allocations/overview",
            get(endpoints::patients::allocation_overview),
        )
        .route(
            "/plans",
            get(endpoints::plans::list).post(endpoints::plans::create),
        )
        .route("/plans/:id", get(endpoints::plans::detail))
        .route("/plans/:id/review", post(endpoints::plans::review))
        .route(
            "/sessions",
            get(endpoints::sessions::list).post(endpoints::sessions::create),
        )
        .route("/sessions/:id/complete", post(endpoints::sessions::complete))
        .route("/notifications/unread", get(endpoints::notifications::unread))
        .route(
            "/notifications/:id/read",
            post(endpoints::notifications::mark_read),
        )
        .with_state(state.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        .layer(axum::Extension(state.clone()));

    let unprotected = Router::new()
        .route("/auth/signup", post(endpoints::auth::signup))
        .route("/auth/login", post(endpoints::auth::login))
        .with_state(state);

    Router::new()
        .nest("/api", protected.merge(unprotected))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::db::Database;

    fn app() -> Router {
        let db = Database::open_in_memory().unwrap();
        api_router(AppState::new(db))
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn signup(app: &Router, username: &str, role: &str, attributes: Value) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({
                "username": username,
                "email": format!("{username}@clinic.test"),
                "password": "hunter2hunter2",
                "role": role,
                "attributes": attributes,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");
        body["userId"].as_i64().unwrap()
    }

    async fn login(app: &Router, username: &str) -> String {
        let (status, body) = send(
            app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({
                "email": format!("{username}@clinic.test"),
                "password": "hunter2hunter2",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    /// Signup + login a standard clinic: supervisor, therapist, patient.
    async fn seed(app: &Router) -> (String, String, String) {
        signup(app, "sup", "supervisor", json!({"department": "Clinical"})).await;
        signup(
            app,
            "ther",
            "therapist",
            json!({"specialization": "Articulation", "yearsExperience": 5}),
        )
        .await;
        signup(app, "pat", "patient", json!({})).await;
        (
            login(app, "sup").await,
            login(app, "ther").await,
            login(app, "pat").await,
        )
    }

    #[tokio::test]
    async fn missing_and_garbage_tokens_are_unauthorized() {
        let app = app();
        let (status, body) = send(&app, Method::GET, "/api/patients", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_SESSION");

        let (status, _) = send(&app, Method::GET, "/api/patients", Some("nonsense"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_signup_conflicts() {
        let app = app();
        signup(&app, "ana", "patient", json!({})).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({
                "username": "ana",
                "email": "other@clinic.test",
                "password": "hunter2hunter2",
                "role": "patient",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "DUPLICATE_IDENTITY");
    }

    #[tokio::test]
    async fn bad_login_is_unauthorized() {
        let app = app();
        signup(&app, "ana", "patient", json!({})).await;
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "ana@clinic.test", "password": "wrong-password"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn full_clinical_workflow() {
        let app = app();
        let (sup, ther, pat) = seed(&app).await;

        // supervisor allocates patient 1 to therapist 1
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/patients/1/allocate",
            Some(&sup),
            Some(json!({"therapistId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        // therapist received exactly one allocation notification
        let (_, unread) = send(&app, Method::GET, "/api/notifications/unread", Some(&ther), None).await;
        assert_eq!(unread.as_array().unwrap().len(), 1);
        assert!(unread[0]["message"].as_str().unwrap().contains('1'));

        // therapist drafts a plan
        let (status, plan) = send(
            &app,
            Method::POST,
            "/api/plans",
            Some(&ther),
            Some(json!({
                "patientId": 1,
                "goals": "Produce /s/ blends",
                "activities": "Drill cards",
                "startDate": "2026-09-01",
                "endDate": "2026-12-18",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{plan}");
        assert_eq!(plan["status"], "pending");
        let plan_id = plan["id"].as_i64().unwrap();

        // supervisor was notified and approves with a rating
        let (_, sup_unread) =
            send(&app, Method::GET, "/api/notifications/unread", Some(&sup), None).await;
        assert_eq!(sup_unread.as_array().unwrap().len(), 1);

        let (status, reviewed) = send(
            &app,
            Method::POST,
            &format!("/api/plans/{plan_id}/review"),
            Some(&sup),
            Some(json!({"ratingScore": 9, "feedback": "Solid goals"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reviewed["plan"]["status"], "approved");
        assert_eq!(reviewed["rating"]["ratingScore"], 9);

        // therapist schedules a session under the plan
        let (status, session) = send(
            &app,
            Method::POST,
            "/api/sessions",
            Some(&ther),
            Some(json!({
                "planId": plan_id,
                "sessionDate": "2026-09-08T14:00:00Z",
                "durationMinutes": 45,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{session}");
        let session_id = session["id"].as_i64().unwrap();
        assert_eq!(session["patientId"].as_i64(), Some(1));

        // patient sees it upcoming
        let (status, upcoming) = send(
            &app,
            Method::GET,
            "/api/patients/1/sessions/upcoming",
            Some(&pat),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(upcoming.as_array().unwrap().len(), 1);

        // therapist completes it with a note
        let (status, completed) = send(
            &app,
            Method::POST,
            &format!("/api/sessions/{session_id}/complete"),
            Some(&ther),
            Some(json!({
                "observations": "Accurate in structured tasks",
                "recommendations": "Move to sentence level",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(completed["session"]["status"], "completed");

        // overview stitches it all together
        let (status, overview) =
            send(&app, Method::GET, "/api/patients/1/overview", Some(&ther), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["plans"].as_array().unwrap().len(), 1);
        assert_eq!(overview["plans"][0]["ratings"].as_array().unwrap().len(), 1);
        assert_eq!(overview["recentSessions"].as_array().unwrap().len(), 1);
        assert!(overview["recentSessions"][0]["note"].is_object());
    }

    #[tokio::test]
    async fn cross_tenant_reads_are_masked() {
        let app = app();
        let (sup, _ther, _pat) = seed(&app).await;
        signup(
            &app,
            "ther2",
            "therapist",
            json!({"specialization": "Fluency"}),
        )
        .await;
        let intruder = login(&app, "ther2").await;

        send(
            &app,
            Method::POST,
            "/api/patients/1/allocate",
            Some(&sup),
            Some(json!({"therapistId": 1})),
        )
        .await;

        let (status, body) =
            send(&app, Method::GET, "/api/patients/1/overview", Some(&intruder), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        // and the roster shows an empty caseload, not someone else's
        let (_, page) = send(&app, Method::GET, "/api/patients", Some(&intruder), None).await;
        assert_eq!(page["data"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn role_gates_map_to_forbidden() {
        let app = app();
        let (_sup, ther, pat) = seed(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/patients/1/allocate",
            Some(&ther),
            Some(json!({"therapistId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");

        let (status, _) =
            send(&app, Method::GET, "/api/allocations/overview", Some(&pat), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn validation_maps_to_bad_request() {
        let app = app();
        let (sup, ther, _pat) = seed(&app).await;
        send(
            &app,
            Method::POST,
            "/api/patients/1/allocate",
            Some(&sup),
            Some(json!({"therapistId": 1})),
        )
        .await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/plans",
            Some(&ther),
            Some(json!({
                "patientId": 1,
                "goals": "Backwards dates",
                "activities": "n/a",
                "startDate": "2026-12-01",
                "endDate": "2026-09-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn pagination_envelope_shape() {
        let app = app();
        let (sup, ther, _pat) = seed(&app).await;
        send(
            &app,
            Method::POST,
            "/api/patients/1/allocate",
            Some(&sup),
            Some(json!({"therapistId": 1})),
        )
        .await;
        for i in 0..12 {
            let (status, _) = send(
                &app,
                Method::POST,
                "/api/patients/1/reports",
                Some(&ther),
                Some(json!({"summary": format!("Week {i}"), "overallProgress": "steady"})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, page) = send(
            &app,
            Method::GET,
            "/api/patients/1/reports?page=2&pageSize=5",
            Some(&ther),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["data"].as_array().unwrap().len(), 5);
        assert_eq!(page["pagination"]["page"], 2);
        assert_eq!(page["pagination"]["pageSize"], 5);
        assert_eq!(page["pagination"]["totalCount"], 12);
        assert_eq!(page["pagination"]["totalPages"], 3);
    }

    #[tokio::test]
    async fn admin_user_table_and_role_filter() {
        let app = app();
        seed(&app).await;
        signup(&app, "root", "admin", json!({})).await;
        let admin = login(&app, "root").await;

        let (status, page) = send(
            &app,
            Method::GET,
            "/api/users?role=therapist",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["data"].as_array().unwrap().len(), 1);
        assert!(page["data"][0].get("passwordHash").is_none());
        assert!(page["data"][0].get("password_hash").is_none());

        let (status, _) = send(
            &app,
            Method::GET,
            "/api/users?role=wizard",
            Some(&admin),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn notification_mark_read_is_idempotent_and_owned() {
        let app = app();
        let (sup, ther, pat) = seed(&app).await;
        send(
            &app,
            Method::POST,
            "/api/patients/1/allocate",
            Some(&sup),
            Some(json!({"therapistId": 1})),
        )
        .await;

        let (_, unread) =
            send(&app, Method::GET, "/api/notifications/unread", Some(&ther), None).await;
        let id = unread[0]["id"].as_i64().unwrap();

        // wrong owner
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/notifications/{id}/read"),
            Some(&pat),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // right owner, twice
        for _ in 0..2 {
            let (status, _) = send(
                &app,
                Method::POST,
                &format!("/api/notifications/{id}/read"),
                Some(&ther),
                None,
            )
            .await;
            assert_eq!(status, StatusCode::NO_CONTENT);
        }
        let (_, unread) =
            send(&app, Method::GET, "/api/notifications/unread", Some(&ther), None).await;
        assert!(unread.as_array().unwrap().is_empty());
    }
}
