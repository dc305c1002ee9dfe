//! Route gating as seen from the outside.

mod common;

use axum::http::StatusCode;
use common::{TestApp, json, location};
use studio_core::auth::roles::Role;

#[tokio::test]
async fn open_pages_serve_anonymous_visitors() {
    let app = TestApp::new();

    let resp = app.get("/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["username"], serde_json::Value::Null);

    let resp = app.get("/user/Ana", None).await;
    assert_eq!(json(resp).await["greeting"], "Hello, Ana!");

    let resp = app.get("/classes", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_visitors_are_sent_to_login_with_next() {
    let app = TestApp::new();

    for (path, expected) in [
        ("/secret", "/auth/login?next=%2Fsecret"),
        ("/admin", "/auth/login?next=%2Fadmin"),
        ("/profile/ana", "/auth/login?next=%2Fprofile%2Fana"),
    ] {
        let resp = app.get(path, None).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp).as_deref(), Some(expected), "{path}");
    }
}

#[tokio::test]
async fn unconfirmed_users_are_held_back_everywhere_but_exempt_routes() {
    let app = TestApp::new();
    app.register("ana@example.com", "ana").await;
    let cookie = app.login("ana@example.com").await;

    for path in ["/", "/classes", "/secret", "/admin", "/user/ana"] {
        let resp = app.get(path, Some(&cookie)).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp).as_deref(), Some("/auth/unconfirmed"), "{path}");
    }

    assert_eq!(app.get("/static/style.css", Some(&cookie)).await.status(), StatusCode::OK);
    assert_eq!(app.get("/auth/unconfirmed", Some(&cookie)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_paths_hold_unconfirmed_users_too() {
    let app = TestApp::new();
    app.register("ana@example.com", "ana").await;
    let cookie = app.login("ana@example.com").await;

    let resp = app.get("/no-such-page", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp).as_deref(), Some("/auth/unconfirmed"));
}

#[tokio::test]
async fn unknown_paths_are_json_not_found_otherwise() {
    let app = TestApp::new();
    let resp = app.get("/no-such-page", None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["error"], "not_found");

    app.seed("bo@example.com", "bo", Role::User).await;
    let cookie = app.login("bo@example.com").await;
    let resp = app.get("/no-such-page", Some(&cookie)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_page_needs_the_admin_permission() {
    let app = TestApp::new();
    app.seed("ana@example.com", "ana", Role::User).await;
    app.seed("mo@example.com", "mo", Role::Moderator).await;
    app.seed("root@example.com", "root", Role::Administrator).await;

    for (email, expected) in [
        ("ana@example.com", StatusCode::FORBIDDEN),
        ("mo@example.com", StatusCode::FORBIDDEN),
        ("root@example.com", StatusCode::OK),
    ] {
        let cookie = app.login(email).await;
        let resp = app.get("/admin", Some(&cookie)).await;
        assert_eq!(resp.status(), expected, "{email}");
    }

    let cookie = app.login("root@example.com").await;
    let resp = app.get("/admin", Some(&cookie)).await;
    assert_eq!(json(resp).await["message"], "For admin");
}

#[tokio::test]
async fn forbidden_is_a_json_error() {
    let app = TestApp::new();
    app.seed("ana@example.com", "ana", Role::User).await;
    let cookie = app.login("ana@example.com").await;

    let body = json(app.get("/admin", Some(&cookie)).await).await;
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn static_assets_are_public() {
    let app = TestApp::new();
    let resp = app.get("/static/style.css", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn stale_cookie_counts_as_anonymous() {
    let app = TestApp::new();
    let resp = app.get("/", Some("studio_session=made-up")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json(resp).await["username"], serde_json::Value::Null);
}

#[tokio::test]
async fn client_info_echoes_user_agent() {
    let app = TestApp::new();
    let req = axum::http::Request::builder()
        .uri("/user_info")
        .header("user-agent", "test-agent/1.0")
        .body(axum::body::Body::empty())
        .unwrap();
    let body = json(app.send(req).await).await;
    assert_eq!(body["userAgent"], "test-agent/1.0");
    // No ConnectInfo under oneshot.
    assert_eq!(body["ip"], serde_json::Value::Null);
}
