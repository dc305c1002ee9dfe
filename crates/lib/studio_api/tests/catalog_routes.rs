//! Classes, reviews and profiles over HTTP.

mod common;

use axum::http::{Request, StatusCode};
use axum::body::Body;
use common::{TestApp, json};
use serde_json::json;
use studio_core::auth::roles::Role;

fn class_body() -> serde_json::Value {
    json!({
        "title": "Salsa basics",
        "description": "First steps",
        "durationMinutes": 45,
        "category": 1,
        "videoPath": "salsa.mp4",
    })
}

#[tokio::test]
async fn trainers_create_classes_users_review_them() {
    let app = TestApp::new();
    app.seed("root@example.com", "root", Role::Administrator).await;
    app.seed("ana@example.com", "ana", Role::User).await;
    let admin = app.login("root@example.com").await;
    let ana = app.login("ana@example.com").await;

    let resp = app.post_json("/classes", Some(&ana), class_body()).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app.post_json("/classes", Some(&admin), class_body()).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let class = json(resp).await;
    assert_eq!(class["trainer"], "root");
    let id = class["id"].as_i64().unwrap();

    let resp = app
        .post_json(
            &format!("/classes/{id}/reviews"),
            Some(&ana),
            json!({ "rating": 5, "comments": "Loved it" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let detail = json(app.get(&format!("/classes/{id}"), Some(&ana)).await).await;
    assert_eq!(detail["class"]["title"], "Salsa basics");
    assert_eq!(detail["reviews"][0]["author"], "ana");

    let listing = json(app.get("/classes", None).await).await;
    assert_eq!(listing["classes"].as_array().unwrap().len(), 1);

    let profile = json(app.get("/profile/ana", Some(&admin)).await).await;
    assert_eq!(profile["reviewCount"], 1);
}

#[tokio::test]
async fn invalid_reviews_and_classes_are_rejected() {
    let app = TestApp::new();
    app.seed("root@example.com", "root", Role::Administrator).await;
    let admin = app.login("root@example.com").await;

    let mut bad = class_body();
    bad["videoPath"] = json!("salsa.exe");
    let resp = app.post_json("/classes", Some(&admin), bad).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let id = json(app.post_json("/classes", Some(&admin), class_body()).await).await["id"]
        .as_i64()
        .unwrap();
    let resp = app
        .post_json(
            &format!("/classes/{id}/reviews"),
            Some(&admin),
            json!({ "rating": 9, "comments": "Too good" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app
        .post_json(
            "/classes/999/reviews",
            Some(&admin),
            json!({ "rating": 3, "comments": "Where?" }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn only_moderators_remove_reviews() {
    let app = TestApp::new();
    app.seed("root@example.com", "root", Role::Administrator).await;
    app.seed("mo@example.com", "mo", Role::Moderator).await;
    app.seed("ana@example.com", "ana", Role::User).await;
    let admin = app.login("root@example.com").await;
    let mo = app.login("mo@example.com").await;
    let ana = app.login("ana@example.com").await;

    let id = json(app.post_json("/classes", Some(&admin), class_body()).await).await["id"]
        .as_i64()
        .unwrap();
    let review = json(
        app.post_json(
            &format!("/classes/{id}/reviews"),
            Some(&ana),
            json!({ "rating": 2, "comments": "Meh" }),
        )
        .await,
    )
    .await;
    let review_id = review["id"].as_i64().unwrap();
    let uri = format!("/classes/{id}/reviews/{review_id}");

    let delete = |cookie: &str| {
        Request::builder()
            .method("DELETE")
            .uri(&uri)
            .header("cookie", cookie)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(app.send(delete(ana.as_str())).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.send(delete(mo.as_str())).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.send(delete(mo.as_str())).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_profile_is_not_found() {
    let app = TestApp::new();
    app.seed("ana@example.com", "ana", Role::User).await;
    let ana = app.login("ana@example.com").await;
    let resp = app.get("/profile/nobody", Some(&ana)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
