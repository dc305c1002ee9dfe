//! Shared helpers: an in-memory app, request builders and cookie plumbing.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use chrono::Duration as ChronoDuration;
use studio_api::{AppState, config::ApiConfig};
use studio_core::auth::password::hash_password;
use studio_core::auth::roles::Role;
use studio_core::config::AuthSettings;
use studio_core::mail::{Mail, MailQueue, MemoryMailer};
use studio_core::models::auth::{NewUser, User};
use studio_core::store::{MemoryStore, UserStore};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "director@studio.test";
pub const PASSWORD: &str = "cat-dog-42";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<MemoryMailer>,
    pub state: AppState,
    _static_dir: TempDir,
}

pub fn test_config(static_dir: PathBuf) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        pg_connection_url: "postgres://unused".into(),
        secret_key: "test-secret".into(),
        public_url: "http://studio.test".into(),
        static_dir,
        mail_sender: "Studio <noreply@studio.test>".into(),
        cookie_secure: false,
        auth: AuthSettings {
            confirm_token_ttl: ChronoDuration::hours(1),
            bcrypt_cost: 4,
            admin_email: Some(ADMIN_EMAIL.into()),
            ..AuthSettings::default()
        },
    }
}

impl TestApp {
    pub fn new() -> Self {
        let static_dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(static_dir.path().join("style.css"), "body { margin: 0 }")
            .expect("write asset");

        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(MemoryMailer::new());
        let (queue, _worker) = MailQueue::spawn(mailer.clone());
        let state = AppState::new(test_config(static_dir.path().to_path_buf()), store.clone(), queue);
        Self {
            router: studio_api::router(state.clone()),
            store,
            mailer,
            state,
            _static_dir: static_dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.expect("request")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        cookie: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            builder = builder.header(header::COOKIE, c);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn register(&self, email: &str, username: &str) -> Response<Body> {
        self.post_json(
            "/auth/register",
            None,
            serde_json::json!({
                "email": email,
                "username": username,
                "password": PASSWORD,
                "confirmPassword": PASSWORD,
            }),
        )
        .await
    }

    /// Log in and return the `name=value` pair for the Cookie header.
    pub async fn login(&self, email: &str) -> String {
        let resp = self
            .post_json(
                "/auth/login",
                None,
                serde_json::json!({ "email": email, "password": PASSWORD }),
            )
            .await;
        assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
        session_cookie(&resp).expect("session cookie")
    }

    /// Wait for the `n`th mail (1-based) and return it.
    pub async fn mail(&self, n: usize) -> Mail {
        let sent = self.mailer.wait_for(n, Duration::from_secs(2)).await;
        sent.get(n - 1).cloned().expect("mail was not delivered")
    }

    /// Insert a confirmed account with `role` directly into the store.
    pub async fn seed(&self, email: &str, username: &str, role: Role) -> User {
        let user = self
            .store
            .create(NewUser {
                email: email.into(),
                username: username.into(),
                password_hash: hash_password(PASSWORD, 4).unwrap(),
                role,
            })
            .await
            .unwrap();
        self.store.mark_confirmed(&user.id).await.unwrap();
        user
    }
}

/// `studio_session=...` from a Set-Cookie header.
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("studio_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn set_cookie_header(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub fn location(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub async fn json(resp: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("parse JSON")
}

/// Token from the confirmation link in a mail body.
pub fn confirmation_token(mail: &Mail) -> String {
    let start = mail.body.find("/auth/confirm/").expect("confirmation link") + "/auth/confirm/".len();
    mail.body[start..]
        .split_whitespace()
        .next()
        .expect("token")
        .to_string()
}
