#![allow(clippy::unwrap_used, clippy::expect_used)]

use fro_admin::{
    app_lib::{
        navigation::{LOGIN_PATH, REFERENTIALS_PATH},
        notify::Level,
        AppConfig, ConsoleNavigator, KeyValueStore, MemoryNotifier, MemoryStorage, Navigator,
    },
    features::auth::LoginCredentials,
    AppContext,
};
use secrecy::SecretString;
use serde_json::json;
use std::{net::TcpListener, sync::Arc};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

struct Harness {
    ctx: AppContext,
    storage: Arc<MemoryStorage>,
    navigator: Arc<ConsoleNavigator>,
    notifier: Arc<MemoryNotifier>,
}

fn harness(server: &MockServer, start: &str) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let navigator = Arc::new(ConsoleNavigator::new(start));
    let notifier = Arc::new(MemoryNotifier::new());
    let config = AppConfig {
        api_base_url: format!("{}/api", server.uri()),
        api_timeout_ms: 2_000,
        ..AppConfig::default()
    };
    let ctx = AppContext::new(
        config,
        storage.clone(),
        navigator.clone(),
        notifier.clone(),
    )
    .unwrap();
    Harness {
        ctx,
        storage,
        navigator,
        notifier,
    }
}

fn user_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "email": "ops@example.com",
        "firstName": "Ada",
        "lastName": "Lovelace",
        "roles": ["admin"],
        "permissions": ["referentials:write"]
    })
}

fn credentials() -> LoginCredentials {
    LoginCredentials {
        email: "ops@example.com".to_string(),
        password: SecretString::from("s3cret"),
        remember_me: None,
    }
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({
            "email": "ops@example.com",
            "password": "s3cret"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": user_json(),
            "token": "tok-1",
            "refreshToken": "ref-1"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_persists_session_and_notifies() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    let h = harness(&server, LOGIN_PATH);
    assert!(!h.ctx.session().has_permission("referentials:write"));
    assert!(!h.ctx.session().has_role("admin"));

    let user = h.ctx.session().login(&credentials()).await.unwrap();
    assert_eq!(user.display_name(), "Ada Lovelace");

    assert_eq!(h.storage.get("auth-token").as_deref(), Some("tok-1"));
    assert_eq!(h.storage.get("refreshToken").as_deref(), Some("ref-1"));
    let stored: serde_json::Value =
        serde_json::from_str(&h.storage.get("user-data").unwrap()).unwrap();
    assert_eq!(stored["email"], "ops@example.com");

    assert!(h.ctx.session().is_authenticated());
    assert!(h.ctx.session().has_role("admin"));
    assert!(h.ctx.session().has_permission("referentials:write"));
    assert!(!h.ctx.session().has_permission("referentials:delete"));
    assert!(!h.ctx.session().has_role("auditor"));
    assert!(!h.ctx.session().is_loading());

    let last = h.notifier.last().unwrap();
    assert_eq!(last.level, Level::Success);
    assert_eq!(last.title.plain_text(), "Login successful");
}

#[tokio::test]
async fn failed_login_notifies_server_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Bad credentials",
            "code": "AUTH_FAILED"
        })))
        .mount(&server)
        .await;
    let h = harness(&server, LOGIN_PATH);

    let err = h.ctx.session().login(&credentials()).await.unwrap_err();
    assert_eq!(err.message(), "Bad credentials");
    assert!(err.has_code("AUTH_FAILED"));
    assert_eq!(err.status(), Some(400));
    assert!(!h.ctx.session().is_authenticated());
    assert!(h.storage.get("auth-token").is_none());

    let last = h.notifier.last().unwrap();
    assert_eq!(last.level, Level::Error);
}

#[tokio::test]
async fn login_leaves_email_checks_to_the_backend() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_partial_json(json!({ "email": "ops" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Unknown account"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let h = harness(&server, LOGIN_PATH);

    let mut short = credentials();
    short.email = "ops".to_string();
    let err = h.ctx.session().login(&short).await.unwrap_err();
    assert_eq!(err.message(), "Unknown account");
    assert_eq!(h.notifier.last().unwrap().level, Level::Error);
}

#[tokio::test]
async fn forgot_password_rejects_invalid_email_without_a_request() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    let h = harness(&server, LOGIN_PATH);

    assert!(h
        .ctx
        .session()
        .forgot_password("not-an-email")
        .await
        .is_err());
    assert_eq!(h.notifier.last().unwrap().level, Level::Error);
}

#[tokio::test]
async fn unauthorized_response_clears_session_and_keeps_preferences() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/referentiels/search"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Token expired"
        })))
        .mount(&server)
        .await;
    let h = harness(&server, REFERENTIALS_PATH);
    h.storage.set("app-theme", "dark").unwrap();
    h.storage.set("app-locale", "fr").unwrap();

    h.ctx.session().login(&credentials()).await.unwrap();
    assert!(h.ctx.session().is_authenticated());

    let mut list = h.ctx.referential_list();
    let err = list.search(Default::default()).await.unwrap_err();
    assert_eq!(err.status(), Some(401));

    assert!(!h.ctx.session().is_authenticated());
    assert!(h.ctx.session().user().is_none());
    for key in ["auth-token", "user-data", "refreshToken"] {
        assert!(h.storage.get(key).is_none(), "{key} should be cleared");
    }
    assert_eq!(h.storage.get("app-theme").as_deref(), Some("dark"));
    assert_eq!(h.storage.get("app-locale").as_deref(), Some("fr"));
    assert_eq!(h.navigator.history(), vec![LOGIN_PATH.to_string()]);
}

#[tokio::test]
async fn init_revalidates_stored_session() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    let mut fresh = user_json();
    fresh["firstName"] = json!("Augusta");
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": fresh,
            "success": true
        })))
        .mount(&server)
        .await;
    let h = harness(&server, REFERENTIALS_PATH);
    h.storage.set("auth-token", "tok-1").unwrap();
    h.storage
        .set("user-data", &user_json().to_string())
        .unwrap();

    h.ctx.session().init().await;

    let user = h.ctx.session().user().unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Augusta"));
    assert!(h.ctx.session().is_authenticated());
    assert!(!h.ctx.session().is_loading());
}

#[tokio::test]
async fn init_with_stale_token_clears_everything() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let h = harness(&server, REFERENTIALS_PATH);
    h.storage.set("auth-token", "stale").unwrap();
    h.storage
        .set("user-data", &user_json().to_string())
        .unwrap();
    h.storage.set("refreshToken", "ref-0").unwrap();

    h.ctx.session().init().await;

    assert!(!h.ctx.session().is_authenticated());
    assert!(h.storage.get("auth-token").is_none());
    assert!(h.storage.get("user-data").is_none());
    assert!(h.storage.get("refreshToken").is_none());
}

#[tokio::test]
async fn logout_clears_locally_even_when_the_call_fails() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "boom"
        })))
        .mount(&server)
        .await;
    let h = harness(&server, REFERENTIALS_PATH);
    h.storage.set("app-theme", "light").unwrap();

    h.ctx.session().login(&credentials()).await.unwrap();
    h.ctx.session().logout().await;

    assert!(!h.ctx.session().is_authenticated());
    assert!(!h.ctx.session().has_permission("referentials:write"));
    assert!(!h.ctx.session().has_role("admin"));
    assert!(h.storage.get("auth-token").is_none());
    assert_eq!(h.storage.get("app-theme").as_deref(), Some("light"));
    assert_eq!(h.navigator.current_path(), LOGIN_PATH);

    let last = h.notifier.last().unwrap();
    assert_eq!(last.level, Level::Info);
    assert_eq!(last.title.plain_text(), "Logged out");
}

#[tokio::test]
async fn refresh_token_rotates_stored_tokens() {
    if !can_bind_localhost() {
        eprintln!("Skipping test: cannot bind localhost");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/refresh"))
        .and(body_partial_json(json!({ "refreshToken": "ref-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok-2",
            "refreshToken": "ref-2"
        })))
        .mount(&server)
        .await;
    let h = harness(&server, REFERENTIALS_PATH);
    h.storage.set("refreshToken", "ref-1").unwrap();

    h.ctx.session().refresh_token().await.unwrap();

    assert_eq!(h.storage.get("auth-token").as_deref(), Some("tok-2"));
    assert_eq!(h.storage.get("refreshToken").as_deref(), Some("ref-2"));
}
