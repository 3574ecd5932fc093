#![allow(dead_code)]
/// Shared harness for roster integration tests: a file-backed app in a
/// temporary directory plus helpers for driving the router in-process.
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use game_roster::{build_router, AppState, GameRosterConfig, JsonFileStore, Roster};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PIN: &str = "4321";

pub struct TestApp {
    pub temp_dir: TempDir,
    pub data_file: PathBuf,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn roster(&self) -> &Arc<Roster> {
        &self.state.roster
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Log in with the test PIN and return the `name=value` cookie pair
    pub async fn login(&self) -> String {
        let response = self.send(form_post("/admin/login", &format!("pin={TEST_PIN}"), None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }
}

pub fn test_config(data_file: PathBuf) -> GameRosterConfig {
    let mut config = GameRosterConfig::default();
    config.admin.pin = TEST_PIN.to_string();
    config.admin.login_attempts_per_minute = 0;
    config.storage.data_file = data_file;
    config
}

pub fn file_backed_app() -> TestApp {
    file_backed_app_with(|_| {})
}

pub fn file_backed_app_with(customize: impl FnOnce(&mut GameRosterConfig)) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let data_file = temp_dir.path().join("data").join("db.json");
    let mut config = test_config(data_file.clone());
    customize(&mut config);

    let store = Arc::new(JsonFileStore::new(&data_file));
    let state = AppState::from_config(&config, store);
    let router = build_router(state.clone());

    TestApp {
        temp_dir,
        data_file,
        state,
        router,
    }
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
        .to_string()
}
