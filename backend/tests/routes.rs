//! HTTP-level tests: the router is driven in-process with `oneshot`, and the
//! session cookie is carried between requests by hand.

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
        HeaderMap, Request, StatusCode,
    },
};
use flatdoc::{config::Config, router, AppState};
use tempfile::TempDir;
use tower::ServiceExt;

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl TestResponse {
    fn location(&self) -> &str {
        self.headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn content_type(&self) -> &str {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

struct TestApp {
    _dir: TempDir,
    state: AppState,
    cookie: Option<String>,
}

impl TestApp {
    async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::for_test(dir.path());
        let state = AppState::from_config(&config).await.unwrap();
        Self {
            _dir: dir,
            state,
            cookie: None,
        }
    }

    fn create_document(&self, name: &str, content: &str) {
        std::fs::write(self.state.documents.root().join(name), content).unwrap();
    }

    fn document(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.state.documents.root().join(name)).ok()
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(COOKIE, cookie.parse().unwrap());
        }

        let response = router(self.state.clone()).oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    async fn get(&mut self, path: &str) -> TestResponse {
        let request = Request::get(path).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::post(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
            .unwrap();
        self.send(request).await
    }

    async fn follow(&mut self, response: &TestResponse) -> TestResponse {
        assert!(
            response.status.is_redirection(),
            "expected a redirect, got {}",
            response.status
        );
        let location = response.location().to_string();
        self.get(&location).await
    }

    async fn sign_in_as_admin(&mut self) {
        self.state
            .credentials
            .store("admin", "secret")
            .await
            .unwrap();
        let response = self
            .post(
                "/users/signin",
                &[("username", "admin"), ("password", "secret")],
            )
            .await;
        assert!(response.status.is_redirection());
    }
}

#[tokio::test]
async fn index_lists_documents() {
    let mut app = TestApp::new().await;
    app.create_document("about.md", "");
    app.create_document("changes.txt", "");

    let response = app.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), "text/html; charset=utf-8");
    assert!(response.body.contains("about.md"));
    assert!(response.body.contains("changes.txt"));
}

#[tokio::test]
async fn viewing_text_document_returns_raw_text() {
    let mut app = TestApp::new().await;
    app.create_document("history.txt", "Ruby 0.95 released");

    let response = app.get("/history.txt").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), "text/plain");
    assert_eq!(response.body, "Ruby 0.95 released");
}

#[tokio::test]
async fn viewing_markdown_document_renders_html() {
    let mut app = TestApp::new().await;
    app.create_document("about.md", "# Ruby is");

    let response = app.get("/about.md").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), "text/html; charset=utf-8");
    assert!(response.body.contains("<h1>Ruby is</h1>"));
}

#[tokio::test]
async fn missing_document_redirects_with_one_shot_flash() {
    let mut app = TestApp::new().await;

    let response = app.get("/no_file.txt").await;
    assert!(response.status.is_redirection());
    assert_eq!(response.location(), "/");

    let response = app.follow(&response).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("no_file.txt does not exist."));

    let response = app.get("/").await;
    assert!(!response.body.contains("no_file.txt does not exist."));
}

#[tokio::test]
async fn mutating_routes_require_sign_in() {
    let mut app = TestApp::new().await;
    app.create_document("changes.txt", "original");

    let attempts: Vec<Request<Body>> = vec![
        Request::get("/new").body(Body::empty()).unwrap(),
        Request::get("/changes.txt/edit").body(Body::empty()).unwrap(),
        Request::get("/image/upload").body(Body::empty()).unwrap(),
        Request::post("/create")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("filename=test.txt"))
            .unwrap(),
        Request::post("/changes.txt")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("content=hijacked"))
            .unwrap(),
        Request::post("/changes.txt/delete").body(Body::empty()).unwrap(),
        Request::post("/changes.txt/clone").body(Body::empty()).unwrap(),
    ];

    for request in attempts {
        let target = format!("{} {}", request.method(), request.uri());
        let response = app.send(request).await;
        assert!(response.status.is_redirection(), "{target} should redirect");
        assert_eq!(response.location(), "/", "{target} should redirect home");

        let response = app.follow(&response).await;
        assert!(
            response.body.contains("You must be signed in to do that."),
            "{target} should leave the sign-in flash"
        );
    }

    assert_eq!(app.document("changes.txt").as_deref(), Some("original"));
    assert_eq!(app.document("test.txt"), None);
}

#[tokio::test]
async fn edit_form_is_prefilled() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    app.create_document("changes.txt", "some changes");

    let response = app.get("/changes.txt/edit").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<textarea"));
    assert!(response.body.contains("some changes"));
    assert!(response.body.contains(r#"<button type="submit""#));
}

#[tokio::test]
async fn edit_of_missing_document_redirects() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.get("/ghost.md/edit").await;
    let response = app.follow(&response).await;
    assert!(response.body.contains("ghost.md does not exist."));
}

#[tokio::test]
async fn updating_document_overwrites_content() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    app.create_document("changes.txt", "old");

    let response = app.post("/changes.txt", &[("content", "new content")]).await;
    assert!(response.status.is_redirection());

    let response = app.follow(&response).await;
    assert!(response.body.contains("changes.txt has been updated."));

    let response = app.get("/changes.txt").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("new content"));
}

#[tokio::test]
async fn updating_with_disallowed_extension_writes_nothing() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.post("/evil.rb", &[("content", "system('rm -rf /')")]).await;
    assert!(response.status.is_redirection());
    assert_eq!(response.location(), "/");

    let response = app.follow(&response).await;
    assert!(response.body.contains("evil.rb cannot be edited."));
    assert_eq!(app.document("evil.rb"), None);
    assert!(!app.state.documents.root().join("evil.rb").exists());
}

#[tokio::test]
async fn links_to_names_with_reserved_characters_are_reachable() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    app.create_document("notes #1.md", "# Notes");

    let response = app.get("/").await;
    assert!(response.body.contains(r#"href="/notes%20%231.md""#));
    assert!(response.body.contains(r#"href="/notes%20%231.md/edit""#));
    assert!(response.body.contains(r#"action="/notes%20%231.md/delete""#));

    let response = app.get("/notes%20%231.md").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<h1>Notes</h1>"));

    let response = app.get("/notes%20%231.md/edit").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"action="/notes%20%231.md""#));

    let response = app.post("/notes%20%231.md", &[("content", "# Revised")]).await;
    let response = app.follow(&response).await;
    assert!(response.body.contains("notes #1.md has been updated."));
    assert_eq!(app.document("notes #1.md").as_deref(), Some("# Revised"));
}

#[tokio::test]
async fn new_document_form() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.get("/new").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<input"));
    assert!(response.body.contains(r#"<button type="submit""#));
}

#[tokio::test]
async fn creating_document() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app
        .post("/create", &[("filename", "test.txt"), ("content", "hello")])
        .await;
    assert!(response.status.is_redirection());

    let response = app.follow(&response).await;
    assert!(response.body.contains("test.txt has been created."));

    let response = app.get("/").await;
    assert!(response.body.contains("test.txt"));
    assert_eq!(app.document("test.txt").as_deref(), Some("hello"));
}

#[tokio::test]
async fn creating_document_without_name_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.post("/create", &[("filename", "")]).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("A name is required"));
}

#[tokio::test]
async fn creating_document_with_bad_extension_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.post("/create", &[("filename", "notes")]).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("A file extension is required"));

    let response = app.post("/create", &[("filename", "notes.rb")]).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Unsupported file extension"));
    // 입력한 이름은 폼에 남아 있다
    assert!(response.body.contains(r#"value="notes.rb""#));

    assert_eq!(app.document("notes.rb"), None);
}

#[tokio::test]
async fn creating_duplicate_document_keeps_original() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    app.create_document("about.md", "original");

    let response = app
        .post("/create", &[("filename", "about.md"), ("content", "other")])
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("about.md already exists."));
    assert_eq!(app.document("about.md").as_deref(), Some("original"));
}

#[tokio::test]
async fn deleting_document() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    app.create_document("test.txt", "");

    let response = app.post("/test.txt/delete", &[]).await;
    assert!(response.status.is_redirection());

    let response = app.follow(&response).await;
    assert!(response.body.contains("test.txt has been deleted."));

    let response = app.get("/").await;
    assert!(!response.body.contains("test.txt"));
}

#[tokio::test]
async fn deleting_missing_document_reports_it() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.post("/ghost.txt/delete", &[]).await;
    let response = app.follow(&response).await;
    assert!(response.body.contains("ghost.txt does not exist."));
}

#[tokio::test]
async fn cloning_prefills_creation_form_without_saving() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    app.create_document("about.md", "Ruby is great");

    let response = app.post("/about.md/clone", &[]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"value="about_copy.md""#));
    assert!(response.body.contains("Ruby is great"));
    assert_eq!(app.document("about_copy.md"), None);
}

#[tokio::test]
async fn signin_form() {
    let mut app = TestApp::new().await;

    let response = app.get("/users/signin").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("<input"));
    assert!(response.body.contains(r#"<button type="submit""#));
}

#[tokio::test]
async fn signin_with_valid_credentials() {
    let mut app = TestApp::new().await;
    app.state
        .credentials
        .store("admin", "secret")
        .await
        .unwrap();

    let response = app
        .post(
            "/users/signin",
            &[("username", "admin"), ("password", "secret")],
        )
        .await;
    assert!(response.status.is_redirection());

    let response = app.follow(&response).await;
    assert!(response.body.contains("Welcome"));
    assert!(response.body.contains("Signed in as admin"));

    // 로그인 이후에는 보호된 라우트가 리다이렉트 없이 동작한다
    let response = app.get("/new").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn signin_with_bad_credentials() {
    let mut app = TestApp::new().await;
    app.state
        .credentials
        .store("admin", "secret")
        .await
        .unwrap();

    let response = app
        .post(
            "/users/signin",
            &[("username", "admin"), ("password", "shhhh")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Invalid credentials"));

    let response = app
        .post(
            "/users/signin",
            &[("username", "guest"), ("password", "shhhh")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    // 세션은 여전히 익명이다
    let response = app.get("/new").await;
    assert!(response.status.is_redirection());
}

#[tokio::test]
async fn signout() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = app.get("/").await;
    assert!(response.body.contains("Welcome"));

    let response = app.post("/users/signout", &[]).await;
    let response = app.follow(&response).await;

    assert!(response.body.contains("You have been signed out"));
    assert!(response.body.contains("Sign In"));
    assert!(!response.body.contains("Signed in as"));
}

#[tokio::test]
async fn signup_creates_credential_and_signs_in() {
    let mut app = TestApp::new().await;

    let response = app
        .post(
            "/users/signup",
            &[("username", "writer"), ("password", "hunter2")],
        )
        .await;
    assert!(response.status.is_redirection());

    let response = app.follow(&response).await;
    assert!(response.body.contains("Signed in as writer"));
    assert!(app.state.credentials.verify("writer", "hunter2").await.unwrap());
}

#[tokio::test]
async fn signup_with_taken_or_empty_username_is_rejected() {
    let mut app = TestApp::new().await;
    app.state
        .credentials
        .store("admin", "secret")
        .await
        .unwrap();

    let response = app
        .post(
            "/users/signup",
            &[("username", "admin"), ("password", "other")],
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("admin is already taken."));

    let response = app
        .post("/users/signup", &[("username", "  "), ("password", "pw")])
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("A username is required."));
}

#[tokio::test]
async fn tampered_session_cookie_is_anonymous() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let cookie = app.cookie.clone().unwrap();
    app.cookie = Some(format!("{cookie}x"));

    let response = app.get("/new").await;
    assert!(response.status.is_redirection());
}

fn multipart_body(boundary: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn upload(app: &mut TestApp, filename: &str, bytes: &[u8]) -> TestResponse {
    let boundary = "flatdoc-test-boundary";
    let request = Request::post("/image/upload")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(multipart_body(boundary, filename, bytes)))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn uploading_image_stores_and_serves_it() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;
    let png = b"\x89PNG\r\n\x1a\nfake";

    let response = upload(&mut app, "logo.png", png).await;
    assert!(response.status.is_redirection());
    let response = app.follow(&response).await;
    assert!(response.body.contains("logo.png has been uploaded."));
    assert!(response.body.contains("logo.png"));

    let stored = std::fs::read(app.state.documents.root().join("logo.png")).unwrap();
    assert_eq!(stored, png);

    let response = app.get("/logo.png").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type(), "image/png");
}

#[tokio::test]
async fn uploading_unsupported_file_is_rejected() {
    let mut app = TestApp::new().await;
    app.sign_in_as_admin().await;

    let response = upload(&mut app, "script.sh", b"echo hi").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Unsupported image type"));
    assert_eq!(app.document("script.sh"), None);
}

#[tokio::test]
async fn health_reports_document_count() {
    let mut app = TestApp::new().await;
    app.create_document("about.md", "");

    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["documents"], 1);
}
