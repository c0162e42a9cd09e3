#![allow(dead_code)]

use edgeroute::app::stream::{
    StreamingId, StreamingName, StreamingService, UnableToCreateStream, UnableToDeleteStream,
};
use edgeroute::app::upload::{FileUrl, UnableToUpload, UploadService};
use edgeroute::app::{build_worker, AppContext, Services};
use edgeroute::config::Env;
use edgeroute::pipeline::Worker;
use edgeroute::request::ApiRequest;
use edgeroute::response::ApiResponse;
use edgeroute::security::{JwtTokens, Pbkdf2PasswordHasher, TokenService};
use edgeroute::static_files::{StaticAssets, StaticFiles};
use edgeroute::storage::{KeyValueStore, MemoryStore};
use futures::future::{self, BoxFuture};
use http::{Method, StatusCode};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SECRET: &str = "test-secret";
pub const PSK: &str = "admin-psk";
pub const ORIGIN: &str = "https://edge.test";

pub fn env() -> Env {
    let mut env = Env::new(SECRET);
    env.auth_header_key = PSK.to_string();
    env.password_salt = "pepper".to_string();
    env
}

pub fn request(method: Method, path: &str) -> ApiRequest {
    ApiRequest::new(method, &format!("{ORIGIN}{path}")).unwrap()
}

/// Records calls and answers with a canned platform response
#[derive(Default)]
pub struct MockStreaming {
    pub created: Mutex<Vec<String>>,
    pub deleted: Mutex<Vec<String>>,
    pub fail: bool,
}

impl StreamingService for MockStreaming {
    fn create_stream<'a>(
        &'a self,
        name: &'a StreamingName,
    ) -> BoxFuture<'a, Result<ApiResponse, UnableToCreateStream>> {
        let result = if self.fail {
            Err(UnableToCreateStream::default())
        } else {
            self.created.lock().unwrap().push(name.name.clone());
            Ok(platform_response(json!({"result": {"uid": "live-1"}, "success": true})))
        };
        Box::pin(future::ready(result))
    }

    fn delete_stream<'a>(
        &'a self,
        id: &'a StreamingId,
    ) -> BoxFuture<'a, Result<ApiResponse, UnableToDeleteStream>> {
        let result = if self.fail {
            Err(UnableToDeleteStream::default())
        } else {
            self.deleted.lock().unwrap().push(id.id.clone());
            Ok(platform_response(json!({"result": null, "success": true})))
        };
        Box::pin(future::ready(result))
    }
}

#[derive(Default)]
pub struct MockUpload {
    pub uploaded: Mutex<Vec<FileUrl>>,
    pub fail: bool,
}

impl UploadService for MockUpload {
    fn upload_from_url<'a>(&'a self, file: &'a FileUrl) -> BoxFuture<'a, Result<ApiResponse, UnableToUpload>> {
        let result = if self.fail {
            Err(UnableToUpload::default())
        } else {
            self.uploaded.lock().unwrap().push(file.clone());
            Ok(platform_response(json!({"result": {"uid": "video-1"}, "success": true})))
        };
        Box::pin(future::ready(result))
    }
}

pub fn platform_response(body: Value) -> ApiResponse {
    ApiResponse::new(StatusCode::OK)
        .with_content_type("application/json")
        .with_body(body.to_string())
}

/// The reference application wired to in-memory and mock collaborators
pub struct Harness {
    pub worker: Worker<AppContext>,
    pub store: Arc<MemoryStore>,
    pub streaming: Arc<MockStreaming>,
    pub upload: Arc<MockUpload>,
    pub tokens: JwtTokens,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(MockStreaming::default(), MockUpload::default(), None)
    }

    pub fn failing_platform() -> Self {
        let streaming = MockStreaming {
            fail: true,
            ..MockStreaming::default()
        };
        let upload = MockUpload {
            fail: true,
            ..MockUpload::default()
        };
        Self::build(streaming, upload, None)
    }

    pub fn with_static_dir(dir: &Path) -> Self {
        Self::build(MockStreaming::default(), MockUpload::default(), Some(dir))
    }

    fn build(streaming: MockStreaming, upload: MockUpload, static_dir: Option<&Path>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let streaming = Arc::new(streaming);
        let upload = Arc::new(upload);
        let services = Services {
            env: Arc::new(env()),
            store: Arc::clone(&store) as Arc<dyn KeyValueStore>,
            tokens: Arc::new(JwtTokens::new(SECRET, Duration::from_secs(3600))),
            password_hasher: Arc::new(Pbkdf2PasswordHasher),
            static_assets: static_dir.map(|d| Arc::new(StaticFiles::new(d)) as Arc<dyn StaticAssets>),
            streaming: Arc::clone(&streaming) as Arc<dyn StreamingService>,
            upload: Arc::clone(&upload) as Arc<dyn UploadService>,
        };
        Self {
            worker: build_worker(services).unwrap(),
            store,
            streaming,
            upload,
            tokens: JwtTokens::new(SECRET, Duration::from_secs(3600)),
        }
    }

    pub async fn send(&self, request: ApiRequest) -> ApiResponse {
        self.worker.handle(request).await
    }

    /// Register a user, as admin when `admin` is set
    pub async fn register(&self, email: &str, password: &str, admin: bool) -> ApiResponse {
        let mut req = request(Method::POST, "/v1/user").with_json(&json!({
            "name": "Ada",
            "surname": "Lovelace",
            "email": email,
            "password": password,
        }));
        if admin {
            req = req.with_header("X-EffEng-PSK", PSK);
        }
        self.send(req).await
    }

    /// Log in and return the issued token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let res = self
            .send(request(Method::POST, "/v1/login").with_json(&json!({"email": email, "password": password})))
            .await;
        assert_eq!(res.status(), StatusCode::OK, "login failed: {}", res.body_text());
        res.body_json().unwrap()["data"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub fn token_for(&self, email: &str, admin: bool) -> String {
        self.tokens.issue(email, admin).unwrap()
    }
}

pub fn error_of(res: &ApiResponse) -> String {
    res.body_json().unwrap()["error"].as_str().unwrap().to_string()
}
