//! Shared helpers: in-memory app, request builders, code capture.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use skylog_api::config::ApiConfig;
use skylog_api::{AppState, router};
use skylog_core::auth::AuthError;
use skylog_core::auth::verification::CodeDelivery;
use skylog_core::store::Stores;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Captures delivered verification codes instead of sending them.
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingDelivery {
    pub fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .expect("lock")
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

#[async_trait]
impl CodeDelivery for RecordingDelivery {
    async fn deliver(&self, email: &str, code: &str) -> Result<(), AuthError> {
        self.sent
            .lock()
            .expect("lock")
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub delivery: Arc<RecordingDelivery>,
}

pub fn test_config() -> ApiConfig {
    let mut config = ApiConfig::new(SECRET);
    config.bcrypt_cost = 4;
    config
}

pub fn app_with(config: ApiConfig, stores: Stores) -> TestApp {
    let delivery = Arc::new(RecordingDelivery::default());
    let state = AppState::new(config, stores)
        .expect("app state")
        .with_code_delivery(delivery.clone());
    TestApp {
        router: router(state.clone()),
        state,
        delivery,
    }
}

pub fn app() -> TestApp {
    app_with(test_config(), Stores::in_memory())
}

impl TestApp {
    /// Send a request and return status plus parsed JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("response");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        (status, json)
    }

    /// Register an account and return its token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn create_journal(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/journals",
                Some(token),
                Some(json!({ "title": title, "content": "A day in the mountains" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create journal failed: {body}");
        body["id"].as_str().expect("id").to_string()
    }
}
