//! Shared helpers for the HTTP integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, Response};
use axum::Router;
use quote_form::api::ApiServer;
use quote_form::config::Config;
use quote_form::error::{FormError, Result};
use quote_form::settings::Settings;
use quote_form::smtp::{Mailer, OutgoingEmail};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

/// Mailer that records every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    senders: Mutex<Vec<String>>,
    fail_to: Mutex<Option<String>>,
}

impl RecordingMailer {
    /// Make every send to `address` fail
    pub fn fail_for(&self, address: &str) {
        *self.fail_to.lock().unwrap() = Some(address.to_string());
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// From address each recorded message would carry
    pub fn senders(&self) -> Vec<String> {
        self.senders.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, settings: &Settings, email: &OutgoingEmail) -> Result<()> {
        if self.fail_to.lock().unwrap().as_deref() == Some(email.to.as_str()) {
            return Err(FormError::Delivery("connection refused".to_string()));
        }
        self.senders.lock().unwrap().push(settings.sender().1.to_string());
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    pub config: Config,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.form.csrf_secret = "integration-secret".to_string();
        config.admin.email = "owner@example.com".to_string();
        config.storage.settings_path = dir
            .path()
            .join("settings.json")
            .to_string_lossy()
            .into_owned();
        adjust(&mut config);

        let mailer = Arc::new(RecordingMailer::default());
        let server = ApiServer::new(&config, mailer.clone());

        Self {
            router: server.router(),
            mailer,
            config,
            _dir: dir,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(encode_form(fields))).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_raw(&self, uri: &str, content_type: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Fetch the form page and pull the nonce out of it
    pub async fn form_nonce(&self) -> String {
        let page = body_text(self.get("/", None).await).await;
        hidden_value(&page, "cfp_nonce")
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Value attribute of the hidden input called `name`
pub fn hidden_value(page: &str, name: &str) -> String {
    let marker = format!("name=\"{}\" value=\"", name);
    let start = page.find(&marker).expect("hidden input present") + marker.len();
    let end = page[start..].find('"').unwrap() + start;
    page[start..end].to_string()
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn percent_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}
