//! Public request handlers: the form page, its script and the submission endpoint

use askama_axum::Template;
use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api::auth::JwtConfig;
use crate::csrf::{CsrfGuard, QUOTE_FORM_ACTION};
use crate::error::FormError;
use crate::form::{QuoteSubmission, FORM_ACTION};
use crate::relay::QuoteRelay;
use crate::settings::SettingsStore;

/// Endpoint the form script posts to
pub const SUBMIT_PATH: &str = "/api/quote";

/// Where the form script is served
pub const SCRIPT_PATH: &str = "/assets/form-handler.js";

const FORM_SCRIPT: &str = include_str!("../../assets/form-handler.js");

/// Shared application state
pub struct AppState {
    pub site_name: String,
    /// Prefix for links rendered into the form, without a trailing slash
    pub public_url: String,
    pub csrf: CsrfGuard,
    pub sessions: JwtConfig,
    pub admin_password_hash: String,
    pub store: SettingsStore,
    pub relay: QuoteRelay,
}

/// JSON body returned by the submission endpoint
#[derive(Debug, Serialize)]
pub struct JsonReply {
    pub success: bool,
    pub data: ReplyData,
}

#[derive(Debug, Serialize)]
pub struct ReplyData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl JsonReply {
    pub fn success(message: &str) -> Self {
        Self {
            success: true,
            data: ReplyData {
                message: message.to_string(),
                field: None,
            },
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            success: false,
            data: ReplyData {
                message: message.to_string(),
                field: None,
            },
        }
    }
}

impl FormError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FormError::Csrf => StatusCode::FORBIDDEN,
            FormError::Validation(_) | FormError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            FormError::Delivery(_) => StatusCode::BAD_GATEWAY,
            FormError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let reply = match &self {
            FormError::Csrf => JsonReply::error("Nonce verification failed."),
            FormError::Validation(e) => JsonReply {
                success: false,
                data: ReplyData {
                    message: e.to_string(),
                    field: Some(e.field()),
                },
            },
            FormError::InvalidEmail(_) => JsonReply::error("Invalid email address."),
            FormError::Delivery(_) => {
                JsonReply::error("We could not send your request. Please try again later.")
            }
            FormError::Unauthorized(_) => JsonReply::error("Not authorized."),
            _ => JsonReply::error("Internal server error."),
        };

        (status, Json(reply)).into_response()
    }
}

#[derive(Template)]
#[template(path = "form.html")]
struct FormTemplate {
    site_name: String,
    action_url: String,
    script_url: String,
    form_action: &'static str,
    nonce: String,
}

#[derive(Template)]
#[template(path = "embed.html")]
struct EmbedTemplate {
    action_url: String,
    script_url: String,
    form_action: &'static str,
    nonce: String,
}

/// GET / - Full page with the quote form
pub async fn form_page(State(state): State<Arc<AppState>>) -> Response {
    let page = FormTemplate {
        site_name: state.site_name.clone(),
        action_url: SUBMIT_PATH.to_string(),
        script_url: SCRIPT_PATH.to_string(),
        form_action: FORM_ACTION,
        nonce: state.csrf.issue(QUOTE_FORM_ACTION),
    };

    ([(header::CACHE_CONTROL, "no-store")], page).into_response()
}

/// GET /embed - The form alone, for inclusion in another page
///
/// Links are absolute when `server.public_url` is set, so the fragment
/// still reaches this service when pasted into another site.
pub async fn embed_form(State(state): State<Arc<AppState>>) -> Response {
    let fragment = EmbedTemplate {
        action_url: format!("{}{}", state.public_url, SUBMIT_PATH),
        script_url: format!("{}{}", state.public_url, SCRIPT_PATH),
        form_action: FORM_ACTION,
        nonce: state.csrf.issue(QUOTE_FORM_ACTION),
    };

    ([(header::CACHE_CONTROL, "no-store")], fragment).into_response()
}

/// GET /assets/form-handler.js - Script that submits the form asynchronously
pub async fn form_script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        FORM_SCRIPT,
    )
}

/// POST /api/quote - Validate a submission and relay it by email
pub async fn submit_quote(
    State(state): State<Arc<AppState>>,
    submission: std::result::Result<Form<QuoteSubmission>, FormRejection>,
) -> Response {
    let submission_id = Uuid::new_v4();

    let submission = match submission {
        Ok(Form(submission)) => submission,
        Err(rejection) => {
            warn!(%submission_id, "Rejected submission: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(JsonReply::error("Invalid form submission.")),
            )
                .into_response();
        }
    };

    let nonce_valid = submission
        .nonce()
        .map(|nonce| state.csrf.verify(QUOTE_FORM_ACTION, nonce))
        .unwrap_or(false);
    if !nonce_valid {
        warn!(%submission_id, "Rejected submission: nonce verification failed");
        return FormError::Csrf.into_response();
    }

    let request = match submission.validate() {
        Ok(request) => request,
        Err(e) => {
            warn!(%submission_id, field = e.field(), "Rejected submission: {}", e);
            return FormError::Validation(e).into_response();
        }
    };

    match state.relay.submit(&request).await {
        Ok(outcome) if outcome.all_sent() => {
            info!(%submission_id, "Quote request accepted");
            (
                StatusCode::OK,
                Json(JsonReply::success("Form submitted successfully!")),
            )
                .into_response()
        }
        Ok(outcome) => {
            error!(%submission_id, ?outcome, "Quote request only partly delivered");
            FormError::Delivery("one or more messages were not sent".to_string()).into_response()
        }
        Err(e) => {
            error!(%submission_id, "Quote request failed: {}", e);
            e.into_response()
        }
    }
}

/// GET /health - Service status
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    use std::time::SystemTime;

    let settings_healthy = state.store.load().await.is_ok();
    let status_code = if settings_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if settings_healthy { "healthy" } else { "unhealthy" },
            "service": "quote-form",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            "checks": {
                "settings": if settings_healthy { "ok" } else { "failed" }
            }
        })),
    )
}
