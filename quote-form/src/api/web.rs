use askama_axum::Template;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::api::auth::{verify_password, SESSION_COOKIE};
use crate::api::handlers::AppState;
use crate::csrf::SETTINGS_ACTION;
use crate::error::FormError;
use crate::settings::{Settings, SettingsInput, SmtpEncryption};
use crate::templates::renderer::{TemplateRenderer, KNOWN_VARIABLES};

#[derive(Template)]
#[template(path = "admin_login.html")]
struct LoginTemplate {
    site_name: String,
    error: String,
}

#[derive(Template)]
#[template(path = "admin_settings.html")]
struct SettingsTemplate {
    site_name: String,
    nonce: String,
    settings: Settings,
    has_password: bool,
    encryption_options: Vec<EncryptionOption>,
    placeholders: String,
    success: String,
    error: String,
}

struct EncryptionOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
}

// Admin index
pub async fn admin_index() -> Redirect {
    Redirect::to("/admin/settings")
}

// Login page (GET)
pub async fn login_page(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    LoginTemplate {
        site_name: state.site_name.clone(),
        error: String::new(),
    }
}

// Login form submission (POST)
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let error = match verify_password(&state.admin_password_hash, &form.password) {
        Ok(true) => match state.sessions.create_token() {
            Ok(token) => {
                info!("Admin logged in");
                let cookie = format!(
                    "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
                    SESSION_COOKIE,
                    token,
                    state.sessions.expiration().as_secs()
                );
                return (
                    StatusCode::SEE_OTHER,
                    [
                        (header::SET_COOKIE, cookie),
                        (header::LOCATION, "/admin/settings".to_string()),
                    ],
                    "Redirecting...",
                )
                    .into_response();
            }
            Err(e) => {
                error!("Failed to create admin session: {}", e);
                "Login failed".to_string()
            }
        },
        Ok(false) => {
            warn!("Failed admin login attempt");
            "Invalid password".to_string()
        }
        Err(FormError::Unauthorized(msg)) => msg,
        Err(e) => {
            error!("Admin login error: {}", e);
            "Login failed".to_string()
        }
    };

    (
        StatusCode::UNAUTHORIZED,
        LoginTemplate {
            site_name: state.site_name.clone(),
            error,
        },
    )
        .into_response()
}

// Logout
pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, cookie),
            (header::LOCATION, "/admin/login".to_string()),
        ],
        "Redirecting...",
    )
        .into_response()
}

// Settings page (GET)
pub async fn settings_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !state.sessions.is_admin(&headers) {
        return Redirect::to("/admin/login").into_response();
    }

    match state.store.load().await {
        Ok(settings) => render_settings(&state, settings, String::new(), String::new()),
        Err(e) => {
            error!("Failed to load settings: {}", e);
            render_settings(
                &state,
                Settings::default(),
                String::new(),
                format!("Stored settings could not be read ({}). Saving will replace them.", e),
            )
        }
    }
}

// Settings form submission (POST)
pub async fn settings_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(input): Form<SettingsInput>,
) -> Response {
    if !state.sessions.is_admin(&headers) {
        return Redirect::to("/admin/login").into_response();
    }

    if !state.csrf.verify(SETTINGS_ACTION, &input.settings_nonce) {
        warn!("Settings update rejected: nonce verification failed");
        let current = state.store.load().await.unwrap_or_default();
        let mut response = render_settings(
            &state,
            current,
            String::new(),
            "Nonce verification failed. Reload the page and try again.".to_string(),
        );
        *response.status_mut() = StatusCode::FORBIDDEN;
        return response;
    }

    let current = match state.store.load().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Replacing unreadable settings: {}", e);
            Settings::default()
        }
    };
    let settings = Settings::sanitized(&input, &current);

    if let Err(e) = state.store.save(&settings).await {
        error!("Failed to save settings: {}", e);
        return render_settings(
            &state,
            settings,
            String::new(),
            format!("Failed to save settings: {}", e),
        );
    }

    let mut unknown: Vec<String> = [
        settings.new_quote_subject.as_str(),
        settings.thank_you_subject.as_str(),
        settings.thank_you_message.as_str(),
    ]
    .iter()
    .flat_map(|text| TemplateRenderer::unknown_variables(text))
    .collect();
    unknown.sort();
    unknown.dedup();

    let success = if unknown.is_empty() {
        "Settings saved.".to_string()
    } else {
        let names: Vec<String> = unknown.iter().map(|v| format!("{{{{{}}}}}", v)).collect();
        format!(
            "Settings saved. Unknown placeholders will be sent as written: {}",
            names.join(", ")
        )
    };

    render_settings(&state, settings, success, String::new())
}

fn render_settings(state: &AppState, settings: Settings, success: String, error: String) -> Response {
    let encryption_options = [SmtpEncryption::None, SmtpEncryption::Tls, SmtpEncryption::Ssl]
        .into_iter()
        .map(|option| EncryptionOption {
            value: option.as_str(),
            label: match option {
                SmtpEncryption::None => "None",
                SmtpEncryption::Tls => "TLS (STARTTLS)",
                SmtpEncryption::Ssl => "SSL",
            },
            selected: option == settings.smtp_encryption,
        })
        .collect();

    let placeholders = KNOWN_VARIABLES
        .iter()
        .map(|v| format!("{{{{{}}}}}", v))
        .collect::<Vec<_>>()
        .join(", ");

    let page = SettingsTemplate {
        site_name: state.site_name.clone(),
        nonce: state.csrf.issue(SETTINGS_ACTION),
        has_password: !settings.smtp_pass.is_empty(),
        settings,
        encryption_options,
        placeholders,
        success,
        error,
    };

    ([(header::CACHE_CONTROL, "no-store")], page).into_response()
}
