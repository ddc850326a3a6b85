//! API Server - HTTP server for the quote form and its admin pages

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::api::auth::JwtConfig;
use crate::api::handlers::{self, AppState, JsonReply, SCRIPT_PATH, SUBMIT_PATH};
use crate::api::web;
use crate::config::Config;
use crate::csrf::CsrfGuard;
use crate::relay::QuoteRelay;
use crate::settings::SettingsStore;
use crate::smtp::Mailer;

/// Fixed-window submission limiter keyed by client IP
pub struct RateLimiter {
    /// Map of IP -> (request count, window start time)
    requests: RwLock<HashMap<String, (u32, Instant)>>,
    /// Maximum requests per window; 0 disables the limit
    max_requests: u32,
    window_duration: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_seconds: u64) -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
            max_requests,
            window_duration: Duration::from_secs(window_seconds),
        }
    }

    /// Check if request should be allowed for given IP
    pub async fn check_rate_limit(&self, ip: &str) -> bool {
        if self.max_requests == 0 {
            return true;
        }

        let now = Instant::now();
        let mut requests = self.requests.write().await;

        let entry = requests.entry(ip.to_string()).or_insert((0, now));

        if now.duration_since(entry.1) > self.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        if entry.0 >= self.max_requests {
            return false;
        }

        entry.0 += 1;
        true
    }

    /// Drop windows that ended long ago
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut requests = self.requests.write().await;
        requests.retain(|_, (_, start)| now.duration_since(*start) <= self.window_duration * 2);
    }
}

/// API Server configuration
pub struct ApiServer {
    state: Arc<AppState>,
    rate_limiter: Arc<RateLimiter>,
    addr: String,
}

impl ApiServer {
    /// Create a server that delivers mail through `mailer`
    pub fn new(config: &Config, mailer: Arc<dyn Mailer>) -> Self {
        let store = SettingsStore::new(config.storage.settings_path.clone());
        let relay = QuoteRelay::new(
            store.clone(),
            mailer,
            config.admin.email.clone(),
            config.server.site_name.clone(),
        );

        let state = Arc::new(AppState {
            site_name: config.server.site_name.clone(),
            public_url: config.server.public_url.trim().trim_end_matches('/').to_string(),
            csrf: CsrfGuard::new(
                &config.form.csrf_secret,
                Duration::from_secs(config.form.csrf_lifetime_secs),
            ),
            sessions: JwtConfig::new(
                config.admin.session_secret.clone(),
                config.admin.session_hours,
            ),
            admin_password_hash: config.admin.password_hash.clone(),
            store,
            relay,
        });

        let rate_limiter = Arc::new(RateLimiter::new(config.form.rate_limit_per_minute, 60));

        Self {
            state,
            rate_limiter,
            addr: config.server.listen_addr.clone(),
        }
    }

    /// Build the router with all routes
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any);

        let public_routes = Router::new()
            .route("/", get(handlers::form_page))
            .route("/embed", get(handlers::embed_form))
            .route(SCRIPT_PATH, get(handlers::form_script))
            .route("/health", get(handlers::health));

        let submit_routes = Router::new()
            .route(SUBMIT_PATH, post(handlers::submit_quote))
            .route_layer(middleware::from_fn_with_state(
                self.rate_limiter.clone(),
                rate_limit_middleware,
            ));

        let admin_routes = Router::new()
            .route("/admin", get(web::admin_index))
            .route("/admin/login", get(web::login_page).post(web::login_submit))
            .route("/admin/logout", get(web::logout))
            .route(
                "/admin/settings",
                get(web::settings_page).post(web::settings_submit),
            );

        Router::new()
            .merge(public_routes)
            .merge(submit_routes)
            .merge(admin_routes)
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the server and serve until Ctrl+C
    pub async fn run(&self) -> std::io::Result<()> {
        let router = self.router();

        let limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });

        info!("Starting quote form server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Rate limiting middleware for form submissions
async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.check_rate_limit(&ip).await {
        warn!("Rate limit exceeded for {}", ip);
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(JsonReply::error("Too many requests. Please try again later.")),
        )
            .into_response();
    }

    next.run(req).await
}
