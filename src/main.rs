mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use crate::config::Settings;
use crate::core::{SweepPolicy, Sweeper};
use crate::routes::AppState;
use crate::services::{ListingStore, Mailer, SupabaseClient, SupabaseTables, UsageStats};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(log_level))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Najem alert service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize Supabase client
    let tables = SupabaseTables {
        alerts: settings.tables.alerts,
        favorites: settings.tables.favorites,
    };

    let supabase = Arc::new(SupabaseClient::new(
        settings.supabase.url,
        settings.supabase.api_key,
        tables,
    ));

    info!("Supabase client initialized");

    // Initialize the mailer
    let mailer = Arc::new(
        Mailer::new(
            &settings.mail.smtp_host,
            settings.mail.smtp_port,
            settings.mail.username,
            settings.mail.password,
            settings.mail.from_address,
        )
        .unwrap_or_else(|e| {
            error!("Failed to initialize mailer: {}", e);
            panic!("Mailer error: {}", e);
        }),
    );

    info!("Mailer initialized (relay: {})", settings.mail.smtp_host);

    // Load the apartment catalog
    let listings = Arc::new(ListingStore::with_catalog());

    info!("Listing store loaded ({} apartments)", listings.all().len());

    // Build the sweeper with its policy
    let policy = SweepPolicy {
        cooldown: (settings.sweep.cooldown_secs > 0)
            .then(|| chrono::Duration::seconds(settings.sweep.cooldown_secs as i64)),
        max_concurrency: settings.sweep.max_concurrency,
        op_timeout: Duration::from_secs(settings.sweep.op_timeout_secs),
    };

    let sweeper = Arc::new(Sweeper::new(
        supabase.clone(),
        supabase.clone(),
        mailer,
        listings.clone(),
        policy,
    ));

    info!(
        "Sweeper initialized (cooldown: {}s, concurrency: {})",
        settings.sweep.cooldown_secs, settings.sweep.max_concurrency
    );

    // Build application state
    let app_state = AppState {
        supabase,
        listings,
        sweeper,
        stats: Arc::new(UsageStats::new()),
        admin_email: settings.admin.email,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
