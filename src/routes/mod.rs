// Route exports
pub mod admin;
pub mod alerts;
pub mod apartments;
pub mod auth;
pub mod favorites;

use crate::core::Sweeper;
use crate::models::HealthResponse;
use crate::services::{ListingStore, SupabaseClient, UsageStats};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub listings: Arc<ListingStore>,
    pub sweeper: Arc<Sweeper>,
    pub stats: Arc<UsageStats>,
    pub admin_email: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(apartments::configure)
            .configure(favorites::configure)
            .configure(alerts::configure)
            .configure(admin::configure),
    );
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use crate::models::HealthResponse;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
