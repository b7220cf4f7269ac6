use crate::core::SweepError;
use crate::models::{
    AdminAlertsResponse, AdminFavoritesResponse, AdminOverviewResponse, AdminUserSummary,
    AdminUsersResponse, AlertAnalytics, ErrorResponse, FavoriteCount,
};
use crate::routes::AppState;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::collections::HashMap;

const TOP_LOCATIONS: usize = 5;
const TOP_FAVORITES: usize = 10;

/// Configure admin routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/admin/overview", web::get().to(overview))
        .route("/admin/users", web::get().to(users))
        .route("/admin/favorites", web::get().to(top_favorites))
        .route("/admin/alerts", web::get().to(alert_analytics))
        .route("/admin/sweep", web::post().to(run_sweep));
}

/// Admin requests carry the operator address in `x-admin-email`.
fn is_authorized(req: &HttpRequest, state: &AppState) -> bool {
    !state.admin_email.is_empty()
        && req
            .headers()
            .get("x-admin-email")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == state.admin_email)
            .unwrap_or(false)
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorResponse {
        error: "Forbidden".to_string(),
        message: "Admin access required".to_string(),
        status_code: 403,
    })
}

/// Usage counters and top searched locations
///
/// GET /api/v1/admin/overview
async fn overview(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !is_authorized(&req, &state) {
        return forbidden();
    }

    let overview = state.stats.overview(TOP_LOCATIONS);

    HttpResponse::Ok().json(AdminOverviewResponse {
        registers: overview.registers,
        logins: overview.logins,
        searches: overview.searches,
        top_locations: overview.top_locations,
    })
}

/// Per-user favorite and alert counts
///
/// GET /api/v1/admin/users
async fn users(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !is_authorized(&req, &state) {
        return forbidden();
    }

    let users = match state.supabase.list_users().await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Failed to list users: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list users".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let favorites = match state.supabase.list_favorites().await {
        Ok(favorites) => favorites,
        Err(e) => {
            tracing::error!("Failed to list favorites: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list favorites".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let alerts = match state.supabase.list_alerts().await {
        Ok(alerts) => alerts,
        Err(e) => {
            tracing::error!("Failed to list alerts: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list alerts".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let mut favorites_per_user: HashMap<&str, usize> = HashMap::new();
    for favorite in &favorites {
        *favorites_per_user.entry(favorite.user_id.as_str()).or_insert(0) += 1;
    }

    let mut alerts_per_user: HashMap<&str, usize> = HashMap::new();
    for alert in &alerts {
        *alerts_per_user.entry(alert.user_id.as_str()).or_insert(0) += 1;
    }

    let summaries: Vec<AdminUserSummary> = users
        .iter()
        .map(|user| AdminUserSummary {
            email: user.email.clone().unwrap_or_else(|| user.id.clone()),
            favorites: favorites_per_user.get(user.id.as_str()).copied().unwrap_or(0),
            alerts: alerts_per_user.get(user.id.as_str()).copied().unwrap_or(0),
        })
        .collect();

    HttpResponse::Ok().json(AdminUsersResponse { users: summaries })
}

/// Most favorited apartments
///
/// GET /api/v1/admin/favorites
async fn top_favorites(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !is_authorized(&req, &state) {
        return forbidden();
    }

    match state.supabase.list_favorites().await {
        Ok(favorites) => {
            let mut counts: HashMap<i64, usize> = HashMap::new();
            for favorite in &favorites {
                *counts.entry(favorite.apartment_id).or_insert(0) += 1;
            }

            let mut top: Vec<FavoriteCount> = counts
                .into_iter()
                .map(|(apartment_id, count)| FavoriteCount {
                    apartment_id,
                    count,
                })
                .collect();
            top.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.apartment_id.cmp(&b.apartment_id)));
            top.truncate(TOP_FAVORITES);

            HttpResponse::Ok().json(AdminFavoritesResponse { top })
        }
        Err(e) => {
            tracing::error!("Failed to list favorites: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list favorites".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Alerts grouped by subscribed location
///
/// GET /api/v1/admin/alerts
async fn alert_analytics(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !is_authorized(&req, &state) {
        return forbidden();
    }

    match state.supabase.list_alerts().await {
        Ok(alerts) => {
            let mut per_location: HashMap<String, usize> = HashMap::new();
            for alert in &alerts {
                let location = if alert.location.is_empty() {
                    "any".to_string()
                } else {
                    alert.location.to_lowercase()
                };
                *per_location.entry(location).or_insert(0) += 1;
            }

            HttpResponse::Ok().json(AdminAlertsResponse {
                analytics: AlertAnalytics { per_location },
            })
        }
        Err(e) => {
            tracing::error!("Failed to list alerts: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list alerts".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Run one alert sweep
///
/// POST /api/v1/admin/sweep
///
/// Invoked by an external scheduler (cron hitting this endpoint). At most
/// one sweep runs at a time; a concurrent trigger gets 409.
async fn run_sweep(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if !is_authorized(&req, &state) {
        return forbidden();
    }

    match state.sweeper.run().await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(SweepError::AlreadyRunning) => HttpResponse::Conflict().json(ErrorResponse {
            error: "Sweep already running".to_string(),
            message: "A sweep is in progress, try again later".to_string(),
            status_code: 409,
        }),
        Err(SweepError::Repository(e)) => {
            tracing::error!("Sweep could not load alerts: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse {
                error: "Sweep failed".to_string(),
                message: e.to_string(),
                status_code: 502,
            })
        }
    }
}
