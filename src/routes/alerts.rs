use crate::models::{
    AlertsResponse, CreateAlertRequest, ErrorResponse, NewAlert, UserQuery,
};
use crate::routes::AppState;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure alert routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/alerts", web::get().to(list_alerts))
        .route("/alerts", web::post().to(create_alert))
        .route("/alerts/{id}", web::delete().to(delete_alert));
}

/// List a user's alerts
///
/// GET /api/v1/alerts?userId={userId}
async fn list_alerts(state: web::Data<AppState>, query: web::Query<UserQuery>) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.supabase.alerts_for_user(&query.user_id).await {
        Ok(alerts) => HttpResponse::Ok().json(AlertsResponse {
            user_id: query.user_id.clone(),
            alerts,
        }),
        Err(e) => {
            tracing::error!("Failed to list alerts for {}: {}", query.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list alerts".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Create an alert
///
/// POST /api/v1/alerts
///
/// Rejects inverted price ranges; an empty location subscribes to every
/// location.
async fn create_alert(
    state: web::Data<AppState>,
    req: web::Json<CreateAlertRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Rejected alert for {}: {}", req.user_id, errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let new_alert = NewAlert {
        user_id: req.user_id.clone(),
        location: req.location.trim().to_string(),
        min_price: req.min_price,
        max_price: req.max_price,
    };

    match state.supabase.insert_alert(&new_alert).await {
        Ok(alert) => {
            tracing::info!(
                "Created alert {} for user {} (location: '{}')",
                alert.id,
                alert.user_id,
                alert.location
            );
            HttpResponse::Ok().json(alert)
        }
        Err(e) => {
            tracing::error!("Failed to create alert for {}: {}", req.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to create alert".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Delete one of a user's alerts
///
/// DELETE /api/v1/alerts/{id}?userId={userId}
async fn delete_alert(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let alert_id = path.into_inner();

    match state.supabase.delete_alert(alert_id, &query.user_id).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            tracing::error!("Failed to delete alert {}: {}", alert_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to delete alert".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
