use crate::models::{ErrorResponse, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::routes::AppState;
use crate::services::SupabaseError;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure auth routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login));
}

/// Register a new account
///
/// POST /api/v1/auth/register
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.supabase.sign_up(&req.email, &req.password).await {
        Ok(user) => {
            state.stats.record_register();
            tracing::info!("Registered user {}", user.id);

            HttpResponse::Ok().json(RegisterResponse {
                message: "Registration successful".to_string(),
                user_id: user.id,
            })
        }
        Err(e) => {
            tracing::warn!("Registration failed for {}: {}", req.email, e);
            HttpResponse::BadRequest().json(ErrorResponse {
                error: "Registration failed".to_string(),
                message: e.to_string(),
                status_code: 400,
            })
        }
    }
}

/// Log in with email and password
///
/// POST /api/v1/auth/login
async fn login(state: web::Data<AppState>, req: web::Json<LoginRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.supabase.sign_in(&req.email, &req.password).await {
        Ok(token) => {
            state.stats.record_login();

            HttpResponse::Ok().json(LoginResponse {
                message: "Login successful".to_string(),
                token,
            })
        }
        Err(SupabaseError::Unauthorized) => HttpResponse::Unauthorized().json(ErrorResponse {
            error: "Login failed".to_string(),
            message: "Invalid email or password".to_string(),
            status_code: 401,
        }),
        Err(e) => {
            tracing::error!("Login failed for {}: {}", req.email, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Login failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
