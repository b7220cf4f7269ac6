use crate::models::{
    CreateFavoriteRequest, DeleteFavoriteQuery, ErrorResponse, FavoritesResponse, NewFavorite,
    UserQuery,
};
use crate::routes::AppState;
use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

/// Configure favorites routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/favorites", web::get().to(list_favorites))
        .route("/favorites", web::post().to(add_favorite))
        .route("/favorites", web::delete().to(remove_favorite));
}

/// List a user's favorites
///
/// GET /api/v1/favorites?userId={userId}
async fn list_favorites(
    state: web::Data<AppState>,
    query: web::Query<UserQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state.supabase.favorites_for_user(&query.user_id).await {
        Ok(favorites) => HttpResponse::Ok().json(FavoritesResponse {
            user_id: query.user_id.clone(),
            count: favorites.len(),
            favorites,
        }),
        Err(e) => {
            tracing::error!("Failed to list favorites for {}: {}", query.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to list favorites".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Favorite an apartment
///
/// POST /api/v1/favorites
async fn add_favorite(
    state: web::Data<AppState>,
    req: web::Json<CreateFavoriteRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    if state.listings.get(req.apartment_id).is_none() {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: "Unknown apartment".to_string(),
            message: format!("No apartment with id {}", req.apartment_id),
            status_code: 404,
        });
    }

    let new_favorite = NewFavorite {
        user_id: req.user_id.clone(),
        apartment_id: req.apartment_id,
    };

    match state.supabase.insert_favorite(&new_favorite).await {
        Ok(favorite) => HttpResponse::Ok().json(favorite),
        Err(e) => {
            tracing::error!("Failed to add favorite for {}: {}", req.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to add favorite".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Remove a favorite
///
/// DELETE /api/v1/favorites?userId={userId}&apartmentId={apartmentId}
async fn remove_favorite(
    state: web::Data<AppState>,
    query: web::Query<DeleteFavoriteQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state
        .supabase
        .delete_favorite(&query.user_id, query.apartment_id)
        .await
    {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => {
            tracing::error!("Failed to remove favorite for {}: {}", query.user_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to remove favorite".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
