use crate::models::{
    ApartmentSearchQuery, ApartmentsResponse, ErrorResponse, ListingQuery, SortKey,
};
use crate::routes::AppState;
use actix_web::{web, HttpResponse, Responder};

/// Configure apartment search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/apartments", web::get().to(search_apartments));
}

/// Search the apartment catalog
///
/// GET /api/v1/apartments?location=maribor&minPrice=50&maxPrice=100&sort=price
async fn search_apartments(
    state: web::Data<AppState>,
    query: web::Query<ApartmentSearchQuery>,
) -> impl Responder {
    let sort = match query.sort.as_deref() {
        None => None,
        Some("price") => Some(SortKey::Price),
        Some("rating") => Some(SortKey::Rating),
        Some("distance") => Some(SortKey::Distance),
        Some(other) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid sort".to_string(),
                message: format!("Unknown sort key '{}', expected price, rating or distance", other),
                status_code: 400,
            });
        }
    };

    let listing_query = ListingQuery {
        location: query.location.clone(),
        min_price: query.min_price,
        max_price: query.max_price,
        sort,
    };

    let apartments = state.listings.search(&listing_query);
    state.stats.record_search(query.location.as_deref());

    tracing::debug!(
        "Search returned {} apartments (location: {:?})",
        apartments.len(),
        query.location
    );

    HttpResponse::Ok().json(ApartmentsResponse {
        total: apartments.len(),
        apartments,
    })
}
