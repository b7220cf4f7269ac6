use serde::{Deserialize, Serialize};

/// Apartment listing from the static catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub price: f64,
    pub rating: f64,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
}

/// Saved search subscription, stored in the Supabase `alerts` table
///
/// `last_sent_at` is the only durable trace of a delivered notification.
/// It is written exclusively by the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub user_id: String,
    pub location: String,
    pub min_price: f64,
    pub max_price: f64,
    #[serde(rename = "last_sent", default)]
    pub last_sent_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Insert payload for the `alerts` table
#[derive(Debug, Clone, Serialize)]
pub struct NewAlert {
    pub user_id: String,
    pub location: String,
    pub min_price: f64,
    pub max_price: f64,
}

/// Favorite row from the Supabase `favorites` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: String,
    pub apartment_id: i64,
}

/// Insert payload for the `favorites` table
#[derive(Debug, Clone, Serialize)]
pub struct NewFavorite {
    pub user_id: String,
    pub apartment_id: i64,
}

/// Supabase auth user, as returned by the auth and admin endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Sort orders accepted by the apartment search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Price,
    Rating,
    Distance,
}

/// Catalog query parameters
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub location: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub sort: Option<SortKey>,
}
