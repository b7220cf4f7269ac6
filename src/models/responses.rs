use crate::models::domain::{Alert, Favorite, Listing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Response for successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
}

/// Response for successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Response for apartment search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApartmentsResponse {
    pub apartments: Vec<Listing>,
    pub total: usize,
}

/// Response listing a user's favorites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub favorites: Vec<Favorite>,
    pub count: usize,
}

/// Response listing a user's alerts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub alerts: Vec<Alert>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Admin overview counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverviewResponse {
    pub registers: u64,
    pub logins: u64,
    pub searches: u64,
    #[serde(rename = "topLocations")]
    pub top_locations: Vec<(String, u64)>,
}

/// Per-user aggregate for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserSummary {
    pub email: String,
    pub favorites: usize,
    pub alerts: usize,
}

/// Response listing per-user aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUsersResponse {
    pub users: Vec<AdminUserSummary>,
}

/// Favorite count for one apartment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteCount {
    #[serde(rename = "apartmentId")]
    pub apartment_id: i64,
    pub count: usize,
}

/// Response listing the most favorited apartments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminFavoritesResponse {
    pub top: Vec<FavoriteCount>,
}

/// Alert analytics for the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertAnalytics {
    #[serde(rename = "perLocation")]
    pub per_location: HashMap<String, usize>,
}

/// Response wrapping alert analytics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminAlertsResponse {
    pub analytics: AlertAnalytics,
}
