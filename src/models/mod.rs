// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Alert, AuthUser, Favorite, Listing, ListingQuery, NewAlert, NewFavorite, SortKey};
pub use requests::{
    ApartmentSearchQuery, CreateAlertRequest, CreateFavoriteRequest, DeleteFavoriteQuery,
    LoginRequest, RegisterRequest, UserQuery,
};
pub use responses::{
    AdminAlertsResponse, AdminFavoritesResponse, AdminOverviewResponse, AdminUserSummary,
    AdminUsersResponse, AlertAnalytics, AlertsResponse, ApartmentsResponse, ErrorResponse,
    FavoriteCount, FavoritesResponse, HealthResponse, LoginResponse, RegisterResponse,
};
