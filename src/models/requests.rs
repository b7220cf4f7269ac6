use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to register a new account
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Request to log in with email and password
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request to create an alert
///
/// An empty `location` is a valid "any location" subscription. Inverted
/// price ranges are rejected here rather than silently matching nothing.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_price_range))]
pub struct CreateAlertRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub location: String,
    #[serde(alias = "min_price", rename = "minPrice")]
    pub min_price: f64,
    #[serde(alias = "max_price", rename = "maxPrice")]
    pub max_price: f64,
}

fn validate_price_range(req: &CreateAlertRequest) -> Result<(), ValidationError> {
    if req.min_price > req.max_price {
        return Err(ValidationError::new("price_range_inverted"));
    }
    if req.min_price < 0.0 {
        return Err(ValidationError::new("price_negative"));
    }
    Ok(())
}

/// Request to favorite an apartment
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFavoriteRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(alias = "apartment_id", rename = "apartmentId")]
    pub apartment_id: i64,
}

/// Query parameters for apartment search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApartmentSearchQuery {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(alias = "min_price", rename = "minPrice", default)]
    pub min_price: Option<f64>,
    #[serde(alias = "max_price", rename = "maxPrice", default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Query parameters for user-scoped listings (favorites, alerts)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
}

/// Query parameters for removing a favorite
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DeleteFavoriteQuery {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[serde(alias = "apartment_id", rename = "apartmentId")]
    pub apartment_id: i64,
}
