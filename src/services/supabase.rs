use crate::core::sweep::{AlertRepository, ContactResolver, RepositoryError, ResolveError};
use crate::models::{Alert, AuthUser, Favorite, NewAlert, NewFavorite};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or credentials")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names in the Supabase database
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub alerts: String,
    pub favorites: String,
}

/// Supabase API client
///
/// Handles all communication with the Supabase backend including:
/// - Auth: signup, password login, token verification
/// - Admin: user listing and contact resolution
/// - Rest: the `alerts` and `favorites` tables
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(base_url: String, api_key: String, tables: SupabaseTables) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
            tables,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            table
        )
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Register a new account
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, SupabaseError> {
        let url = self.auth_url("signup");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);
            let message = body
                .get("msg")
                .or_else(|| body.get("error_description"))
                .or_else(|| body.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or("signup rejected");
            return Err(SupabaseError::ApiError(format!("{}: {}", status, message)));
        }

        let body: Value = response.json().await?;

        // Signup returns either the user directly or a session wrapping it.
        let user = body.get("user").unwrap_or(&body);

        serde_json::from_value(user.clone())
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse user: {}", e)))
    }

    /// Log in with email and password, returning the access token
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<String, SupabaseError> {
        let url = format!("{}?grant_type=password", self.auth_url("token"));

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::Unauthorized);
        }

        let body: Value = response.json().await?;

        body.get("access_token")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(|| SupabaseError::InvalidResponse("Missing access_token".into()))
    }

    /// Verify an access token and return the user it belongs to
    pub async fn get_user(&self, access_token: &str) -> Result<AuthUser, SupabaseError> {
        let url = self.auth_url("user");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SupabaseError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to verify token: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        serde_json::from_value(body)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse user: {}", e)))
    }

    /// Resolve a user's email address via the admin API
    pub async fn get_user_email(&self, user_id: &str) -> Result<String, SupabaseError> {
        let url = self.auth_url(&format!("admin/users/{}", urlencoding::encode(user_id)));

        tracing::debug!("Resolving contact for user: {}", user_id);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(SupabaseError::NotFound(format!("User {} not found", user_id)));
        }
        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to fetch user: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        body.get("email")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .map(str::to_string)
            .ok_or_else(|| SupabaseError::NotFound(format!("User {} has no email", user_id)))
    }

    /// List all registered users via the admin API
    pub async fn list_users(&self) -> Result<Vec<AuthUser>, SupabaseError> {
        let url = self.auth_url("admin/users");

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to list users: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        let users = body
            .get("users")
            .and_then(|u| u.as_array())
            .ok_or_else(|| SupabaseError::InvalidResponse("Missing users array".into()))?;

        Ok(users
            .iter()
            .filter_map(|u| serde_json::from_value(u.clone()).ok())
            .collect())
    }

    /// Fetch every alert row
    pub async fn list_alerts(&self) -> Result<Vec<Alert>, SupabaseError> {
        let url = format!("{}?select=*", self.rest_url(&self.tables.alerts));

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to list alerts: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        serde_json::from_value(body)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse alerts: {}", e)))
    }

    /// Fetch one user's alerts
    pub async fn alerts_for_user(&self, user_id: &str) -> Result<Vec<Alert>, SupabaseError> {
        let url = format!(
            "{}?select=*&user_id=eq.{}",
            self.rest_url(&self.tables.alerts),
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to list alerts: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        serde_json::from_value(body)
            .map_err(|e| SupabaseError::InvalidResponse(format!("Failed to parse alerts: {}", e)))
    }

    /// Insert a new alert and return the stored row
    pub async fn insert_alert(&self, new_alert: &NewAlert) -> Result<Alert, SupabaseError> {
        let url = self.rest_url(&self.tables.alerts);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(new_alert)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to insert alert: {}",
                response.status()
            )));
        }

        let rows: Vec<Alert> = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| SupabaseError::InvalidResponse("Failed to parse inserted alert".into()))?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::InvalidResponse("Insert returned no rows".into()))
    }

    /// Delete one of a user's alerts
    pub async fn delete_alert(&self, alert_id: i64, user_id: &str) -> Result<(), SupabaseError> {
        let url = format!(
            "{}?id=eq.{}&user_id=eq.{}",
            self.rest_url(&self.tables.alerts),
            alert_id,
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .delete(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to delete alert: {}",
                response.status()
            )));
        }

        Ok(())
    }

    /// Advance an alert's `last_sent` marker
    pub async fn update_alert_last_sent(
        &self,
        alert_id: i64,
        sent_at: DateTime<Utc>,
    ) -> Result<(), SupabaseError> {
        let url = format!("{}?id=eq.{}", self.rest_url(&self.tables.alerts), alert_id);

        let response = self
            .client
            .patch(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&json!({ "last_sent": sent_at }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to update alert {}: {}",
                alert_id,
                response.status()
            )));
        }

        tracing::debug!("Updated last_sent for alert {}", alert_id);

        Ok(())
    }

    /// Fetch every favorite row
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, SupabaseError> {
        let url = format!("{}?select=*", self.rest_url(&self.tables.favorites));

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to list favorites: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        serde_json::from_value(body).map_err(|e| {
            SupabaseError::InvalidResponse(format!("Failed to parse favorites: {}", e))
        })
    }

    /// Fetch one user's favorites
    pub async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, SupabaseError> {
        let url = format!(
            "{}?select=*&user_id=eq.{}",
            self.rest_url(&self.tables.favorites),
            urlencoding::encode(user_id)
        );

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to list favorites: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        serde_json::from_value(body).map_err(|e| {
            SupabaseError::InvalidResponse(format!("Failed to parse favorites: {}", e))
        })
    }

    /// Insert a favorite and return the stored row
    pub async fn insert_favorite(
        &self,
        new_favorite: &NewFavorite,
    ) -> Result<Favorite, SupabaseError> {
        let url = self.rest_url(&self.tables.favorites);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(new_favorite)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to insert favorite: {}",
                response.status()
            )));
        }

        let rows: Vec<Favorite> = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|v| serde_json::from_value(v).ok())
            .ok_or_else(|| {
                SupabaseError::InvalidResponse("Failed to parse inserted favorite".into())
            })?;

        rows.into_iter()
            .next()
            .ok_or_else(|| SupabaseError::InvalidResponse("Insert returned no rows".into()))
    }

    /// Remove a user's favorite for one apartment
    pub async fn delete_favorite(
        &self,
        user_id: &str,
        apartment_id: i64,
    ) -> Result<(), SupabaseError> {
        let url = format!(
            "{}?user_id=eq.{}&apartment_id=eq.{}",
            self.rest_url(&self.tables.favorites),
            urlencoding::encode(user_id),
            apartment_id
        );

        let response = self
            .client
            .delete(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to delete favorite: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl AlertRepository for SupabaseClient {
    async fn list_all(&self) -> Result<Vec<Alert>, RepositoryError> {
        self.list_alerts()
            .await
            .map_err(|e| RepositoryError(e.to_string()))
    }

    async fn update_last_sent(
        &self,
        alert_id: i64,
        sent_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.update_alert_last_sent(alert_id, sent_at)
            .await
            .map_err(|e| RepositoryError(e.to_string()))
    }
}

#[async_trait]
impl ContactResolver for SupabaseClient {
    async fn resolve_contact(&self, user_id: &str) -> Result<String, ResolveError> {
        self.get_user_email(user_id)
            .await
            .map_err(|e| ResolveError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_client_creation() {
        let tables = SupabaseTables {
            alerts: "alerts".to_string(),
            favorites: "favorites".to_string(),
        };

        let client = SupabaseClient::new(
            "https://project.supabase.co/".to_string(),
            "test_key".to_string(),
            tables,
        );

        assert_eq!(
            client.rest_url("alerts"),
            "https://project.supabase.co/rest/v1/alerts"
        );
        assert_eq!(
            client.auth_url("token"),
            "https://project.supabase.co/auth/v1/token"
        );
    }
}
