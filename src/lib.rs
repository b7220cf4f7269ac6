//! Najem Alerts - Alert matching and notification service for the Najem
//! apartment search app
//!
//! This library provides the alert sweep used by the Najem backend: a pure
//! match engine over the apartment catalog, a per-alert notification
//! dispatcher, and a sweep orchestrator that drives them with bounded
//! concurrency.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    matching_listings, DispatchError, DispatchOutcome, SkipReason, SweepPolicy, SweepReport,
    Sweeper,
};
pub use crate::models::{Alert, Favorite, Listing, ListingQuery, SortKey};
pub use crate::services::{ListingStore, Mailer, SupabaseClient, UsageStats};
