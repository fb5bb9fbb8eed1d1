//! Congregate Library
//!
//! Church management backend: member directory, households, groups, events,
//! announcements, giving, children's check-in and an audit trail of every
//! change.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::{DataStore, SharedStore};
pub use middleware::{auth_middleware, AuthUser};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// In-memory data store
    pub store: SharedStore,
}

impl AppState {
    /// Build state around the seeded demo store
    pub fn new(config: AppConfig) -> Self {
        let store = DataStore::seeded(&config).into_shared();
        Self::with_store(config, store)
    }

    pub fn with_store(config: AppConfig, store: SharedStore) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
