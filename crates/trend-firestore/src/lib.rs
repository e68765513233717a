//! Firestore REST client and document stores.
//!
//! This crate provides:
//! - A Firestore REST client with token caching, retry and metrics
//! - Storage traits for cached trends, users and sessions
//! - Firestore-backed and in-memory implementations of those traits
//! - `STORE_BACKEND` selection between the two

pub mod account_repo;
pub mod backend;
pub mod client;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod retry;
pub mod store;
pub mod token_cache;
pub mod trend_repo;
pub mod types;

#[cfg(test)]
mod client_tests;

pub use account_repo::{FirestoreSessionStore, FirestoreUserStore};
pub use backend::StoreBackend;
pub use client::{FirestoreClient, FirestoreConfig};
pub use error::{FirestoreError, FirestoreResult};
pub use memory::MemoryStore;
pub use retry::RetryConfig;
pub use store::{SessionStore, TrendCacheStore, UserStore};
pub use trend_repo::{FirestoreTrendStore, DEFAULT_TREND_COLLECTION};
pub use types::{Document, StructuredQuery, Value};
