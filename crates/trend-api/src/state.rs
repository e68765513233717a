//! Application state.

use std::sync::Arc;

use anyhow::Context;
use tracing::warn;
use trend_firestore::{
    FirestoreClient, FirestoreSessionStore, FirestoreTrendStore, FirestoreUserStore, MemoryStore,
    SessionStore, StoreBackend, TrendCacheStore, UserStore,
};
use trend_llm::{IdeaGenerator, LlmClient};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub trends: Arc<dyn TrendCacheStore>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub ideas: IdeaGenerator,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        trends: Arc<dyn TrendCacheStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        ideas: IdeaGenerator,
    ) -> Self {
        Self {
            config,
            trends,
            users,
            sessions,
            ideas,
        }
    }

    /// All three stores backed by one [`MemoryStore`].
    pub fn in_memory(config: ApiConfig, store: Arc<MemoryStore>, ideas: IdeaGenerator) -> Self {
        Self::new(config, store.clone(), store.clone(), store, ideas)
    }

    /// Build state from the configured store backend and the LLM env config.
    pub async fn from_config(config: ApiConfig) -> anyhow::Result<Self> {
        let ideas = IdeaGenerator::new(LlmClient::from_env().context("LLM client")?);

        match config.store_backend {
            StoreBackend::Firestore => {
                let client = FirestoreClient::from_env()
                    .await
                    .context("Firestore client")?;
                let trends = Arc::new(FirestoreTrendStore::new(
                    client.clone(),
                    FirestoreTrendStore::collection_from_env(),
                ));
                let users = Arc::new(FirestoreUserStore::new(client.clone()));
                let sessions = Arc::new(FirestoreSessionStore::new(client));
                Ok(Self::new(config, trends, users, sessions, ideas))
            }
            StoreBackend::Memory => {
                warn!("STORE_BACKEND=memory: all accounts and cached trends are lost on restart");
                Ok(Self::in_memory(config, Arc::new(MemoryStore::new()), ideas))
            }
        }
    }
}
