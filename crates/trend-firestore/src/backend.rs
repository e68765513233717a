//! Store backend selection shared by the API and the cache writer.

use std::fmt;
use std::str::FromStr;

use crate::error::{FirestoreError, FirestoreResult};

/// Which storage implementation a binary wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Firestore,
    /// Process-local; data is lost on exit.
    Memory,
}

impl StoreBackend {
    /// Read `STORE_BACKEND`, defaulting to Firestore.
    pub fn from_env() -> FirestoreResult<Self> {
        match std::env::var("STORE_BACKEND") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse(),
            _ => Ok(Self::default()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Firestore => "firestore",
            StoreBackend::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = FirestoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(FirestoreError::config(format!(
                "unknown STORE_BACKEND '{other}' (expected 'firestore' or 'memory')"
            ))),
        }
    }
}
