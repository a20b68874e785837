//! Process-wide record of the current player script and its programs

use crate::platform::cipher::CipherProgram;
use crate::utils::cache::{new_async_cache, AsyncCache};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// Tracks the most recently discovered player asset version and caches the
/// cipher program derived from each version.
#[derive(Clone)]
pub struct PlayerRegistry {
    current: Arc<RwLock<Option<String>>>,
    programs: AsyncCache<String, Arc<CipherProgram>>,
}

impl PlayerRegistry {
    pub fn new(program_ttl: Duration) -> Self {
        Self {
            current: Arc::new(RwLock::new(None)),
            programs: new_async_cache(program_ttl),
        }
    }

    /// Record `version` as the current player asset
    pub fn record(&self, version: &str) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_deref() != Some(version) {
            debug!("Player asset version is now {}", version);
            *current = Some(version.to_string());
        }
    }

    pub fn current(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn cached_program(&self, version: &str) -> Option<Arc<CipherProgram>> {
        self.programs.get(version).await
    }

    pub async fn store_program(&self, version: &str, program: Arc<CipherProgram>) {
        self.programs.insert(version.to_string(), program).await;
    }
}

impl Default for PlayerRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(3600))
    }
}
