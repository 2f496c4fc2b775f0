//! Collision-free resource names

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{FixtureError, Result};

/// First identifier handed out
pub const FIRST_ID: u64 = 1000;

/// Give up after this many names already taken on the engine
const MAX_ATTEMPTS: u64 = 10_000;

static GLOBAL_IDS: Lazy<IdSource> = Lazy::new(IdSource::new);

/// Monotonic identifier source for `<prefix>-<id>` names
///
/// Identifiers never repeat within a source; names are additionally checked
/// against the engine so leftovers from other runs are skipped.
#[derive(Debug)]
pub struct IdSource {
    next: AtomicU64,
}

impl IdSource {
    pub fn new() -> Self {
        Self::starting_at(FIRST_ID)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Process-wide source shared by all helpers
    pub fn global() -> &'static IdSource {
        &GLOBAL_IDS
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Next `<prefix>-<id>` name for which `is_taken` answers false
    pub async fn next_free_name<F, Fut>(&self, prefix: &str, mut is_taken: F) -> Result<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        for _ in 0..MAX_ATTEMPTS {
            let name = format!("{}-{}", prefix, self.next_id());
            if !is_taken(name.clone()).await? {
                return Ok(name);
            }
            debug!(name = %name, "Name already taken on engine, trying next");
        }

        Err(FixtureError::config(format!(
            "No free {} name after {} attempts",
            prefix, MAX_ATTEMPTS
        )))
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::new()
    }
}
