//! Shared prediction cache and the guard that keeps it bounded.
//!
//! Adaptive lookahead memoizes two things across every recognizer in a process:
//! the lookahead contexts it has seen (interned to small ids) and, per decision,
//! which alternative a context predicts. Both live in a [`PredictionCache`] that is
//! shared through a [`SharedPredictionCache`] handle injected into each lexer and
//! parser.
//!
//! Left alone, the cache grows with every distinct lookahead it meets. The
//! [`CacheGuard`] runs whenever a recognizer is constructed: if the number of
//! interned contexts exceeds the threshold, everything is dropped and rebuilt on
//! demand. Eviction is all-or-nothing.
//!
//! The check and the clear happen under one lock, but the bound is only enforced
//! at construction: recognizers already running keep adding entries. Callers that
//! construct recognizers on several threads at once must serialize construction
//! themselves if they need the bound to hold exactly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{ArboristError, Result};
use crate::runtime::TokenType;

/// Number of interned contexts above which the cache is cleared.
pub const DEFAULT_CACHE_THRESHOLD: usize = 10_000;

/// Identifier of an interned lookahead context. Only meaningful within the
/// generation that issued it.
pub type ContextId = usize;

/// Memoized prediction state shared by all recognizers.
#[derive(Debug, Default)]
pub struct PredictionCache {
    contexts: HashMap<Vec<TokenType>, ContextId>,
    dfa: HashMap<(usize, ContextId), usize>,
    generation: u64,
}

impl PredictionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned contexts. This is the size the guard bounds.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Number of recorded decision outcomes.
    pub fn dfa_len(&self) -> usize {
        self.dfa.len()
    }

    /// Bumped every time the cache is cleared; ids from an older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the id of `lookahead`, interning it if it is new.
    pub fn intern(&mut self, lookahead: &[TokenType]) -> ContextId {
        if let Some(id) = self.contexts.get(lookahead) {
            return *id;
        }
        let id = self.contexts.len();
        self.contexts.insert(lookahead.to_vec(), id);
        id
    }

    pub fn prediction(&self, decision: usize, context: ContextId) -> Option<usize> {
        self.dfa.get(&(decision, context)).copied()
    }

    pub fn record(&mut self, decision: usize, context: ContextId, alternative: usize) {
        self.dfa.insert((decision, context), alternative);
    }

    /// Drops every context and every recorded decision.
    pub fn clear(&mut self) {
        self.contexts.clear();
        self.dfa.clear();
        self.generation += 1;
    }
}

/// Reference-counted handle on a [`PredictionCache`].
///
/// Cloning the handle shares the cache. [`SharedPredictionCache::global`] is the
/// process-wide instance used when no cache is injected.
#[derive(Debug, Clone, Default)]
pub struct SharedPredictionCache {
    inner: Arc<Mutex<PredictionCache>>,
}

static GLOBAL_CACHE: Lazy<SharedPredictionCache> = Lazy::new(SharedPredictionCache::new);

impl SharedPredictionCache {
    /// A fresh cache, independent of every other.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache.
    pub fn global() -> SharedPredictionCache {
        GLOBAL_CACHE.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, PredictionCache>> {
        self.inner.lock().map_err(|_| ArboristError::CacheUnavailable)
    }

    /// Runs `f` with exclusive access to the cache.
    pub fn with<R>(&self, f: impl FnOnce(&mut PredictionCache) -> R) -> Result<R> {
        let mut cache = self.lock()?;
        Ok(f(&mut cache))
    }

    pub fn size(&self) -> Result<usize> {
        self.with(|cache| cache.len())
    }

    pub fn generation(&self) -> Result<u64> {
        self.with(|cache| cache.generation())
    }

    pub fn clear(&self) -> Result<()> {
        self.with(PredictionCache::clear)
    }

    /// True if both handles refer to the same cache.
    pub fn ptr_eq(&self, other: &SharedPredictionCache) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Size bound enforced on a [`SharedPredictionCache`] when a recognizer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGuard {
    threshold: usize,
}

impl Default for CacheGuard {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_THRESHOLD)
    }
}

impl CacheGuard {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Clears `cache` if it holds more than `threshold` contexts.
    ///
    /// Returns whether a clear happened, in which case the caller must discard any
    /// interpreter state derived from the cache.
    ///
    /// # Errors
    ///
    /// [`ArboristError::CacheUnavailable`] if the cache cannot be locked.
    pub fn enforce(&self, cache: &SharedPredictionCache) -> Result<bool> {
        cache.with(|cache| {
            let size = cache.len();
            if size <= self.threshold {
                return false;
            }
            debug!(
                size,
                threshold = self.threshold,
                "prediction cache over threshold, clearing"
            );
            cache.clear();
            true
        })
    }
}
