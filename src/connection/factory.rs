//! Backend registry
//!
//! Backends register once at startup; tests may `clear` and re-populate a
//! registry between cases. Selection never holds the lock across `open`.

use super::default::DefaultConnectionFactory;
use super::types::{Connection, ConnectionRequest};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::debug;

/// A pluggable backend able to open sessions
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    /// Backend name, used in logs
    fn name(&self) -> &str;

    /// Check whether this backend wants to open the request
    fn can_open(&self, request: &ConnectionRequest) -> bool;

    /// Rank among backends that can open the request; higher wins
    fn priority(&self, request: &ConnectionRequest) -> i32;

    /// Open the session
    async fn open(&self, request: &ConnectionRequest) -> Result<Box<dyn Connection>>;
}

static GLOBAL: LazyLock<BackendRegistry> = LazyLock::new(BackendRegistry::new);

/// Ordered collection of backends plus a fallback
pub struct BackendRegistry {
    factories: RwLock<Vec<Arc<dyn ConnectionFactory>>>,
    fallback: Arc<dyn ConnectionFactory>,
}

impl BackendRegistry {
    /// Empty registry falling back to the default HTTP backend
    pub fn new() -> Self {
        Self::with_fallback(Arc::new(DefaultConnectionFactory::default()))
    }

    /// Empty registry with a custom fallback
    pub fn with_fallback(fallback: Arc<dyn ConnectionFactory>) -> Self {
        Self {
            factories: RwLock::new(Vec::new()),
            fallback,
        }
    }

    /// Process-wide registry
    pub fn global() -> &'static BackendRegistry {
        &GLOBAL
    }

    /// Add a backend
    pub fn register(&self, factory: Arc<dyn ConnectionFactory>) {
        debug!("Registering connection backend '{}'", factory.name());
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(factory);
    }

    /// Remove every registered backend; the fallback stays
    pub fn clear(&self) {
        self.factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of registered backends, excluding the fallback
    pub fn len(&self) -> usize {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if no backend is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backend that would open this request
    pub fn resolve(&self, request: &ConnectionRequest) -> Arc<dyn ConnectionFactory> {
        if let Some(preferred) = request.preferred_backend() {
            return Arc::clone(preferred);
        }

        let factories = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        let mut best: Option<(i32, &Arc<dyn ConnectionFactory>)> = None;
        for factory in factories.iter() {
            if !factory.can_open(request) {
                continue;
            }
            let priority = factory.priority(request);
            // Strictly greater: the earliest registered keeps a tie
            if best.map_or(true, |(p, _)| priority > p) {
                best = Some((priority, factory));
            }
        }

        match best {
            Some((_, factory)) => Arc::clone(factory),
            None => Arc::clone(&self.fallback),
        }
    }

    /// Open a session through the selected backend
    pub async fn open(&self, request: &ConnectionRequest) -> Result<Box<dyn Connection>> {
        let factory = self.resolve(request);
        debug!(
            "Opening connection to {} via '{}' (auth: {})",
            request.server_url(),
            factory.name(),
            request.auth_token().kind()
        );

        factory.open(request).await.map_err(|e| match e {
            Error::ConnectionOpen { .. } => e,
            other => Error::connection_open(request.server_url(), other),
        })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        f.debug_struct("BackendRegistry")
            .field("factories", &names)
            .field("fallback", &self.fallback.name())
            .finish()
    }
}
