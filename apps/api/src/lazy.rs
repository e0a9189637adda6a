//! Lazily-initialized API client slots.
//!
//! Each vendor client (LLM, email, payment) lives in a `LazyClient<T>` owned by the
//! service registry. The secret it needs is read on first `get()`, never at startup,
//! so the service boots without every integration configured and handlers can ask
//! `is_configured()` before touching a client.
//!
//! First construction is serialized by a mutex; after that `get()` is a lock-free
//! `OnceLock` read.

use std::sync::{Arc, Mutex, OnceLock};

use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The required secret is missing. Nothing is cached; the next call re-checks.
    #[error("{client} client is not configured: environment variable '{var}' is not set")]
    NotConfigured {
        client: &'static str,
        var: &'static str,
    },

    #[error("Failed to construct {client} client: {message}")]
    Construction {
        client: &'static str,
        message: String,
    },
}

impl ClientError {
    pub fn construction(client: &'static str, err: impl std::fmt::Display) -> Self {
        ClientError::Construction {
            client,
            message: err.to_string(),
        }
    }
}

/// Where client secrets come from. Production reads the process environment;
/// tests supply an in-memory map.
pub trait SecretSource: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads secrets from the process environment. Empty values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl SecretSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

type Builder<T> = Box<dyn Fn(String) -> Result<T, ClientError> + Send + Sync>;

/// A get-or-create slot holding at most one client for the lifetime of its owner.
pub struct LazyClient<T> {
    name: &'static str,
    key_var: &'static str,
    source: Arc<dyn SecretSource>,
    build: Builder<T>,
    slot: OnceLock<T>,
    init_lock: Mutex<()>,
}

impl<T> LazyClient<T> {
    pub fn new<F>(
        name: &'static str,
        key_var: &'static str,
        source: Arc<dyn SecretSource>,
        build: F,
    ) -> Self
    where
        F: Fn(String) -> Result<T, ClientError> + Send + Sync + 'static,
    {
        Self {
            name,
            key_var,
            source,
            build: Box::new(build),
            slot: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// Returns the cached client, constructing it on first use.
    ///
    /// Once a client is cached the secret is never read again, so a key that is
    /// later changed or removed has no effect until the owner is rebuilt.
    pub fn get(&self) -> Result<&T, ClientError> {
        if let Some(client) = self.slot.get() {
            return Ok(client);
        }

        // A panicking builder leaves the slot empty, so a poisoned lock is safe to reuse.
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(client) = self.slot.get() {
            return Ok(client);
        }

        let secret = self.source.get(self.key_var).ok_or_else(|| {
            debug!(client = self.name, var = self.key_var, "Client secret missing");
            ClientError::NotConfigured {
                client: self.name,
                var: self.key_var,
            }
        })?;

        let client = (self.build)(secret)?;
        info!(client = self.name, "API client initialized");

        Ok(self.slot.get_or_init(|| client))
    }

    /// True iff the secret is present. Never constructs or caches a client.
    pub fn is_configured(&self) -> bool {
        self.source.get(self.key_var).is_some()
    }

    /// True once `get()` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn key_var(&self) -> &'static str {
        self.key_var
    }
}

impl<T> std::fmt::Debug for LazyClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyClient")
            .field("name", &self.name)
            .field("key_var", &self.key_var)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
