//! MatcherBuilder for constructing an immutable Matcher.

use crate::{Matcher, RegistryError, RegistryResult, Role};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;

/// Collects handler registrations, rejecting duplicates as they arrive.
pub struct MatcherBuilder<H: ?Sized> {
    handlers: IndexMap<(String, Role), Arc<H>>,
}

impl<H: ?Sized> Default for MatcherBuilder<H> {
    fn default() -> Self {
        Self {
            handlers: IndexMap::new(),
        }
    }
}

impl<H: ?Sized> MatcherBuilder<H> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `(path, role)`.
    pub fn register(
        &mut self,
        path: impl Into<String>,
        role: Role,
        handler: Arc<H>,
    ) -> RegistryResult<&mut Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(RegistryError::EmptyPath);
        }
        let key = (path, role);
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::duplicate_handler(key.0, role));
        }
        trace!(path = %key.0, %role, "registered handler");
        self.handlers.insert(key, handler);
        Ok(self)
    }

    /// Register one handler for several roles of the same kind.
    pub fn register_roles(
        &mut self,
        path: impl Into<String>,
        roles: &[Role],
        handler: Arc<H>,
    ) -> RegistryResult<&mut Self> {
        let path = path.into();
        for role in roles {
            self.register(path.clone(), *role, handler.clone())?;
        }
        Ok(self)
    }

    /// Returns true if `(path, role)` already has a handler.
    pub fn is_registered(&self, path: &str, role: Role) -> bool {
        self.handlers.contains_key(&(path.to_string(), role))
    }

    /// Freeze the registrations.
    pub fn build(self) -> Matcher<H> {
        Matcher::from_handlers(self.handlers)
    }
}
