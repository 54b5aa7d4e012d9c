//! # Handler Registry
//!
//! Method name to handler mapping. Built once at startup, read-only after.

use crate::ports::CommandHandler;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors from building a registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A handler is already registered under this name.
    #[error("duplicate handler for method '{0}'")]
    DuplicateMethod(String),

    /// Method names must be non-empty.
    #[error("method name must not be empty")]
    EmptyMethodName,
}

/// Immutable method registry.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn get(&self, method: &str) -> Option<&Arc<dyn CommandHandler>> {
        self.handlers.get(method)
    }

    pub fn contains(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut methods: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        methods.sort_unstable();
        methods
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("methods", &self.methods())
            .finish()
    }
}

/// Builder rejecting duplicate method names.
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl HandlerRegistryBuilder {
    /// Register `handler` under `method`.
    pub fn register(
        mut self,
        method: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<Self, RegistryError> {
        let method = method.into();
        if method.is_empty() {
            return Err(RegistryError::EmptyMethodName);
        }
        if self.handlers.contains_key(&method) {
            return Err(RegistryError::DuplicateMethod(method));
        }
        self.handlers.insert(method, handler);
        Ok(self)
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}
