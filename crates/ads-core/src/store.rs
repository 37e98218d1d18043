//! Remote template persistence boundary.
//!
//! The designer core never talks HTTP itself: the host wires in a
//! `TemplateStore` implementation. Operations are fire-once — no retry
//! policy lives at this seam; failures surface to the UI as a single
//! message.

use crate::model::Template;
use std::collections::HashMap;
use thiserror::Error;

/// Failures crossing the store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("template `{0}` not found")]
    NotFound(String),
    #[error("conflicting save for template `{0}`")]
    Conflict(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed template payload: {0}")]
    Decode(String),
}

/// Remote persistence operations. Templates are fetched and saved
/// wholesale; there is no partial update.
pub trait TemplateStore {
    fn fetch(&self, id: &str) -> Result<Template, StoreError>;

    /// Save a template. `None` creates a new record; the stored id is
    /// returned either way.
    fn save(&mut self, id: Option<&str>, template: &Template) -> Result<String, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and local drafts.
#[derive(Debug, Default)]
pub struct MemStore {
    records: HashMap<String, Template>,
    next_id: u64,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TemplateStore for MemStore {
    fn fetch(&self, id: &str) -> Result<Template, StoreError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn save(&mut self, id: Option<&str>, template: &Template) -> Result<String, StoreError> {
        let id = match id {
            Some(existing) => {
                if !self.records.contains_key(existing) {
                    return Err(StoreError::NotFound(existing.to_string()));
                }
                existing.to_string()
            }
            None => {
                self.next_id += 1;
                format!("tpl_{}", self.next_id)
            }
        };
        self.records.insert(id.clone(), template.clone());
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.records
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}
