//! ModelRegistry for mapping model ids to their descriptors.

use crate::domain::model::{CapabilityAdapter, ModelDescriptor};
use crate::domain::outcome::ValidationOutcome;
use crate::error::{EngineError, Result};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A registry that maps model ids to their descriptors.
///
/// Safe to share behind an `Arc`: lookups take the shared lock, registration
/// and removal take the exclusive lock. Everything handed out is a copy, so
/// callers never iterate while the lock is held.
pub struct ModelRegistry {
    models: RwLock<HashMap<String, ModelDescriptor>>,
}

impl ModelRegistry {
    /// Creates a new empty ModelRegistry.
    pub fn new() -> Self {
        Self {
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Registers (or replaces) a descriptor under its id.
    pub async fn register(&self, descriptor: ModelDescriptor) -> Result<()> {
        if descriptor.id.trim().is_empty() {
            return Err(EngineError::InvalidDescriptor(
                "model identifier must not be empty".to_string(),
            ));
        }

        let id = descriptor.id.clone();
        let replaced = self
            .models
            .write()
            .await
            .insert(id.clone(), descriptor)
            .is_some();
        tracing::info!(model = %id, replaced, "registered model");
        Ok(())
    }

    pub async fn unregister(&self, id: &str) -> Result<()> {
        match self.models.write().await.remove(id) {
            Some(_) => {
                tracing::info!(model = %id, "unregistered model");
                Ok(())
            }
            None => Err(EngineError::ModelNotFound(id.to_string())),
        }
    }

    /// Retrieves a copy of the descriptor registered under `id`.
    pub async fn get(&self, id: &str) -> Result<ModelDescriptor> {
        self.models
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::ModelNotFound(id.to_string()))
    }

    pub async fn is_registered(&self, id: &str) -> bool {
        self.models.read().await.contains_key(id)
    }

    /// Returns all registered ids, sorted.
    pub async fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.models.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns copies of all descriptors, sorted by id.
    pub async fn get_all(&self) -> Vec<ModelDescriptor> {
        let mut all: Vec<ModelDescriptor> = self.models.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub async fn len(&self) -> usize {
        self.models.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.models.read().await.is_empty()
    }

    /// Validates `payload` with the validator registered under `id`.
    ///
    /// The lock is released before the validator runs.
    pub async fn validate(&self, id: &str, payload: &JsonValue) -> Result<ValidationOutcome> {
        let descriptor = self.get(id).await?;
        Ok(CapabilityAdapter::invoke(&descriptor, payload))
    }

    /// Zero-value instance of the shape registered under `id`.
    pub async fn create_instance(&self, id: &str) -> Result<JsonValue> {
        self.models
            .read()
            .await
            .get(id)
            .map(|d| d.shape.create_instance())
            .ok_or_else(|| EngineError::ModelNotFound(id.to_string()))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
