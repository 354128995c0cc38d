//! Growth-diary aggregate store: registered plants and their dated entries.
//!
//! Owns the in-memory plant collection for the process lifetime and is the
//! sole writer to the storage blob. Every mutation is read-modify-persist
//! under the write lock, so mutations are serialized; persistence is a single
//! atomic blob write by the storage adapter. A crash between the memory
//! mutation and the write loses that one mutation only.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::{DiaryEntry, DomainError, Plant, check_species_match};
use crate::ports::StoragePort;

pub struct DiaryService {
    storage: Arc<dyn StoragePort>,
    plants: RwLock<Vec<Plant>>,
}

impl DiaryService {
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        Self {
            storage,
            plants: RwLock::new(Vec::new()),
        }
    }

    /// Load the plant collection from storage. An absent or unreadable blob
    /// yields an empty diary: corruption is swallowed (logged), never
    /// surfaced to the user.
    pub async fn load(&self) -> Result<(), DomainError> {
        let plants = match self.storage.read().await? {
            Some(blob) => match serde_json::from_str::<Vec<Plant>>(&blob) {
                Ok(plants) => plants,
                Err(e) => {
                    warn!(error = %e, "stored diary is unreadable, starting with an empty diary");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        info!(plants = plants.len(), "diary loaded");
        *self.plants.write().await = plants;
        Ok(())
    }

    /// Snapshot of all registered plants.
    pub async fn plants(&self) -> Vec<Plant> {
        self.plants.read().await.clone()
    }

    pub async fn get(&self, plant_id: &str) -> Option<Plant> {
        self.plants
            .read()
            .await
            .iter()
            .find(|p| p.id == plant_id)
            .cloned()
    }

    /// Register a new plant from its first diary entry. The plant's display
    /// name is fixed to the entry's identified species.
    pub async fn create_plant(&self, initial_entry: DiaryEntry) -> Result<Plant, DomainError> {
        let plant = Plant::register(initial_entry);
        let mut plants = self.plants.write().await;
        plants.push(plant.clone());
        self.persist(&plants).await?;
        info!(plant_id = %plant.id, name = %plant.name, "plant registered");
        Ok(plant)
    }

    /// Append a diary entry to an existing plant. The species guard runs
    /// first; a rejected append leaves the plant's entries untouched.
    pub async fn append_entry(&self, plant_id: &str, entry: DiaryEntry) -> Result<(), DomainError> {
        let mut plants = self.plants.write().await;
        let plant = plants
            .iter_mut()
            .find(|p| p.id == plant_id)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown plant: {plant_id}")))?;

        check_species_match(&plant.name, &entry.analysis)?;

        plant.entries.push(entry);
        info!(plant_id, entries = plant.entries.len(), "diary entry appended");
        self.persist(&plants).await
    }

    /// Wholesale replace a plant's entry collection (used for deleting a
    /// single entry). The plant record itself persists even at zero entries.
    pub async fn update_entries(
        &self,
        plant_id: &str,
        new_entries: Vec<DiaryEntry>,
    ) -> Result<(), DomainError> {
        let mut plants = self.plants.write().await;
        let plant = plants
            .iter_mut()
            .find(|p| p.id == plant_id)
            .ok_or_else(|| DomainError::InvalidInput(format!("unknown plant: {plant_id}")))?;
        plant.entries = new_entries;
        info!(plant_id, entries = plant.entries.len(), "diary entries replaced");
        self.persist(&plants).await
    }

    /// Remove a plant and all of its entries.
    pub async fn delete_plant(&self, plant_id: &str) -> Result<(), DomainError> {
        let mut plants = self.plants.write().await;
        let before = plants.len();
        plants.retain(|p| p.id != plant_id);
        if plants.len() == before {
            return Err(DomainError::InvalidInput(format!(
                "unknown plant: {plant_id}"
            )));
        }
        info!(plant_id, "plant deleted");
        self.persist(&plants).await
    }

    async fn persist(&self, plants: &[Plant]) -> Result<(), DomainError> {
        let blob = serde_json::to_string_pretty(plants)
            .map_err(|e| DomainError::Storage(format!("serialize diary: {e}")))?;
        self.storage.write(&blob).await
    }
}
