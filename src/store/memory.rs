//! In-process backend: an ordered map keyed by the 24-char hex id, so that
//! iteration order matches the MongoDB backend's `_id`-ascending sort.
//! Selected with a `memory://` URI; also what the test suites run against.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::model::{Restaurant, RestaurantPatch};
use super::StoreError;

#[derive(Debug, Default)]
pub struct MemoryBackend {
    ready: AtomicBool,
    data: RwLock<BTreeMap<String, Restaurant>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self) -> Result<(), StoreError> {
        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    pub(super) fn check_ready(&self) -> Result<(), StoreError> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotReady)
        }
    }

    pub async fn insert(&self, restaurant: Restaurant) -> Result<(), StoreError> {
        self.check_ready()?;
        self.data
            .write()
            .await
            .insert(restaurant.id.clone(), restaurant);
        Ok(())
    }

    pub async fn list(
        &self,
        skip: u64,
        limit: i64,
        borough: Option<&str>,
    ) -> Result<Vec<Restaurant>, StoreError> {
        self.check_ready()?;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let data = self.data.read().await;
        Ok(data
            .values()
            .filter(|r| borough.is_none_or(|b| r.borough.as_deref() == Some(b)))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    pub async fn get(&self, id: &str) -> Result<Restaurant, StoreError> {
        self.check_ready()?;
        let data = self.data.read().await;
        data.get(id).cloned().ok_or(StoreError::NotFound)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: &RestaurantPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Restaurant, StoreError> {
        self.check_ready()?;
        let mut data = self.data.write().await;
        let restaurant = data.get_mut(id).ok_or(StoreError::NotFound)?;
        patch.apply(restaurant);
        restaurant.updated_at = updated_at;
        Ok(restaurant.clone())
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check_ready()?;
        let mut data = self.data.write().await;
        data.remove(id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}
