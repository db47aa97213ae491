//! Record store for the restaurant collection.
//!
//! The [`Store`] facade is the only component that issues queries. It owns
//! id generation and validation, timestamping, pagination clamping and the
//! required-field checks; the backends (MongoDB or the in-process map,
//! chosen by URI scheme) only persist. Every operation checks readiness and
//! returns [`StoreError::NotReady`] until [`Store::initialize`] has
//! completed successfully.

use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

pub mod memory;
pub mod model;
pub mod mongo;

use memory::MemoryBackend;
use model::{Grade, NewRestaurant, Restaurant, RestaurantPatch};
use mongo::MongoBackend;

#[derive(Debug, Error)]
pub enum StoreError {
    /// An operation ran before `initialize` completed. Programmer error,
    /// not an expected runtime outcome.
    #[error("record store has not been initialized")]
    NotReady,
    /// The targeted record does not exist (or the id was malformed).
    #[error("restaurant not found")]
    NotFound,
    /// A required field was missing or a constraint was broken.
    #[error("{0}")]
    Validation(String),
    /// The underlying connection or query layer failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<mongodb::bson::ser::Error> for StoreError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

enum Backend {
    Mongo(MongoBackend),
    Memory(MemoryBackend),
}

pub struct Store {
    backend: Backend,
}

impl Store {
    /// Builds a store for the given connection URI without touching the
    /// network; `memory://` selects the in-process backend, anything else
    /// is handed to the MongoDB driver.
    pub fn new(uri: &str) -> Self {
        let backend = if uri.starts_with("memory://") {
            Backend::Memory(MemoryBackend::new())
        } else {
            Backend::Mongo(MongoBackend::new(uri))
        };
        Self { backend }
    }

    /// One-shot connection setup. Concurrent callers coalesce into a single
    /// in-flight attempt; once it has succeeded this is a cheap no-op.
    /// Connection failure is reported, never raised as a panic.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Mongo(backend) => backend.initialize().await,
            Backend::Memory(backend) => backend.initialize(),
        }
    }

    // Readiness comes before any argument handling, so a store that was
    // never initialized reports `NotReady` rather than `NotFound` or a
    // validation failure.
    fn check_ready(&self) -> Result<(), StoreError> {
        match &self.backend {
            Backend::Mongo(backend) => backend.check_ready(),
            Backend::Memory(backend) => backend.check_ready(),
        }
    }

    /// Validates, assigns id and timestamps, persists, and returns the
    /// record as stored.
    pub async fn create(&self, input: NewRestaurant) -> Result<Restaurant, StoreError> {
        self.check_ready()?;
        let name = input
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| StoreError::Validation("name is required".to_string()))?;
        let grades = input.grades.unwrap_or_default();
        validate_grades(&grades)?;

        let id = ObjectId::new();
        let now = Utc::now();
        let restaurant = Restaurant {
            id: id.to_hex(),
            name,
            borough: input.borough,
            cuisine: input.cuisine,
            address: input.address,
            grades,
            restaurant_id: input.restaurant_id,
            created_at: now,
            updated_at: now,
        };
        match &self.backend {
            Backend::Mongo(backend) => backend.insert(id, &restaurant).await?,
            Backend::Memory(backend) => backend.insert(restaurant.clone()).await?,
        }
        Ok(restaurant)
    }

    /// Pages through the collection in id-ascending order. Non-positive
    /// `page`/`per_page` are clamped to 1; a blank borough means no filter.
    pub async fn list(
        &self,
        page: i64,
        per_page: i64,
        borough: Option<&str>,
    ) -> Result<Vec<Restaurant>, StoreError> {
        self.check_ready()?;
        let page = page.max(1);
        let per_page = per_page.max(1);
        let skip = (page - 1).saturating_mul(per_page) as u64;
        let borough = borough.map(str::trim).filter(|b| !b.is_empty());
        match &self.backend {
            Backend::Mongo(backend) => backend.list(skip, per_page, borough).await,
            Backend::Memory(backend) => backend.list(skip, per_page, borough).await,
        }
    }

    pub async fn get(&self, id: &str) -> Result<Restaurant, StoreError> {
        self.check_ready()?;
        let id = parse_id(id)?;
        match &self.backend {
            Backend::Mongo(backend) => backend.get(id).await,
            Backend::Memory(backend) => backend.get(&id.to_hex()).await,
        }
    }

    /// Field-by-field merge of the patch against the stored record;
    /// refreshes `updatedAt` and returns the post-update record.
    pub async fn update(
        &self,
        id: &str,
        patch: RestaurantPatch,
    ) -> Result<Restaurant, StoreError> {
        self.check_ready()?;
        let id = parse_id(id)?;
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(StoreError::Validation("name cannot be blank".to_string()));
            }
        }
        if let Some(grades) = &patch.grades {
            validate_grades(grades)?;
        }
        let now = Utc::now();
        match &self.backend {
            Backend::Mongo(backend) => backend.update(id, &patch, now).await,
            Backend::Memory(backend) => backend.update(&id.to_hex(), &patch, now).await,
        }
    }

    /// Hard delete. `Ok(())` only when a record was actually removed, so a
    /// repeated delete of the same id reports `NotFound`.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.check_ready()?;
        let id = parse_id(id)?;
        match &self.backend {
            Backend::Mongo(backend) => backend.delete(id).await,
            Backend::Memory(backend) => backend.delete(&id.to_hex()).await,
        }
    }
}

// Malformed ids are an expected miss, checked before any query runs.
fn parse_id(id: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(id).map_err(|_| StoreError::NotFound)
}

fn validate_grades(grades: &[Grade]) -> Result<(), StoreError> {
    for grade in grades {
        if let Some(score) = grade.score {
            if score < 0.0 {
                return Err(StoreError::Validation(
                    "grade score must be non-negative".to_string(),
                ));
            }
        }
    }
    Ok(())
}
