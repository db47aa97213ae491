//! MongoDB backend over the `restaurants` collection.
//!
//! Queries mirror the collection's established shape: documents are sorted
//! by `_id` ascending for deterministic pagination, partial updates go
//! through `$set`, and deletes are hard. The connection is established once
//! and verified with a `ping` command; the collection handle is shared by
//! all requests.

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use super::model::{Address, Grade, Restaurant, RestaurantPatch};
use super::StoreError;

const COLLECTION: &str = "restaurants";
const DEFAULT_DATABASE: &str = "restaurants";

/// Storage representation: same fields as [`Restaurant`] but with a real
/// `ObjectId` under `_id`.
#[derive(Debug, Serialize, Deserialize)]
struct RestaurantDoc {
    #[serde(rename = "_id")]
    id: ObjectId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    borough: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<Address>,
    #[serde(default)]
    grades: Vec<Grade>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restaurant_id: Option<String>,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl RestaurantDoc {
    fn from_record(id: ObjectId, record: &Restaurant) -> Self {
        Self {
            id,
            name: record.name.clone(),
            borough: record.borough.clone(),
            cuisine: record.cuisine.clone(),
            address: record.address.clone(),
            grades: record.grades.clone(),
            restaurant_id: record.restaurant_id.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<RestaurantDoc> for Restaurant {
    fn from(doc: RestaurantDoc) -> Self {
        Self {
            id: doc.id.to_hex(),
            name: doc.name,
            borough: doc.borough,
            cuisine: doc.cuisine,
            address: doc.address,
            grades: doc.grades,
            restaurant_id: doc.restaurant_id,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}

pub struct MongoBackend {
    uri: String,
    conn: OnceCell<Collection<RestaurantDoc>>,
}

impl MongoBackend {
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            conn: OnceCell::new(),
        }
    }

    /// Connects and pings once; concurrent first callers share the single
    /// in-flight attempt through the `OnceCell`.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        self.conn
            .get_or_try_init(|| async {
                let client = Client::with_uri_str(&self.uri).await?;
                let database = client
                    .default_database()
                    .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
                database.run_command(doc! { "ping": 1 }).await?;
                info!(database = %database.name(), "connected to MongoDB");
                Ok(database.collection::<RestaurantDoc>(COLLECTION))
            })
            .await
            .map(|_| ())
    }

    fn collection(&self) -> Result<&Collection<RestaurantDoc>, StoreError> {
        self.conn.get().ok_or(StoreError::NotReady)
    }

    pub(super) fn check_ready(&self) -> Result<(), StoreError> {
        self.collection().map(|_| ())
    }

    pub async fn insert(&self, id: ObjectId, record: &Restaurant) -> Result<(), StoreError> {
        let collection = self.collection()?;
        collection
            .insert_one(RestaurantDoc::from_record(id, record))
            .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        skip: u64,
        limit: i64,
        borough: Option<&str>,
    ) -> Result<Vec<Restaurant>, StoreError> {
        let collection = self.collection()?;
        let filter = match borough {
            Some(b) => doc! { "borough": b },
            None => Document::new(),
        };
        let mut cursor = collection
            .find(filter)
            .sort(doc! { "_id": 1 })
            .skip(skip)
            .limit(limit)
            .await?;

        let mut restaurants = Vec::new();
        while let Some(doc) = cursor.try_next().await? {
            restaurants.push(doc.into());
        }
        Ok(restaurants)
    }

    pub async fn get(&self, id: ObjectId) -> Result<Restaurant, StoreError> {
        let collection = self.collection()?;
        collection
            .find_one(doc! { "_id": id })
            .await?
            .map(Into::into)
            .ok_or(StoreError::NotFound)
    }

    pub async fn update(
        &self,
        id: ObjectId,
        patch: &RestaurantPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Restaurant, StoreError> {
        let collection = self.collection()?;
        let set = set_document(patch, updated_at)?;
        collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?
            .map(Into::into)
            .ok_or(StoreError::NotFound)
    }

    pub async fn delete(&self, id: ObjectId) -> Result<(), StoreError> {
        let collection = self.collection()?;
        collection
            .find_one_and_delete(doc! { "_id": id })
            .await?
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

fn set_document(
    patch: &RestaurantPatch,
    updated_at: DateTime<Utc>,
) -> Result<Document, StoreError> {
    let mut set = doc! { "updatedAt": to_bson(&updated_at)? };
    if let Some(name) = &patch.name {
        set.insert("name", name.clone());
    }
    if let Some(borough) = &patch.borough {
        set.insert("borough", borough.clone());
    }
    if let Some(cuisine) = &patch.cuisine {
        set.insert("cuisine", cuisine.clone());
    }
    if let Some(address) = &patch.address {
        set.insert("address", to_bson(address)?);
    }
    if let Some(grades) = &patch.grades {
        set.insert("grades", to_bson(grades)?);
    }
    if let Some(restaurant_id) = &patch.restaurant_id {
        set.insert("restaurant_id", restaurant_id.clone());
    }
    Ok(set)
}
