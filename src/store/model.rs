use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted restaurant record. `id` and the timestamps are assigned by
/// the store and are not client-settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borough: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub grades: Vec<Grade>,
    /// Legacy external identifier carried by the source dataset; opaque
    /// passthrough, distinct from `id`.
    #[serde(rename = "restaurant_id", skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    /// `(lat, lon)` pair.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coord: Option<[f64; 2]>,
}

/// One inspection entry. Insertion order of `Restaurant::grades` is
/// preserved; there is no uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Grade {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Creation payload. Everything is optional at the transport layer; the
/// store rejects a missing or blank `name`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRestaurant {
    pub name: Option<String>,
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub address: Option<Address>,
    pub grades: Option<Vec<Grade>>,
    pub restaurant_id: Option<String>,
}

/// Partial update: one optional slot per attribute. A present field
/// replaces the stored value wholesale, absent fields are left untouched.
/// Fields cannot be unset through a patch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub borough: Option<String>,
    pub cuisine: Option<String>,
    pub address: Option<Address>,
    pub grades: Option<Vec<Grade>>,
    pub restaurant_id: Option<String>,
}

impl RestaurantPatch {
    pub fn apply(&self, restaurant: &mut Restaurant) {
        if let Some(name) = &self.name {
            restaurant.name = name.clone();
        }
        if let Some(borough) = &self.borough {
            restaurant.borough = Some(borough.clone());
        }
        if let Some(cuisine) = &self.cuisine {
            restaurant.cuisine = Some(cuisine.clone());
        }
        if let Some(address) = &self.address {
            restaurant.address = Some(address.clone());
        }
        if let Some(grades) = &self.grades {
            restaurant.grades = grades.clone();
        }
        if let Some(restaurant_id) = &self.restaurant_id {
            restaurant.restaurant_id = Some(restaurant_id.clone());
        }
    }
}
