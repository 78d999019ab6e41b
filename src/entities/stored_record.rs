//! Stored record entity - key/value blobs written by the storage layer.
//! One row holds the split collection, another the settlement registry.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored record database model - one JSON document per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stored_records")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Record key (e.g., `"smart-food-splitter-v2"`)
    #[sea_orm(unique)]
    pub key: String,
    /// JSON document
    pub value: String,
    /// When this record was last written
    pub updated_at: DateTime,
}

/// `StoredRecord` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
