//! Entity module - SeaORM entity definitions for persisted records.

pub mod stored_record;

pub use stored_record::{
    Column as StoredRecordColumn, Entity as StoredRecord, Model as StoredRecordModel,
};
