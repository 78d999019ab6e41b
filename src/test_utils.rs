//! Shared test utilities for the bill splitter.
//!
//! This module provides common helper functions for setting up test databases
//! and building splits with sensible defaults.

use crate::{
    core::{
        money::Amount,
        split::{Person, Split},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Id given to the first person built by [`people`]; later people count up.
pub const FIRST_PERSON_ID: i64 = 10;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all storage tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds people from `(name, mrp)` pairs.
///
/// # Defaults
/// * ids: [`FIRST_PERSON_ID`], then 11, 12, ...
pub fn people(entries: &[(&str, f64)]) -> Vec<Person> {
    (FIRST_PERSON_ID..)
        .zip(entries)
        .map(|(id, (name, mrp))| Person::new(id, *name, *mrp))
        .collect()
}

/// Creates a test split with sensible defaults.
///
/// # Defaults
/// * `slug`: empty (not derived yet)
/// * `paid_by_id`: the first person, if any
/// * `total_bill`, `mrp_total`: empty
pub fn split_with(id: i64, name: &str, entries: &[(&str, f64)]) -> Split {
    let people = people(entries);
    Split {
        id,
        name: name.to_string(),
        paid_by_id: people.first().map(|p| p.id),
        people,
        ..Split::default()
    }
}

/// Creates a test split with the final bill filled in.
pub fn billed_split(id: i64, name: &str, entries: &[(&str, f64)], total_bill: f64) -> Split {
    Split {
        total_bill: Amount::new(total_bill),
        ..split_with(id, name, entries)
    }
}
