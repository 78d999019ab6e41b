//! Split and person records.
//!
//! A [`Split`] is one saved bill-sharing session. Its serialized form is the
//! record a storage collaborator persists, so field names follow the stored
//! camelCase shape. Derived values (shares, transactions) are never stored here.

use crate::{
    core::money::Amount,
    errors::{Error, Result},
};
use serde::{Deserialize, Serialize};

/// One person taking part in a split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Unique within the owning split
    pub id: i64,
    /// Display name; may be empty while being edited
    #[serde(default)]
    pub name: String,
    /// Pre-discount portion of the order
    #[serde(default)]
    pub mrp: Amount,
}

impl Person {
    /// Creates a person record.
    #[must_use]
    pub fn new(id: i64, name: impl Into<String>, mrp: impl Into<Amount>) -> Self {
        Self {
            id,
            name: name.into(),
            mrp: mrp.into(),
        }
    }

    /// Case-insensitive, whitespace-insensitive name comparison.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

/// A saved bill-sharing session.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Split {
    /// Unique across all splits
    pub id: i64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// URL-safe identifier, unique across all splits; empty means "not derived yet"
    #[serde(default)]
    pub slug: String,
    /// People in entry order
    #[serde(default)]
    pub people: Vec<Person>,
    /// Final discounted bill actually paid
    #[serde(default)]
    pub total_bill: Amount,
    /// Pre-discount total of the order, if entered
    #[serde(default)]
    pub mrp_total: Amount,
    /// Person who paid the bill
    #[serde(default)]
    pub paid_by_id: Option<i64>,
}

impl Split {
    /// Looks up a person by id.
    #[must_use]
    pub fn person(&self, id: i64) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    /// The payer, if one is set and still a member of the split.
    #[must_use]
    pub fn payer(&self) -> Option<&Person> {
        self.paid_by_id.and_then(|id| self.person(id))
    }

    /// Whether a person with this name (case-insensitive) already exists.
    #[must_use]
    pub fn has_person_named(&self, name: &str) -> bool {
        self.people.iter().any(|p| p.has_name(name))
    }

    /// Appends a person. A blank name is replaced with `"Person N"`.
    ///
    /// Fails with [`Error::DuplicatePersonName`] when the resulting name already
    /// exists in this split. The first person added to an empty split becomes
    /// the payer.
    pub fn add_person(&mut self, id: i64, name: &str, mrp: Amount) -> Result<&Person> {
        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            format!("Person {}", self.people.len() + 1)
        } else {
            trimmed.to_string()
        };

        if self.has_person_named(&name) {
            return Err(Error::DuplicatePersonName { name });
        }

        let was_empty = self.people.is_empty();
        self.people.push(Person { id, name, mrp });
        if was_empty {
            self.ensure_payer();
        }

        let index = self.people.len() - 1;
        Ok(&self.people[index])
    }

    /// Removes a person. Unknown ids are ignored.
    ///
    /// Removing the payer hands the role to the first remaining person, or clears
    /// it when nobody is left.
    pub fn remove_person(&mut self, id: i64) {
        let before = self.people.len();
        self.people.retain(|p| p.id != id);
        if self.people.len() < before && self.paid_by_id == Some(id) {
            self.paid_by_id = None;
            self.ensure_payer();
        }
    }

    /// Sets or clears the payer. The payer must be a member of the split.
    pub fn set_payer(&mut self, person_id: Option<i64>) -> Result<()> {
        if let Some(id) = person_id
            && self.person(id).is_none()
        {
            return Err(Error::PersonNotFound { id });
        }
        self.paid_by_id = person_id;
        Ok(())
    }

    /// Renames a person in place. Inline edits are free-form and skip the
    /// duplicate-name check.
    pub fn update_person_name(&mut self, person_id: i64, name: &str) -> Result<()> {
        let person = self.person_mut(person_id)?;
        person.name = name.to_string();
        Ok(())
    }

    /// Replaces a person's MRP portion.
    pub fn update_person_mrp(&mut self, person_id: i64, mrp: Amount) -> Result<()> {
        let person = self.person_mut(person_id)?;
        person.mrp = mrp;
        Ok(())
    }

    /// Assigns the first person as payer when no valid payer is set.
    pub fn ensure_payer(&mut self) {
        if self.payer().is_none() {
            self.paid_by_id = self.people.first().map(|p| p.id);
        }
    }

    /// Clears a payer id that no longer names a member. A cleared payer stays
    /// cleared.
    pub fn clear_dangling_payer(&mut self) {
        if self.paid_by_id.is_some() && self.payer().is_none() {
            self.paid_by_id = None;
        }
    }

    fn person_mut(&mut self, id: i64) -> Result<&mut Person> {
        self.people
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::PersonNotFound { id })
    }
}
