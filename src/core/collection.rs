//! Split collection manager - CRUD over the list of saved splits.
//!
//! Holds every split plus the id of the one being edited. Each mutation is
//! validated before anything changes, so a rejected call leaves the collection
//! exactly as it was. Slug uniqueness is re-established on every create and
//! rename.

use crate::{
    core::{
        money::Amount,
        slug::{ensure_slugs, resolve_selection, unique_slug},
        split::{Person, Split},
    },
    errors::{Error, Result},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// A friend row entered while creating a split.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewFriend {
    /// Name as typed; blank rows are dropped
    pub name: String,
    /// MRP portion as typed
    pub mrp: Amount,
}

impl NewFriend {
    /// Creates a friend row.
    #[must_use]
    pub fn new(name: impl Into<String>, mrp: impl Into<Amount>) -> Self {
        Self {
            name: name.into(),
            mrp: mrp.into(),
        }
    }
}

/// The persisted collection record: `{ splits, selectedId }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    /// Every saved split
    #[serde(default)]
    pub splits: Vec<Split>,
    /// Split being edited
    #[serde(default)]
    pub selected_id: Option<i64>,
}

/// Every saved split and the current selection.
#[derive(Clone, Debug, Default)]
pub struct SplitCollection {
    splits: Vec<Split>,
    selected_id: Option<i64>,
    last_issued_id: i64,
}

impl SplitCollection {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a collection from stored or imported splits.
    ///
    /// Missing slugs are derived and payer ids that no longer name a member are
    /// cleared; a stored `null` payer is kept so the split still shows as missing
    /// one. The selection is resolved from the inbound path segment, then the
    /// previous selection, then the first split.
    #[must_use]
    pub fn hydrate(mut splits: Vec<Split>, selected_id: Option<i64>, segment: Option<&str>) -> Self {
        ensure_slugs(&mut splits);
        for split in &mut splits {
            split.clear_dangling_payer();
        }

        let last_issued_id = splits
            .iter()
            .flat_map(|s| std::iter::once(s.id).chain(s.people.iter().map(|p| p.id)))
            .max()
            .unwrap_or(0);
        let selected_id = resolve_selection(&splits, segment, selected_id);

        Self {
            splits,
            selected_id,
            last_issued_id,
        }
    }

    /// The persisted record, with a selection that no longer exists nulled.
    #[must_use]
    pub fn to_record(&self) -> CollectionRecord {
        CollectionRecord {
            splits: self.splits.clone(),
            selected_id: self.selected().map(|s| s.id),
        }
    }

    /// All splits in collection order.
    #[must_use]
    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    /// Id of the split being edited.
    #[must_use]
    pub const fn selected_id(&self) -> Option<i64> {
        self.selected_id
    }

    /// The split being edited.
    #[must_use]
    pub fn selected(&self) -> Option<&Split> {
        self.selected_id.and_then(|id| self.get(id))
    }

    /// Looks up a split by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Split> {
        self.splits.iter().find(|s| s.id == id)
    }

    /// Number of saved splits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    /// Whether no split has been saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Issues a time-based id, strictly greater than every id issued or loaded so far.
    ///
    /// Fails with [`Error::IdsExhausted`] once an id of `i64::MAX` has been seen.
    pub fn next_id(&mut self) -> Result<i64> {
        let floor = self
            .last_issued_id
            .checked_add(1)
            .ok_or(Error::IdsExhausted)?;
        let id = Utc::now().timestamp_millis().max(floor);
        self.last_issued_id = id;
        Ok(id)
    }

    /// Creates a split and selects it.
    ///
    /// Blank friend rows are dropped. The whole creation is rejected when the
    /// name is blank or two friends share a name (case-insensitive). The first
    /// friend becomes the payer.
    pub fn create_split(&mut self, name: &str, friends: &[NewFriend]) -> Result<i64> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::BlankSplitName);
        }

        let cleaned: Vec<(&str, Amount)> = friends
            .iter()
            .map(|f| (f.name.trim(), f.mrp))
            .filter(|(name, _)| !name.is_empty())
            .collect();

        let mut seen = HashSet::new();
        if !cleaned.iter().all(|(name, _)| seen.insert(name.to_lowercase())) {
            return Err(Error::DuplicateFriendNames);
        }

        let id = self.next_id()?;
        let people = cleaned
            .into_iter()
            .map(|(friend, mrp)| Ok(Person::new(self.next_id()?, friend, mrp)))
            .collect::<Result<Vec<Person>>>()?;
        let split = Split {
            id,
            name: name.to_string(),
            slug: unique_slug(name, &self.splits, None),
            paid_by_id: people.first().map(|p| p.id),
            people,
            total_bill: Amount::EMPTY,
            mrp_total: Amount::EMPTY,
        };

        info!(split_id = id, slug = %split.slug, people = split.people.len(), "Created split");
        self.splits.push(split);
        self.selected_id = Some(id);
        Ok(id)
    }

    /// Selects a split for editing.
    pub fn select_split(&mut self, id: i64) -> Result<()> {
        if self.get(id).is_none() {
            return Err(Error::SplitNotFound { id });
        }
        self.selected_id = Some(id);
        Ok(())
    }

    /// Deletes a split. Deleting the selected split moves the selection to the
    /// first remaining split, or clears it. Settlement marks for the split are
    /// left in the registry.
    pub fn delete_split(&mut self, id: i64) {
        let before = self.splits.len();
        self.splits.retain(|s| s.id != id);
        if self.splits.len() == before {
            return;
        }

        if self.selected_id == Some(id) {
            self.selected_id = self.splits.first().map(|s| s.id);
        }
        info!(split_id = id, selected = ?self.selected_id, "Deleted split");
    }

    /// Renames a split and re-derives its slug, ignoring its own current slug.
    ///
    /// The name is stored as typed; a blank name slugs to `"split"`.
    pub fn rename_split(&mut self, id: i64, new_name: &str) -> Result<()> {
        let slug = unique_slug(new_name, &self.splits, Some(id));
        let split = self.split_mut(id)?;
        split.name = new_name.to_string();
        split.slug = slug;
        info!(split_id = id, slug = %split.slug, "Renamed split");
        Ok(())
    }

    /// Adds a person to a split and returns the new person's id.
    pub fn add_person(&mut self, split_id: i64, name: &str, mrp: Amount) -> Result<i64> {
        let split_index = self
            .splits
            .iter()
            .position(|s| s.id == split_id)
            .ok_or(Error::SplitNotFound { id: split_id })?;
        let person_id = self.next_id()?;
        let split = &mut self.splits[split_index];
        let person = split.add_person(person_id, name, mrp)?;
        info!(split_id, person_id, name = %person.name, "Added person");
        Ok(person_id)
    }

    /// Removes a person from a split, reassigning the payer if needed.
    pub fn remove_person(&mut self, split_id: i64, person_id: i64) -> Result<()> {
        let split = self.split_mut(split_id)?;
        split.remove_person(person_id);
        info!(split_id, person_id, payer = ?split.paid_by_id, "Removed person");
        Ok(())
    }

    /// Sets the final bill paid.
    pub fn set_total_bill(&mut self, split_id: i64, amount: Amount) -> Result<()> {
        self.split_mut(split_id)?.total_bill = amount;
        Ok(())
    }

    /// Sets the MRP total of the order.
    pub fn set_mrp_total(&mut self, split_id: i64, amount: Amount) -> Result<()> {
        self.split_mut(split_id)?.mrp_total = amount;
        Ok(())
    }

    /// Sets or clears the payer.
    pub fn set_payer(&mut self, split_id: i64, person_id: Option<i64>) -> Result<()> {
        self.split_mut(split_id)?.set_payer(person_id)
    }

    /// Edits a person's name inline.
    pub fn update_person_name(&mut self, split_id: i64, person_id: i64, name: &str) -> Result<()> {
        self.split_mut(split_id)?.update_person_name(person_id, name)
    }

    /// Edits a person's MRP portion inline.
    pub fn update_person_mrp(&mut self, split_id: i64, person_id: i64, mrp: Amount) -> Result<()> {
        self.split_mut(split_id)?.update_person_mrp(person_id, mrp)
    }

    fn split_mut(&mut self, id: i64) -> Result<&mut Split> {
        self.splits
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(Error::SplitNotFound { id })
    }
}
