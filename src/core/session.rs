//! Application state for one user session, plus import and export.
//!
//! The session owns the split collection and the settlement registry. Engine
//! functions are called with explicit state taken from here; nothing is global.

use crate::{
    core::{
        aggregate::{BalanceScope, BalanceView},
        allocation::{Allocation, allocate},
        collection::SplitCollection,
        settlement::{SettlementRegistry, Transaction},
        split::Split,
    },
    errors::Result,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Shape written by [`Session::export`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    splits: &'a [Split],
    selected_id: Option<i64>,
    settlements: &'a SettlementRegistry,
}

/// What an import actually replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Number of splits loaded, `None` when the `splits` key was skipped
    pub splits: Option<usize>,
    /// Whether the settlement registry was replaced
    pub settlements: bool,
}

/// Splits and settlement marks for one user.
#[derive(Clone, Debug, Default)]
pub struct Session {
    /// Saved splits and the current selection
    pub collection: SplitCollection,
    /// Which transactions have been marked paid
    pub settlements: SettlementRegistry,
}

impl Session {
    /// Creates a session from its parts.
    #[must_use]
    pub const fn new(collection: SplitCollection, settlements: SettlementRegistry) -> Self {
        Self {
            collection,
            settlements,
        }
    }

    /// Allocation for the selected split, if any.
    #[must_use]
    pub fn selected_allocation<P: AsRef<str>>(&self, palette: &[P]) -> Option<Allocation> {
        self.collection
            .selected()
            .map(|s| allocate(s.total_bill, s.mrp_total, &s.people, palette))
    }

    /// Balances for the requested scope with their settled state.
    #[must_use]
    pub fn balances(&self, scope: BalanceScope) -> BalanceView {
        BalanceView::build(
            scope,
            self.collection.splits(),
            self.collection.selected_id(),
            &self.settlements,
        )
    }

    /// Flips the settled mark of a transaction and returns the new state.
    pub fn toggle_settlement(&mut self, tx: &Transaction) -> bool {
        self.settlements.toggle(tx)
    }

    /// Exports `{ splits, selectedId, settlements }` verbatim.
    pub fn export(&self) -> Result<Value> {
        let document = ExportDocument {
            splits: self.collection.splits(),
            selected_id: self.collection.selected_id(),
            settlements: &self.settlements,
        };
        Ok(serde_json::to_value(document)?)
    }

    /// Exports as pretty-printed JSON text.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export()?)?)
    }

    /// Imports a previously exported document.
    ///
    /// When `splits` is an array it replaces the collection, deriving missing
    /// slugs against the imported list and selecting the imported `selectedId`
    /// when it names a split, else the first. A missing or non-array `splits`
    /// is skipped. `settlements`, when present, replaces the registry wholesale.
    /// Text that is not JSON, or a split that does not fit the split shape, is
    /// an error and nothing is applied.
    pub fn import_json(&mut self, text: &str) -> Result<ImportOutcome> {
        let document: Value = serde_json::from_str(text)?;

        let splits = match document.get("splits") {
            Some(Value::Array(items)) => Some(
                items
                    .iter()
                    .cloned()
                    .map(serde_json::from_value::<Split>)
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            ),
            Some(_) => {
                warn!("Import skipped `splits`: not an array");
                None
            }
            None => None,
        };
        let selected_id = document.get("selectedId").and_then(Value::as_i64);
        let settlements = match document.get("settlements") {
            Some(Value::Null) | None => None,
            Some(value) => Some(serde_json::from_value::<SettlementRegistry>(value.clone())?),
        };

        let outcome = ImportOutcome {
            splits: splits.as_ref().map(Vec::len),
            settlements: settlements.is_some(),
        };
        if let Some(splits) = splits {
            self.collection = SplitCollection::hydrate(splits, selected_id, None);
        }
        if let Some(settlements) = settlements {
            self.settlements = settlements;
        }

        info!(splits = ?outcome.splits, settlements = outcome.settlements, "Imported session");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        aggregate::{missing_payer_splits, overall_balances}, allocation::DEFAULT_PALETTE, collection::NewFriend,
        money::Amount,
    };

    fn sample_session() -> Session {
        let mut session = Session::default();
        let id = session
            .collection
            .create_split(
                "Dominos Lunch",
                &[NewFriend::new("Asha", 100.0), NewFriend::new("Ravi", 200.0)],
            )
            .unwrap();
        session.collection.set_total_bill(id, Amount::new(150.0)).unwrap();
        session.collection.set_mrp_total(id, Amount::new(300.0)).unwrap();
        session
    }

    #[test]
    fn test_selected_allocation_and_balances() {
        let session = sample_session();

        let allocation = session.selected_allocation(&DEFAULT_PALETTE).unwrap();
        assert_eq!(allocation.discount_pct, 50.0);

        let view = session.balances(BalanceScope::Current);
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].transaction.amount, 100.0);
        assert_eq!(view.outstanding, 100.0);
    }

    #[test]
    fn test_toggle_does_not_change_amounts() {
        let mut session = sample_session();
        let tx = overall_balances(session.collection.splits()).remove(0);

        assert!(session.toggle_settlement(&tx));

        let view = session.balances(BalanceScope::All);
        assert!(view.entries[0].settled);
        assert_eq!(view.entries[0].transaction.amount, 100.0);
        assert_eq!(view.settled, 100.0);
        assert_eq!(view.outstanding, 0.0);
    }

    #[test]
    fn test_export_shape() {
        let mut session = sample_session();
        let tx = overall_balances(session.collection.splits()).remove(0);
        session.toggle_settlement(&tx);

        let exported = session.export().unwrap();

        assert!(exported["splits"].is_array());
        assert_eq!(exported["splits"][0]["slug"], "dominos-lunch");
        assert_eq!(exported["splits"][0]["totalBill"], 150.0);
        assert_eq!(exported["splits"][0]["people"][1]["mrp"], 200.0);
        assert_eq!(exported["selectedId"], exported["splits"][0]["id"]);
        let key = format!("{}:Ravi->Asha", tx.split_id);
        assert_eq!(exported["settlements"][key.as_str()], true);
    }

    #[test]
    fn test_export_then_import_restores_session() {
        let original = sample_session();
        let text = original.export_json().unwrap();

        let mut restored = Session::default();
        let outcome = restored.import_json(&text).unwrap();

        assert_eq!(outcome.splits, Some(1));
        assert!(outcome.settlements);
        assert_eq!(restored.collection.splits(), original.collection.splits());
        assert_eq!(restored.collection.selected_id(), original.collection.selected_id());
    }

    #[test]
    fn test_import_derives_missing_slugs_against_imported_list() {
        let mut session = sample_session();
        let text = r#"{
            "splits": [
                {"id": 10, "name": "Team Dinner", "people": []},
                {"id": 11, "name": "team dinner", "slug": "team-dinner", "people": []}
            ],
            "selectedId": 11
        }"#;

        session.import_json(text).unwrap();

        let slugs: Vec<&str> = session.collection.splits().iter().map(|s| s.slug.as_str()).collect();
        assert_eq!(slugs, vec!["team-dinner-2", "team-dinner"]);
        assert_eq!(session.collection.selected_id(), Some(11));
    }

    #[test]
    fn test_import_keeps_null_payer_missing() {
        let mut session = Session::default();
        let text = r#"{
            "splits": [
                {"id": 1, "name": "Lunch", "people": [{"id": 2, "name": "Asha", "mrp": 10}],
                 "totalBill": 10, "paidById": null}
            ]
        }"#;

        session.import_json(text).unwrap();

        let splits = session.collection.splits();
        assert_eq!(splits[0].paid_by_id, None);
        assert_eq!(missing_payer_splits(splits).len(), 1);
        assert_eq!(session.balances(BalanceScope::All).missing_payer_split_ids, vec![1]);
    }

    #[test]
    fn test_import_max_id_then_create_is_rejected() {
        let mut session = Session::default();
        session
            .import_json(r#"{"splits":[{"id":9223372036854775807,"name":"X","people":[]}]}"#)
            .unwrap();

        let result = session.collection.create_split("Y", &[]);

        assert!(matches!(result, Err(crate::errors::Error::IdsExhausted)));
        assert_eq!(session.collection.len(), 1);
    }

    #[test]
    fn test_import_settlements_replace_registry() {
        let mut session = sample_session();
        let tx = overall_balances(session.collection.splits()).remove(0);
        session.toggle_settlement(&tx);

        let outcome = session
            .import_json(r#"{"settlements": {"1:A->B": true}}"#)
            .unwrap();

        assert_eq!(outcome.splits, None);
        assert!(!session.settlements.is_settled(&tx));
        assert!(session.settlements.is_key_settled("1:A->B"));
        assert_eq!(session.collection.len(), 1);
    }

    #[test]
    fn test_import_skips_non_array_splits() {
        let mut session = sample_session();

        let outcome = session.import_json(r#"{"splits": "nope"}"#).unwrap();

        assert_eq!(outcome, ImportOutcome::default());
        assert_eq!(session.collection.len(), 1);
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        let mut session = sample_session();

        assert!(session.import_json("{not json").is_err());
        assert_eq!(session.collection.len(), 1);
    }
}
