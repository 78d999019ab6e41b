//! Settlement derivation and the settled-state registry.
//!
//! Every split has exactly one payer, so the debts form a star: each other
//! person pays the payer their share directly. No netting happens here or
//! across splits.
//!
//! The registry records which transactions were marked paid. It is keyed by
//! `"{split_id}:{from}->{to}"` using display names, so two people sharing a name
//! in one split share a key and renaming a person detaches their old marks.
//! Keys are never pruned; entries for deleted splits or people stay behind.

use crate::core::{
    allocation::{FALLBACK_PERSON_NAME, person_shares},
    money::round2,
    split::Split,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name used for a payer whose name is blank.
pub const FALLBACK_PAYER_NAME: &str = "Payer";

/// Name used for a split whose name is blank.
pub const FALLBACK_SPLIT_NAME: &str = "Split";

/// A derived debt from one person to the split's payer. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Split the debt belongs to
    pub split_id: i64,
    /// Split display name
    pub split_name: String,
    /// Debtor's display name
    pub from: String,
    /// Payer's display name
    pub to: String,
    /// Amount owed, rounded to cents
    pub amount: f64,
}

/// Derives the debtor-to-payer transactions for one split.
///
/// Returns nothing unless a payer is set, the payer is still in the split and
/// the bill is positive. A dangling payer id is treated as "no payer".
#[must_use]
pub fn derive_transactions(split: &Split) -> Vec<Transaction> {
    let Some(payer_id) = split.paid_by_id else {
        return Vec::new();
    };
    if split.total_bill.value() <= 0.0 {
        return Vec::new();
    }

    let shares = person_shares(split.total_bill, split.mrp_total, &split.people);
    let Some(payer) = shares.iter().find(|p| p.id == payer_id) else {
        tracing::debug!(split_id = split.id, payer_id, "Payer not found in split");
        return Vec::new();
    };

    let to = display_name(&payer.name, FALLBACK_PAYER_NAME);
    let split_name = display_name(&split.name, FALLBACK_SPLIT_NAME);

    shares
        .iter()
        .filter(|p| p.id != payer_id)
        .map(|p| Transaction {
            split_id: split.id,
            split_name: split_name.clone(),
            from: display_name(&p.name, FALLBACK_PERSON_NAME),
            to: to.clone(),
            amount: round2(p.share),
        })
        .collect()
}

fn display_name(name: &str, fallback: &str) -> String {
    if name.is_empty() {
        fallback.to_string()
    } else {
        name.to_string()
    }
}

/// Identity of a transaction for settlement tracking.
#[must_use]
pub fn settlement_key(tx: &Transaction) -> String {
    format!("{}:{}->{}", tx.split_id, tx.from, tx.to)
}

/// Which transactions have been marked paid, shared by every view.
///
/// Serializes as the flat `{ "<key>": bool }` map the storage collaborator keeps.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettlementRegistry(BTreeMap<String, bool>);

impl SettlementRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the transaction has been marked paid. Unknown keys are unsettled.
    #[must_use]
    pub fn is_settled(&self, tx: &Transaction) -> bool {
        self.is_key_settled(&settlement_key(tx))
    }

    /// Raw lookup by key.
    #[must_use]
    pub fn is_key_settled(&self, key: &str) -> bool {
        self.0.get(key).copied().unwrap_or(false)
    }

    /// Flips the settled state of a transaction and returns the new state.
    ///
    /// The amount is not part of the key, so a mark survives later edits to
    /// the split's numbers.
    pub fn toggle(&mut self, tx: &Transaction) -> bool {
        let key = settlement_key(tx);
        let settled = !self.is_key_settled(&key);
        tracing::info!(key = %key, settled, "Toggled settlement");
        self.0.insert(key, settled);
        settled
    }

    /// Number of recorded keys, including stale ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key has ever been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over recorded keys and their state.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(key, settled)| (key.as_str(), *settled))
    }
}

impl FromIterator<(String, bool)> for SettlementRegistry {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{core::money::Amount, test_utils::*};
    use proptest::prelude::*;

    #[test]
    fn test_star_topology_to_payer() {
        let split = billed_split(7, "Dinner", &[("Asha", 100.0), ("Ravi", 200.0), ("Meera", 100.0)], 200.0);

        let txs = derive_transactions(&split);

        assert_eq!(txs.len(), 2);
        assert!(txs.iter().all(|tx| tx.to == "Asha" && tx.split_id == 7));
        assert_eq!(txs[0].from, "Ravi");
        assert_eq!(txs[0].amount, 100.0);
        assert_eq!(txs[1].from, "Meera");
        assert_eq!(txs[1].amount, 50.0);
        assert_eq!(txs[0].split_name, "Dinner");
    }

    #[test]
    fn test_zero_bill_yields_nothing() {
        let split = billed_split(1, "Lunch", &[("Asha", 100.0), ("Ravi", 200.0)], 0.0);
        assert!(derive_transactions(&split).is_empty());
    }

    #[test]
    fn test_no_payer_or_dangling_payer_yields_nothing() {
        let mut split = billed_split(1, "Lunch", &[("Asha", 100.0), ("Ravi", 200.0)], 90.0);

        split.paid_by_id = None;
        assert!(derive_transactions(&split).is_empty());

        split.paid_by_id = Some(12345);
        assert!(derive_transactions(&split).is_empty());
    }

    #[test]
    fn test_payer_removed_and_reassigned() {
        let mut split = billed_split(
            1,
            "Lunch",
            &[("Asha", 100.0), ("Ravi", 100.0), ("Meera", 100.0), ("Kiran", 100.0)],
            400.0,
        );
        assert_eq!(split.paid_by_id, Some(10));

        split.remove_person(10);

        let txs = derive_transactions(&split);
        assert_eq!(split.people.len(), 3);
        assert_eq!(txs.len(), 2);
        assert!(txs.iter().all(|tx| tx.to == "Ravi" && tx.from != "Ravi"));
    }

    #[test]
    fn test_blank_names_use_fallbacks() {
        let split = billed_split(1, "", &[("", 50.0), ("", 50.0)], 100.0);

        let txs = derive_transactions(&split);

        assert_eq!(txs[0].from, "Friend");
        assert_eq!(txs[0].to, "Payer");
        assert_eq!(txs[0].split_name, "Split");
    }

    #[test]
    fn test_derivation_uses_stored_mrp_total() {
        let mut split = billed_split(1, "Lunch", &[("Asha", 100.0), ("Ravi", 200.0)], 150.0);
        split.mrp_total = Amount::new(600.0);

        let txs = derive_transactions(&split);

        assert_eq!(txs[0].amount, 50.0);
    }

    #[test]
    fn test_settlement_key_format() {
        let tx = Transaction {
            split_id: 42,
            split_name: "Lunch".to_string(),
            from: "Ravi".to_string(),
            to: "Asha".to_string(),
            amount: 10.0,
        };
        assert_eq!(settlement_key(&tx), "42:Ravi->Asha");
    }

    #[test]
    fn test_toggle_flips_and_persists_shape() {
        let split = billed_split(3, "Lunch", &[("Asha", 100.0), ("Ravi", 200.0)], 90.0);
        let tx = derive_transactions(&split).remove(0);
        let mut registry = SettlementRegistry::new();

        assert!(!registry.is_settled(&tx));
        assert!(registry.toggle(&tx));
        assert!(registry.is_settled(&tx));

        let json = serde_json::to_string(&registry).unwrap();
        assert_eq!(json, r#"{"3:Ravi->Asha":true}"#);

        assert!(!registry.toggle(&tx));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_same_name_people_share_a_key() {
        let mut split = billed_split(3, "Lunch", &[("Asha", 100.0), ("Ravi", 100.0), ("Meera", 100.0)], 90.0);
        split.people[2].name = "Ravi".to_string();
        let txs = derive_transactions(&split);
        let mut registry = SettlementRegistry::new();

        registry.toggle(&txs[0]);

        assert!(registry.is_settled(&txs[1]));
    }

    #[test]
    fn test_stale_mark_survives_amount_change() {
        let mut split = billed_split(3, "Lunch", &[("Asha", 100.0), ("Ravi", 200.0)], 90.0);
        let mut registry = SettlementRegistry::new();
        registry.toggle(&derive_transactions(&split)[0]);

        split.total_bill = Amount::new(300.0);

        assert!(registry.is_settled(&derive_transactions(&split)[0]));
    }

    proptest! {
        #[test]
        fn prop_derivation_is_idempotent(
            mrps in prop::collection::vec(0.0f64..1_000.0, 1..8),
            bill in 0.0f64..5_000.0,
        ) {
            let entries: Vec<(String, f64)> = mrps
                .iter()
                .enumerate()
                .map(|(idx, mrp)| (format!("P{idx}"), *mrp))
                .collect();
            let borrowed: Vec<(&str, f64)> = entries.iter().map(|(n, m)| (n.as_str(), *m)).collect();
            let split = billed_split(1, "Prop", &borrowed, bill);

            prop_assert_eq!(derive_transactions(&split), derive_transactions(&split));
        }

        #[test]
        fn prop_double_toggle_restores_state(
            from in "[A-Za-z]{1,8}",
            to in "[A-Za-z]{1,8}",
            preset in any::<bool>(),
        ) {
            let tx = Transaction { split_id: 1, split_name: String::new(), from, to, amount: 1.0 };
            let mut registry: SettlementRegistry =
                std::iter::once((settlement_key(&tx), preset)).collect();

            registry.toggle(&tx);
            registry.toggle(&tx);

            prop_assert_eq!(registry.is_settled(&tx), preset);
        }
    }
}
