//! Balances across one split or the whole collection.
//!
//! Per-split transactions are concatenated in collection order; a debt in one
//! split is never netted against an opposite debt in another. The settlement
//! registry only decides the "completed" flag on each entry and never changes
//! an amount.

use crate::core::{
    money::round2,
    settlement::{SettlementRegistry, Transaction, derive_transactions, settlement_key},
    split::Split,
};
use serde::Serialize;
use std::collections::HashSet;

/// Which balances a view is showing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum BalanceScope {
    /// Only the selected split
    #[default]
    Current,
    /// Every split in the collection
    All,
}

/// Balances for the selected split. No split selected means no balances.
#[must_use]
pub fn current_balances(split: Option<&Split>) -> Vec<Transaction> {
    split.map(derive_transactions).unwrap_or_default()
}

/// Balances for every split, concatenated in collection order.
#[must_use]
pub fn overall_balances(splits: &[Split]) -> Vec<Transaction> {
    splits.iter().flat_map(derive_transactions).collect()
}

/// Splits that cannot contribute balances yet because they have no payer or
/// no people.
#[must_use]
pub fn missing_payer_splits(splits: &[Split]) -> Vec<&Split> {
    splits
        .iter()
        .filter(|s| s.paid_by_id.is_none() || s.people.is_empty())
        .collect()
}

/// Distinct non-empty person names across all splits, in first-seen order.
#[must_use]
pub fn unique_friend_names(splits: &[Split]) -> Vec<String> {
    let mut seen = HashSet::new();
    splits
        .iter()
        .flat_map(|s| s.people.iter())
        .filter(|p| !p.name.is_empty())
        .filter(|p| seen.insert(p.name.clone()))
        .map(|p| p.name.clone())
        .collect()
}

/// A transaction paired with its settlement state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceEntry {
    /// Registry key for the transaction
    pub key: String,
    /// The derived debt
    pub transaction: Transaction,
    /// Whether it has been marked paid
    pub settled: bool,
}

/// Everything a balances view renders.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceView {
    /// Which balances are shown
    pub scope: BalanceScope,
    /// Entries in derivation order
    pub entries: Vec<BalanceEntry>,
    /// Sum of amounts not yet marked paid
    pub outstanding: f64,
    /// Sum of amounts marked paid
    pub settled: f64,
    /// Splits skipped for lack of a payer or people; only filled for [`BalanceScope::All`]
    pub missing_payer_split_ids: Vec<i64>,
}

impl BalanceView {
    /// Builds the view for the given scope.
    #[must_use]
    pub fn build(
        scope: BalanceScope,
        splits: &[Split],
        selected_id: Option<i64>,
        registry: &SettlementRegistry,
    ) -> Self {
        let transactions = match scope {
            BalanceScope::Current => {
                current_balances(selected_id.and_then(|id| splits.iter().find(|s| s.id == id)))
            }
            BalanceScope::All => overall_balances(splits),
        };

        let entries: Vec<BalanceEntry> = transactions
            .into_iter()
            .map(|transaction| {
                let key = settlement_key(&transaction);
                let settled = registry.is_key_settled(&key);
                BalanceEntry {
                    key,
                    transaction,
                    settled,
                }
            })
            .collect();

        let (settled, outstanding) = entries.iter().fold((0.0, 0.0), |(settled, outstanding), e| {
            if e.settled {
                (settled + e.transaction.amount, outstanding)
            } else {
                (settled, outstanding + e.transaction.amount)
            }
        });

        let missing_payer_split_ids = match scope {
            BalanceScope::Current => Vec::new(),
            BalanceScope::All => missing_payer_splits(splits).iter().map(|s| s.id).collect(),
        };
        if !missing_payer_split_ids.is_empty() {
            tracing::warn!(
                count = missing_payer_split_ids.len(),
                "Some splits are missing a payer and contribute no balances"
            );
        }

        Self {
            scope,
            outstanding: round2(outstanding),
            settled: round2(settled),
            entries,
            missing_payer_split_ids,
        }
    }

    /// Whether there is nothing to settle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
