//! Allocation engine - proportional shares of a discounted bill.
//!
//! Each person's share of the final bill is proportional to their MRP portion.
//! The computation is pure and re-run from scratch on every edit; nothing here is
//! cached or persisted. Degenerate inputs (no MRP, zero bill) yield zero-valued
//! results rather than errors so a live form always has something to render.

use crate::core::{
    money::{Amount, round2},
    split::Person,
};
use serde::Serialize;

/// Chart colors assigned to slices by position.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#60a5fa", "#a78bfa", "#f472b6", "#34d399", "#f59e0b", "#f87171", "#22d3ee", "#c084fc",
];

/// Name shown for a person whose name is still blank.
pub const FALLBACK_PERSON_NAME: &str = "Friend";

/// A person's derived allocation. Never stored alongside [`Person`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PersonShare {
    /// Person id within the split
    pub id: i64,
    /// Display name as entered
    pub name: String,
    /// MRP portion as entered
    pub mrp: Amount,
    /// Fraction of the base MRP attributed to this person
    pub efficiency: f64,
    /// Portion of the final bill, rounded to cents
    pub share: f64,
}

/// A person's position relative to the payer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Net {
    /// Non-payer owes their share to the payer
    Owes(f64),
    /// Payer gets back the bill minus their own share
    Gets(f64),
}

/// One pie-chart slice.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieSlice {
    /// Person id the slice represents
    pub id: i64,
    /// Display name, [`FALLBACK_PERSON_NAME`] when blank
    pub name: String,
    /// Color picked from the palette by position
    pub color: String,
    /// Percentage of the whole chart
    pub pct: f64,
    /// Cumulative start percentage
    pub start_pct: f64,
    /// Cumulative end percentage
    pub end_pct: f64,
}

/// Everything the split view derives from its working values.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Allocation {
    /// Final bill, empty counted as zero
    pub total_bill: f64,
    /// Entered MRP total, empty counted as zero
    pub mrp_total: f64,
    /// Sum of the people's MRP portions
    pub mrp_entered_total: f64,
    /// MRP the efficiencies are measured against
    pub base_mrp: f64,
    /// Per-person results in `people` order
    pub per_person: Vec<PersonShare>,
    /// Sum of shares; may drift from the bill by rounding
    pub split_total: f64,
    /// Discount relative to the MRP total, in `[0, 100]`
    pub discount_pct: f64,
    /// How much the discount saved, never negative
    pub saved_amount: f64,
    /// Chart slices; empty when there is nothing to weigh
    pub pie_slices: Vec<PieSlice>,
}

impl Allocation {
    /// Net position of a person given the payer, `None` without a payer or for
    /// an unknown person.
    #[must_use]
    pub fn net_for(&self, person_id: i64, payer_id: Option<i64>) -> Option<Net> {
        let payer_id = payer_id?;
        let person = self.per_person.iter().find(|p| p.id == person_id)?;
        if person.id == payer_id {
            Some(Net::Gets(round2(self.total_bill - person.share)))
        } else {
            Some(Net::Owes(person.share))
        }
    }
}

/// The MRP every efficiency is measured against: the entered total when
/// positive, else the sum of the people's portions.
#[must_use]
pub fn base_mrp(mrp_total: Amount, people: &[Person]) -> f64 {
    let mrp_total = mrp_total.value();
    if mrp_total > 0.0 {
        mrp_total
    } else {
        mrp_entered_total(people)
    }
}

/// Sum of entered MRP portions, empty counted as zero.
#[must_use]
pub fn mrp_entered_total(people: &[Person]) -> f64 {
    people.iter().map(|p| p.mrp.value()).sum()
}

/// Per-person efficiency and share.
///
/// This is the part of the allocation settlement derivation relies on, so both
/// always agree on the amounts.
#[must_use]
pub fn person_shares(total_bill: Amount, mrp_total: Amount, people: &[Person]) -> Vec<PersonShare> {
    let total_bill = total_bill.value();
    let base = base_mrp(mrp_total, people);

    people
        .iter()
        .map(|person| {
            let efficiency = if base > 0.0 {
                person.mrp.value() / base
            } else {
                0.0
            };
            PersonShare {
                id: person.id,
                name: person.name.clone(),
                mrp: person.mrp,
                efficiency,
                share: round2(total_bill * efficiency),
            }
        })
        .collect()
}

/// Discount percentage, `0` unless both the bill and the MRP total are positive.
#[must_use]
pub fn discount_pct(total_bill: f64, mrp_total: f64) -> f64 {
    if mrp_total > 0.0 && total_bill > 0.0 {
        (1.0 - total_bill / mrp_total).max(0.0) * 100.0
    } else {
        0.0
    }
}

/// Width of a person's share bar relative to the bill, capped at 100.
#[must_use]
pub fn bar_pct(share: f64, total_bill: f64) -> f64 {
    if total_bill > 0.0 {
        (share / total_bill * 100.0).min(100.0)
    } else {
        0.0
    }
}

/// Computes the full allocation for one split's working values.
///
/// Colors are assigned by position, so removing an earlier person shifts the
/// colors of everyone after them. An empty palette falls back to
/// [`DEFAULT_PALETTE`].
#[must_use]
pub fn allocate<P: AsRef<str>>(
    total_bill: Amount,
    mrp_total: Amount,
    people: &[Person],
    palette: &[P],
) -> Allocation {
    let per_person = person_shares(total_bill, mrp_total, people);
    let total_bill = total_bill.value();
    let mrp_total = mrp_total.value();

    let split_total: f64 = per_person.iter().map(|p| p.share).sum();
    let pie_slices = pie_slices(&per_person, total_bill, palette);

    tracing::debug!(
        people = per_person.len(),
        total_bill,
        split_total,
        "Computed allocation"
    );

    Allocation {
        total_bill,
        mrp_total,
        mrp_entered_total: mrp_entered_total(people),
        base_mrp: base_mrp(Amount::new(mrp_total), people),
        per_person,
        split_total,
        discount_pct: discount_pct(total_bill, mrp_total),
        saved_amount: (mrp_total - total_bill).max(0.0),
        pie_slices,
    }
}

fn pie_slices<P: AsRef<str>>(
    per_person: &[PersonShare],
    total_bill: f64,
    palette: &[P],
) -> Vec<PieSlice> {
    let weight = |p: &PersonShare| {
        if total_bill > 0.0 {
            p.share
        } else {
            p.efficiency
        }
    };
    let total_weight: f64 = per_person.iter().map(weight).sum();
    if total_weight <= 0.0 {
        return Vec::new();
    }

    let mut cursor = 0.0;
    per_person
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            let pct = weight(p) / total_weight * 100.0;
            let start_pct = cursor;
            cursor += pct;
            PieSlice {
                id: p.id,
                name: if p.name.is_empty() {
                    FALLBACK_PERSON_NAME.to_string()
                } else {
                    p.name.clone()
                },
                color: palette_color(palette, idx).to_string(),
                pct,
                start_pct,
                end_pct: cursor,
            }
        })
        .collect()
}

fn palette_color<P: AsRef<str>>(palette: &[P], idx: usize) -> &str {
    if palette.is_empty() {
        DEFAULT_PALETTE[idx % DEFAULT_PALETTE.len()]
    } else {
        palette[idx % palette.len()].as_ref()
    }
}
