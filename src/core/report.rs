//! Plain-text rendering of allocations and balances.
//!
//! Numbers are printed with two decimals and no currency symbol; locale-aware
//! formatting is left to whoever displays the text.

use crate::core::{
    aggregate::{BalanceEntry, BalanceView},
    allocation::{Allocation, FALLBACK_PERSON_NAME, Net, bar_pct},
    split::Split,
};

/// Formats an amount with two decimals.
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Generates a progress bar string for visual representation.
///
/// Creates a text-based progress bar like: `[████████░░] 80.0%`
#[must_use]
pub fn format_progress_bar(progress_percent: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let clamped_progress = progress_percent.clamp(0.0, 100.0);

    // clamped_progress is in [0, 100] and length is small, so the result fits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let filled = ((clamped_progress / 100.0) * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    let filled_str = "█".repeat(filled);
    let empty_str = "░".repeat(empty);

    format!("[{filled_str}{empty_str}] {progress_percent:.1}%")
}

/// One balance line, e.g. `[ ] Ravi -> Asha: 50.00 (Lunch)`.
#[must_use]
pub fn format_balance_line(entry: &BalanceEntry) -> String {
    let mark = if entry.settled { "x" } else { " " };
    let tx = &entry.transaction;
    format!(
        "[{mark}] {} -> {}: {} ({})",
        tx.from,
        tx.to,
        format_amount(tx.amount),
        tx.split_name
    )
}

/// Renders a balances view with its outstanding and settled totals.
#[must_use]
pub fn format_balances(view: &BalanceView) -> String {
    if view.is_empty() {
        return "No balances to settle.".to_string();
    }

    let mut lines: Vec<String> = view.entries.iter().map(format_balance_line).collect();
    lines.push(format!(
        "Outstanding: {} | Settled: {}",
        format_amount(view.outstanding),
        format_amount(view.settled)
    ));
    lines.join("\n")
}

/// Renders one split: totals, discount and each person's share with a bar.
#[must_use]
pub fn format_split_summary(split: &Split, allocation: &Allocation) -> String {
    let mut lines = vec![
        format!("{} ({})", split.name, split.slug),
        format!(
            "Bill: {} | MRP: {} | Discount: {:.1}% | Saved: {}",
            format_amount(allocation.total_bill),
            format_amount(allocation.mrp_total),
            allocation.discount_pct,
            format_amount(allocation.saved_amount)
        ),
    ];

    lines.extend(allocation.per_person.iter().map(|person| {
        let name = if person.name.is_empty() {
            FALLBACK_PERSON_NAME
        } else {
            person.name.as_str()
        };
        let net = match allocation.net_for(person.id, split.paid_by_id) {
            Some(Net::Gets(amount)) => format!(" | gets {}", format_amount(amount)),
            Some(Net::Owes(amount)) => format!(" | owes {}", format_amount(amount)),
            None => String::new(),
        };
        format!(
            "  {name}: {} {}{net}",
            format_amount(person.share),
            format_progress_bar(bar_pct(person.share, allocation.total_bill), None)
        )
    }));

    lines.push(format!("Split total: {}", format_amount(allocation.split_total)));
    lines.join("\n")
}
