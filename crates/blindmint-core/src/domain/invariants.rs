//! # Domain Invariants
//!
//! Checked on every record a unit of work is about to write, so a bug in an
//! operation surfaces as `InvariantViolation` instead of corrupt state.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | `mint_count ≤ max_supply` | [`check_supply_invariant`] |
//! | `sale_start_time ≤ sale_end_time` | [`check_window_invariant`] |
//! | `total_supply ≤ mint_count` | [`check_reveal_invariant`] |
//! | `sold_count ≤ mint_count` | [`check_sold_invariant`] |
//! | settled placeholder ⇔ burned token | [`check_settlement_invariant`] |

use crate::domain::accounts::{Collection, Placeholder, TokenMint};
use crate::errors::MintError;

#[must_use]
pub fn check_supply_invariant(collection: &Collection) -> bool {
    collection.mint_count <= collection.max_supply
}

#[must_use]
pub fn check_window_invariant(collection: &Collection) -> bool {
    collection.sale_start_time <= collection.sale_end_time
}

#[must_use]
pub fn check_reveal_invariant(collection: &Collection) -> bool {
    collection.total_supply <= collection.mint_count
}

#[must_use]
pub fn check_sold_invariant(collection: &Collection) -> bool {
    collection.sold_count <= collection.mint_count
}

/// A terminal placeholder has a burned token; a live one has supply 1.
#[must_use]
pub fn check_settlement_invariant(placeholder: &Placeholder, token: &TokenMint) -> bool {
    if placeholder.status.is_terminal() {
        token.supply == 0
    } else {
        token.supply == 1
    }
}

/// Runs every collection check.
pub fn check_collection(collection: &Collection) -> Result<(), MintError> {
    let checks: [(bool, &str); 4] = [
        (check_supply_invariant(collection), "mint_count exceeds max_supply"),
        (check_window_invariant(collection), "sale window is inverted"),
        (check_reveal_invariant(collection), "total_supply exceeds mint_count"),
        (check_sold_invariant(collection), "sold_count exceeds mint_count"),
    ];
    match checks.iter().find(|(ok, _)| !ok) {
        Some((_, what)) => Err(MintError::InvariantViolation((*what).to_string())),
        None => Ok(()),
    }
}
