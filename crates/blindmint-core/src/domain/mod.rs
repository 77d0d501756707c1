//! # Domain Layer (Inner Hexagon)
//!
//! Pure protocol logic: addressing, record layouts, lifecycle transitions,
//! invariants and airdrop attestations.
//! NO I/O, NO async.

pub mod accounts;
pub mod addressing;
pub mod invariants;
pub mod lifecycle;
pub mod proof;
pub mod value_objects;

pub use accounts::*;
pub use addressing::*;
pub use invariants::*;
pub use lifecycle::*;
pub use proof::*;
pub use value_objects::*;
