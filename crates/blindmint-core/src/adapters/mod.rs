//! # Adapters Layer (Outer Hexagon)
//!
//! Implementations of the driven ports: an in-memory ledger, clocks, and
//! HTTP and canned metadata sources.

pub mod clock;
pub mod http_metadata;
pub mod memory_store;
pub mod static_metadata;

pub use clock::*;
pub use http_metadata::*;
pub use memory_store::*;
pub use static_metadata::*;
