//! # BlindMint Core
//!
//! Blind-then-reveal collectible issuance. A collection sells placeholder
//! tokens inside a sale window; once a buyer's final artwork is assigned
//! off-chain, the placeholder is swapped for a revealed collectible.
//!
//! ## Components
//!
//! | Component | Responsibility | Location |
//! |-----------|----------------|----------|
//! | Addressing Engine | Deterministic off-curve record addresses | `domain/addressing.rs` |
//! | Protocol/Admin Registry | Protocol singleton, lock flag, admins | `service/registry.rs` |
//! | Collection Manager | Sale windows, supply, price | `service/collections.rs` |
//! | Placeholder Issuer | Mint, sell, airdrop, burn | `service/placeholders.rs` |
//! | Reveal & Swap Engine | Create collectibles, swap placeholders | `service/reveal.rs` |
//!
//! ## Per-id Lifecycle
//!
//! ```text
//! Minted ──buy/airdrop──→ Sold ──transfer_nft──→ Swapped
//!                           │
//!                           └──burn_placeholder──→ Burned
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `mint_count ≤ max_supply` | `domain/invariants.rs` - `check_supply_invariant()` |
//! | `total_supply ≤ mint_count` | `domain/invariants.rs` - `check_reveal_invariant()` |
//! | `sale_start_time ≤ sale_end_time` | `domain/invariants.rs` - `check_window_invariant()` |
//! | Settled placeholder has a burned token | `domain/invariants.rs` - `check_settlement_invariant()` |
//! | One outcome per operation | `service/unit_of_work.rs` - version-guarded change sets |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OUTER LAYER                                │
//! │  adapters/ - in-memory ledger, clocks, metadata sources         │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/inbound.rs  - MintProtocolApi, CollectionQueries, Reveal │
//! │  ports/outbound.rs - AccountStore, Clock, MetadataSource        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/addressing.rs   - program-derived addresses             │
//! │  domain/accounts.rs     - record layouts and codecs             │
//! │  domain/lifecycle.rs    - placeholder/collectible state         │
//! │  domain/invariants.rs   - collection invariants                 │
//! │  domain/proof.rs        - airdrop attestations                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (service, clock) = create_test_service(1_700_000_000);
//! service.initialize_protocol(&authority)?;
//! service.add_admin(&authority, "root", &admin)?;
//! service.create_collection(&admin, params)?;
//! service.create_placeholder(&admin, &owner, 0, "https://meta.example/blind.json")?;
//! service.buy_placeholder(&buyer, &owner, 0)?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

pub use adapters::*;
pub use config::{ConfigError, MetadataConfig, MintConfig, RentSchedule};
pub use domain::*;
pub use errors::*;
pub use events::{MintEvent, Receipt};
pub use ports::*;
pub use service::{create_test_service, MintService, RevealCoordinator, ServiceStats, UnitOfWork};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
