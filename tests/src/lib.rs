//! # BlindMint Test Suite
//!
//! Workspace-level scenarios driven through the public API only.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs      # Shared fixture: funded admin, owner, buyers
//!     ├── lifecycle.rs    # Mint → buy → reveal → swap end to end
//!     ├── concurrency.rs  # Racing submissions against the same id
//!     └── reveal.rs       # Off-chain metadata resolution
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p blindmint-tests
//! cargo test -p blindmint-tests integration::concurrency::
//! ```

pub mod integration;
