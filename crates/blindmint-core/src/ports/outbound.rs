//! # Driven Ports (SPI - Outbound)
//!
//! What the protocol needs from its host:
//! - an account store with compare-and-swap commits (the ledger)
//! - the ledger clock
//! - the off-chain metadata service

use crate::domain::value_objects::{Address, Attribute, Lamports, UnixTimestamp};
use crate::errors::{MetadataError, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;

// =============================================================================
// ACCOUNT STORE
// =============================================================================

/// Balance and data held at one address. Wallets have empty data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredAccount {
    pub lamports: Lamports,
    pub data: Vec<u8>,
}

/// A stored account plus the store version of its last write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionedAccount {
    pub account: StoredAccount,
    pub version: u64,
}

/// Predicate for bulk reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AccountFilter {
    /// Data is exactly this many bytes.
    DataSize(usize),
    /// Data contains `bytes` starting at `offset`.
    Memcmp { offset: usize, bytes: Vec<u8> },
}

impl AccountFilter {
    #[must_use]
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::DataSize(len) => data.len() == *len,
            Self::Memcmp { offset, bytes } => data
                .get(*offset..offset.saturating_add(bytes.len()))
                .is_some_and(|window| window == bytes.as_slice()),
        }
    }
}

/// Writes of one unit of work, guarded by the versions it read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Version each read account had; `None` means it was absent.
    pub reads: BTreeMap<Address, Option<u64>>,
    /// New contents per address; `None` closes the account.
    pub writes: BTreeMap<Address, Option<StoredAccount>>,
}

impl ChangeSet {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

/// The ledger's account storage.
///
/// `commit` must apply every write or none, and only if every read version
/// still matches; otherwise it returns [`StoreError::Conflict`].
pub trait AccountStore: Send + Sync {
    fn get(&self, address: &Address) -> Result<Option<VersionedAccount>, StoreError>;

    /// Every account whose data passes all `filters`.
    fn scan(&self, filters: &[AccountFilter])
        -> Result<Vec<(Address, VersionedAccount)>, StoreError>;

    /// Applies `changes` atomically and returns the new store version.
    fn commit(&self, changes: ChangeSet) -> Result<u64, StoreError>;
}

// =============================================================================
// CLOCK
// =============================================================================

/// Ledger time. Operations never accept caller-supplied timestamps.
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> UnixTimestamp;
}

// =============================================================================
// METADATA SOURCE
// =============================================================================

/// Answer of `{base_url}/{mint_count}/{buyer}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataListing {
    pub metadata_url: String,
    pub attributes: Vec<Attribute>,
}

/// Answer of `metadata_url`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetadataDocument {
    pub name: String,
}

/// Read-only client of the off-chain metadata service.
///
/// Only a 200 answer with the expected JSON counts as success.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn fetch_listing(
        &self,
        base_url: &str,
        mint_count: u64,
        buyer: &Address,
    ) -> Result<MetadataListing, MetadataError>;

    async fn fetch_document(&self, metadata_url: &str) -> Result<MetadataDocument, MetadataError>;
}
