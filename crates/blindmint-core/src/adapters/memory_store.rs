//! # In-Memory Account Store
//!
//! A single-process ledger. One write lock serialises commits, which gives
//! the same ordering guarantee as an external ledger: each change set is
//! validated against current versions and applied whole, or rejected.

use crate::domain::value_objects::{Address, Lamports};
use crate::errors::StoreError;
use crate::ports::outbound::{
    AccountFilter, AccountStore, ChangeSet, StoredAccount, VersionedAccount,
};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<Address, VersionedAccount>,
    version: u64,
}

/// Account store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Inner>,
}

impl InMemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lamport balance of `address`, creating a wallet if needed.
    pub fn set_lamports(&self, address: Address, lamports: Lamports) {
        let mut inner = self.inner.write();
        inner.version += 1;
        let version = inner.version;
        let entry = inner
            .accounts
            .entry(address)
            .or_insert_with(|| VersionedAccount {
                account: StoredAccount::default(),
                version,
            });
        entry.account.lamports = lamports;
        entry.version = version;
    }

    /// Latest committed version.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Number of live accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every account, for before/after comparisons.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<Address, StoredAccount> {
        self.inner
            .read()
            .accounts
            .iter()
            .map(|(addr, v)| (*addr, v.account.clone()))
            .collect()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn get(&self, address: &Address) -> Result<Option<VersionedAccount>, StoreError> {
        Ok(self.inner.read().accounts.get(address).cloned())
    }

    fn scan(
        &self,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Address, VersionedAccount)>, StoreError> {
        let inner = self.inner.read();
        let mut hits: Vec<_> = inner
            .accounts
            .iter()
            .filter(|(_, v)| filters.iter().all(|f| f.matches(&v.account.data)))
            .map(|(addr, v)| (*addr, v.clone()))
            .collect();
        hits.sort_by_key(|(addr, _)| *addr);
        Ok(hits)
    }

    fn commit(&self, changes: ChangeSet) -> Result<u64, StoreError> {
        let mut inner = self.inner.write();

        for (address, expected) in &changes.reads {
            let found = inner.accounts.get(address).map(|v| v.version);
            if found != *expected {
                return Err(StoreError::Conflict {
                    address: *address,
                    expected: *expected,
                    found,
                });
            }
        }

        if changes.writes.is_empty() {
            return Ok(inner.version);
        }

        inner.version += 1;
        let version = inner.version;
        for (address, write) in changes.writes {
            match write {
                Some(account) => {
                    inner
                        .accounts
                        .insert(address, VersionedAccount { account, version });
                }
                None => {
                    inner.accounts.remove(&address);
                }
            }
        }
        Ok(version)
    }
}

// =============================================================================
// TESTS
// =============================================================================
