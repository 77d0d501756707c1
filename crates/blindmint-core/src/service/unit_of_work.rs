//! # Unit of Work
//!
//! Buffers every read and write of one operation. Reads record the version
//! they observed; the resulting [`ChangeSet`] commits only if none of those
//! versions moved. Dropping a unit of work without committing discards
//! everything it did.

use crate::config::RentSchedule;
use crate::domain::accounts::AccountRecord;
use crate::domain::value_objects::{Address, Lamports};
use crate::errors::MintError;
use crate::events::MintEvent;
use crate::ports::outbound::{AccountStore, ChangeSet, StoredAccount};
use std::collections::{BTreeMap, BTreeSet};

pub struct UnitOfWork<'a> {
    store: &'a dyn AccountStore,
    rent: RentSchedule,
    reads: BTreeMap<Address, Option<u64>>,
    view: BTreeMap<Address, Option<StoredAccount>>,
    dirty: BTreeSet<Address>,
    events: Vec<MintEvent>,
}

impl<'a> UnitOfWork<'a> {
    pub fn new(store: &'a dyn AccountStore, rent: RentSchedule) -> Self {
        Self {
            store,
            rent,
            reads: BTreeMap::new(),
            view: BTreeMap::new(),
            dirty: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    /// Current view of `address`, fetching it on first touch.
    fn load(&mut self, address: &Address) -> Result<Option<StoredAccount>, MintError> {
        if let Some(cached) = self.view.get(address) {
            return Ok(cached.clone());
        }
        let fetched = self.store.get(address)?;
        self.reads
            .insert(*address, fetched.as_ref().map(|v| v.version));
        let account = fetched.map(|v| v.account);
        self.view.insert(*address, account.clone());
        Ok(account)
    }

    fn put(&mut self, address: &Address, account: Option<StoredAccount>) {
        self.view.insert(*address, account);
        self.dirty.insert(*address);
    }

    /// True if `address` holds a program record.
    pub fn exists(&mut self, address: &Address) -> Result<bool, MintError> {
        Ok(self
            .load(address)?
            .is_some_and(|account| !account.data.is_empty()))
    }

    /// Decodes the record at `address`, if any.
    pub fn read<R: AccountRecord>(&mut self, address: &Address) -> Result<Option<R>, MintError> {
        match self.load(address)? {
            Some(account) if !account.data.is_empty() => Ok(Some(R::decode(&account.data)?)),
            _ => Ok(None),
        }
    }

    /// Like [`Self::read`] but maps absence to `missing()`.
    pub fn require<R: AccountRecord>(
        &mut self,
        address: &Address,
        missing: impl FnOnce() -> MintError,
    ) -> Result<R, MintError> {
        self.read(address)?.ok_or_else(missing)
    }

    /// Overwrites the record at `address`, keeping its balance.
    pub fn write<R: AccountRecord>(&mut self, address: &Address, record: &R) -> Result<(), MintError> {
        let data = record.encode()?;
        let mut account = self.load(address)?.unwrap_or_default();
        account.data = data;
        self.put(address, Some(account));
        Ok(())
    }

    /// Stores a new record, funding its rent from `payer`. Returns the rent.
    pub fn create<R: AccountRecord>(
        &mut self,
        payer: &Address,
        address: &Address,
        record: &R,
    ) -> Result<Lamports, MintError> {
        let data = record.encode()?;
        let existing = self.load(address)?.unwrap_or_default();
        if !existing.data.is_empty() {
            return Err(MintError::InvariantViolation(format!(
                "{address} already holds a record"
            )));
        }
        let rent = self.rent.minimum_balance(data.len());
        self.debit(payer, rent)?;
        let lamports = existing
            .lamports
            .checked_add(rent)
            .ok_or(MintError::BalanceOverflow { address: *address })?;
        self.put(address, Some(StoredAccount { lamports, data }));
        Ok(rent)
    }

    /// Removes the account at `address`, moving its lamports to `refund_to`.
    pub fn close(&mut self, address: &Address, refund_to: &Address) -> Result<Lamports, MintError> {
        let lamports = self.load(address)?.map_or(0, |a| a.lamports);
        self.put(address, None);
        self.credit(refund_to, lamports)?;
        Ok(lamports)
    }

    pub fn balance(&mut self, address: &Address) -> Result<Lamports, MintError> {
        Ok(self.load(address)?.map_or(0, |a| a.lamports))
    }

    /// Moves `amount` lamports. Zero-amount transfers touch nothing.
    pub fn transfer(&mut self, from: &Address, to: &Address, amount: Lamports) -> Result<(), MintError> {
        if amount == 0 {
            return Ok(());
        }
        self.debit(from, amount)?;
        self.credit(to, amount)
    }

    fn debit(&mut self, address: &Address, amount: Lamports) -> Result<(), MintError> {
        let mut account = self.load(address)?.unwrap_or_default();
        if account.lamports < amount {
            return Err(MintError::InsufficientFunds {
                required: amount,
                available: account.lamports,
            });
        }
        account.lamports -= amount;
        self.put(address, Some(account));
        Ok(())
    }

    fn credit(&mut self, address: &Address, amount: Lamports) -> Result<(), MintError> {
        let mut account = self.load(address)?.unwrap_or_default();
        account.lamports = account
            .lamports
            .checked_add(amount)
            .ok_or(MintError::BalanceOverflow { address: *address })?;
        self.put(address, Some(account));
        Ok(())
    }

    pub fn emit(&mut self, event: MintEvent) {
        self.events.push(event);
    }

    /// The guarded change set plus the events to report once it commits.
    pub fn finish(self) -> (ChangeSet, Vec<MintEvent>) {
        let mut view = self.view;
        let writes = self
            .dirty
            .into_iter()
            .map(|address| (address, view.remove(&address).flatten()))
            .collect();
        (
            ChangeSet {
                reads: self.reads,
                writes,
            },
            self.events,
        )
    }
}
