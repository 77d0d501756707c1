//! # Mint Service
//!
//! Runs every operation as one optimistic unit of work against the account
//! store:
//!
//! 1. Read what the transition needs, recording versions.
//! 2. Check preconditions and build the new records.
//! 3. Commit the change set if no read version moved; otherwise re-run
//!    from step 1 against fresh state, up to `max_commit_attempts`.
//!
//! A rejected operation commits nothing.

mod collections;
mod placeholders;
mod queries;
mod registry;
mod reveal;
pub mod unit_of_work;

pub use reveal::RevealCoordinator;
pub use unit_of_work::UnitOfWork;

use crate::adapters::{InMemoryAccountStore, ManualClock};
use crate::config::MintConfig;
use crate::domain::addressing::AddressBook;
use crate::domain::proof::AirdropProof;
use crate::domain::value_objects::{Address, UnixTimestamp};
use crate::errors::{ErrorKind, MintError, StoreError};
use crate::events::Receipt;
use crate::ports::inbound::{MintProtocolApi, NewCollectible, NewCollection};
use crate::ports::outbound::{AccountStore, Clock};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// What a transition sees besides the store.
pub(crate) struct OpContext<'a> {
    pub book: &'a AddressBook,
    pub config: &'a MintConfig,
    /// Ledger time, read once per attempt.
    pub now: UnixTimestamp,
}

/// Statistics for the Mint Service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Operations whose change set committed.
    pub committed: u64,
    /// Operations that returned an error.
    pub rejected: u64,
    /// Commit conflicts that triggered a re-run.
    pub conflicts_retried: u64,
}

/// The protocol core.
pub struct MintService<S: AccountStore> {
    config: MintConfig,
    book: AddressBook,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    stats: RwLock<ServiceStats>,
}

impl<S: AccountStore> MintService<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: MintConfig) -> Self {
        Self {
            book: AddressBook::new(config.program_id),
            config,
            store,
            clock,
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    /// Address derivation under this service's program namespace.
    #[must_use]
    pub fn addresses(&self) -> &AddressBook {
        &self.book
    }

    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub fn stats(&self) -> ServiceStats {
        self.stats.read().clone()
    }

    fn reject(&self, op: &'static str, err: MintError) -> MintError {
        self.stats.write().rejected += 1;
        match err.kind() {
            ErrorKind::Authorization | ErrorKind::Integrity => {
                warn!(op, error = %err, "operation rejected");
            }
            _ => debug!(op, error = %err, "operation rejected"),
        }
        err
    }

    /// Runs `transition` in a fresh unit of work until it commits, fails, or
    /// runs out of attempts.
    fn execute<F>(&self, op: &'static str, transition: F) -> Result<Receipt, MintError>
    where
        F: Fn(&mut UnitOfWork<'_>, &OpContext<'_>) -> Result<(), MintError>,
    {
        let correlation_id = Uuid::new_v4();
        let attempts = self.config.max_commit_attempts;

        for attempt in 1..=attempts {
            let ctx = OpContext {
                book: &self.book,
                config: &self.config,
                now: self.clock.unix_timestamp(),
            };
            let mut uow = UnitOfWork::new(self.store.as_ref(), self.config.rent);
            if let Err(err) = transition(&mut uow, &ctx) {
                return Err(self.reject(op, err));
            }

            let (changes, events) = uow.finish();
            match self.store.commit(changes) {
                Ok(version) => {
                    self.stats.write().committed += 1;
                    info!(op, %correlation_id, version, events = events.len(), "committed");
                    return Ok(Receipt {
                        correlation_id,
                        version,
                        events,
                    });
                }
                Err(StoreError::Conflict { address, .. }) => {
                    self.stats.write().conflicts_retried += 1;
                    debug!(op, %correlation_id, attempt, %address, "commit conflict, re-running");
                }
                Err(err) => return Err(self.reject(op, err.into())),
            }
        }

        Err(self.reject(op, MintError::ContentionExhausted { attempts }))
    }
}

// =============================================================================
// MintProtocolApi Implementation
// =============================================================================

impl<S: AccountStore> MintProtocolApi for MintService<S> {
    #[instrument(skip_all, fields(authority = %authority))]
    fn initialize_protocol(&self, authority: &Address) -> Result<Receipt, MintError> {
        self.execute("initialize_protocol", |uow, ctx| {
            registry::initialize_protocol(uow, ctx, authority)
        })
    }

    #[instrument(skip_all, fields(admin = %admin))]
    fn lock_protocol(&self, admin: &Address) -> Result<Receipt, MintError> {
        self.execute("lock_protocol", |uow, ctx| {
            registry::lock_protocol(uow, ctx, admin)
        })
    }

    #[instrument(skip_all, fields(caller = %caller, new_admin = %new_admin))]
    fn add_admin(
        &self,
        caller: &Address,
        username: &str,
        new_admin: &Address,
    ) -> Result<Receipt, MintError> {
        self.execute("add_admin", |uow, ctx| {
            registry::add_admin(uow, ctx, caller, username, new_admin)
        })
    }

    #[instrument(skip_all, fields(caller = %caller, target = %target))]
    fn remove_admin(&self, caller: &Address, target: &Address) -> Result<Receipt, MintError> {
        self.execute("remove_admin", |uow, ctx| {
            registry::remove_admin(uow, ctx, caller, target)
        })
    }

    #[instrument(skip_all, fields(admin = %admin, owner = %params.owner))]
    fn create_collection(
        &self,
        admin: &Address,
        params: NewCollection,
    ) -> Result<Receipt, MintError> {
        self.execute("create_collection", |uow, ctx| {
            collections::create_collection(uow, ctx, admin, &params)
        })
    }

    #[instrument(skip_all, fields(admin = %admin, owner = %owner))]
    fn close_collection(&self, admin: &Address, owner: &Address) -> Result<Receipt, MintError> {
        self.execute("close_collection", |uow, ctx| {
            collections::close_collection(uow, ctx, admin, owner)
        })
    }

    #[instrument(skip_all, fields(admin = %admin, owner = %owner, id = id))]
    fn create_placeholder(
        &self,
        admin: &Address,
        owner: &Address,
        id: u64,
        url: &str,
    ) -> Result<Receipt, MintError> {
        self.execute("create_placeholder", |uow, ctx| {
            placeholders::create_placeholder(uow, ctx, admin, owner, id, url)
        })
    }

    #[instrument(skip_all, fields(buyer = %buyer, owner = %owner, id = id))]
    fn buy_placeholder(
        &self,
        buyer: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError> {
        self.execute("buy_placeholder", |uow, ctx| {
            placeholders::buy_placeholder(uow, ctx, buyer, owner, id)
        })
    }

    #[instrument(skip_all, fields(payer = %payer, owner = %owner, id = id, recipient = %recipient))]
    fn airdrop_placeholder(
        &self,
        payer: &Address,
        owner: &Address,
        id: u64,
        recipient: &Address,
        proof: &AirdropProof,
    ) -> Result<Receipt, MintError> {
        self.execute("airdrop_placeholder", |uow, ctx| {
            placeholders::airdrop_placeholder(uow, ctx, payer, owner, id, recipient, proof)
        })
    }

    #[instrument(skip_all, fields(admin = %admin, owner = %owner, id = id))]
    fn burn_placeholder(
        &self,
        admin: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError> {
        self.execute("burn_placeholder", |uow, ctx| {
            placeholders::burn_placeholder(uow, ctx, admin, owner, id)
        })
    }

    #[instrument(skip_all, fields(admin = %admin, owner = %owner, id = params.id))]
    fn create_nft(
        &self,
        admin: &Address,
        owner: &Address,
        params: NewCollectible,
    ) -> Result<Receipt, MintError> {
        self.execute("create_nft", |uow, ctx| {
            reveal::create_nft(uow, ctx, admin, owner, &params)
        })
    }

    #[instrument(skip_all, fields(caller = %caller, owner = %owner, id = id))]
    fn transfer_nft(
        &self,
        caller: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError> {
        self.execute("transfer_nft", |uow, ctx| {
            reveal::transfer_nft(uow, ctx, caller, owner, id)
        })
    }
}

/// Create a service over an empty in-memory ledger with a manual clock.
pub fn create_test_service(now: UnixTimestamp) -> (MintService<InMemoryAccountStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(now));
    let service = MintService::new(
        Arc::new(InMemoryAccountStore::new()),
        clock.clone(),
        MintConfig::default(),
    );
    (service, clock)
}

// =============================================================================
// TESTS
// =============================================================================
