//! # Test Harness
//!
//! A protocol with one admin and one collection, driven by a manual clock.

use blindmint_core::{
    Address, CollectionQueries, InMemoryAccountStore, ManualClock, MintConfig, MintProtocolApi,
    MintService, NewCollectible, NewCollection, UnixTimestamp,
};
use blindmint_telemetry::{init_logging, TelemetryConfig};
use ed25519_dalek::SigningKey;
use std::sync::Arc;

pub const FUNDS: u64 = 10_000_000_000;
pub const SALE_START: UnixTimestamp = 1_700_000_000;
pub const SALE_END: UnixTimestamp = SALE_START + 86_400;
pub const PRICE: u64 = 250_000;
pub const BASE_URL: &str = "https://meta.blindmint.test";
pub const BLIND_URL: &str = "https://meta.blindmint.test/blind.json";

/// Installs a subscriber once per test binary; later calls are no-ops.
pub fn init_test_logging() {
    let config = TelemetryConfig {
        log_level: "blindmint_core=debug".to_string(),
        ..TelemetryConfig::default()
    };
    let _ = init_logging(&config);
}

pub struct Harness {
    pub service: Arc<MintService<InMemoryAccountStore>>,
    pub clock: Arc<ManualClock>,
    pub authority: Address,
    pub admin: Address,
    pub owner_key: SigningKey,
    pub owner: Address,
}

impl Harness {
    /// Protocol, one admin and a collection of `max_supply` open at
    /// `SALE_START`.
    pub fn new(max_supply: u64) -> Self {
        Self::with_config(max_supply, MintConfig::default())
    }

    pub fn with_config(max_supply: u64, config: MintConfig) -> Self {
        init_test_logging();
        let clock = Arc::new(ManualClock::new(SALE_START));
        let service = Arc::new(MintService::new(
            Arc::new(InMemoryAccountStore::new()),
            clock.clone(),
            config,
        ));
        let owner_key = SigningKey::from_bytes(&[42; 32]);
        let harness = Self {
            service,
            clock,
            authority: Address::new([1; 32]),
            admin: Address::new([2; 32]),
            owner: Address::new(owner_key.verifying_key().to_bytes()),
            owner_key,
        };
        harness.fund(harness.authority);
        harness.fund(harness.admin);
        harness.fund(harness.owner);

        let s = &harness.service;
        s.initialize_protocol(&harness.authority)
            .expect("initialize");
        s.add_admin(&harness.authority, "root", &harness.admin)
            .expect("bootstrap admin");
        s.create_collection(&harness.admin, collection_params(harness.owner, max_supply))
            .expect("create collection");
        harness
    }

    /// Gives `address` a wallet with `FUNDS` lamports.
    pub fn fund(&self, address: Address) -> Address {
        self.service.store().set_lamports(address, FUNDS);
        address
    }

    /// A funded buyer wallet derived from `seed`.
    pub fn buyer(&self, seed: u8) -> Address {
        self.fund(Address::new([seed; 32]))
    }

    pub fn collection_address(&self) -> Address {
        self.service
            .addresses()
            .collection(&self.owner)
            .expect("derive collection")
            .address
    }

    pub fn placeholder_address(&self, id: u64) -> Address {
        self.service
            .addresses()
            .placeholder(&self.collection_address(), id)
            .expect("derive placeholder")
            .address
    }

    pub fn collectible_address(&self, id: u64) -> Address {
        self.service
            .addresses()
            .collectible(&self.collection_address(), id)
            .expect("derive collectible")
            .address
    }

    pub fn mint(&self, id: u64) {
        self.service
            .create_placeholder(&self.admin, &self.owner, id, BLIND_URL)
            .expect("create placeholder");
    }

    pub fn balance(&self, address: &Address) -> u64 {
        self.service.balance_of(address).expect("balance")
    }
}

pub fn collection_params(owner: Address, max_supply: u64) -> NewCollection {
    NewCollection {
        owner,
        reference: Address::new([0xEE; 32]),
        name: "Genesis Blind Box".to_string(),
        symbol: "GBB".to_string(),
        url: BASE_URL.to_string(),
        sale_start: SALE_START,
        sale_end: SALE_END,
        max_supply,
        price: PRICE,
        stable_id: "genesis-2024".to_string(),
    }
}

pub fn collectible_params(id: u64) -> NewCollectible {
    NewCollectible {
        id,
        url: format!("{BASE_URL}/final/{id}.json"),
        name: format!("Genesis #{id}"),
        attributes: vec![
            blindmint_core::Attribute::new("background", "teal"),
            blindmint_core::Attribute::new("eyes", "laser"),
        ],
    }
}
