//! # Outcome Events
//!
//! Every committed operation returns a [`Receipt`] listing the transitions it
//! made. Events are serde-serialisable so callers can forward them to an
//! indexer or audit log unchanged.

use crate::domain::value_objects::{Address, Lamports, UnixTimestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MintEvent {
    ProtocolInitialized {
        protocol: Address,
        authority: Address,
    },
    ProtocolLocked {
        by: Address,
    },
    AdminAdded {
        admin: Address,
        username: String,
        by: Address,
    },
    AdminRemoved {
        admin: Address,
        by: Address,
        /// Lamports returned to `by` when the record closed.
        refunded: Lamports,
    },
    CollectionCreated {
        collection: Address,
        owner: Address,
        reference: Address,
        max_supply: u64,
        price: Lamports,
    },
    CollectionClosed {
        collection: Address,
        final_supply: u64,
        closed_at: UnixTimestamp,
    },
    PlaceholderMinted {
        collection: Address,
        id: u64,
        placeholder: Address,
        mint: Address,
    },
    PlaceholderSold {
        collection: Address,
        id: u64,
        buyer: Address,
        price: Lamports,
    },
    PlaceholderAirdropped {
        collection: Address,
        id: u64,
        recipient: Address,
        fee: Lamports,
    },
    CollectibleCreated {
        collection: Address,
        id: u64,
        rank: u64,
        collectible: Address,
    },
    CollectibleClaimed {
        collection: Address,
        id: u64,
        owner: Address,
    },
    PlaceholderBurned {
        collection: Address,
        id: u64,
    },
}

/// Result of a committed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Correlates log lines of one operation.
    pub correlation_id: Uuid,
    /// Store version the change set was committed at.
    pub version: u64,
    pub events: Vec<MintEvent>,
}
