//! # Driving Ports (API - Inbound)
//!
//! The operations admin tooling, buyer clients and indexers invoke.
//!
//! State-changing operations are synchronous: each is one unit of work that
//! either commits fully or returns an error having changed nothing. Only the
//! reveal path, which waits on the metadata service, is async.

use crate::domain::accounts::{AdminState, Collectible, Collection, Placeholder, ProtocolState, TokenMint};
use crate::domain::proof::AirdropProof;
use crate::domain::value_objects::{Address, Attribute, Lamports, UnixTimestamp};
use crate::errors::MintError;
use crate::events::Receipt;
use async_trait::async_trait;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Parameters of a new collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCollection {
    /// Identity the collection is keyed by; receives sale proceeds.
    pub owner: Address,
    pub reference: Address,
    pub name: String,
    pub symbol: String,
    /// Base url of the off-chain metadata service.
    pub url: String,
    pub sale_start: UnixTimestamp,
    pub sale_end: UnixTimestamp,
    pub max_supply: u64,
    pub price: Lamports,
    pub stable_id: String,
}

/// Resolved metadata of a collectible to create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCollectible {
    pub id: u64,
    pub url: String,
    pub name: String,
    pub attributes: Vec<Attribute>,
}

// =============================================================================
// MINT PROTOCOL API
// =============================================================================

/// State-changing operations.
pub trait MintProtocolApi: Send + Sync {
    // --- Registry ------------------------------------------------------------

    /// Creates the protocol singleton with `authority` as bootstrap identity.
    fn initialize_protocol(&self, authority: &Address) -> Result<Receipt, MintError>;

    /// Freezes every admin-authorised operation. Irreversible.
    fn lock_protocol(&self, admin: &Address) -> Result<Receipt, MintError>;

    /// Registers `new_admin`. The first admin is bootstrapped by the
    /// protocol authority while the protocol is unlocked.
    fn add_admin(
        &self,
        caller: &Address,
        username: &str,
        new_admin: &Address,
    ) -> Result<Receipt, MintError>;

    /// Closes `target`'s AdminState. Caller must be a different admin.
    fn remove_admin(&self, caller: &Address, target: &Address) -> Result<Receipt, MintError>;

    // --- Collections ---------------------------------------------------------

    fn create_collection(
        &self,
        admin: &Address,
        params: NewCollection,
    ) -> Result<Receipt, MintError>;

    /// Ends the sale now and caps supply at what was minted.
    fn close_collection(&self, admin: &Address, owner: &Address) -> Result<Receipt, MintError>;

    // --- Placeholders --------------------------------------------------------

    fn create_placeholder(
        &self,
        admin: &Address,
        owner: &Address,
        id: u64,
        url: &str,
    ) -> Result<Receipt, MintError>;

    /// `buyer` pays the collection price to the owner and receives the token.
    fn buy_placeholder(
        &self,
        buyer: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError>;

    /// Delivers the token to `recipient` on the owner's signed authorisation.
    fn airdrop_placeholder(
        &self,
        payer: &Address,
        owner: &Address,
        id: u64,
        recipient: &Address,
        proof: &AirdropProof,
    ) -> Result<Receipt, MintError>;

    /// Retires a sold placeholder without a swap. Fails once a collectible
    /// exists for the id.
    fn burn_placeholder(
        &self,
        admin: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError>;

    // --- Reveal & swap -------------------------------------------------------

    /// Creates the collectible for a minted, unsettled placeholder.
    fn create_nft(
        &self,
        admin: &Address,
        owner: &Address,
        params: NewCollectible,
    ) -> Result<Receipt, MintError>;

    /// Delivers collectible `id` to the placeholder holder and burns the
    /// placeholder, in one unit of work.
    fn transfer_nft(
        &self,
        caller: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError>;
}

// =============================================================================
// QUERIES
// =============================================================================

/// Read-only views. Missing records read as `None`, never as errors.
pub trait CollectionQueries: Send + Sync {
    fn get_protocol(&self) -> Result<Option<ProtocolState>, MintError>;

    fn get_admin(&self, admin: &Address) -> Result<Option<AdminState>, MintError>;

    fn get_collection(&self, owner: &Address) -> Result<Option<Collection>, MintError>;

    /// Metadata base url of a collection.
    fn get_collection_url(&self, owner: &Address) -> Result<Option<String>, MintError>;

    /// Every collection, optionally only those with this `reference`.
    /// Undecodable entries are skipped.
    fn get_all_collections(
        &self,
        reference: Option<&Address>,
    ) -> Result<Vec<(Address, Collection)>, MintError>;

    fn get_placeholder(&self, owner: &Address, id: u64) -> Result<Option<Placeholder>, MintError>;

    /// Every placeholder of one collection, ordered by id.
    fn get_placeholders(&self, owner: &Address) -> Result<Vec<Placeholder>, MintError>;

    fn get_collectible(&self, owner: &Address, id: u64) -> Result<Option<Collectible>, MintError>;

    /// Token attached to a placeholder or collectible record.
    fn get_token(&self, record: &Address) -> Result<Option<TokenMint>, MintError>;

    fn balance_of(&self, address: &Address) -> Result<Lamports, MintError>;
}

// =============================================================================
// REVEAL
// =============================================================================

/// Resolves off-chain metadata for a sold placeholder and creates its
/// collectible.
#[async_trait]
pub trait RevealApi: Send + Sync {
    async fn reveal(
        &self,
        admin: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError>;
}
