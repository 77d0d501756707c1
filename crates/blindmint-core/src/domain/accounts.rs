//! # Stored Records
//!
//! Every program record is stored as `discriminator ‖ bincode(fields)`, where
//! the discriminator is the first 8 bytes of `SHA-256("account:<Name>")`.
//! Decoding checks the discriminator first and fails fast on a kind
//! mismatch.
//!
//! Protocol, AdminState, Collection and Placeholder records have a constant
//! encoded size. Indexers filter on `(offset, bytes)` and exact size, so the
//! field order below is part of the public contract; see [`layout`].

use crate::domain::lifecycle::{CollectibleStatus, PlaceholderStatus};
use crate::domain::value_objects::{Address, Attribute, FixedText, Lamports, UnixTimestamp};
use crate::errors::CodecError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Bytes of discriminator prefixing each record.
pub const DISCRIMINATOR_LEN: usize = 8;

pub const USERNAME_LEN: usize = 5;
pub const NAME_LEN: usize = 32;
pub const SYMBOL_LEN: usize = 10;
pub const URL_LEN: usize = 200;
pub const STABLE_ID_LEN: usize = 32;

/// Attributes allowed on one collectible.
pub const MAX_ATTRIBUTES: usize = 32;
pub const ATTRIBUTE_KEY_LEN: usize = 32;
pub const ATTRIBUTE_VALUE_LEN: usize = 64;
pub const INSCRIPTION_LEN: usize = 32;

/// Inscription of a collectible nobody has inscribed yet.
pub const UNINSCRIBED: &str = "none";

pub type Username = FixedText<USERNAME_LEN>;
pub type Name = FixedText<NAME_LEN>;
pub type Symbol = FixedText<SYMBOL_LEN>;
pub type Url = FixedText<URL_LEN>;
pub type StableId = FixedText<STABLE_ID_LEN>;
pub type AttributeKey = FixedText<ATTRIBUTE_KEY_LEN>;
pub type AttributeValue = FixedText<ATTRIBUTE_VALUE_LEN>;
pub type Inscription = FixedText<INSCRIPTION_LEN>;

// =============================================================================
// RECORDS
// =============================================================================

/// Deployment-wide singleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolState {
    /// Identity that initialized the protocol; may bootstrap the first admin.
    pub authority: Address,
    pub locked: bool,
    pub admin_count: u64,
    pub bump: u8,
}

/// One administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminState {
    pub owner: Address,
    pub username: Username,
    pub created_at: UnixTimestamp,
    pub bump: u8,
}

/// Sale parameters and counters of one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// External cross-system id; indexers filter on it.
    pub reference: Address,
    pub owner: Address,
    pub name: Name,
    pub symbol: Symbol,
    /// Base url of the off-chain metadata service.
    pub url: Url,
    pub sale_start_time: UnixTimestamp,
    pub sale_end_time: UnixTimestamp,
    pub max_supply: u64,
    /// Collectibles revealed so far.
    pub total_supply: u64,
    /// Placeholders minted so far; next placeholder ordinal.
    pub mint_count: u64,
    /// Placeholders transferred to buyers.
    pub sold_count: u64,
    pub price: Lamports,
    pub stable_id: StableId,
    pub bump: u8,
}

impl Collection {
    /// True if `now` falls inside `[sale_start_time, sale_end_time]`.
    #[must_use]
    pub fn is_open(&self, now: UnixTimestamp) -> bool {
        self.sale_start_time <= now && now <= self.sale_end_time
    }

    /// Placeholders that can still be minted.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.max_supply.saturating_sub(self.mint_count)
    }
}

/// Blind token record for one purchase slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub collection: Address,
    /// Copied from the collection so indexers can filter placeholders too.
    pub reference: Address,
    pub id: u64,
    /// `Address::ZERO` until sold.
    pub buyer: Address,
    pub url: Url,
    /// Collection price when minted.
    pub price: Lamports,
    pub created_at: UnixTimestamp,
    pub status: PlaceholderStatus,
    pub bump: u8,
}

impl Placeholder {
    /// The buyer, once sold.
    #[must_use]
    pub fn buyer(&self) -> Option<Address> {
        (!self.buyer.is_zero()).then_some(self.buyer)
    }
}

/// Revealed collectible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collectible {
    pub collection: Address,
    pub id: u64,
    /// Order of reveal within the collection, starting at 0.
    pub rank: u64,
    /// `Address::ZERO` until claimed.
    pub owner: Address,
    pub name: Name,
    pub url: Url,
    /// At most [`MAX_ATTRIBUTES`], each key and value within
    /// [`ATTRIBUTE_KEY_LEN`] and [`ATTRIBUTE_VALUE_LEN`] bytes.
    pub attributes: Vec<Attribute>,
    /// [`UNINSCRIBED`] until inscribed; carried through the swap.
    pub inscription: Inscription,
    /// Collection price when revealed.
    pub price: Lamports,
    pub created_at: UnixTimestamp,
    pub status: CollectibleStatus,
    pub bump: u8,
}

/// Name, symbol, uri and free-form fields attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub additional: Vec<(String, String)>,
}

impl TokenMetadata {
    /// Looks up an additional field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.additional
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// An indivisible token attached to a placeholder or collectible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMint {
    /// Record this token represents.
    pub subject: Address,
    /// Program authority allowed to move and burn the token.
    pub authority: Address,
    pub mint_authority_revoked: bool,
    pub holder: Address,
    /// 1 while live, 0 once burned.
    pub supply: u64,
    pub decimals: u8,
    pub metadata: TokenMetadata,
}

impl TokenMint {
    /// A fresh supply-1 token held by `authority`.
    #[must_use]
    pub fn issue(subject: Address, authority: Address, metadata: TokenMetadata) -> Self {
        Self {
            subject,
            authority,
            mint_authority_revoked: false,
            holder: authority,
            supply: 1,
            decimals: 0,
            metadata,
        }
    }

    /// True until burned.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.supply > 0
    }
}

// =============================================================================
// DISCRIMINATED CODEC
// =============================================================================

/// First 8 bytes of `SHA-256("account:<name>")`.
#[must_use]
pub fn discriminator_for(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let digest = Sha256::digest(format!("account:{name}").as_bytes());
    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// A record type that can be stored in an account.
pub trait AccountRecord: Serialize + DeserializeOwned + Sized {
    /// Record name used for the discriminator.
    const NAME: &'static str;

    fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        discriminator_for(Self::NAME)
    }

    /// Encodes as `discriminator ‖ bincode(self)`.
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let mut out = Self::discriminator().to_vec();
        bincode::serialize_into(&mut out, self)?;
        Ok(out)
    }

    /// Decodes after checking the discriminator.
    fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let (disc, body) = split_discriminator(data)?;
        if disc != Self::discriminator() {
            return Err(CodecError::KindMismatch {
                expected: Self::NAME,
                found: AccountKind::from_discriminator(&disc)
                    .map(|k| k.name().to_string())
                    .unwrap_or_else(|| hex::encode(disc)),
            });
        }
        Ok(bincode::deserialize(body)?)
    }
}

impl AccountRecord for ProtocolState {
    const NAME: &'static str = "Protocol";
}

impl AccountRecord for AdminState {
    const NAME: &'static str = "AdminState";
}

impl AccountRecord for Collection {
    const NAME: &'static str = "Collection";
}

impl AccountRecord for Placeholder {
    const NAME: &'static str = "Placeholder";
}

impl AccountRecord for Collectible {
    const NAME: &'static str = "Collectible";
}

impl AccountRecord for TokenMint {
    const NAME: &'static str = "TokenMint";
}

fn split_discriminator(data: &[u8]) -> Result<([u8; DISCRIMINATOR_LEN], &[u8]), CodecError> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(CodecError::Truncated { len: data.len() });
    }
    let (head, body) = data.split_at(DISCRIMINATOR_LEN);
    let mut disc = [0u8; DISCRIMINATOR_LEN];
    disc.copy_from_slice(head);
    Ok((disc, body))
}

// =============================================================================
// ACCOUNT KINDS
// =============================================================================

/// Kind tag of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    Protocol,
    Admin,
    Collection,
    Placeholder,
    Collectible,
    Token,
}

impl AccountKind {
    pub const ALL: [Self; 6] = [
        Self::Protocol,
        Self::Admin,
        Self::Collection,
        Self::Placeholder,
        Self::Collectible,
        Self::Token,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Protocol => ProtocolState::NAME,
            Self::Admin => AdminState::NAME,
            Self::Collection => Collection::NAME,
            Self::Placeholder => Placeholder::NAME,
            Self::Collectible => Collectible::NAME,
            Self::Token => TokenMint::NAME,
        }
    }

    #[must_use]
    pub fn discriminator(self) -> [u8; DISCRIMINATOR_LEN] {
        discriminator_for(self.name())
    }

    #[must_use]
    pub fn from_discriminator(disc: &[u8; DISCRIMINATOR_LEN]) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.discriminator() == *disc)
    }
}

/// Any decoded program record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Account {
    Protocol(ProtocolState),
    Admin(AdminState),
    Collection(Collection),
    Placeholder(Placeholder),
    Collectible(Collectible),
    Token(TokenMint),
}

impl Account {
    /// Decodes any record, dispatching on its discriminator.
    pub fn decode(data: &[u8]) -> Result<Self, CodecError> {
        let (disc, _) = split_discriminator(data)?;
        let kind = AccountKind::from_discriminator(&disc)
            .ok_or_else(|| CodecError::UnknownDiscriminator(hex::encode(disc)))?;
        Ok(match kind {
            AccountKind::Protocol => Self::Protocol(ProtocolState::decode(data)?),
            AccountKind::Admin => Self::Admin(AdminState::decode(data)?),
            AccountKind::Collection => Self::Collection(Collection::decode(data)?),
            AccountKind::Placeholder => Self::Placeholder(Placeholder::decode(data)?),
            AccountKind::Collectible => Self::Collectible(Collectible::decode(data)?),
            AccountKind::Token => Self::Token(TokenMint::decode(data)?),
        })
    }

    #[must_use]
    pub fn kind(&self) -> AccountKind {
        match self {
            Self::Protocol(_) => AccountKind::Protocol,
            Self::Admin(_) => AccountKind::Admin,
            Self::Collection(_) => AccountKind::Collection,
            Self::Placeholder(_) => AccountKind::Placeholder,
            Self::Collectible(_) => AccountKind::Collectible,
            Self::Token(_) => AccountKind::Token,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Protocol(r) => r.encode(),
            Self::Admin(r) => r.encode(),
            Self::Collection(r) => r.encode(),
            Self::Placeholder(r) => r.encode(),
            Self::Collectible(r) => r.encode(),
            Self::Token(r) => r.encode(),
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Encoded sizes and field offsets of the fixed-size records.
pub mod layout {
    use super::{DISCRIMINATOR_LEN, NAME_LEN, STABLE_ID_LEN, SYMBOL_LEN, URL_LEN, USERNAME_LEN};

    const ADDR: usize = 32;
    const U64: usize = 8;
    const ENUM_TAG: usize = 4;

    pub const PROTOCOL_LEN: usize = DISCRIMINATOR_LEN + ADDR + 1 + U64 + 1;

    pub const ADMIN_OWNER: usize = DISCRIMINATOR_LEN;
    pub const ADMIN_STATE_LEN: usize = DISCRIMINATOR_LEN + ADDR + USERNAME_LEN + U64 + 1;

    pub const COLLECTION_REFERENCE: usize = DISCRIMINATOR_LEN;
    pub const COLLECTION_OWNER: usize = COLLECTION_REFERENCE + ADDR;
    pub const COLLECTION_NAME: usize = COLLECTION_OWNER + ADDR;
    pub const COLLECTION_SYMBOL: usize = COLLECTION_NAME + NAME_LEN;
    pub const COLLECTION_URL: usize = COLLECTION_SYMBOL + SYMBOL_LEN;
    pub const COLLECTION_SALE_START: usize = COLLECTION_URL + URL_LEN;
    pub const COLLECTION_SALE_END: usize = COLLECTION_SALE_START + U64;
    pub const COLLECTION_MAX_SUPPLY: usize = COLLECTION_SALE_END + U64;
    pub const COLLECTION_TOTAL_SUPPLY: usize = COLLECTION_MAX_SUPPLY + U64;
    pub const COLLECTION_MINT_COUNT: usize = COLLECTION_TOTAL_SUPPLY + U64;
    pub const COLLECTION_SOLD_COUNT: usize = COLLECTION_MINT_COUNT + U64;
    pub const COLLECTION_PRICE: usize = COLLECTION_SOLD_COUNT + U64;
    pub const COLLECTION_STABLE_ID: usize = COLLECTION_PRICE + U64;
    pub const COLLECTION_LEN: usize = COLLECTION_STABLE_ID + STABLE_ID_LEN + 1;

    pub const PLACEHOLDER_COLLECTION: usize = DISCRIMINATOR_LEN;
    pub const PLACEHOLDER_REFERENCE: usize = PLACEHOLDER_COLLECTION + ADDR;
    pub const PLACEHOLDER_ID: usize = PLACEHOLDER_REFERENCE + ADDR;
    pub const PLACEHOLDER_BUYER: usize = PLACEHOLDER_ID + U64;
    pub const PLACEHOLDER_URL: usize = PLACEHOLDER_BUYER + ADDR;
    pub const PLACEHOLDER_PRICE: usize = PLACEHOLDER_URL + URL_LEN;
    pub const PLACEHOLDER_CREATED_AT: usize = PLACEHOLDER_PRICE + U64;
    pub const PLACEHOLDER_STATUS: usize = PLACEHOLDER_CREATED_AT + U64;
    pub const PLACEHOLDER_LEN: usize = PLACEHOLDER_STATUS + ENUM_TAG + 1;
}

// =============================================================================
// TESTS
// =============================================================================
