//! # Error Types
//!
//! All error types for the issuance protocol.
//!
//! Every operation aborts its whole unit of work on error, so a `MintError`
//! always means "nothing was committed". `MintError::kind()` lets callers
//! tell "retry later" apart from "never retry".

use crate::domain::value_objects::{Address, Lamports, UnixTimestamp};
use thiserror::Error;

// =============================================================================
// ERROR KIND
// =============================================================================

/// Coarse classification of a [`MintError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks admin or ownership standing.
    Authorization,
    /// Duplicate id, already sold, already settled: caller used stale state.
    StateConflict,
    /// Sale not yet open or already closed.
    Window,
    /// Supply exhausted.
    Capacity,
    /// Attestation mismatch or broken invariant.
    Integrity,
    /// Malformed request parameters.
    Validation,
    /// Payer cannot cover price, rent or fee.
    Payment,
    /// Storage, encoding, derivation or metadata-service failure.
    Infrastructure,
}

// =============================================================================
// MINT ERRORS
// =============================================================================

/// Errors returned by protocol operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MintError {
    // --- Authorization -------------------------------------------------------
    /// Caller has no valid AdminState.
    #[error("unauthorized: {caller} is not a valid admin")]
    Unauthorized { caller: Address },

    /// An admin tried to remove its own AdminState.
    #[error("admin {admin} cannot remove itself")]
    CannotRemoveSelf { admin: Address },

    /// Protocol is locked; admin-authorised operations are frozen.
    #[error("protocol is locked")]
    ProtocolLocked,

    /// Caller does not hold the placeholder token it tries to swap.
    #[error("{caller} does not hold placeholder {id}")]
    NotPlaceholderHolder { caller: Address, id: u64 },

    /// A token is not controlled by the protocol authority.
    #[error("token {mint} authority is {actual}, expected {expected}")]
    AuthorityMismatch {
        mint: Address,
        expected: Address,
        actual: Address,
    },

    // --- State conflicts -----------------------------------------------------
    /// Protocol record already exists.
    #[error("protocol already initialized")]
    AlreadyInitialized,

    /// Protocol record does not exist yet.
    #[error("protocol not initialized")]
    ProtocolNotInitialized,

    /// Target identity already has an AdminState.
    #[error("{admin} is already an admin")]
    AlreadyAdmin { admin: Address },

    /// Target identity has no AdminState.
    #[error("{target} is not an admin")]
    NotAnAdmin { target: Address },

    /// A collection already exists for this owner.
    #[error("collection already exists for owner {owner}")]
    CollectionExists { owner: Address },

    /// No collection exists for this owner.
    #[error("no collection for owner {owner}")]
    CollectionNotFound { owner: Address },

    /// No placeholder with this id.
    #[error("placeholder {id} not found")]
    PlaceholderNotFound { id: u64 },

    /// A record with this id already exists.
    #[error("duplicate id {id}")]
    DuplicateId { id: u64 },

    /// Placeholder was already bought or airdropped.
    #[error("placeholder {id} is already owned")]
    AlreadyOwned { id: u64 },

    /// Placeholder already reached a terminal state.
    #[error("placeholder {id} is already settled")]
    AlreadySettled { id: u64 },

    /// Placeholder has not been sold yet.
    #[error("placeholder {id} has not been sold")]
    NotSold { id: u64 },

    /// No collectible has been created for this id.
    #[error("collectible {id} has not been revealed")]
    NotRevealed { id: u64 },

    /// A collectible already waits for this placeholder.
    #[error("placeholder {id} already has a collectible")]
    AlreadyRevealed { id: u64 },

    // --- Window --------------------------------------------------------------
    /// Issuance attempted before the sale window opens.
    #[error("sale not open: starts at {starts_at}, now {now}")]
    SaleNotOpen {
        starts_at: UnixTimestamp,
        now: UnixTimestamp,
    },

    /// Issuance attempted after the sale window closed.
    #[error("sale closed: ended at {ended_at}, now {now}")]
    SaleClosed {
        ended_at: UnixTimestamp,
        now: UnixTimestamp,
    },

    /// Purchase attempted outside the sale window.
    #[error("not for sale at {now}: window [{starts_at}, {ends_at}]")]
    NotForSale {
        starts_at: UnixTimestamp,
        ends_at: UnixTimestamp,
        now: UnixTimestamp,
    },

    // --- Capacity ------------------------------------------------------------
    /// `mint_count` reached `max_supply`.
    #[error("sold out: max supply {max_supply}")]
    SoldOut { max_supply: u64 },

    /// Every minted placeholder already has a collectible.
    #[error("nothing left to reveal: {revealed} of {minted} revealed")]
    RevealExceedsMinted { minted: u64, revealed: u64 },

    // --- Integrity -----------------------------------------------------------
    /// Airdrop attestation does not match the expected signer/recipient.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// A record would violate a protocol invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    // --- Validation ----------------------------------------------------------
    /// Admin username exceeds its bound.
    #[error("username too long: {actual} > {max} bytes")]
    UsernameTooLong { max: usize, actual: usize },

    /// A text field exceeds its fixed width.
    #[error("{field} too long: {actual} > {max} bytes")]
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    /// A text field contains a NUL byte.
    #[error("{field} contains a NUL byte")]
    InvalidText { field: &'static str },

    /// `sale_start > sale_end`.
    #[error("invalid sale window: start {start} > end {end}")]
    InvalidWindow {
        start: UnixTimestamp,
        end: UnixTimestamp,
    },

    /// `max_supply == 0`.
    #[error("max supply must be positive")]
    InvalidSupply,

    /// Too many attributes for one collectible.
    #[error("too many attributes: {actual} > {max}")]
    TooManyAttributes { max: usize, actual: usize },

    // --- Payment -------------------------------------------------------------
    /// Payer balance does not cover the debit.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Lamports,
        available: Lamports,
    },

    // --- Infrastructure ------------------------------------------------------
    /// Account store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Record encoding failure.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Address derivation failure.
    #[error("addressing error: {0}")]
    Addressing(#[from] AddressingError),

    /// Off-chain metadata resolution failed.
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Optimistic commit kept conflicting.
    #[error("commit contention: gave up after {attempts} attempts")]
    ContentionExhausted { attempts: u32 },

    /// Lamport arithmetic overflowed.
    #[error("lamport balance overflow on {address}")]
    BalanceOverflow { address: Address },
}

impl MintError {
    /// Classifies this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. }
            | Self::CannotRemoveSelf { .. }
            | Self::ProtocolLocked
            | Self::NotPlaceholderHolder { .. }
            | Self::AuthorityMismatch { .. } => ErrorKind::Authorization,

            Self::AlreadyInitialized
            | Self::ProtocolNotInitialized
            | Self::AlreadyAdmin { .. }
            | Self::NotAnAdmin { .. }
            | Self::CollectionExists { .. }
            | Self::CollectionNotFound { .. }
            | Self::PlaceholderNotFound { .. }
            | Self::DuplicateId { .. }
            | Self::AlreadyOwned { .. }
            | Self::AlreadySettled { .. }
            | Self::NotSold { .. }
            | Self::NotRevealed { .. }
            | Self::AlreadyRevealed { .. } => ErrorKind::StateConflict,

            Self::SaleNotOpen { .. } | Self::SaleClosed { .. } | Self::NotForSale { .. } => {
                ErrorKind::Window
            }

            Self::SoldOut { .. } | Self::RevealExceedsMinted { .. } => ErrorKind::Capacity,

            Self::InvalidSignature(_) | Self::InvariantViolation(_) => ErrorKind::Integrity,

            Self::UsernameTooLong { .. }
            | Self::FieldTooLong { .. }
            | Self::InvalidText { .. }
            | Self::InvalidWindow { .. }
            | Self::InvalidSupply
            | Self::TooManyAttributes { .. } => ErrorKind::Validation,

            Self::InsufficientFunds { .. } => ErrorKind::Payment,

            Self::Store(_)
            | Self::Codec(_)
            | Self::Addressing(_)
            | Self::Metadata(_)
            | Self::ContentionExhausted { .. }
            | Self::BalanceOverflow { .. } => ErrorKind::Infrastructure,
        }
    }

    /// Returns true if resubmitting the same request later may succeed
    /// without any other party changing state first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::SaleNotOpen { .. } | Self::ContentionExhausted { .. } => true,
            Self::NotForSale { starts_at, now, .. } => now < starts_at,
            Self::Metadata(err) => err.is_transient(),
            _ => false,
        }
    }
}

// =============================================================================
// TEXT ERRORS
// =============================================================================

/// Errors building a fixed-width text field.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TextError {
    /// Value does not fit in the field.
    #[error("value too long: {actual} > {max} bytes")]
    TooLong { max: usize, actual: usize },

    /// Value contains a NUL byte, which is reserved for padding.
    #[error("value contains a NUL byte")]
    InteriorNul,
}

impl TextError {
    /// Attaches the field name.
    #[must_use]
    pub fn for_field(self, field: &'static str) -> MintError {
        match self {
            Self::TooLong { max, actual } => MintError::FieldTooLong { field, max, actual },
            Self::InteriorNul => MintError::InvalidText { field },
        }
    }
}

// =============================================================================
// STORE ERRORS
// =============================================================================

/// Errors from the account store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// An account read by the unit of work changed before commit.
    #[error("write conflict on {address}: expected version {expected:?}, found {found:?}")]
    Conflict {
        address: Address,
        expected: Option<u64>,
        found: Option<u64>,
    },

    /// Backend is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors decoding or encoding stored records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Account data is shorter than a discriminator.
    #[error("account data truncated: {len} bytes")]
    Truncated { len: usize },

    /// Discriminator names a different record kind.
    #[error("account kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: &'static str,
        found: String,
    },

    /// Discriminator is not a known record kind.
    #[error("unknown account discriminator {0}")]
    UnknownDiscriminator(String),

    /// Body failed to (de)serialize.
    #[error("malformed record: {0}")]
    Malformed(String),
}

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

// =============================================================================
// ADDRESSING ERRORS
// =============================================================================

/// Errors deriving program addresses.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressingError {
    /// A seed is longer than 32 bytes.
    #[error("seed too long: {len} > {max} bytes")]
    SeedTooLong { len: usize, max: usize },

    /// Too many seeds.
    #[error("too many seeds: {count} > {max}")]
    TooManySeeds { count: usize, max: usize },

    /// The digest landed on the curve; try another bump.
    #[error("derived address is on the curve")]
    OnCurve,

    /// Every bump produced an on-curve digest.
    #[error("no viable bump seed")]
    NoViableBump,
}

// =============================================================================
// METADATA ERRORS
// =============================================================================

/// Errors talking to the off-chain metadata service.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// Request could not be sent or the connection failed.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Service answered with a non-200 status.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// Response body was not the expected JSON.
    #[error("cannot decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Document resolved but names nothing usable.
    #[error("metadata document is incomplete: {0}")]
    Incomplete(String),
}

impl MetadataError {
    /// Transport failures and 5xx answers may clear up on their own.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode { .. } | Self::Incomplete(_) => false,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
