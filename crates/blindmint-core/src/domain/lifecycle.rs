//! # Per-id Lifecycle
//!
//! ```text
//! Unminted ──create_placeholder──► Minted ──buy/airdrop──► Sold ──transfer_nft──► Swapped
//!                                                            │
//!                                                            └──burn_placeholder──► Burned
//! ```
//!
//! `Swapped` and `Burned` are terminal and mutually exclusive. No transition
//! may be taken twice.

use crate::errors::MintError;
use serde::{Deserialize, Serialize};

/// State of a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderStatus {
    /// Minted and held by the issuance authority.
    Minted,
    /// Transferred to a buyer, awaiting reveal.
    Sold,
    /// Exchanged for its collectible; token burned.
    Swapped,
    /// Burned without a swap.
    Burned,
}

impl PlaceholderStatus {
    /// True for `Swapped` and `Burned`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Swapped | Self::Burned)
    }

    /// `Minted → Sold`.
    pub fn sell(self, id: u64) -> Result<Self, MintError> {
        match self {
            Self::Minted => Ok(Self::Sold),
            Self::Sold => Err(MintError::AlreadyOwned { id }),
            Self::Swapped | Self::Burned => Err(MintError::AlreadySettled { id }),
        }
    }

    /// `Sold → Swapped`.
    pub fn swap(self, id: u64) -> Result<Self, MintError> {
        match self {
            Self::Sold => Ok(Self::Swapped),
            Self::Minted => Err(MintError::NotSold { id }),
            Self::Swapped | Self::Burned => Err(MintError::AlreadySettled { id }),
        }
    }

    /// `Sold → Burned`.
    pub fn burn(self, id: u64) -> Result<Self, MintError> {
        match self {
            Self::Sold => Ok(Self::Burned),
            Self::Minted => Err(MintError::NotSold { id }),
            Self::Swapped | Self::Burned => Err(MintError::AlreadySettled { id }),
        }
    }
}

/// State of a collectible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectibleStatus {
    /// Revealed, still held by the issuance authority.
    Unclaimed,
    /// Delivered to the placeholder holder.
    Claimed,
}

impl CollectibleStatus {
    /// `Unclaimed → Claimed`.
    pub fn claim(self, id: u64) -> Result<Self, MintError> {
        match self {
            Self::Unclaimed => Ok(Self::Claimed),
            Self::Claimed => Err(MintError::AlreadySettled { id }),
        }
    }
}
