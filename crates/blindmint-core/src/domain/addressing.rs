//! # Addressing Engine
//!
//! Every record lives at an address derived from a tag, some key material
//! and the program namespace. Any party holding the same inputs can
//! recompute the address, so no lookup table is ever needed.
//!
//! ## Derivation
//!
//! ```text
//! address = SHA-256(seed_1 ‖ … ‖ seed_k ‖ bump ‖ program_id ‖ "ProgramDerivedAddress")
//! ```
//!
//! `bump` is searched from 255 downwards; the first digest that does not
//! decompress to an Edwards25519 point wins. Off-curve addresses have no
//! private key, so only the program can act for them.

use crate::domain::value_objects::Address;
use crate::errors::AddressingError;
use ed25519_dalek::VerifyingKey;
use sha2::{Digest, Sha256};

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

// =============================================================================
// SEED TAGS
// =============================================================================

/// Domain separator placed first in every derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedTag {
    Protocol,
    AdminState,
    Collection,
    Placeholder,
    Collectible,
    Mint,
    Auth,
}

impl SeedTag {
    /// Wire bytes of the tag.
    #[must_use]
    pub const fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Protocol => b"protocol",
            Self::AdminState => b"admin_state",
            Self::Collection => b"collection",
            Self::Placeholder => b"placeholder",
            Self::Collectible => b"ainft",
            Self::Mint => b"mint",
            Self::Auth => b"auth",
        }
    }
}

// =============================================================================
// DERIVATION
// =============================================================================

/// A derived address and the bump that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    pub address: Address,
    pub bump: u8,
}

/// True if `bytes` is a valid compressed Edwards25519 point.
#[must_use]
pub fn is_on_curve(bytes: &[u8; 32]) -> bool {
    VerifyingKey::from_bytes(bytes).is_ok()
}

/// Hashes `seeds` into an address. The bump, if any, must already be the
/// last seed. Fails if the result lands on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, AddressingError> {
    if seeds.len() > MAX_SEEDS {
        return Err(AddressingError::TooManySeeds {
            count: seeds.len(),
            max: MAX_SEEDS,
        });
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(AddressingError::SeedTooLong {
            len: seed.len(),
            max: MAX_SEED_LEN,
        });
    }

    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    let digest: [u8; 32] = hasher.finalize().into();

    if is_on_curve(&digest) {
        return Err(AddressingError::OnCurve);
    }
    Ok(Address::new(digest))
}

/// Finds the highest bump for which `seeds ‖ bump` derives an off-curve
/// address.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<DerivedAddress, AddressingError> {
    if seeds.len() >= MAX_SEEDS {
        return Err(AddressingError::TooManySeeds {
            count: seeds.len() + 1,
            max: MAX_SEEDS,
        });
    }

    for bump in (0..=u8::MAX).rev() {
        let bump_seed = [bump];
        let mut with_bump: Vec<&[u8]> = Vec::with_capacity(seeds.len() + 1);
        with_bump.extend_from_slice(seeds);
        with_bump.push(&bump_seed);
        match create_program_address(&with_bump, program_id) {
            Ok(address) => return Ok(DerivedAddress { address, bump }),
            Err(AddressingError::OnCurve) => continue,
            Err(err) => return Err(err),
        }
    }
    Err(AddressingError::NoViableBump)
}

// =============================================================================
// ADDRESS BOOK
// =============================================================================

/// Derives the address of every record kind under one program namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressBook {
    program_id: Address,
}

impl AddressBook {
    #[must_use]
    pub const fn new(program_id: Address) -> Self {
        Self { program_id }
    }

    #[must_use]
    pub const fn program_id(&self) -> &Address {
        &self.program_id
    }

    fn derive(&self, seeds: &[&[u8]]) -> Result<DerivedAddress, AddressingError> {
        find_program_address(seeds, &self.program_id)
    }

    /// `["protocol"]`
    pub fn protocol(&self) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[SeedTag::Protocol.as_bytes()])
    }

    /// `["admin_state", admin]`
    pub fn admin_state(&self, admin: &Address) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[SeedTag::AdminState.as_bytes(), admin.as_bytes()])
    }

    /// `["collection", owner]`
    pub fn collection(&self, owner: &Address) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[SeedTag::Collection.as_bytes(), owner.as_bytes()])
    }

    /// `["placeholder", collection, id_le]`
    pub fn placeholder(
        &self,
        collection: &Address,
        id: u64,
    ) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[
            SeedTag::Placeholder.as_bytes(),
            collection.as_bytes(),
            &id.to_le_bytes(),
        ])
    }

    /// `["ainft", collection, id_le]`
    pub fn collectible(
        &self,
        collection: &Address,
        id: u64,
    ) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[
            SeedTag::Collectible.as_bytes(),
            collection.as_bytes(),
            &id.to_le_bytes(),
        ])
    }

    /// `["mint", record]`: the token attached to a placeholder or collectible.
    pub fn mint(&self, record: &Address) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[SeedTag::Mint.as_bytes(), record.as_bytes()])
    }

    /// `["auth"]`: the program authority over every token it issues.
    pub fn auth(&self) -> Result<DerivedAddress, AddressingError> {
        self.derive(&[SeedTag::Auth.as_bytes()])
    }
}

// =============================================================================
// TESTS
// =============================================================================
