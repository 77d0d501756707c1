//! # Airdrop Attestations
//!
//! An airdrop replaces payment with an Ed25519 signature by the collection
//! owner over
//!
//! ```text
//! "blindmint/airdrop/v1" ‖ collection ‖ id_le8 ‖ recipient
//! ```
//!
//! so the proof is bound to exactly one placeholder and one recipient.

use crate::domain::value_objects::Address;
use crate::errors::MintError;
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

/// Domain prefix of every airdrop message.
pub const AIRDROP_DOMAIN: &[u8] = b"blindmint/airdrop/v1";

/// Bytes signed to authorise airdropping placeholder `id` to `recipient`.
#[must_use]
pub fn airdrop_message(collection: &Address, id: u64, recipient: &Address) -> Vec<u8> {
    let mut msg = Vec::with_capacity(AIRDROP_DOMAIN.len() + 32 + 8 + 32);
    msg.extend_from_slice(AIRDROP_DOMAIN);
    msg.extend_from_slice(collection.as_bytes());
    msg.extend_from_slice(&id.to_le_bytes());
    msg.extend_from_slice(recipient.as_bytes());
    msg
}

/// A signed airdrop authorisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AirdropProof {
    /// Public key that produced the signature.
    pub signer: Address,
    pub signature: [u8; 64],
}

impl AirdropProof {
    /// Signs an airdrop authorisation with `key`.
    #[must_use]
    pub fn sign(key: &SigningKey, collection: &Address, id: u64, recipient: &Address) -> Self {
        let signature = key.sign(&airdrop_message(collection, id, recipient));
        Self {
            signer: Address::new(key.verifying_key().to_bytes()),
            signature: signature.to_bytes(),
        }
    }

    /// Checks that `expected_signer` signed this exact authorisation.
    pub fn verify(
        &self,
        expected_signer: &Address,
        collection: &Address,
        id: u64,
        recipient: &Address,
    ) -> Result<(), MintError> {
        if self.signer != *expected_signer {
            return Err(MintError::InvalidSignature(format!(
                "signed by {}, expected {}",
                self.signer, expected_signer
            )));
        }
        let key = VerifyingKey::from_bytes(self.signer.as_bytes())
            .map_err(|_| MintError::InvalidSignature("signer is not a valid public key".into()))?;
        let sig = Signature::from_bytes(&self.signature);
        key.verify_strict(&airdrop_message(collection, id, recipient), &sig)
            .map_err(|_| MintError::InvalidSignature("signature does not verify".into()))
    }
}
