//! # Value Objects
//!
//! Immutable primitives shared by every record: identities, balances,
//! timestamps and fixed-width text.

use crate::errors::TextError;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Native ledger unit.
pub type Lamports = u64;

/// Seconds since the Unix epoch, as reported by the ledger clock.
pub type UnixTimestamp = i64;

// =============================================================================
// ADDRESS (32 bytes)
// =============================================================================

/// A 32-byte account identity.
///
/// Wallet identities are Ed25519 public keys; record identities are derived
/// addresses that lie off the curve.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The all-zero address, used for "nobody".
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates an address from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self)
    }

    /// Parses 64 hex characters, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim_start_matches("0x"), &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full lowercase hex, no prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "0x{}...{}", &hex[..8], &hex[60..])
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 32] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// =============================================================================
// FIXED-WIDTH TEXT
// =============================================================================

/// UTF-8 text stored in exactly `N` bytes, right-padded with NUL.
///
/// Encodes as `N` raw bytes so the enclosing record keeps a constant size
/// and every later field keeps a stable offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> FixedText<N> {
    /// Capacity in bytes.
    pub const CAPACITY: usize = N;

    /// Builds a field from `value`; fails if it does not fit or contains NUL.
    pub fn new(value: &str) -> Result<Self, TextError> {
        let raw = value.as_bytes();
        if raw.len() > N {
            return Err(TextError::TooLong {
                max: N,
                actual: raw.len(),
            });
        }
        if raw.contains(&0) {
            return Err(TextError::InteriorNul);
        }
        let mut bytes = [0u8; N];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self { bytes })
    }

    /// The empty string.
    #[must_use]
    pub const fn empty() -> Self {
        Self { bytes: [0u8; N] }
    }

    /// Text without padding. Invalid UTF-8 (foreign writers) reads as empty.
    #[must_use]
    pub fn as_str(&self) -> &str {
        let len = self.len();
        std::str::from_utf8(&self.bytes[..len]).unwrap_or_default()
    }

    /// Used length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.iter().position(|b| *b == 0).unwrap_or(N)
    }

    /// Returns true if no text is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The padded bytes exactly as stored.
    #[must_use]
    pub const fn as_padded(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> Serialize for FixedText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(N)?;
        for byte in &self.bytes {
            tuple.serialize_element(byte)?;
        }
        tuple.end()
    }
}

impl<'de, const N: usize> Deserialize<'de> for FixedText<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FixedTextVisitor<const M: usize>(PhantomData<[u8; M]>);

        impl<'de, const M: usize> Visitor<'de> for FixedTextVisitor<M> {
            type Value = FixedText<M>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{M} padded text bytes")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut bytes = [0u8; M];
                for (i, slot) in bytes.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                Ok(FixedText { bytes })
            }
        }

        deserializer.deserialize_tuple(N, FixedTextVisitor::<N>(PhantomData))
    }
}

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// One `{key, value}` trait of a revealed collectible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::new([0xab; 32]);
        let hex = addr.to_hex();
        assert_eq!(hex.len(), 64);
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
        assert_eq!(Address::from_hex(&format!("0x{hex}")).unwrap(), addr);
        assert!(Address::from_hex("abcd").is_err());
    }

    #[test]
    fn test_address_display_is_abbreviated() {
        let addr = Address::new([0x11; 32]);
        assert_eq!(addr.to_string(), "0x11111111...1111");
        assert!(Address::ZERO.is_zero());
        assert!(!addr.is_zero());
    }

    #[test]
    fn test_fixed_text_bounds() {
        assert_eq!(FixedText::<5>::new("alice").unwrap().as_str(), "alice");
        assert_eq!(
            FixedText::<5>::new("mallory"),
            Err(TextError::TooLong { max: 5, actual: 7 })
        );
        assert_eq!(FixedText::<5>::new("a\0b"), Err(TextError::InteriorNul));
        assert!(FixedText::<5>::new("").unwrap().is_empty());
    }

    #[test]
    fn test_fixed_text_encodes_to_exact_width() {
        let text = FixedText::<10>::new("SYM").unwrap();
        let encoded = bincode::serialize(&text).unwrap();
        assert_eq!(encoded.len(), 10);
        assert_eq!(&encoded[..3], b"SYM");
        assert!(encoded[3..].iter().all(|b| *b == 0));

        let decoded: FixedText<10> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_fixed_text_wide_field() {
        let url = "https://example.com/".repeat(9);
        let text = FixedText::<200>::new(&url).unwrap();
        let encoded = bincode::serialize(&text).unwrap();
        assert_eq!(encoded.len(), 200);
        let decoded: FixedText<200> = bincode::deserialize(&encoded).unwrap();
        assert_eq!(decoded.as_str(), url);
    }
}
