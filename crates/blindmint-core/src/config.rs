//! Protocol configuration with validation.

use crate::domain::value_objects::{Address, Lamports};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::time::Duration;

/// Program namespace used when none is configured.
pub const DEFAULT_PROGRAM_ID: Address = Address::new([
    0xa1, 0x7c, 0xfe, 0x36, 0x74, 0x08, 0xfd, 0xa8, 0x7e, 0x2b, 0x40, 0x61, 0xd8, 0xa0, 0x37, 0x31,
    0x0a, 0x63, 0x40, 0x96, 0x65, 0xe8, 0xdf, 0x0c, 0x56, 0xcf, 0x8a, 0x50, 0x11, 0xea, 0x8d, 0x1a,
]);

/// Main protocol configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    /// Address-derivation namespace
    #[serde(serialize_with = "address_to_hex", deserialize_with = "address_from_hex")]
    pub program_id: Address,
    /// Rent charged for new records
    pub rent: RentSchedule,
    /// Operator fee moved from the collection owner to the payer on airdrop
    pub airdrop_fee: Lamports,
    /// Optimistic commit attempts before giving up
    pub max_commit_attempts: u32,
    /// Metadata service client
    pub metadata: MetadataConfig,
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            rent: RentSchedule::default(),
            airdrop_fee: 0,
            max_commit_attempts: 8,
            metadata: MetadataConfig::default(),
        }
    }
}

impl MintConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_commit_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_commit_attempts cannot be 0".into(),
            ));
        }
        if self.rent.lamports_per_byte_year == 0 || self.rent.exemption_threshold_years == 0 {
            return Err(ConfigError::Invalid("rent schedule cannot be free".into()));
        }
        if self.metadata.request_timeout_ms == 0 || self.metadata.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout(
                "metadata timeouts cannot be 0".into(),
            ));
        }
        if self.metadata.bearer_token.is_some() && self.metadata.auth_header.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "metadata token set without a header name".into(),
            ));
        }
        Ok(())
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BM_PROGRAM_ID`: 32-byte hex namespace (default: built-in)
    /// - `BM_AIRDROP_FEE`: lamports (default: 0)
    /// - `BM_MAX_COMMIT_ATTEMPTS`: (default: 8)
    /// - `BM_METADATA_AUTH_HEADER`: header carrying the token (default: Authorization)
    /// - `BM_METADATA_TOKEN`: token sent to the metadata service (default: none)
    /// - `BM_METADATA_TIMEOUT_MS`: request timeout (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Self::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("BM_PROGRAM_ID") {
            config.program_id = Address::from_hex(raw.trim())
                .map_err(|e| ConfigError::InvalidValue("BM_PROGRAM_ID", e.to_string()))?;
        }
        if let Some(fee) = parse_var(&lookup, "BM_AIRDROP_FEE")? {
            config.airdrop_fee = fee;
        }
        if let Some(attempts) = parse_var(&lookup, "BM_MAX_COMMIT_ATTEMPTS")? {
            config.max_commit_attempts = attempts;
        }
        if let Some(header) = lookup("BM_METADATA_AUTH_HEADER") {
            config.metadata.auth_header = header;
        }
        config.metadata.bearer_token = lookup("BM_METADATA_TOKEN").filter(|t| !t.is_empty());
        if let Some(timeout) = parse_var(&lookup, "BM_METADATA_TIMEOUT_MS")? {
            config.metadata.request_timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidValue(key, e.to_string()))
        })
        .transpose()
}

fn address_to_hex<S: Serializer>(addr: &Address, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&addr.to_hex())
}

fn address_from_hex<'de, D: Deserializer<'de>>(d: D) -> Result<Address, D::Error> {
    let raw = String::deserialize(d)?;
    Address::from_hex(&raw).map_err(serde::de::Error::custom)
}

/// Rent schedule for stored records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RentSchedule {
    /// Bytes of bookkeeping charged on top of the data
    pub account_overhead: u64,
    pub lamports_per_byte_year: Lamports,
    pub exemption_threshold_years: u64,
}

impl Default for RentSchedule {
    fn default() -> Self {
        Self {
            account_overhead: 128,
            lamports_per_byte_year: 3480,
            exemption_threshold_years: 2,
        }
    }
}

impl RentSchedule {
    /// Lamports a record of `data_len` bytes must hold.
    #[must_use]
    pub fn minimum_balance(&self, data_len: usize) -> Lamports {
        (self.account_overhead.saturating_add(data_len as u64))
            .saturating_mul(self.lamports_per_byte_year)
            .saturating_mul(self.exemption_threshold_years)
    }
}

/// Metadata service client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Header name carrying `bearer_token`
    pub auth_header: String,
    pub bearer_token: Option<String>,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            auth_header: "Authorization".to_string(),
            bearer_token: None,
            request_timeout_ms: 10_000,
            connect_timeout_ms: 2_000,
        }
    }
}

impl MetadataConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable could not be parsed
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
