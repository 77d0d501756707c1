//! # HTTP Metadata Source
//!
//! Client of the off-chain metadata service:
//!
//! - `GET {base_url}/{mint_count}/{buyer_hex}` →
//!   `{"metadataUrl": "...", "attributes": [{"trait_type": "...", "value": ...}]}`
//! - `GET {metadataUrl}` → `{"name": "...", ...}`
//!
//! Anything but a 200 is a hard failure.

use crate::config::MetadataConfig;
use crate::domain::value_objects::{Address, Attribute};
use crate::errors::MetadataError;
use crate::ports::outbound::{MetadataDocument, MetadataListing, MetadataSource};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ListingWire {
    #[serde(rename = "metadataUrl")]
    metadata_url: String,
    #[serde(default)]
    attributes: Vec<TraitWire>,
}

#[derive(Debug, Deserialize)]
struct TraitWire {
    trait_type: String,
    value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DocumentWire {
    name: String,
}

/// Renders a JSON trait value as text; strings lose their quotes.
fn value_to_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

impl From<ListingWire> for MetadataListing {
    fn from(wire: ListingWire) -> Self {
        Self {
            metadata_url: wire.metadata_url,
            attributes: wire
                .attributes
                .into_iter()
                .map(|t| Attribute::new(t.trait_type, value_to_text(t.value)))
                .collect(),
        }
    }
}

/// Metadata service client over HTTP.
pub struct HttpMetadataSource {
    client: Client,
    config: MetadataConfig,
}

impl HttpMetadataSource {
    pub fn new(config: MetadataConfig) -> Result<Self, MetadataError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| MetadataError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, MetadataError> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.config.bearer_token {
            request = request.header(self.config.auth_header.as_str(), token.as_str());
        }

        let response = request.send().await.map_err(|e| MetadataError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        debug!(url, status = status.as_u16(), "metadata response");
        if status != StatusCode::OK {
            return Err(MetadataError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| MetadataError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

/// `{base_url}/{mint_count}/{buyer_hex}` without doubled slashes.
#[must_use]
pub fn listing_url(base_url: &str, mint_count: u64, buyer: &Address) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        mint_count,
        buyer.to_hex()
    )
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch_listing(
        &self,
        base_url: &str,
        mint_count: u64,
        buyer: &Address,
    ) -> Result<MetadataListing, MetadataError> {
        let url = listing_url(base_url, mint_count, buyer);
        let wire: ListingWire = self.get_json(&url).await?;
        Ok(wire.into())
    }

    async fn fetch_document(&self, metadata_url: &str) -> Result<MetadataDocument, MetadataError> {
        let wire: DocumentWire = self.get_json(metadata_url).await?;
        Ok(MetadataDocument { name: wire.name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_url() {
        let buyer = Address::new([0xab; 32]);
        let url = listing_url("https://meta.example/api/", 4, &buyer);
        assert_eq!(url, format!("https://meta.example/api/4/{}", "ab".repeat(32)));
    }

    #[test]
    fn test_listing_wire_decoding() {
        let json = r#"{
            "metadataUrl": "https://meta.example/7.json",
            "attributes": [
                {"trait_type": "Background", "value": "Blue"},
                {"trait_type": "Level", "value": 3},
                {"trait_type": "Shiny", "value": true}
            ]
        }"#;
        let wire: ListingWire = serde_json::from_str(json).unwrap();
        let listing: MetadataListing = wire.into();
        assert_eq!(listing.metadata_url, "https://meta.example/7.json");
        assert_eq!(
            listing.attributes,
            vec![
                Attribute::new("Background", "Blue"),
                Attribute::new("Level", "3"),
                Attribute::new("Shiny", "true"),
            ]
        );
    }

    #[test]
    fn test_listing_without_url_is_rejected() {
        let result: Result<ListingWire, _> = serde_json::from_str(r#"{"attributes": []}"#);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transient() {
        let config = MetadataConfig {
            request_timeout_ms: 200,
            connect_timeout_ms: 200,
            ..MetadataConfig::default()
        };
        let source = HttpMetadataSource::new(config).unwrap();
        let err = source
            .fetch_document("http://127.0.0.1:9/none.json")
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Transport { .. }));
        assert!(err.is_transient());
    }
}
