//! # Static Metadata Source
//!
//! Serves canned answers keyed by the exact URL the HTTP client would hit.
//! Unknown URLs answer 404.

use crate::adapters::http_metadata::listing_url;
use crate::domain::value_objects::Address;
use crate::errors::MetadataError;
use crate::ports::outbound::{MetadataDocument, MetadataListing, MetadataSource};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
enum Answer {
    Listing(MetadataListing),
    Document(MetadataDocument),
    Status(u16),
}

/// In-process stand-in for the metadata service.
#[derive(Debug, Default)]
pub struct StaticMetadataSource {
    answers: RwLock<HashMap<String, Answer>>,
    requests: AtomicU64,
}

impl StaticMetadataSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_listing(
        &self,
        base_url: &str,
        mint_count: u64,
        buyer: &Address,
        listing: MetadataListing,
    ) {
        self.answers.write().insert(
            listing_url(base_url, mint_count, buyer),
            Answer::Listing(listing),
        );
    }

    pub fn insert_document(&self, url: &str, document: MetadataDocument) {
        self.answers
            .write()
            .insert(url.to_string(), Answer::Document(document));
    }

    /// Makes `url` answer with a non-200 `status`.
    pub fn insert_status(&self, url: &str, status: u16) {
        self.answers
            .write()
            .insert(url.to_string(), Answer::Status(status));
    }

    /// Requests served so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    fn lookup(&self, url: &str) -> Result<Answer, MetadataError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        match self.answers.read().get(url).cloned() {
            Some(Answer::Status(status)) => Err(MetadataError::Status {
                url: url.to_string(),
                status,
            }),
            Some(answer) => Ok(answer),
            None => Err(MetadataError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

fn wrong_shape(url: &str) -> MetadataError {
    MetadataError::Decode {
        url: url.to_string(),
        reason: "unexpected document shape".into(),
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn fetch_listing(
        &self,
        base_url: &str,
        mint_count: u64,
        buyer: &Address,
    ) -> Result<MetadataListing, MetadataError> {
        let url = listing_url(base_url, mint_count, buyer);
        match self.lookup(&url)? {
            Answer::Listing(listing) => Ok(listing),
            _ => Err(wrong_shape(&url)),
        }
    }

    async fn fetch_document(&self, metadata_url: &str) -> Result<MetadataDocument, MetadataError> {
        match self.lookup(metadata_url)? {
            Answer::Document(document) => Ok(document),
            _ => Err(wrong_shape(metadata_url)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_answers() {
        let source = StaticMetadataSource::new();
        let buyer = Address::new([1; 32]);
        source.insert_listing(
            "https://meta",
            2,
            &buyer,
            MetadataListing {
                metadata_url: "https://meta/doc".into(),
                attributes: vec![],
            },
        );
        source.insert_document(
            "https://meta/doc",
            MetadataDocument {
                name: "Orb".into(),
            },
        );

        let listing = source.fetch_listing("https://meta", 2, &buyer).await.unwrap();
        let doc = source.fetch_document(&listing.metadata_url).await.unwrap();
        assert_eq!(doc.name, "Orb");
        assert_eq!(source.request_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_and_failing_urls() {
        let source = StaticMetadataSource::new();
        let err = source.fetch_document("https://meta/missing").await.unwrap_err();
        assert_eq!(
            err,
            MetadataError::Status {
                url: "https://meta/missing".into(),
                status: 404
            }
        );

        source.insert_status("https://meta/flaky", 503);
        let err = source.fetch_document("https://meta/flaky").await.unwrap_err();
        assert!(err.is_transient());
    }
}
