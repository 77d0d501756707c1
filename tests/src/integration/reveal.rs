//! # Reveal Scenarios
//!
//! `RevealCoordinator` against canned metadata answers: the collectible is
//! created only when both fetches succeed.

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use blindmint_core::{
        listing_url, Address, Attribute, CollectionQueries, MetadataDocument, MetadataError,
        MetadataListing, MintError, MintProtocolApi, RevealApi, RevealCoordinator,
        StaticMetadataSource,
    };
    use std::sync::Arc;

    const FINAL_URL: &str = "https://meta.blindmint.test/final/0.json";

    struct RevealFixture {
        harness: Harness,
        metadata: Arc<StaticMetadataSource>,
        coordinator: RevealCoordinator<blindmint_core::InMemoryAccountStore, StaticMetadataSource>,
        buyer: Address,
    }

    /// One sold placeholder (id 0) and a coordinator with no answers yet.
    fn sold_placeholder() -> RevealFixture {
        let harness = Harness::new(2);
        let buyer = harness.buyer(0xB0);
        harness.mint(0);
        harness
            .service
            .buy_placeholder(&buyer, &harness.owner, 0)
            .unwrap();
        let metadata = Arc::new(StaticMetadataSource::new());
        let coordinator = RevealCoordinator::new(harness.service.clone(), metadata.clone());
        RevealFixture {
            harness,
            metadata,
            coordinator,
            buyer,
        }
    }

    fn listing() -> MetadataListing {
        MetadataListing {
            metadata_url: FINAL_URL.to_string(),
            attributes: vec![
                Attribute::new("background", "teal"),
                Attribute::new("level", "3"),
            ],
        }
    }

    #[tokio::test]
    async fn test_reveal_then_swap() {
        let f = sold_placeholder();
        let h = &f.harness;
        f.metadata.insert_listing(BASE_URL, 1, &f.buyer, listing());
        f.metadata.insert_document(
            FINAL_URL,
            MetadataDocument {
                name: "Genesis #0".to_string(),
            },
        );

        f.coordinator.reveal(&h.admin, &h.owner, 0).await.unwrap();
        assert_eq!(f.metadata.request_count(), 2);

        let collectible = h.service.get_collectible(&h.owner, 0).unwrap().unwrap();
        assert_eq!(collectible.name.as_str(), "Genesis #0");
        assert_eq!(collectible.url.as_str(), FINAL_URL);
        assert_eq!(collectible.attributes, listing().attributes);
        assert_eq!(collectible.rank, 0);

        h.service.transfer_nft(&f.buyer, &h.owner, 0).unwrap();
        let collectible = h.service.get_collectible(&h.owner, 0).unwrap().unwrap();
        assert_eq!(collectible.owner, f.buyer);

        let err = f.coordinator.reveal(&h.admin, &h.owner, 0).await.unwrap_err();
        assert_eq!(err, MintError::DuplicateId { id: 0 });
    }

    #[tokio::test]
    async fn test_listing_error_writes_nothing() {
        let f = sold_placeholder();
        let h = &f.harness;
        let url = listing_url(BASE_URL, 1, &f.buyer);
        f.metadata.insert_status(&url, 503);
        let before = h.service.store().snapshot();

        let err = f.coordinator.reveal(&h.admin, &h.owner, 0).await.unwrap_err();
        assert_eq!(
            err,
            MintError::Metadata(MetadataError::Status { url, status: 503 })
        );
        assert!(err.is_retryable());
        assert_eq!(h.service.store().snapshot(), before);
        assert!(h.service.get_collectible(&h.owner, 0).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_document_not_found() {
        let f = sold_placeholder();
        let h = &f.harness;
        f.metadata.insert_listing(BASE_URL, 1, &f.buyer, listing());

        let err = f.coordinator.reveal(&h.admin, &h.owner, 0).await.unwrap_err();
        assert!(matches!(
            err,
            MintError::Metadata(MetadataError::Status { status: 404, .. })
        ));
        assert!(!err.is_retryable());
        assert_eq!(
            h.service.get_collection(&h.owner).unwrap().unwrap().total_supply,
            0
        );
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let f = sold_placeholder();
        let h = &f.harness;
        f.metadata.insert_listing(BASE_URL, 1, &f.buyer, listing());
        f.metadata.insert_document(
            FINAL_URL,
            MetadataDocument {
                name: String::new(),
            },
        );

        let err = f.coordinator.reveal(&h.admin, &h.owner, 0).await.unwrap_err();
        assert!(matches!(
            err,
            MintError::Metadata(MetadataError::Incomplete(_))
        ));
    }

    #[tokio::test]
    async fn test_reveal_unsold_placeholder() {
        let f = sold_placeholder();
        let h = &f.harness;
        h.mint(1);

        let err = f.coordinator.reveal(&h.admin, &h.owner, 1).await.unwrap_err();
        assert_eq!(err, MintError::NotSold { id: 1 });
        assert_eq!(f.metadata.request_count(), 0);

        let err = f.coordinator.reveal(&h.admin, &h.owner, 9).await.unwrap_err();
        assert_eq!(err, MintError::PlaceholderNotFound { id: 9 });
    }

    #[tokio::test]
    async fn test_reveal_requires_admin() {
        let f = sold_placeholder();
        let h = &f.harness;
        f.metadata.insert_listing(BASE_URL, 1, &f.buyer, listing());
        f.metadata.insert_document(
            FINAL_URL,
            MetadataDocument {
                name: "Genesis #0".to_string(),
            },
        );

        let stranger = Address::new([0x55; 32]);
        let err = f.coordinator.reveal(&stranger, &h.owner, 0).await.unwrap_err();
        assert_eq!(err, MintError::Unauthorized { caller: stranger });
    }
}
