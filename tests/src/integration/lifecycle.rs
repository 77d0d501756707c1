//! # Lifecycle Scenarios
//!
//! Full mint → buy → reveal → swap runs through the public API, checking the
//! collection counters and both tokens after every step.

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use blindmint_core::{
        AirdropProof, CollectibleStatus, CollectionQueries, ErrorKind, MintConfig, MintError,
        MintEvent, MintProtocolApi, PlaceholderStatus,
    };

    // =========================================================================
    // END-TO-END
    // =========================================================================

    /// max_supply 1, placeholder 7: buy, reveal, swap.
    #[test]
    fn test_single_item_collection_swap() {
        let h = Harness::new(1);
        let buyer = h.buyer(0xB0);

        h.mint(7);
        h.service.buy_placeholder(&buyer, &h.owner, 7).unwrap();
        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(7))
            .unwrap();
        let receipt = h.service.transfer_nft(&buyer, &h.owner, 7).unwrap();
        assert!(receipt
            .events
            .iter()
            .any(|e| matches!(e, MintEvent::PlaceholderBurned { id: 7, .. })));

        let placeholder = h.service.get_placeholder(&h.owner, 7).unwrap().unwrap();
        assert_eq!(placeholder.status, PlaceholderStatus::Swapped);
        let placeholder_token = h
            .service
            .get_token(&h.placeholder_address(7))
            .unwrap()
            .unwrap();
        assert_eq!(placeholder_token.supply, 0);

        let collectible = h.service.get_collectible(&h.owner, 7).unwrap().unwrap();
        assert_eq!(collectible.owner, buyer);
        assert_eq!(collectible.status, CollectibleStatus::Claimed);
        assert_eq!(collectible.attributes.len(), 2);
        let collectible_token = h
            .service
            .get_token(&h.collectible_address(7))
            .unwrap()
            .unwrap();
        assert_eq!(collectible_token.holder, buyer);
        assert_eq!(collectible_token.metadata.field("eyes"), Some("laser"));

        let collection = h.service.get_collection(&h.owner).unwrap().unwrap();
        assert_eq!(collection.total_supply, 1);
        assert_eq!(collection.mint_count, 1);
        assert_eq!(collection.sold_count, 1);
    }

    #[test]
    fn test_proceeds_reach_owner() {
        let h = Harness::new(3);
        let owner_start = h.balance(&h.owner);
        for id in 0..3 {
            h.mint(id);
            let buyer = h.buyer(0xC0 + id as u8);
            h.service.buy_placeholder(&buyer, &h.owner, id).unwrap();
            assert_eq!(h.balance(&buyer), FUNDS - PRICE);
        }
        assert_eq!(h.balance(&h.owner), owner_start + 3 * PRICE);
    }

    #[test]
    fn test_buy_and_airdrop_intermix() {
        let config = MintConfig {
            airdrop_fee: 5_000,
            ..MintConfig::default()
        };
        let h = Harness::with_config(2, config);
        h.mint(0);
        h.mint(1);

        let buyer = h.buyer(0xB0);
        h.service.buy_placeholder(&buyer, &h.owner, 0).unwrap();

        let recipient = blindmint_core::Address::new([0xD0; 32]);
        let proof = AirdropProof::sign(&h.owner_key, &h.collection_address(), 1, &recipient);
        h.service
            .airdrop_placeholder(&h.admin, &h.owner, 1, &recipient, &proof)
            .unwrap();

        // An airdropped placeholder cannot be bought afterwards.
        assert_eq!(
            h.service.buy_placeholder(&buyer, &h.owner, 1).unwrap_err(),
            MintError::AlreadyOwned { id: 1 }
        );
        // Nor can a bought one be airdropped.
        let late = AirdropProof::sign(&h.owner_key, &h.collection_address(), 0, &recipient);
        assert_eq!(
            h.service
                .airdrop_placeholder(&h.admin, &h.owner, 0, &recipient, &late)
                .unwrap_err(),
            MintError::AlreadyOwned { id: 0 }
        );

        // The recipient swaps like any buyer.
        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(1))
            .unwrap();
        h.service.transfer_nft(&recipient, &h.owner, 1).unwrap();
        let collectible = h.service.get_collectible(&h.owner, 1).unwrap().unwrap();
        assert_eq!(collectible.owner, recipient);
        assert_eq!(
            h.service.get_collection(&h.owner).unwrap().unwrap().sold_count,
            2
        );
    }

    // =========================================================================
    // FAILURE PROPERTIES
    // =========================================================================

    #[test]
    fn test_duplicate_collectible_keeps_first() {
        let h = Harness::new(2);
        h.mint(0);
        h.mint(1);
        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(0))
            .unwrap();
        let first = h.service.get_collectible(&h.owner, 0).unwrap().unwrap();

        let mut second = collectible_params(0);
        second.name = "Impostor".to_string();
        let err = h.service.create_nft(&h.admin, &h.owner, second).unwrap_err();
        assert_eq!(err, MintError::DuplicateId { id: 0 });
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert!(!err.is_retryable());

        assert_eq!(h.service.get_collectible(&h.owner, 0).unwrap().unwrap(), first);
        assert_eq!(
            h.service.get_collection(&h.owner).unwrap().unwrap().total_supply,
            1
        );
    }

    /// Burned and swapped are exclusive: a burned id never gets a
    /// collectible, and a revealed id cannot be burned.
    #[test]
    fn test_burn_and_reveal_exclude_each_other() {
        let h = Harness::new(2);
        let buyer = h.buyer(0xB0);
        h.mint(0);
        h.mint(1);
        h.service.buy_placeholder(&buyer, &h.owner, 0).unwrap();
        h.service.buy_placeholder(&buyer, &h.owner, 1).unwrap();

        h.service.burn_placeholder(&h.admin, &h.owner, 0).unwrap();
        let err = h
            .service
            .create_nft(&h.admin, &h.owner, collectible_params(0))
            .unwrap_err();
        assert_eq!(err, MintError::AlreadySettled { id: 0 });

        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(1))
            .unwrap();
        let err = h.service.burn_placeholder(&h.admin, &h.owner, 1).unwrap_err();
        assert_eq!(err, MintError::AlreadyRevealed { id: 1 });
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        h.service.transfer_nft(&buyer, &h.owner, 1).unwrap();

        let collection = h.service.get_collection(&h.owner).unwrap().unwrap();
        assert_eq!(collection.total_supply, 1);
        assert!(h.service.get_collectible(&h.owner, 0).unwrap().is_none());
    }

    /// max_supply 1: a reveal for an id that was never minted must not
    /// strand the buyer of the one real placeholder.
    #[test]
    fn test_stray_reveal_does_not_strand_buyer() {
        let h = Harness::new(1);
        let buyer = h.buyer(0xB0);
        h.mint(7);
        h.service.buy_placeholder(&buyer, &h.owner, 7).unwrap();

        let err = h
            .service
            .create_nft(&h.admin, &h.owner, collectible_params(99))
            .unwrap_err();
        assert_eq!(err, MintError::PlaceholderNotFound { id: 99 });

        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(7))
            .unwrap();
        h.service.transfer_nft(&buyer, &h.owner, 7).unwrap();
        assert_eq!(
            h.service.get_collectible(&h.owner, 7).unwrap().unwrap().owner,
            buyer
        );
    }

    #[test]
    fn test_transfer_retry_leaves_state_unchanged() {
        let h = Harness::new(1);
        let buyer = h.buyer(0xB0);
        h.mint(0);
        h.service.buy_placeholder(&buyer, &h.owner, 0).unwrap();
        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(0))
            .unwrap();
        h.service.transfer_nft(&buyer, &h.owner, 0).unwrap();

        let settled = h.service.store().snapshot();
        let err = h.service.transfer_nft(&buyer, &h.owner, 0).unwrap_err();
        assert_eq!(err, MintError::AlreadySettled { id: 0 });
        assert_eq!(h.service.store().snapshot(), settled);
    }

    #[test]
    fn test_window_errors_mutate_nothing() {
        let h = Harness::new(2);
        let before = h.service.store().snapshot();

        h.clock.set(SALE_START - 1);
        let err = h
            .service
            .create_placeholder(&h.admin, &h.owner, 0, BLIND_URL)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Window);
        assert!(err.is_retryable());

        h.clock.set(SALE_END + 1);
        let err = h
            .service
            .create_placeholder(&h.admin, &h.owner, 0, BLIND_URL)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Window);
        assert!(!err.is_retryable());

        assert_eq!(h.service.store().snapshot(), before);
    }

    #[test]
    fn test_remove_self_keeps_admin_state() {
        let h = Harness::new(1);
        let before = h.service.get_admin(&h.admin).unwrap();
        assert_eq!(
            h.service.remove_admin(&h.admin, &h.admin).unwrap_err(),
            MintError::CannotRemoveSelf { admin: h.admin }
        );
        assert_eq!(h.service.get_admin(&h.admin).unwrap(), before);
    }

    #[test]
    fn test_locked_protocol_still_settles() {
        let h = Harness::new(1);
        let buyer = h.buyer(0xB0);
        h.mint(0);
        h.service.buy_placeholder(&buyer, &h.owner, 0).unwrap();
        h.service
            .create_nft(&h.admin, &h.owner, collectible_params(0))
            .unwrap();
        h.service.lock_protocol(&h.admin).unwrap();

        let err = h
            .service
            .close_collection(&h.admin, &h.owner)
            .unwrap_err();
        assert_eq!(err, MintError::ProtocolLocked);
        assert_eq!(err.kind(), ErrorKind::Authorization);

        h.service.transfer_nft(&buyer, &h.owner, 0).unwrap();
    }
}
