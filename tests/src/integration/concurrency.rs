//! # Concurrency Scenarios
//!
//! Racing submissions against shared records. The in-memory ledger orders
//! commits; the service must turn every lost race into either a clean
//! re-run or a state-conflict error, never a double effect.

#[cfg(test)]
mod tests {
    use super::super::harness::*;
    use blindmint_core::{
        AccountFilter, AccountStore, Address, ChangeSet, CollectionQueries, InMemoryAccountStore,
        ManualClock, MintConfig, MintError, MintProtocolApi, MintService, StoreError,
        VersionedAccount,
    };
    use proptest::prelude::*;
    use std::sync::{Arc, Barrier};

    // =========================================================================
    // RACING BUYERS
    // =========================================================================

    #[test]
    fn test_concurrent_buys_single_winner() {
        const BUYERS: usize = 8;
        let h = Harness::new(1);
        h.mint(0);
        let buyers: Vec<Address> = (0..BUYERS).map(|i| h.buyer(0x80 + i as u8)).collect();
        let owner_start = h.balance(&h.owner);
        let barrier = Barrier::new(BUYERS);

        let results: Vec<Result<_, MintError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = buyers
                .iter()
                .map(|buyer| {
                    let service = &h.service;
                    let barrier = &barrier;
                    let owner = h.owner;
                    scope.spawn(move || {
                        barrier.wait();
                        service.buy_placeholder(buyer, &owner, 0)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("buyer thread panicked"))
                .collect()
        });

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        for result in results.iter().filter(|r| r.is_err()) {
            assert_eq!(result.as_ref().unwrap_err(), &MintError::AlreadyOwned { id: 0 });
        }

        // Exactly one price moved.
        assert_eq!(h.balance(&h.owner), owner_start + PRICE);
        let paid = buyers
            .iter()
            .filter(|b| h.balance(b) == FUNDS - PRICE)
            .count();
        assert_eq!(paid, 1);

        let placeholder = h.service.get_placeholder(&h.owner, 0).unwrap().unwrap();
        let winner = placeholder.buyer().unwrap();
        assert_eq!(h.balance(&winner), FUNDS - PRICE);
        assert_eq!(
            h.service.get_collection(&h.owner).unwrap().unwrap().sold_count,
            1
        );
    }

    #[test]
    fn test_concurrent_mints_all_land() {
        const MINTERS: u64 = 8;
        let h = Harness::new(MINTERS);
        let barrier = Barrier::new(MINTERS as usize);

        std::thread::scope(|scope| {
            for id in 0..MINTERS {
                let h = &h;
                let barrier = &barrier;
                scope.spawn(move || {
                    barrier.wait();
                    h.mint(id);
                });
            }
        });

        let collection = h.service.get_collection(&h.owner).unwrap().unwrap();
        assert_eq!(collection.mint_count, MINTERS);
        let ids: Vec<u64> = h
            .service
            .get_placeholders(&h.owner)
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, (0..MINTERS).collect::<Vec<_>>());
    }

    #[test]
    fn test_concurrent_mints_respect_supply() {
        const MINTERS: u64 = 8;
        let h = Harness::new(3);
        let barrier = Barrier::new(MINTERS as usize);

        let results: Vec<Result<_, MintError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..MINTERS)
                .map(|id| {
                    let h = &h;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        h.service
                            .create_placeholder(&h.admin, &h.owner, id, BLIND_URL)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("minter thread panicked"))
                .collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == MintError::SoldOut { max_supply: 3 }));
        let collection = h.service.get_collection(&h.owner).unwrap().unwrap();
        assert_eq!(collection.mint_count, 3);
    }

    // =========================================================================
    // CONTENTION LIMIT
    // =========================================================================

    /// Store whose commits always lose the race.
    struct AlwaysConflicting {
        inner: InMemoryAccountStore,
    }

    impl AccountStore for AlwaysConflicting {
        fn get(&self, address: &Address) -> Result<Option<VersionedAccount>, StoreError> {
            self.inner.get(address)
        }

        fn scan(
            &self,
            filters: &[AccountFilter],
        ) -> Result<Vec<(Address, VersionedAccount)>, StoreError> {
            self.inner.scan(filters)
        }

        fn commit(&self, changes: ChangeSet) -> Result<u64, StoreError> {
            let address = changes
                .reads
                .keys()
                .next()
                .copied()
                .unwrap_or(Address::ZERO);
            Err(StoreError::Conflict {
                address,
                expected: None,
                found: Some(1),
            })
        }
    }

    #[test]
    fn test_contention_exhausted() {
        let config = MintConfig {
            max_commit_attempts: 3,
            ..MintConfig::default()
        };
        let store = Arc::new(AlwaysConflicting {
            inner: InMemoryAccountStore::new(),
        });
        let service = MintService::new(store, Arc::new(ManualClock::new(SALE_START)), config);

        let err = service
            .initialize_protocol(&Address::new([1; 32]))
            .unwrap_err();
        assert_eq!(err, MintError::ContentionExhausted { attempts: 3 });
        assert!(err.is_retryable());

        let stats = service.stats();
        assert_eq!(stats.conflicts_retried, 3);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.committed, 0);
        assert!(service.get_protocol().unwrap().is_none());
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Step {
        Mint(u64),
        Buy(u64),
        Advance(i64),
        Close,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            4 => (0u64..6).prop_map(Step::Mint),
            2 => (0u64..6).prop_map(Step::Buy),
            1 => (0i64..20_000).prop_map(Step::Advance),
            1 => Just(Step::Close),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_mint_count_monotonic_and_bounded(steps in prop::collection::vec(step(), 1..24)) {
            let h = Harness::new(4);
            let buyer = h.buyer(0xB0);
            let mut last = 0;

            for step in steps {
                let _ = match step {
                    Step::Mint(id) => h
                        .service
                        .create_placeholder(&h.admin, &h.owner, id, BLIND_URL),
                    Step::Buy(id) => h.service.buy_placeholder(&buyer, &h.owner, id),
                    Step::Advance(secs) => {
                        h.clock.advance(secs);
                        continue;
                    }
                    Step::Close => h.service.close_collection(&h.admin, &h.owner),
                };

                let collection = h.service.get_collection(&h.owner).unwrap().unwrap();
                prop_assert!(collection.mint_count >= last);
                prop_assert!(collection.mint_count <= collection.max_supply);
                prop_assert!(collection.sold_count <= collection.mint_count);
                prop_assert!(collection.sale_start_time <= collection.sale_end_time);
                last = collection.mint_count;
            }
        }
    }
}
