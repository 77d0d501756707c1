//! Read path. Pure reads of committed state; nothing here opens a unit of
//! work.

use super::MintService;
use crate::domain::accounts::{
    layout, AccountRecord, AdminState, Collectible, Collection, Placeholder, ProtocolState,
    TokenMint,
};
use crate::domain::value_objects::{Address, Lamports};
use crate::errors::MintError;
use crate::ports::inbound::CollectionQueries;
use crate::ports::outbound::{AccountFilter, AccountStore};
use tracing::debug;

impl<S: AccountStore> MintService<S> {
    fn fetch<R: AccountRecord>(&self, address: &Address) -> Result<Option<R>, MintError> {
        match self.store.get(address)? {
            Some(v) if !v.account.data.is_empty() => Ok(Some(R::decode(&v.account.data)?)),
            _ => Ok(None),
        }
    }

    /// Decodes every scan hit, skipping entries of another shape.
    fn scan_records<R: AccountRecord>(
        &self,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Address, R)>, MintError> {
        let hits = self.store.scan(filters)?;
        Ok(hits
            .into_iter()
            .filter_map(|(address, v)| match R::decode(&v.account.data) {
                Ok(record) => Some((address, record)),
                Err(err) => {
                    debug!(%address, error = %err, "skipping undecodable account");
                    None
                }
            })
            .collect())
    }
}

impl<S: AccountStore> CollectionQueries for MintService<S> {
    fn get_protocol(&self) -> Result<Option<ProtocolState>, MintError> {
        self.fetch(&self.book.protocol()?.address)
    }

    fn get_admin(&self, admin: &Address) -> Result<Option<AdminState>, MintError> {
        self.fetch(&self.book.admin_state(admin)?.address)
    }

    fn get_collection(&self, owner: &Address) -> Result<Option<Collection>, MintError> {
        self.fetch(&self.book.collection(owner)?.address)
    }

    fn get_collection_url(&self, owner: &Address) -> Result<Option<String>, MintError> {
        Ok(self.get_collection(owner)?.map(|c| c.url.to_string()))
    }

    fn get_all_collections(
        &self,
        reference: Option<&Address>,
    ) -> Result<Vec<(Address, Collection)>, MintError> {
        let mut filters = vec![
            AccountFilter::DataSize(layout::COLLECTION_LEN),
            AccountFilter::Memcmp {
                offset: 0,
                bytes: Collection::discriminator().to_vec(),
            },
        ];
        if let Some(reference) = reference {
            filters.push(AccountFilter::Memcmp {
                offset: layout::COLLECTION_REFERENCE,
                bytes: reference.as_bytes().to_vec(),
            });
        }
        self.scan_records(&filters)
    }

    fn get_placeholder(&self, owner: &Address, id: u64) -> Result<Option<Placeholder>, MintError> {
        let collection = self.book.collection(owner)?.address;
        self.fetch(&self.book.placeholder(&collection, id)?.address)
    }

    fn get_placeholders(&self, owner: &Address) -> Result<Vec<Placeholder>, MintError> {
        let collection = self.book.collection(owner)?.address;
        let filters = [
            AccountFilter::DataSize(layout::PLACEHOLDER_LEN),
            AccountFilter::Memcmp {
                offset: 0,
                bytes: Placeholder::discriminator().to_vec(),
            },
            AccountFilter::Memcmp {
                offset: layout::PLACEHOLDER_COLLECTION,
                bytes: collection.as_bytes().to_vec(),
            },
        ];
        let mut placeholders: Vec<Placeholder> = self
            .scan_records(&filters)?
            .into_iter()
            .map(|(_, p)| p)
            .collect();
        placeholders.sort_by_key(|p| p.id);
        Ok(placeholders)
    }

    fn get_collectible(&self, owner: &Address, id: u64) -> Result<Option<Collectible>, MintError> {
        let collection = self.book.collection(owner)?.address;
        self.fetch(&self.book.collectible(&collection, id)?.address)
    }

    fn get_token(&self, record: &Address) -> Result<Option<TokenMint>, MintError> {
        self.fetch(&self.book.mint(record)?.address)
    }

    fn balance_of(&self, address: &Address) -> Result<Lamports, MintError> {
        Ok(self
            .store
            .get(address)?
            .map_or(0, |v| v.account.lamports))
    }
}
