//! # Reveal & Swap Engine
//!
//! `create_nft` attaches final metadata to a new collectible. `transfer_nft`
//! reconciles a sold placeholder with its collectible: the collectible moves
//! to the placeholder holder and the placeholder token burns, in the same
//! change set. [`RevealCoordinator`] resolves the metadata off-chain first.

use super::collections::load_collection;
use super::placeholders::load_placeholder;
use super::registry::authorize_admin;
use super::unit_of_work::UnitOfWork;
use super::{MintService, OpContext};
use crate::domain::accounts::{
    AttributeKey, AttributeValue, Collectible, Inscription, Name, Placeholder, TokenMetadata,
    TokenMint, Url, MAX_ATTRIBUTES, UNINSCRIBED,
};
use crate::domain::invariants::{check_collection, check_settlement_invariant};
use crate::domain::lifecycle::CollectibleStatus;
use crate::domain::value_objects::Address;
use crate::errors::{MetadataError, MintError};
use crate::events::{MintEvent, Receipt};
use crate::ports::inbound::{CollectionQueries, MintProtocolApi, NewCollectible, RevealApi};
use crate::ports::outbound::{AccountStore, MetadataSource};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

pub(crate) fn create_nft(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    admin: &Address,
    owner: &Address,
    params: &NewCollectible,
) -> Result<(), MintError> {
    let name = Name::new(&params.name).map_err(|e| e.for_field("name"))?;
    let url = Url::new(&params.url).map_err(|e| e.for_field("url"))?;
    if params.attributes.len() > MAX_ATTRIBUTES {
        return Err(MintError::TooManyAttributes {
            max: MAX_ATTRIBUTES,
            actual: params.attributes.len(),
        });
    }
    for attribute in &params.attributes {
        AttributeKey::new(&attribute.key).map_err(|e| e.for_field("attribute key"))?;
        AttributeValue::new(&attribute.value).map_err(|e| e.for_field("attribute value"))?;
    }
    let inscription = Inscription::new(UNINSCRIBED).map_err(|e| e.for_field("inscription"))?;

    authorize_admin(uow, ctx, admin)?;
    let (collection_address, mut collection) = load_collection(uow, ctx, owner)?;

    let id = params.id;
    let derived = ctx.book.collectible(&collection_address, id)?;
    if uow.exists(&derived.address)? {
        return Err(MintError::DuplicateId { id });
    }
    // Every collectible pairs with a live placeholder, so reveals never
    // outrun mints.
    let placeholder_address = ctx.book.placeholder(&collection_address, id)?.address;
    let placeholder: Placeholder =
        uow.require(&placeholder_address, || MintError::PlaceholderNotFound { id })?;
    if placeholder.status.is_terminal() {
        return Err(MintError::AlreadySettled { id });
    }
    if collection.total_supply >= collection.mint_count {
        return Err(MintError::RevealExceedsMinted {
            minted: collection.mint_count,
            revealed: collection.total_supply,
        });
    }

    let rank = collection.total_supply;
    let collectible = Collectible {
        collection: collection_address,
        id,
        rank,
        owner: Address::ZERO,
        name,
        url,
        attributes: params.attributes.clone(),
        inscription,
        price: collection.price,
        created_at: ctx.now,
        status: CollectibleStatus::Unclaimed,
        bump: derived.bump,
    };

    let mut additional = vec![
        ("id".to_string(), id.to_string()),
        ("rank".to_string(), rank.to_string()),
    ];
    additional.extend(
        params
            .attributes
            .iter()
            .map(|a| (a.key.clone(), a.value.clone())),
    );
    let mut token = TokenMint::issue(
        derived.address,
        ctx.book.auth()?.address,
        TokenMetadata {
            name: params.name.clone(),
            symbol: collection.symbol.to_string(),
            uri: params.url.clone(),
            additional,
        },
    );
    token.mint_authority_revoked = true;
    let mint = ctx.book.mint(&derived.address)?.address;

    uow.create(admin, &derived.address, &collectible)?;
    uow.create(admin, &mint, &token)?;

    collection.total_supply += 1;
    check_collection(&collection)?;
    uow.write(&collection_address, &collection)?;

    uow.emit(MintEvent::CollectibleCreated {
        collection: collection_address,
        id,
        rank,
        collectible: derived.address,
    });
    Ok(())
}

/// Checks run in order: revealed, not yet settled, caller holds the
/// placeholder, both tokens under the program authority.
pub(crate) fn transfer_nft(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    caller: &Address,
    owner: &Address,
    id: u64,
) -> Result<(), MintError> {
    let (collection_address, _) = load_collection(uow, ctx, owner)?;

    let collectible_address = ctx.book.collectible(&collection_address, id)?.address;
    let mut collectible: Collectible =
        uow.require(&collectible_address, || MintError::NotRevealed { id })?;
    let mut placeholder = load_placeholder(uow, ctx, &collection_address, id)?;

    if placeholder.record.status.is_terminal() || collectible.status == CollectibleStatus::Claimed
    {
        return Err(MintError::AlreadySettled { id });
    }
    if placeholder.token.holder != *caller || !placeholder.token.is_live() {
        return Err(MintError::NotPlaceholderHolder {
            caller: *caller,
            id,
        });
    }

    let collectible_mint = ctx.book.mint(&collectible_address)?.address;
    let mut collectible_token: TokenMint = uow.require(&collectible_mint, || {
        MintError::InvariantViolation(format!("collectible {id} has no token"))
    })?;
    let authority = ctx.book.auth()?.address;
    for (mint, token) in [
        (placeholder.mint, &placeholder.token),
        (collectible_mint, &collectible_token),
    ] {
        if token.authority != authority {
            return Err(MintError::AuthorityMismatch {
                mint,
                expected: authority,
                actual: token.authority,
            });
        }
    }

    placeholder.record.status = placeholder.record.status.swap(id)?;
    collectible.status = collectible.status.claim(id)?;
    collectible.owner = *caller;
    collectible_token.holder = *caller;
    placeholder.token.supply = 0;
    placeholder.token.holder = Address::ZERO;

    if !check_settlement_invariant(&placeholder.record, &placeholder.token) {
        return Err(MintError::InvariantViolation(
            "swapped placeholder token still live".into(),
        ));
    }
    uow.write(&collectible_address, &collectible)?;
    uow.write(&collectible_mint, &collectible_token)?;
    uow.write(&placeholder.address, &placeholder.record)?;
    uow.write(&placeholder.mint, &placeholder.token)?;

    uow.emit(MintEvent::CollectibleClaimed {
        collection: collection_address,
        id,
        owner: *caller,
    });
    uow.emit(MintEvent::PlaceholderBurned {
        collection: collection_address,
        id,
    });
    Ok(())
}

// =============================================================================
// REVEAL COORDINATOR
// =============================================================================

/// Fetches off-chain metadata for a sold placeholder, then creates its
/// collectible. Nothing is written unless every fetch succeeds.
pub struct RevealCoordinator<S: AccountStore, M: MetadataSource> {
    service: Arc<MintService<S>>,
    metadata: Arc<M>,
}

impl<S: AccountStore, M: MetadataSource> RevealCoordinator<S, M> {
    pub fn new(service: Arc<MintService<S>>, metadata: Arc<M>) -> Self {
        Self { service, metadata }
    }

    #[must_use]
    pub fn service(&self) -> &Arc<MintService<S>> {
        &self.service
    }
}

#[async_trait]
impl<S: AccountStore, M: MetadataSource> RevealApi for RevealCoordinator<S, M> {
    #[instrument(skip_all, fields(admin = %admin, owner = %owner, id = id))]
    async fn reveal(
        &self,
        admin: &Address,
        owner: &Address,
        id: u64,
    ) -> Result<Receipt, MintError> {
        let collection = self
            .service
            .get_collection(owner)?
            .ok_or(MintError::CollectionNotFound { owner: *owner })?;
        if self.service.get_collectible(owner, id)?.is_some() {
            return Err(MintError::DuplicateId { id });
        }
        let placeholder = self
            .service
            .get_placeholder(owner, id)?
            .ok_or(MintError::PlaceholderNotFound { id })?;
        let buyer = placeholder.buyer().ok_or(MintError::NotSold { id })?;

        let listing = self
            .metadata
            .fetch_listing(collection.url.as_str(), collection.mint_count, &buyer)
            .await?;
        if listing.metadata_url.is_empty() {
            return Err(MetadataError::Incomplete("empty metadataUrl".into()).into());
        }
        let document = self.metadata.fetch_document(&listing.metadata_url).await?;
        if document.name.is_empty() {
            return Err(MetadataError::Incomplete("empty name".into()).into());
        }
        info!(name = %document.name, attributes = listing.attributes.len(), "metadata resolved");

        self.service.create_nft(
            admin,
            owner,
            NewCollectible {
                id,
                url: listing.metadata_url,
                name: document.name,
                attributes: listing.attributes,
            },
        )
    }
}
