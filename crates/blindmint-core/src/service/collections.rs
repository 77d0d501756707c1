//! # Collection Manager

use super::registry::authorize_admin;
use super::unit_of_work::UnitOfWork;
use super::OpContext;
use crate::domain::accounts::{Collection, Name, StableId, Symbol, Url};
use crate::domain::invariants::check_collection;
use crate::domain::value_objects::Address;
use crate::errors::MintError;
use crate::events::MintEvent;
use crate::ports::inbound::NewCollection;

/// Loads the collection keyed by `owner`.
pub(crate) fn load_collection(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    owner: &Address,
) -> Result<(Address, Collection), MintError> {
    let address = ctx.book.collection(owner)?.address;
    let collection = uow.require(&address, || MintError::CollectionNotFound { owner: *owner })?;
    Ok((address, collection))
}

pub(crate) fn create_collection(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    admin: &Address,
    params: &NewCollection,
) -> Result<(), MintError> {
    if params.sale_start > params.sale_end {
        return Err(MintError::InvalidWindow {
            start: params.sale_start,
            end: params.sale_end,
        });
    }
    if params.max_supply == 0 {
        return Err(MintError::InvalidSupply);
    }
    let name = Name::new(&params.name).map_err(|e| e.for_field("name"))?;
    let symbol = Symbol::new(&params.symbol).map_err(|e| e.for_field("symbol"))?;
    let url = Url::new(&params.url).map_err(|e| e.for_field("url"))?;
    let stable_id = StableId::new(&params.stable_id).map_err(|e| e.for_field("stable_id"))?;

    authorize_admin(uow, ctx, admin)?;

    let derived = ctx.book.collection(&params.owner)?;
    if uow.exists(&derived.address)? {
        return Err(MintError::CollectionExists {
            owner: params.owner,
        });
    }

    let collection = Collection {
        reference: params.reference,
        owner: params.owner,
        name,
        symbol,
        url,
        sale_start_time: params.sale_start,
        sale_end_time: params.sale_end,
        max_supply: params.max_supply,
        total_supply: 0,
        mint_count: 0,
        sold_count: 0,
        price: params.price,
        stable_id,
        bump: derived.bump,
    };
    check_collection(&collection)?;
    uow.create(admin, &derived.address, &collection)?;
    uow.emit(MintEvent::CollectionCreated {
        collection: derived.address,
        owner: params.owner,
        reference: params.reference,
        max_supply: params.max_supply,
        price: params.price,
    });
    Ok(())
}

/// Ends the sale now and caps supply at what was minted. The window is
/// never extended and never inverted.
pub(crate) fn close_collection(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    admin: &Address,
    owner: &Address,
) -> Result<(), MintError> {
    authorize_admin(uow, ctx, admin)?;
    let (address, mut collection) = load_collection(uow, ctx, owner)?;

    collection.sale_end_time = collection
        .sale_end_time
        .min(ctx.now)
        .max(collection.sale_start_time);
    collection.max_supply = collection.mint_count;
    check_collection(&collection)?;
    uow.write(&address, &collection)?;
    uow.emit(MintEvent::CollectionClosed {
        collection: address,
        final_supply: collection.max_supply,
        closed_at: collection.sale_end_time,
    });
    Ok(())
}
