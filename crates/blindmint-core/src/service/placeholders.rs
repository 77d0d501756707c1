//! # Placeholder Issuer
//!
//! Mints blind tokens inside the sale window and hands them to buyers, by
//! payment or by the collection owner's signed authorisation.

use super::collections::load_collection;
use super::registry::authorize_admin;
use super::unit_of_work::UnitOfWork;
use super::OpContext;
use crate::domain::accounts::{Collection, Placeholder, TokenMetadata, TokenMint, Url};
use crate::domain::invariants::{check_collection, check_settlement_invariant};
use crate::domain::lifecycle::PlaceholderStatus;
use crate::domain::proof::AirdropProof;
use crate::domain::value_objects::{Address, UnixTimestamp};
use crate::errors::MintError;
use crate::events::MintEvent;

/// A placeholder plus its token, loaded together.
pub(crate) struct LoadedPlaceholder {
    pub address: Address,
    pub record: Placeholder,
    pub mint: Address,
    pub token: TokenMint,
}

pub(crate) fn load_placeholder(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    collection: &Address,
    id: u64,
) -> Result<LoadedPlaceholder, MintError> {
    let address = ctx.book.placeholder(collection, id)?.address;
    let record: Placeholder = uow.require(&address, || MintError::PlaceholderNotFound { id })?;
    let mint = ctx.book.mint(&address)?.address;
    let token: TokenMint = uow.require(&mint, || {
        MintError::InvariantViolation(format!("placeholder {id} has no token"))
    })?;
    Ok(LoadedPlaceholder {
        address,
        record,
        mint,
        token,
    })
}

fn placeholder_metadata(collection: &Collection, id: u64, url: &str, now: UnixTimestamp) -> TokenMetadata {
    TokenMetadata {
        name: format!("{} #{id}", collection.name),
        symbol: collection.symbol.to_string(),
        uri: url.to_string(),
        additional: vec![
            ("id".into(), id.to_string()),
            ("timestamp".into(), now.to_string()),
            ("price".into(), collection.price.to_string()),
            ("collection".into(), collection.name.to_string()),
            ("reference".into(), collection.reference.to_hex()),
        ],
    }
}

pub(crate) fn create_placeholder(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    admin: &Address,
    owner: &Address,
    id: u64,
    url: &str,
) -> Result<(), MintError> {
    let blind_url = Url::new(url).map_err(|e| e.for_field("url"))?;

    authorize_admin(uow, ctx, admin)?;
    let (collection_address, mut collection) = load_collection(uow, ctx, owner)?;

    if ctx.now < collection.sale_start_time {
        return Err(MintError::SaleNotOpen {
            starts_at: collection.sale_start_time,
            now: ctx.now,
        });
    }
    if ctx.now > collection.sale_end_time {
        return Err(MintError::SaleClosed {
            ended_at: collection.sale_end_time,
            now: ctx.now,
        });
    }
    if collection.mint_count >= collection.max_supply {
        return Err(MintError::SoldOut {
            max_supply: collection.max_supply,
        });
    }

    let derived = ctx.book.placeholder(&collection_address, id)?;
    if uow.exists(&derived.address)? {
        return Err(MintError::DuplicateId { id });
    }
    let mint = ctx.book.mint(&derived.address)?.address;
    let authority = ctx.book.auth()?.address;

    let placeholder = Placeholder {
        collection: collection_address,
        reference: collection.reference,
        id,
        buyer: Address::ZERO,
        url: blind_url,
        price: collection.price,
        created_at: ctx.now,
        status: PlaceholderStatus::Minted,
        bump: derived.bump,
    };
    let token = TokenMint::issue(
        derived.address,
        authority,
        placeholder_metadata(&collection, id, url, ctx.now),
    );
    uow.create(admin, &derived.address, &placeholder)?;
    uow.create(admin, &mint, &token)?;

    collection.mint_count += 1;
    check_collection(&collection)?;
    uow.write(&collection_address, &collection)?;

    uow.emit(MintEvent::PlaceholderMinted {
        collection: collection_address,
        id,
        placeholder: derived.address,
        mint,
    });
    Ok(())
}

/// Checks shared by purchase and airdrop, in order: lifecycle, custody,
/// window.
fn check_deliverable(
    placeholder: &LoadedPlaceholder,
    collection: &Collection,
    ctx: &OpContext<'_>,
    id: u64,
) -> Result<PlaceholderStatus, MintError> {
    let next = placeholder.record.status.sell(id)?;
    let authority = ctx.book.auth()?.address;
    if placeholder.token.holder != authority || !placeholder.token.is_live() {
        return Err(MintError::AlreadyOwned { id });
    }
    if !collection.is_open(ctx.now) {
        return Err(MintError::NotForSale {
            starts_at: collection.sale_start_time,
            ends_at: collection.sale_end_time,
            now: ctx.now,
        });
    }
    Ok(next)
}

/// Transfers the token to `recipient` and revokes its mint authority.
fn deliver(
    uow: &mut UnitOfWork<'_>,
    collection_address: &Address,
    mut collection: Collection,
    mut placeholder: LoadedPlaceholder,
    next: PlaceholderStatus,
    recipient: &Address,
) -> Result<(), MintError> {
    placeholder.record.status = next;
    placeholder.record.buyer = *recipient;
    placeholder.token.holder = *recipient;
    placeholder.token.mint_authority_revoked = true;
    collection.sold_count += 1;

    check_collection(&collection)?;
    if !check_settlement_invariant(&placeholder.record, &placeholder.token) {
        return Err(MintError::InvariantViolation(
            "sold placeholder token is not live".into(),
        ));
    }
    uow.write(&placeholder.address, &placeholder.record)?;
    uow.write(&placeholder.mint, &placeholder.token)?;
    uow.write(collection_address, &collection)?;
    Ok(())
}

pub(crate) fn buy_placeholder(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    buyer: &Address,
    owner: &Address,
    id: u64,
) -> Result<(), MintError> {
    let (collection_address, collection) = load_collection(uow, ctx, owner)?;
    let placeholder = load_placeholder(uow, ctx, &collection_address, id)?;
    let next = check_deliverable(&placeholder, &collection, ctx, id)?;

    let price = collection.price;
    uow.transfer(buyer, &collection.owner, price)?;
    deliver(uow, &collection_address, collection, placeholder, next, buyer)?;

    uow.emit(MintEvent::PlaceholderSold {
        collection: collection_address,
        id,
        buyer: *buyer,
        price,
    });
    Ok(())
}

pub(crate) fn airdrop_placeholder(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    payer: &Address,
    owner: &Address,
    id: u64,
    recipient: &Address,
    proof: &AirdropProof,
) -> Result<(), MintError> {
    authorize_admin(uow, ctx, payer)?;
    let (collection_address, collection) = load_collection(uow, ctx, owner)?;
    let placeholder = load_placeholder(uow, ctx, &collection_address, id)?;
    let next = check_deliverable(&placeholder, &collection, ctx, id)?;

    proof.verify(&collection.owner, &collection_address, id, recipient)?;

    let fee = ctx.config.airdrop_fee;
    uow.transfer(&collection.owner, payer, fee)?;
    deliver(uow, &collection_address, collection, placeholder, next, recipient)?;

    uow.emit(MintEvent::PlaceholderAirdropped {
        collection: collection_address,
        id,
        recipient: *recipient,
        fee,
    });
    Ok(())
}

pub(crate) fn burn_placeholder(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    admin: &Address,
    owner: &Address,
    id: u64,
) -> Result<(), MintError> {
    authorize_admin(uow, ctx, admin)?;
    let (collection_address, _) = load_collection(uow, ctx, owner)?;
    let mut placeholder = load_placeholder(uow, ctx, &collection_address, id)?;

    placeholder.record.status = placeholder.record.status.burn(id)?;
    let collectible = ctx.book.collectible(&collection_address, id)?.address;
    if uow.exists(&collectible)? {
        return Err(MintError::AlreadyRevealed { id });
    }
    placeholder.token.supply = 0;
    placeholder.token.holder = Address::ZERO;
    if !check_settlement_invariant(&placeholder.record, &placeholder.token) {
        return Err(MintError::InvariantViolation(
            "burned placeholder token still live".into(),
        ));
    }
    uow.write(&placeholder.address, &placeholder.record)?;
    uow.write(&placeholder.mint, &placeholder.token)?;

    uow.emit(MintEvent::PlaceholderBurned {
        collection: collection_address,
        id,
    });
    Ok(())
}
