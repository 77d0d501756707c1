//! # Protocol/Admin Registry
//!
//! The protocol singleton, its lock flag, and one AdminState per admin.

use super::unit_of_work::UnitOfWork;
use super::OpContext;
use crate::domain::accounts::{AdminState, ProtocolState, Username};
use crate::domain::value_objects::Address;
use crate::errors::{MintError, TextError};
use crate::events::MintEvent;

// =============================================================================
// AUTHORIZATION
// =============================================================================

/// Loads the protocol singleton.
pub(crate) fn load_protocol(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
) -> Result<(Address, ProtocolState), MintError> {
    let address = ctx.book.protocol()?.address;
    let protocol = uow.require(&address, || MintError::ProtocolNotInitialized)?;
    Ok((address, protocol))
}

/// Requires `caller` to hold a valid AdminState.
pub(crate) fn require_admin(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    caller: &Address,
) -> Result<AdminState, MintError> {
    let address = ctx.book.admin_state(caller)?.address;
    let state: AdminState = uow.require(&address, || MintError::Unauthorized { caller: *caller })?;
    if state.owner != *caller {
        return Err(MintError::Unauthorized { caller: *caller });
    }
    Ok(state)
}

/// Gate of every admin-authorised operation: unlocked protocol, valid admin.
pub(crate) fn authorize_admin(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    caller: &Address,
) -> Result<(Address, ProtocolState), MintError> {
    let (address, protocol) = load_protocol(uow, ctx)?;
    if protocol.locked {
        return Err(MintError::ProtocolLocked);
    }
    require_admin(uow, ctx, caller)?;
    Ok((address, protocol))
}

// =============================================================================
// OPERATIONS
// =============================================================================

pub(crate) fn initialize_protocol(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    authority: &Address,
) -> Result<(), MintError> {
    let derived = ctx.book.protocol()?;
    if uow.exists(&derived.address)? {
        return Err(MintError::AlreadyInitialized);
    }
    let protocol = ProtocolState {
        authority: *authority,
        locked: false,
        admin_count: 0,
        bump: derived.bump,
    };
    uow.create(authority, &derived.address, &protocol)?;
    uow.emit(MintEvent::ProtocolInitialized {
        protocol: derived.address,
        authority: *authority,
    });
    Ok(())
}

pub(crate) fn lock_protocol(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    admin: &Address,
) -> Result<(), MintError> {
    let (address, mut protocol) = authorize_admin(uow, ctx, admin)?;
    protocol.locked = true;
    uow.write(&address, &protocol)?;
    uow.emit(MintEvent::ProtocolLocked { by: *admin });
    Ok(())
}

pub(crate) fn add_admin(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    caller: &Address,
    username: &str,
    new_admin: &Address,
) -> Result<(), MintError> {
    let username = Username::new(username).map_err(|err| match err {
        TextError::TooLong { max, actual } => MintError::UsernameTooLong { max, actual },
        TextError::InteriorNul => err.for_field("username"),
    })?;

    let (protocol_address, mut protocol) = load_protocol(uow, ctx)?;
    if protocol.locked {
        return Err(MintError::ProtocolLocked);
    }
    if protocol.admin_count == 0 {
        // Bootstrap: only the initializer may seat the first admin.
        if *caller != protocol.authority {
            return Err(MintError::Unauthorized { caller: *caller });
        }
    } else {
        require_admin(uow, ctx, caller)?;
    }

    let derived = ctx.book.admin_state(new_admin)?;
    if uow.exists(&derived.address)? {
        return Err(MintError::AlreadyAdmin { admin: *new_admin });
    }

    let state = AdminState {
        owner: *new_admin,
        username,
        created_at: ctx.now,
        bump: derived.bump,
    };
    uow.create(caller, &derived.address, &state)?;

    protocol.admin_count += 1;
    uow.write(&protocol_address, &protocol)?;
    uow.emit(MintEvent::AdminAdded {
        admin: *new_admin,
        username: username.to_string(),
        by: *caller,
    });
    Ok(())
}

pub(crate) fn remove_admin(
    uow: &mut UnitOfWork<'_>,
    ctx: &OpContext<'_>,
    caller: &Address,
    target: &Address,
) -> Result<(), MintError> {
    let (protocol_address, mut protocol) = authorize_admin(uow, ctx, caller)?;
    if caller == target {
        return Err(MintError::CannotRemoveSelf { admin: *caller });
    }

    let target_address = ctx.book.admin_state(target)?.address;
    if uow.read::<AdminState>(&target_address)?.is_none() {
        return Err(MintError::NotAnAdmin { target: *target });
    }
    let refunded = uow.close(&target_address, caller)?;

    protocol.admin_count = protocol.admin_count.saturating_sub(1);
    uow.write(&protocol_address, &protocol)?;
    uow.emit(MintEvent::AdminRemoved {
        admin: *target,
        by: *caller,
        refunded,
    });
    Ok(())
}
