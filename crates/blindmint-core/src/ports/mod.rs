//! # Ports Layer (Middle Hexagon)
//!
//! - **Driving Ports (Inbound)**: `MintProtocolApi`, `CollectionQueries`, `RevealApi`
//! - **Driven Ports (Outbound)**: `AccountStore`, `Clock`, `MetadataSource`

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
