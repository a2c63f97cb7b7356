//! Shared domain types used across all hublink crates.

pub mod types;

pub use types::{
    CustomerIdentity, DEFAULT_CUSTOMER_NAME, InboundMessageEvent, NoteDirection,
    OutboundDeliveryTarget, SenderType,
};
