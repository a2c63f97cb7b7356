//! Service seams shared by the platform clients and the bridge.
//!
//! The Landbot and HubSpot crates implement [`BotOutbound`] and [`CrmApi`];
//! the workflows and the HTTP gateway only see the traits.

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{BotOutbound, CrmApi, PublishedMessage},
};
