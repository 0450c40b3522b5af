//! Sessionkit Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports defined in the
//! application layer, the two auth connectors, and factory functions wiring
//! them into ready-to-use clients.

pub mod adapters;
pub mod auth;
pub mod factory;
pub mod persistence;
pub mod window;

#[cfg(test)]
mod test_support;

pub use adapters::UrlPatternDiscovery;
pub use auth::{ConnectorOptions, DirectAuthConnector, MediatedAuthConnector};
pub use factory::{ClientEnvironment, DirectClient, MediatedClient, direct_client, mediated_client};
pub use persistence::{FileStorage, MemoryStorage};
pub use window::{ChannelWindowHost, OpenedPopup};
