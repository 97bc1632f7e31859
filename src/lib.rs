//! # customer-profiles
//!
//! Browser SDK that lets an agent-app embedded in the contact-center console
//! call the CustomerProfiles agent-app API.
//!
//! Pages on the connect domain post to the API directly. Pages elsewhere
//! cannot (the endpoint does not answer cross-origin requests), so their
//! calls are relayed through a hidden widget iframe on the connect domain.
//! The [`comms`] module holds both strategies; [`client`] is the facade.
//!
//! The core is host-agnostic: it talks to the page through the traits in
//! [`host`]. Enabling the `browser` feature adds the `web-sys`
//! implementations and the `wasm-bindgen` export in `web`.

pub mod client;
pub mod comms;
pub mod config;
pub mod consts;
pub mod error;
pub mod host;
pub mod operation;
pub mod urls;
#[cfg(feature = "browser")]
pub mod web;

#[cfg(test)]
mod test_support;

pub use bridge::{ApiData, ApiResponse, BridgeMessage};
pub use client::CustomerProfilesClient;
pub use comms::CommsKind;
pub use config::{ClientConfig, LocalCredentials};
pub use error::Error;
pub use operation::Operation;
