//! Parcel tracking on SQLite.
//!
//! # Intention
//!
//! - Persist parcels (client, address, status, creation time) and answer
//!   lookups by client and by number.
//! - Enforce the parcel lifecycle at the point of mutation: status moves
//!   `registered -> sent -> delivered` one step at a time, and the address can
//!   only be edited, or the parcel deleted, while it is `registered`.
//!
//! # Architectural Boundaries
//!
//! - [`store::ParcelStore`] is the only code that touches the `parcel` table.
//!   It holds no state beyond the injected connection.
//! - [`service::ParcelService`] composes store calls into workflows.
//! - Connection setup, schema provisioning and config live in [`sqlite`] and
//!   [`config`]; they are not used by the store itself.

pub mod config;
pub mod error;
pub mod logging;
pub mod parcel;
pub mod service;
pub mod sqlite;
pub mod store;

pub use error::{Result, TrackerError};
pub use parcel::{ClientId, Parcel, ParcelNumber, ParcelStatus};
pub use service::ParcelService;
pub use store::{ParcelStore, SharedConnection};
