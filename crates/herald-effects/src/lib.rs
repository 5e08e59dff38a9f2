//! # Herald Effects - Collaborator Handlers
//!
//! Production implementations of the Herald effect traits:
//! - [`RosterMembershipHandler`]: membership backed by an in-memory roster,
//!   loadable from a TOML file
//! - [`TcpDeliveryHandler`]: one framed TCP round trip per notification
//! - [`NotificationListener`]: the receiving side of the same wire format
//!
//! Handlers are stateless with respect to broadcasts; each call is a fresh
//! lookup or a fresh connection.

#![forbid(unsafe_code)]

pub mod listener;
pub mod roster;
pub mod tcp;
pub mod wire;

pub use listener::{NotificationListener, ReceivedNotification};
pub use roster::{NodeRecord, RosterFile, RosterMembershipHandler};
pub use tcp::TcpDeliveryHandler;
pub use wire::{NotificationEnvelope, WireError};
