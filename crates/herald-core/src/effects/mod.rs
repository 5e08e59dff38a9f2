//! Effect traits for the broadcast collaborators
//!
//! The coordinator only ever talks to the outside world through these two
//! traits, so it can be exercised against scripted fakes without a network or
//! a membership store.
//!
//! # Cancellation
//!
//! Futures returned by these traits may be dropped at any await point when a
//! broadcast is canceled or a delivery deadline passes. Implementations must not
//! rely on running to completion and must not retry in the background.

pub mod delivery;
pub mod membership;

pub use delivery::DeliveryEffects;
pub use membership::MembershipEffects;
