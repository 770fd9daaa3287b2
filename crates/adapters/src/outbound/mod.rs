//! Outbound adapters.

pub mod clock;
pub mod identity;
pub mod mail;
pub mod persistence;
pub mod telemetry;
