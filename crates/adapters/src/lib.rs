//! Adapters plugging external systems into the application ports.

pub mod outbound;
