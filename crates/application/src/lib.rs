//! Application layer: use cases orchestrating the outbound ports.

pub mod dto;
pub mod error;
pub mod ports;
pub mod usecases;

#[cfg(test)]
mod testing;
