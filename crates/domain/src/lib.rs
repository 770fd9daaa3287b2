//! Domain layer: profiles, projects and the pure rules applied to them.

pub mod error;
pub mod filter;
pub mod identity;
pub mod project;
