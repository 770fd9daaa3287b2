//! User identity: profile entity and its value objects.

pub mod email;
pub mod id;
pub mod patch;
pub mod profile;
