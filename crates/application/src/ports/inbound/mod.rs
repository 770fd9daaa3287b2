//! These traits define what the application can do.

pub mod create_user;
pub mod lookup_users;
pub mod update_user;

pub use create_user::*;
pub use lookup_users::*;
pub use update_user::*;
