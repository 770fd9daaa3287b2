//! Application services implementing business logic.

pub mod create_user;
pub mod lookup_users;
pub mod update_user;

pub use create_user::*;
pub use lookup_users::*;
pub use update_user::*;
