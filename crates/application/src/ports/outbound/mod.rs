//! These traits define what the application needs from the outside world.

pub mod clock;
pub mod identity;
pub mod mailer;
pub mod profile;
pub mod telemetry;

pub use clock::*;
pub use identity::*;
pub use mailer::*;
pub use profile::*;
pub use telemetry::*;
