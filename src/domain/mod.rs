//! Domain Layer
//!
//! Request-scoped entities: nothing here is persisted

pub mod event;
pub mod location;
pub mod message;

pub use event::*;
pub use location::*;
pub use message::*;
