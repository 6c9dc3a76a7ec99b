//! Actor model for the session controller.
//!
//! One [`session::SessionActor`] per conferencing session owns all mutable
//! state and processes commands and adapter events one at a time from a
//! single mailbox. Public interaction goes through the cloneable
//! [`session::SessionHandle`].

pub mod messages;
pub mod session;

pub use messages::{SessionSnapshot, SessionState};
pub use session::{SessionActor, SessionHandle};
