//! Async session: a worker task that owns the working set and serializes
//! edits and commits against it.

mod error;
mod worker;

pub use error::SessionError;
pub use worker::{init_tracing, Session, SessionHandle};
