//! Intent session services.
//!
//! This module contains the `IntentSession` aggregate root, the
//! `IntentServices` bundle it is built from, and the in-process folder
//! leases that keep one session per intent folder.

mod intent_session;
mod lease;
mod services;

pub use intent_session::IntentSession;
pub use lease::{FolderLease, LeaseRegistry};
pub use services::IntentServices;
