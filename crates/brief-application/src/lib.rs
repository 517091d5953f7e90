pub mod autosave;
pub mod session;

pub use autosave::{AutoSaveQueue, AutoSaveTarget, FlushOutcome};
pub use session::{IntentServices, IntentSession, LeaseRegistry};
