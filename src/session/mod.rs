//! Session lifecycle
//!
//! One `Session` per negotiated client connection, tracked in a shared
//! `SessionRegistry`. Teardown is idempotent and has exactly two triggers:
//! an observed `failed` connection state, and bulk shutdown.

pub mod registry;
pub mod session;
pub mod state;

pub use registry::SessionRegistry;
pub use session::{spawn_state_monitor, Session};
pub use state::ConnectionPhase;
