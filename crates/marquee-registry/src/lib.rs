//! marquee-registry: visitor presence registry for the Marquee site.
//!
//! Serves `GET /api/ping?id=<visitor>`. Each call sweeps entries older than
//! the activity window, records the visitor if unseen and answers with the
//! number of entries left. Visitors are never refreshed, so the count
//! approximates "distinct visitors first seen within the window".

pub mod clock;
pub mod error;
pub mod routes;
pub mod server;
pub mod service;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::RegistryError;
pub use server::{build_router, cors_layer, run, serve, AppState};
pub use service::RegistryService;
pub use store::{open_store, MemoryStore, PresenceEntry, PresenceStore, SqliteStore};
