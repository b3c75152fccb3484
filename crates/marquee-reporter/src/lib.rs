//! Client-side presence reporting for Marquee.
//!
//! A reporter keeps a visitor id in a cookie jar, pings the registry's
//! `/api/ping` endpoint on a fixed interval, and publishes the active
//! visitor count it gets back.

pub mod client;
pub mod cookie;
pub mod identity;
pub mod reporter;

pub use client::PingClient;
pub use cookie::{CookieJar, VisitorCookie};
pub use identity::{generate_visitor_id, VisitorIdentity};
pub use reporter::{PresenceReporter, ReporterHandle};
