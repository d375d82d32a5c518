/// Data model of monitored endpoints
///
/// A resource is identified by its (url, port) pair and carries its last
/// known reachability plus a bounded, oldest-first status history.
pub mod resource;

pub use resource::{DEFAULT_HISTORY_LIMIT, Identity, Resource, StatusEntry};
