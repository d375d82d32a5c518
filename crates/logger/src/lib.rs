//! Shared tracing setup for the portwatch binaries.

mod subscriber;

pub use subscriber::{LogFormat, init, init_with};
