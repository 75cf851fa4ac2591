//! Host UI state (pure).
//!
//! State transitions are plain functions testable without a terminal.

pub mod host_state;

pub use host_state::{HostState, RefreshMode};
