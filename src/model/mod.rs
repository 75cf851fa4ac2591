//! Domain model types (pure).
//!
//! Fetch lifecycle state, the fact payload, host key actions, transport
//! credentials and the error taxonomy.

pub mod credentials;
pub mod error;
pub mod fetch_state;
pub mod key_action;

// Re-export for convenience
pub use credentials::Credentials;
pub use error::{AppError, ConfigError, DecodeError, TransportError, WidgetError};
pub use fetch_state::{Fact, FetchState, Strategy};
pub use key_action::KeyAction;
