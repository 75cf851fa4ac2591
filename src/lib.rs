//! factcard
//!
//! A self-refreshing fact card: acquires short text facts from an HTTP
//! endpoint (pull) or a server-sent event stream (push) and displays the
//! latest one in a scoped scene, hosted in a terminal.
//!
//! Pure Core / Impure Shell: `engine`, `config` and `scene` decide what
//! happens; `runtime`, `source` and `view` perform it.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod runtime;
pub mod scene;
pub mod source;
pub mod state;
pub mod view;
