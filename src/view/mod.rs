//! Card rendering and terminal management (impure shell)

pub mod card_view;
pub mod host_app;
pub mod live_indicator;
pub mod render_sink;

pub use card_view::{card_background, control_labels, render_screen};
pub use host_app::{run_host, HostApp};
pub use live_indicator::LiveIndicator;
pub use render_sink::{CardLayout, RenderSink};
