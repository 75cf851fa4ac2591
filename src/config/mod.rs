//! Configuration module.
//!
//! - [`attributes`]: the widget's attribute surface and configuration resolver
//! - [`loader`]: the terminal host's config file, env and CLI precedence chain
//! - [`keybindings`]: host key bindings

pub mod attributes;
pub mod keybindings;
pub mod loader;

pub use attributes::{parse_assignment, resolve, AttributeMap, WidgetConfig};
pub use keybindings::KeyBindings;
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigFile, ConfigFileError,
    ResolvedConfig,
};
