//! factcard - Entry Point

use clap::Parser;
use factcard::config::attributes::{
    ATTR_AUTO_REFRESH, ATTR_COLOR, ATTR_KEY, ATTR_REFRESH_INTERVAL, ATTR_SHOW_LOADING,
    ATTR_SHOW_STOP_BUTTON, ATTR_SRC, ATTR_SSE,
};
use factcard::config::{parse_assignment, AttributeMap};
use std::path::PathBuf;
use tracing::info;

/// factcard - self-refreshing fact card in the terminal
///
/// Attribute values are passed through as raw strings and validated when the
/// card attaches, exactly like attributes set by any other host.
#[derive(Parser, Debug)]
#[command(name = "factcard")]
#[command(version)]
#[command(about = "Display a self-refreshing fact from an HTTP endpoint or event stream")]
pub struct Args {
    /// Source URL (pull endpoint or event stream)
    #[arg(long)]
    pub src: Option<String>,

    /// Response key holding the fact text (pull only)
    #[arg(long)]
    pub key: Option<String>,

    /// Show a loading placeholder while acquiring ("true" enables)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub show_loading: Option<String>,

    /// Re-acquire on a recurring timer ("true" enables)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub auto_refresh: Option<String>,

    /// Refresh period in milliseconds
    #[arg(long)]
    pub refresh_interval: Option<String>,

    /// Render a stop control while auto-refreshing ("true" enables)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub show_stop_button: Option<String>,

    /// Use a server-sent event stream instead of polling ("false" or "0" disables)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub sse: Option<String>,

    /// Card background color
    #[arg(long)]
    pub color: Option<String>,

    /// Set any attribute as NAME=VALUE (repeatable)
    #[arg(long = "attr", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub attrs: Vec<(String, String)>,

    /// Content of the manual trigger's button-title slot
    #[arg(long)]
    pub button_title: Option<String>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Attribute overrides given on the command line.
    ///
    /// Named flags win over `--attr` pairs for the same attribute.
    pub fn attribute_overrides(&self) -> AttributeMap {
        let mut attributes = AttributeMap::from_pairs(self.attrs.iter().cloned());

        let named = [
            (ATTR_SRC, &self.src),
            (ATTR_KEY, &self.key),
            (ATTR_SHOW_LOADING, &self.show_loading),
            (ATTR_AUTO_REFRESH, &self.auto_refresh),
            (ATTR_REFRESH_INTERVAL, &self.refresh_interval),
            (ATTR_SHOW_STOP_BUTTON, &self.show_stop_button),
            (ATTR_SSE, &self.sse),
            (ATTR_COLOR, &self.color),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                attributes.set(name, value.clone());
            }
        }

        attributes
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = factcard::config::load_config_with_precedence(args.config.clone())?;
        let merged = factcard::config::merge_config(config_file);
        let with_env = factcard::config::apply_env_overrides(merged);
        factcard::config::apply_cli_overrides(
            with_env,
            &args.attribute_overrides(),
            args.button_title.clone(),
        )
    };

    factcard::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        "Configuration loaded and resolved"
    );

    factcard::view::run_host(config)?;

    Ok(())
}
