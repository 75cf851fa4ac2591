//! Render sink: builds the card and projects fetch state onto it.
//!
//! Card structure inside the shadow root:
//!
//! ```text
//! div.card (background: <color>)
//! ├── style
//! ├── p#fact-container
//! ├── div.cta-container [click=manual-trigger]   (manual trigger only)
//! │   └── slot[name=button-title]
//! └── button "Stop" [click=stop]                 (stop control only)
//! ```

use crate::config::WidgetConfig;
use crate::model::Fact;
use crate::scene::{Control, NodeId, Scene, SceneError};

/// Tag of the host element.
pub const HOST_TAG: &str = "fact-card";
/// Id of the paragraph holding the fact.
pub const FACT_CONTAINER_ID: &str = "fact-container";
/// Slot filled with the manual trigger's label.
pub const BUTTON_TITLE_SLOT: &str = "button-title";
/// Text shown while acquiring, when enabled.
pub const LOADING_PLACEHOLDER: &str = "Loading…";
/// Label of the stop control.
pub const STOP_LABEL: &str = "Stop";

const CARD_STYLE: &str = "\
.card { border-radius: 5px; display: flex; flex-direction: column; \
align-items: flex-end; padding: 10px; width: 300px; }
button, ::slotted(button) { text-transform: uppercase; cursor: pointer; }
#fact-container { align-self: start; margin-bottom: 10px; }";

/// Which parts of the card are rendered, fixed at attach time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardLayout {
    /// Card background.
    pub color: Option<String>,
    /// Render the manual trigger.
    pub manual_trigger: bool,
    /// Render the stop control.
    pub stop_control: bool,
    /// Whether loading writes the placeholder.
    pub show_loading: bool,
}

impl CardLayout {
    /// Layout for a resolved configuration.
    pub fn for_config(config: &WidgetConfig) -> Self {
        Self {
            color: config.color.clone(),
            manual_trigger: config.renders_manual_trigger(),
            stop_control: config.renders_stop_control(),
            show_loading: config.show_loading_indicator,
        }
    }

    /// Layout for a card whose attributes failed to resolve: no controls.
    pub fn inert(color: Option<String>) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }
}

/// Owns the scene and writes fetch state into it.
#[derive(Debug, Clone)]
pub struct RenderSink {
    scene: Scene,
    fact_container: Option<NodeId>,
    show_loading: bool,
}

impl Default for RenderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSink {
    /// Sink over an empty `fact-card` scene.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(HOST_TAG),
            fact_container: None,
            show_loading: false,
        }
    }

    /// The underlying scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Set the page content offered to the manual trigger's slot.
    pub fn set_button_title(&mut self, title: &str) -> Result<(), SceneError> {
        self.scene.append_light_child(BUTTON_TITLE_SLOT, title)?;
        Ok(())
    }

    /// Build the card for one attach, replacing any previous card.
    pub fn build(&mut self, layout: &CardLayout) -> Result<(), SceneError> {
        self.scene.revive();
        let shadow = self.scene.attach_shadow()?;
        self.show_loading = layout.show_loading;

        let card = self.scene.create_element("div")?;
        self.scene.set_class(card, "card")?;
        if let Some(color) = &layout.color {
            self.scene.set_style(card, "background", color.as_str())?;
        }
        self.scene.append_child(shadow, card)?;

        let style = self.scene.create_element("style")?;
        let css = self.scene.create_text(CARD_STYLE)?;
        self.scene.append_child(style, css)?;
        self.scene.append_child(card, style)?;

        let fact = self.scene.create_element("p")?;
        self.scene.set_id(fact, FACT_CONTAINER_ID)?;
        self.scene.append_child(card, fact)?;
        self.fact_container = Some(fact);

        if layout.manual_trigger {
            let cta = self.scene.create_element("div")?;
            self.scene.set_class(cta, "cta-container")?;
            self.scene.set_control(cta, Control::ManualTrigger)?;
            let slot = self.scene.create_slot(BUTTON_TITLE_SLOT)?;
            self.scene.append_child(cta, slot)?;
            self.scene.append_child(card, cta)?;
        }

        if layout.stop_control {
            let button = self.scene.create_element("button")?;
            self.scene.set_control(button, Control::Stop)?;
            let label = self.scene.create_text(STOP_LABEL)?;
            self.scene.append_child(button, label)?;
            self.scene.append_child(card, button)?;
        }

        Ok(())
    }

    /// Show the loading placeholder if the card was built with one.
    pub fn show_loading(&mut self) -> Result<(), SceneError> {
        if !self.show_loading {
            return Ok(());
        }
        self.write_fact_text(LOADING_PLACEHOLDER)
    }

    /// Replace the displayed text with `fact`, verbatim.
    pub fn show_fact(&mut self, fact: &Fact) -> Result<(), SceneError> {
        self.write_fact_text(fact.as_str())
    }

    fn write_fact_text(&mut self, text: &str) -> Result<(), SceneError> {
        match self.fact_container {
            Some(node) => self.scene.set_text_content(node, text),
            None => Err(SceneError::Disposed),
        }
    }

    /// Current text of the fact region, if a card is built.
    pub fn displayed_text(&self) -> Option<String> {
        self.fact_container
            .filter(|_| !self.scene.is_disposed())
            .map(|node| self.scene.text_content(node))
    }

    /// Dispose the card. Further writes fail with [`SceneError::Disposed`].
    pub fn teardown(&mut self) {
        self.scene.dispose();
        self.fact_container = None;
    }
}

#[cfg(test)]
#[path = "render_sink_tests.rs"]
mod tests;
