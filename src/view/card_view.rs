//! Draws a fact card scene and the status bar with ratatui.

use crate::scene::Scene;
use crate::state::{HostState, RefreshMode};
use crate::view::live_indicator::LiveIndicator;
use crate::view::render_sink::{FACT_CONTAINER_ID, HOST_TAG};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::str::FromStr;

const KEY_HINTS: &str = "q: quit | Tab: focus | Enter: click | r: refresh | s: stop";

/// Render the whole host screen: card above, status bar below.
pub fn render_screen(frame: &mut Frame, scene: &Scene, state: &HostState, mode: RefreshMode) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Card
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_card(frame, chunks[0], scene, state.focus());
    render_status_bar(frame, chunks[1], state, mode);
}

/// Background color of the card, if its `background` style names a terminal color.
pub fn card_background(scene: &Scene) -> Option<Color> {
    let card = scene.element_by_class("card")?;
    let value = scene.style(card, "background")?;
    Color::from_str(value.trim()).ok()
}

/// Labels of the rendered controls, in document order.
pub fn control_labels(scene: &Scene) -> Vec<String> {
    scene
        .controls()
        .into_iter()
        .map(|(node, _)| scene.control_label(node))
        .collect()
}

fn render_card(frame: &mut Frame, area: Rect, scene: &Scene, focus: Option<usize>) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {HOST_TAG} "));
    if let Some(color) = card_background(scene) {
        block = block.style(Style::default().bg(color));
    }

    let fact = scene
        .element_by_id(FACT_CONTAINER_ID)
        .map(|node| scene.text_content(node))
        .unwrap_or_default();

    let labels = control_labels(scene);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if labels.is_empty() { 0 } else { 1 }),
        ])
        .split(inner);

    let paragraph = Paragraph::new(fact).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[0]);

    if !labels.is_empty() {
        let spans: Vec<Span> = labels
            .into_iter()
            .enumerate()
            .flat_map(|(i, label)| {
                let style = if focus == Some(i) {
                    Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                [
                    Span::styled(format!("[ {} ]", label.to_uppercase()), style),
                    Span::raw(" "),
                ]
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Right),
            chunks[1],
        );
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &HostState, mode: RefreshMode) {
    let mut spans = vec![LiveIndicator::new(mode, state.blink_on()).render()];
    match state.last_diagnostic() {
        Some(diagnostic) => spans.push(Span::styled(
            diagnostic.to_string(),
            Style::default().fg(Color::Red),
        )),
        None => spans.push(Span::styled(KEY_HINTS, Style::default().fg(Color::Gray))),
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{resolve, AttributeMap};
    use crate::model::{DecodeError, Fact};
    use crate::runtime::Diagnostic;
    use crate::view::render_sink::{CardLayout, RenderSink};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn sink_for(pairs: &[(&str, &str)]) -> RenderSink {
        let config = resolve(&AttributeMap::from_pairs(pairs.iter().copied())).unwrap();
        let mut sink = RenderSink::new();
        sink.set_button_title("Next fact").unwrap();
        sink.build(&CardLayout::for_config(&config)).unwrap();
        sink
    }

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(sink: &RenderSink, state: &HostState, mode: RefreshMode) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
        terminal
            .draw(|frame| render_screen(frame, sink.scene(), state, mode))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    #[test]
    fn fact_text_and_manual_trigger_are_drawn() {
        let mut sink = sink_for(&[]);
        sink.show_fact(&Fact::new("cats sleep a lot")).unwrap();

        let text = buffer_text(&draw(&sink, &HostState::new(), RefreshMode::Manual));

        assert!(text.contains("cats sleep a lot"), "got:\n{}", text);
        assert!(text.contains("[ NEXT FACT ]"), "got:\n{}", text);
        assert!(text.contains("[MANUAL]"), "got:\n{}", text);
    }

    #[test]
    fn stop_control_is_drawn_for_auto_refresh() {
        let sink = sink_for(&[("auto-refresh", "true")]);
        let text = buffer_text(&draw(&sink, &HostState::new(), RefreshMode::Auto));

        assert!(text.contains("[ STOP ]"), "got:\n{}", text);
        assert!(!text.contains("NEXT FACT"), "got:\n{}", text);
    }

    #[test]
    fn diagnostic_replaces_key_hints() {
        let sink = sink_for(&[]);
        let mut state = HostState::new();
        state.record(Diagnostic::now(DecodeError::NotAnObject.into()));

        let text = buffer_text(&draw(&sink, &state, RefreshMode::Manual));

        assert!(text.contains("decode error"), "got:\n{}", text);
        assert!(!text.contains("q: quit"), "got:\n{}", text);
    }

    #[test]
    fn card_background_parses_terminal_colors() {
        assert_eq!(card_background(sink_for(&[("color", "red")]).scene()), Some(Color::Red));
        assert_eq!(
            card_background(sink_for(&[("color", "#336699")]).scene()),
            Some(Color::Rgb(0x33, 0x66, 0x99))
        );
        assert_eq!(
            card_background(sink_for(&[("color", "linear-gradient(red, blue)")]).scene()),
            None
        );
        assert_eq!(card_background(sink_for(&[]).scene()), None);
    }

    #[test]
    fn control_labels_follow_document_order() {
        let sink = sink_for(&[]);
        assert_eq!(control_labels(sink.scene()), vec!["Next fact"]);
    }
}
