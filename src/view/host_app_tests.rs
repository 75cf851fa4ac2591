//! Tests for the terminal host, driven with `TestBackend` on paused time.

use super::*;
use crate::config::AttributeMap;
use crate::source::{PushSender, ScriptedPull, ScriptedPush};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::backend::TestBackend;

type TestApp = HostApp<TestBackend, ScriptedPull, ScriptedPush>;

const CAT_FACT: &str = r#"{"fact":"cats sleep a lot","length":16}"#;

fn app_with(pull: &ScriptedPull, pairs: &[(&str, &str)]) -> (TestApp, PushSender) {
    let (push, sender) = ScriptedPush::new();
    let (card, events) = FactCard::new(pull.clone(), push, "Next fact");
    let terminal = Terminal::new(TestBackend::new(60, 8)).unwrap();
    let mut app = HostApp::new(terminal, card, events, KeyBindings::default());
    app.card_mut()
        .attach(&AttributeMap::from_pairs(pairs.iter().copied()));
    (app, sender)
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

/// Let spawned acquisitions run, then deliver whatever they produced.
async fn settle(app: &mut TestApp) {
    tokio::time::sleep(Duration::from_millis(1)).await;
    while let Ok(event) = app.events.events.try_recv() {
        app.on_card_event(event);
    }
    while let Ok(diagnostic) = app.events.diagnostics.try_recv() {
        app.on_diagnostic(diagnostic);
    }
}

fn screen(app: &TestApp) -> String {
    let buffer = app.terminal().backend().buffer();
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test(start_paused = true)]
async fn fetched_fact_is_drawn() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[]);

            settle(&mut app).await;
            app.draw().unwrap();

            let text = screen(&app);
            assert!(text.contains("cats sleep a lot"), "got:\n{}", text);
            assert!(text.contains("[MANUAL]"), "got:\n{}", text);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn refresh_key_clicks_manual_trigger() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[]);
            settle(&mut app).await;

            assert!(!app.handle_key(key(KeyCode::Char('r'))));
            settle(&mut app).await;

            assert_eq!(pull.request_count(), 2);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn stop_key_without_stop_control_does_nothing() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[]);
            settle(&mut app).await;

            assert!(!app.handle_key(key(KeyCode::Char('s'))));
            settle(&mut app).await;

            assert_eq!(pull.request_count(), 1);
            assert_eq!(app.refresh_mode(), RefreshMode::Manual);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn focused_stop_control_halts_auto_refresh() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[("auto-refresh", "true")]);
            settle(&mut app).await;
            assert_eq!(app.refresh_mode(), RefreshMode::Auto);

            app.handle_key(key(KeyCode::Tab));
            assert_eq!(app.state().focus(), Some(0));
            app.handle_key(key(KeyCode::Enter));

            assert_eq!(app.refresh_mode(), RefreshMode::Stopped);
            assert!(!app.card().timer_running());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn activate_without_focus_is_ignored() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[("auto-refresh", "true")]);
            settle(&mut app).await;

            app.handle_key(key(KeyCode::Enter));

            assert_eq!(app.refresh_mode(), RefreshMode::Auto);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn quit_detaches_card() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[("auto-refresh", "true")]);
            settle(&mut app).await;

            assert!(app.handle_key(key(KeyCode::Char('q'))));

            assert!(!app.card().is_attached());
            assert!(!app.card().timer_running());
            assert_eq!(app.refresh_mode(), RefreshMode::Detached);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn unbound_key_is_ignored() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always(CAT_FACT);
            let (mut app, _sender) = app_with(&pull, &[]);

            assert!(!app.handle_key(key(KeyCode::Char('x'))));
            assert!(app.card().is_attached());
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn failed_acquisition_is_shown_in_status_bar() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::always("not json");
            let (mut app, _sender) = app_with(&pull, &[]);

            settle(&mut app).await;
            app.draw().unwrap();

            assert!(app.state().last_diagnostic().is_some());
            let text = screen(&app);
            assert!(text.contains("decode error"), "got:\n{}", text);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn push_messages_are_drawn_verbatim() {
    LocalSet::new()
        .run_until(async {
            let pull = ScriptedPull::new();
            let (mut app, sender) = app_with(&pull, &[("sse", "true")]);
            settle(&mut app).await;

            sender.send("hello from the stream");
            settle(&mut app).await;
            app.draw().unwrap();

            let text = screen(&app);
            assert!(text.contains("hello from the stream"), "got:\n{}", text);
            assert!(text.contains("[PUSH]"), "got:\n{}", text);
            assert_eq!(pull.request_count(), 0);
        })
        .await;
}
