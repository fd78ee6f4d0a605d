use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use quizgen_core::StatusReport;

use crate::app::{App, Field, InputMode, Popup};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.popup.is_some() {
        handle_popup(app, key);
        return;
    }

    if ctrl {
        match key.code {
            KeyCode::Char('g') => {
                app.start_generate();
                return;
            }
            KeyCode::Char('s') => {
                app.start_submit();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Focus
        KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => app.focus = app.focus.next(),
        KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => app.focus = app.focus.prev(),

        // Edit focused field
        KeyCode::Enter | KeyCode::Char('i') => app.input_mode = InputMode::Editing,

        // Pipelines
        KeyCode::Char('g') => app.start_generate(),
        KeyCode::Char('s') => app.start_submit(),

        // Links from the last successful submit
        KeyCode::Char('e') => {
            if let Some(url) = app.last_result.as_ref().and_then(|r| r.edit_url.clone()) {
                open_url(&url);
            }
        }
        KeyCode::Char('p') => {
            if let Some(url) = app.last_result.as_ref().and_then(|r| r.published_url.clone()) {
                open_url(&url);
            }
        }

        // Settings
        KeyCode::Char('K') => app.open_popup(Popup::ApiKey),
        KeyCode::Char('U') => app.open_popup(Popup::ScriptUrl),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    let multiline = app.focused_input().is_multiline();
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter if multiline => app.focused_input().insert('\n'),
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            if app.focus != Field::QuizJson {
                app.focus = app.focus.next();
            }
        }
        KeyCode::Tab if !multiline => app.focus = app.focus.next(),
        KeyCode::BackTab => app.focus = app.focus.prev(),
        KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => {}
        KeyCode::Char(c) => app.focused_input().insert(c),
        KeyCode::Tab => {
            for _ in 0..2 {
                app.focused_input().insert(' ');
            }
        }
        KeyCode::Backspace => app.focused_input().backspace(),
        KeyCode::Delete => app.focused_input().delete(),
        KeyCode::Left => app.focused_input().move_left(),
        KeyCode::Right => app.focused_input().move_right(),
        KeyCode::Up => app.focused_input().move_up(),
        KeyCode::Down => app.focused_input().move_down(),
        KeyCode::Home => app.focused_input().move_home(),
        KeyCode::End => app.focused_input().move_end(),
        _ => {}
    }
}

fn handle_popup(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_popup(),
        KeyCode::Enter => {
            if let Err(e) = app.confirm_popup() {
                log::error!("Failed to save settings: {}", e);
                app.ai_status = Some(StatusReport::error(format!("Failed to save settings: {}", e)));
                app.close_popup();
            }
        }
        KeyCode::Char(c) => app.popup_input.insert(c),
        KeyCode::Backspace => app.popup_input.backspace(),
        KeyCode::Delete => app.popup_input.delete(),
        KeyCode::Left => app.popup_input.move_left(),
        KeyCode::Right => app.popup_input.move_right(),
        KeyCode::Home => app.popup_input.move_home(),
        KeyCode::End => app.popup_input.move_end(),
        _ => {}
    }
}

/// Open a link in the system browser.
fn open_url(url: &str) {
    use std::process::{Command, Stdio};

    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]);
        cmd
    } else {
        Command::new("xdg-open")
    };

    if let Err(e) = command
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        log::warn!("Could not open {}: {}", url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizgen_core::{Config, ReqwestTransport, Settings};
    use std::sync::Arc;

    fn app() -> App {
        let settings = Settings::resolve_with(&Config::new(), |_| None);
        App::new(settings, Arc::new(ReqwestTransport::new()), None)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn ctrl_c_quits_from_editing() {
        let mut app = app();
        app.input_mode = InputMode::Editing;

        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn typing_q_while_editing_does_not_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        type_text(&mut app, "quiz");

        assert!(!app.should_quit);
        assert_eq!(app.prompt.text(), "quiz");
    }

    #[test]
    fn enter_adds_newline_in_prompt_and_advances_from_title() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "b");
        assert_eq!(app.prompt.text(), "a\nb");

        press(&mut app, KeyCode::Esc);
        app.focus = Field::Title;
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Networks");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.title.text(), "Networks");
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.focus, Field::Description);
    }

    #[test]
    fn escape_closes_popup_without_saving() {
        let mut app = app();
        press(&mut app, KeyCode::Char('U'));
        assert_eq!(app.popup, Some(Popup::ScriptUrl));

        type_text(&mut app, "https://x");
        press(&mut app, KeyCode::Esc);

        assert!(app.popup.is_none());
        assert!(app.script_client.is_none());
    }

    #[test]
    fn popup_save_without_config_dir_reports_error() {
        let mut app = app();
        press(&mut app, KeyCode::Char('K'));
        type_text(&mut app, "sk-or-test");
        press(&mut app, KeyCode::Enter);

        assert!(app.popup.is_none());
        assert!(app
            .ai_status
            .as_ref()
            .is_some_and(|s| s.plain_text().starts_with("Failed to save settings")));
    }
}
