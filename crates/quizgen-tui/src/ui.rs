use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use quizgen_core::quiz::{DEFAULT_DESCRIPTION, DEFAULT_FOLDER, DEFAULT_TITLE};
use quizgen_core::{StatusReport, Tone};

use crate::app::{App, Field, InputMode, Popup, TextInput};

const SPINNER: [&str; 3] = [".  ", ".. ", "..."];

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .areas(body_area);

    let [title_area, description_area, folder_area, prompt_area, ai_status_area] =
        Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .areas(left_area);

    render_input(app, frame, title_area, Field::Title);
    render_input(app, frame, description_area, Field::Description);
    render_input(app, frame, folder_area, Field::Folder);
    render_input(app, frame, prompt_area, Field::Prompt);
    render_status(
        app,
        frame,
        ai_status_area,
        " AI ",
        app.ai_status.as_ref(),
        app.generate_run.is_sending(),
    );

    let [json_area, script_status_area] =
        Layout::vertical([Constraint::Min(5), Constraint::Length(7)]).areas(right_area);

    render_input(app, frame, json_area, Field::QuizJson);
    render_status(
        app,
        frame,
        script_status_area,
        " Apps Script ",
        app.script_status.as_ref(),
        app.submit_run.is_sending(),
    );

    render_footer(app, frame, footer_area);

    if let Some(popup) = app.popup {
        render_settings_popup(app, frame, area, popup);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_state = match app.settings.api_key_source {
        Some(source) => Span::styled(
            format!(" key: {} ", source.as_str()),
            Style::default().fg(Color::Green),
        ),
        None => Span::styled(" key: not set (K) ", Style::default().fg(Color::Red)),
    };
    let script_state = if app.settings.script_url.is_some() {
        Span::styled(" script: set ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" script: not set (U) ", Style::default().fg(Color::Red))
    };

    let title = Line::from(vec![
        Span::styled(" Quiz Generator ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!(" {} ", app.settings.model),
            Style::default().fg(Color::Magenta),
        ),
        key_state,
        script_state,
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    match app.input_mode {
        InputMode::Normal => {
            hints.extend(vec![
                Span::styled(" Tab ", key_style),
                Span::styled(" focus ", label_style),
                Span::styled(" i ", key_style),
                Span::styled(" edit ", label_style),
                Span::styled(" g ", key_style),
                Span::styled(" generate ", label_style),
            ]);
            if app.submit_offered {
                hints.extend(vec![
                    Span::styled(" s ", key_style),
                    Span::styled(" submit ", label_style),
                ]);
            }
            if app.last_result.is_some() {
                hints.extend(vec![
                    Span::styled(" e/p ", key_style),
                    Span::styled(" open links ", label_style),
                ]);
            }
            hints.extend(vec![
                Span::styled(" K ", key_style),
                Span::styled(" API key ", label_style),
                Span::styled(" U ", key_style),
                Span::styled(" script URL ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ]);
        }
        InputMode::Editing => {
            hints.extend(vec![
                Span::styled(" Esc ", key_style),
                Span::styled(" done ", label_style),
                Span::styled(" Ctrl-G ", key_style),
                Span::styled(" generate ", label_style),
            ]);
            if app.submit_offered {
                hints.extend(vec![
                    Span::styled(" Ctrl-S ", key_style),
                    Span::styled(" submit ", label_style),
                ]);
            }
        }
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn placeholder(field: Field) -> Option<&'static str> {
    match field {
        Field::Title => Some(DEFAULT_TITLE),
        Field::Description => Some(DEFAULT_DESCRIPTION),
        Field::Folder => Some(DEFAULT_FOLDER),
        Field::Prompt => Some("Paste content or describe the quiz you want..."),
        Field::QuizJson => None,
    }
}

fn field_title(app: &App, field: Field) -> String {
    if field != Field::QuizJson {
        return format!(" {} ", field.label());
    }
    if app.quiz_json.text().trim().is_empty() {
        return format!(" {} ", field.label());
    }
    match app.draft_question_count() {
        Some(1) => format!(" {} (1 question) ", field.label()),
        Some(n) => format!(" {} ({} questions) ", field.label(), n),
        None => format!(" {} (not a JSON array) ", field.label()),
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, field: Field) {
    let focused = app.focus == field;
    let editing = focused && app.input_mode == InputMode::Editing;
    let border_style = if editing {
        Style::default().fg(Color::Yellow)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(field_title(app, field));

    if field == Field::QuizJson && app.submit_offered {
        let trigger = if app.submit_run.is_sending() {
            Span::styled(" Submitting ", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(" s: Create Google Form ", Style::default().fg(Color::Green).bold())
        };
        block = block.title_bottom(Line::from(trigger));
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let input = app.field(field);
    if input.text().is_empty() && !editing {
        if let Some(hint) = placeholder(field) {
            let paragraph = Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, inner);
        }
        return;
    }

    let (scroll, cursor) = viewport(input, inner);
    let paragraph = Paragraph::new(Text::raw(input.text())).scroll(scroll);
    frame.render_widget(paragraph, inner);

    if editing && app.popup.is_none() {
        frame.set_cursor_position(cursor);
    }
}

/// Scroll offset keeping the cursor inside `area`, and the cursor's screen position.
fn viewport(input: &TextInput, area: Rect) -> ((u16, u16), (u16, u16)) {
    let (line, col) = input.cursor_position();
    let height = area.height.max(1) as usize;
    let width = area.width.max(1) as usize;

    let scroll_y = line.saturating_sub(height - 1);
    let scroll_x = col.saturating_sub(width - 1);

    let cursor_x = area.x + (col - scroll_x) as u16;
    let cursor_y = area.y + (line - scroll_y) as u16;

    ((scroll_y as u16, scroll_x as u16), (cursor_x, cursor_y))
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Info => Style::default().fg(Color::White),
        Tone::Success => Style::default().fg(Color::Green),
        Tone::Error => Style::default().fg(Color::Red),
    }
}

fn render_status(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    title: &str,
    report: Option<&StatusReport>,
    sending: bool,
) {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title.to_string());
    if sending {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" Working{} ", SPINNER[app.animation_frame as usize % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        )));
    }

    let Some(report) = report else {
        frame.render_widget(block, area);
        return;
    };

    let style = tone_style(report.tone);
    let lines: Vec<Line> = report
        .lines
        .iter()
        .map(|line| match &line.link {
            Some(url) => Line::from(vec![
                Span::styled(line.text.clone(), style),
                Span::styled(
                    url.clone(),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                ),
            ]),
            None => Line::from(Span::styled(line.text.clone(), style)),
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Mask a secret for display, keeping only its last four characters.
fn mask_secret(secret: &str) -> String {
    let len = secret.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let masked_len = len - 4;
    let last_four: String = secret.chars().skip(masked_len).collect();
    format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
}

fn render_settings_popup(app: &App, frame: &mut Frame, area: Rect, popup: Popup) {
    let title = match popup {
        Popup::ApiKey => " OpenRouter API Key ",
        Popup::ScriptUrl => " Apps Script Web App URL ",
    };

    // Calculate popup size and position (centered)
    let popup_width = 70.min(area.width.saturating_sub(4));
    let popup_height = 7.min(area.height);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    if let Some(row) = inner_row(inner, 0) {
        let instructions = Paragraph::new("Press Enter to save, Esc to cancel.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(instructions, row);
    }

    let text = app.popup_input.text();
    if let Some(row) = inner_row(inner, 4) {
        let status = Paragraph::new(format!("{} characters", text.chars().count()))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, row);
    }

    // The input row is the one that matters on a short terminal.
    let Some(input_area) = inner_row(inner, 2).or_else(|| inner_row(inner, 0)) else {
        return;
    };
    match popup {
        Popup::ApiKey => {
            let input = Paragraph::new(mask_secret(text)).style(Style::default().fg(Color::Cyan));
            frame.render_widget(input, input_area);

            let masked_width = mask_secret(text).chars().count();
            let cursor_x = masked_width.min(input_area.width as usize) as u16;
            frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
        }
        Popup::ScriptUrl => {
            let (scroll, cursor) = viewport(&app.popup_input, input_area);
            let input = Paragraph::new(text)
                .style(Style::default().fg(Color::Cyan))
                .scroll(scroll);
            frame.render_widget(input, input_area);
            frame.set_cursor_position(cursor);
        }
    }
}

/// One-line row `offset` rows into `inner`, if it fits.
fn inner_row(inner: Rect, offset: u16) -> Option<Rect> {
    (offset < inner.height && inner.width > 0)
        .then(|| Rect::new(inner.x, inner.y + offset, inner.width, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizgen_core::{Config, ReqwestTransport, Settings};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        let settings = Settings::resolve_with(&Config::new(), |_| None);
        App::new(settings, Arc::new(ReqwestTransport::new()), None)
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn settings_popups_fit_short_terminals() {
        for popup in [Popup::ApiKey, Popup::ScriptUrl] {
            let mut app = app();
            app.open_popup(popup);
            for c in "sk-or-v1-abcdef".chars() {
                app.popup_input.insert(c);
            }

            for height in [1, 3, 5, 6] {
                draw(&app, 80, height);
            }
        }
    }

    #[test]
    fn api_key_popup_shows_only_last_four_characters() {
        let mut app = app();
        app.open_popup(Popup::ApiKey);
        for c in "sk-or-v1-abcdef".chars() {
            app.popup_input.insert(c);
        }

        let screen = draw(&app, 80, 24);
        assert!(screen.contains("...cdef"));
        assert!(!screen.contains("sk-or-v1"));
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        assert_eq!(mask_secret(""), "");
        assert_eq!(mask_secret("abcd"), "****");
    }

    #[test]
    fn long_secrets_keep_last_four() {
        assert_eq!(mask_secret("sk-or-v1-1234"), "*********...1234");
    }

    #[test]
    fn viewport_scrolls_to_keep_cursor_visible() {
        let mut input = TextInput::multi_line();
        input.set_text("1\n2\n3\n4\n5\nabcdefghij");
        let area = Rect::new(10, 20, 4, 3);

        let (scroll, cursor) = viewport(&input, area);
        assert_eq!(scroll, (3, 7));
        assert_eq!(cursor, (13, 22));
    }
}
