use anyhow::{anyhow, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FormField, InputMode, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize => {}
        AppEvent::Tick => {
            app.tick();
            poll_generation(app).await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen {
        Screen::Home => handle_home(app, key),
        Screen::Input => handle_input(app, key),
        Screen::Loading => handle_loading(app, key),
        Screen::Output => handle_output(app, key),
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('s') => app.start(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_loading(app: &mut App, key: KeyEvent) {
    // No cancellation: the request runs to completion. Leaving here just
    // discards the eventual result.
    if key.code == KeyCode::Esc {
        app.start_over();
    }
}

fn handle_output(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next_option(),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev_option(),
        KeyCode::Char('c') | KeyCode::Enter => {
            let index = app.selected_option;
            let text = app
                .response
                .as_ref()
                .and_then(|r| r.options.get(index))
                .map(|o| o.text.clone());
            if let Some(text) = text {
                if copy_to_clipboard(&text) {
                    app.mark_copied(index);
                }
            }
        }
        KeyCode::Char('r') => begin_regenerate(app),
        KeyCode::Esc | KeyCode::Char('s') => app.start_over(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    // Pickers take priority while open
    if app.show_content_type_picker {
        match key.code {
            KeyCode::Esc => app.show_content_type_picker = false,
            KeyCode::Char('j') | KeyCode::Down => picker_nav(app, true, 1),
            KeyCode::Char('k') | KeyCode::Up => picker_nav(app, true, -1),
            KeyCode::Enter => app.select_content_type(),
            _ => {}
        }
        return;
    }
    if app.show_tone_picker {
        match key.code {
            KeyCode::Esc => app.show_tone_picker = false,
            KeyCode::Char('j') | KeyCode::Down => picker_nav(app, false, 1),
            KeyCode::Char('k') | KeyCode::Up => picker_nav(app, false, -1),
            KeyCode::Enter => app.select_tone(),
            _ => {}
        }
        return;
    }

    // Submit works from either mode
    if key.code == KeyCode::Char('g') && key.modifiers.contains(KeyModifiers::CONTROL) {
        begin_generation(app);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_input_normal(app, key),
        InputMode::Editing => handle_input_editing(app, key),
    }
}

fn handle_input_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => app.focus_next_field(),
        KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => app.focus_prev_field(),
        KeyCode::Enter | KeyCode::Char('i') => match app.focused_field {
            FormField::ContentType => app.open_content_type_picker(),
            FormField::Tone => app.open_tone_picker(),
            _ => app.input_mode = InputMode::Editing,
        },
        KeyCode::Char('g') => begin_generation(app),
        KeyCode::Char('d') => {
            if app.focused_field == FormField::Image {
                app.remove_image();
            }
        }
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Esc => app.start_over(),
        KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

fn handle_input_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => {
            if app.focused_field == FormField::Image {
                app.attach_image();
            }
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Tab => {
            app.focus_next_field();
            if app.focused_text().is_none() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::BackTab => {
            app.focus_prev_field();
            if app.focused_text().is_none() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Backspace => {
            let cursor = app.cursor;
            if cursor > 0 {
                if let Some(text) = app.focused_text_mut() {
                    let byte_pos = char_to_byte_index(text, cursor - 1);
                    text.remove(byte_pos);
                    app.cursor = cursor - 1;
                }
            }
        }
        KeyCode::Delete => {
            let cursor = app.cursor;
            if let Some(text) = app.focused_text_mut() {
                if cursor < text.chars().count() {
                    let byte_pos = char_to_byte_index(text, cursor);
                    text.remove(byte_pos);
                }
            }
        }
        KeyCode::Left => app.cursor = app.cursor.saturating_sub(1),
        KeyCode::Right => {
            let max = app.focused_text().map(|t| t.chars().count()).unwrap_or(0);
            app.cursor = (app.cursor + 1).min(max);
        }
        KeyCode::Home => app.cursor = 0,
        KeyCode::End => {
            app.cursor = app.focused_text().map(|t| t.chars().count()).unwrap_or(0);
        }
        KeyCode::Char(c) => {
            // Character limit is numeric-as-text
            if app.focused_field == FormField::CharLimit && !c.is_ascii_digit() {
                return;
            }
            let cursor = app.cursor;
            if let Some(text) = app.focused_text_mut() {
                let byte_pos = char_to_byte_index(text, cursor);
                text.insert(byte_pos, c);
                app.cursor = cursor + 1;
            }
        }
        _ => {}
    }
}

fn picker_nav(app: &mut App, content_type: bool, delta: i32) {
    let (state, len) = if content_type {
        (&mut app.content_type_state, crate::app::CONTENT_TYPES.len() + 1)
    } else {
        (&mut app.tone_state, crate::app::TONES.len() + 1)
    };
    let current = state.selected().unwrap_or(0);
    let next = if delta > 0 {
        (current + 1).min(len - 1)
    } else {
        current.saturating_sub(1)
    };
    state.select(Some(next));
}

fn begin_generation(app: &mut App) {
    if let Some((id, request)) = app.submit() {
        tracing::info!("generation {} submitted", id);
        spawn_generation(app, id, request);
    }
}

fn begin_regenerate(app: &mut App) {
    if let Some((id, request)) = app.regenerate() {
        tracing::info!("generation {} resubmitted", id);
        spawn_generation(app, id, request);
    }
}

fn spawn_generation(app: &mut App, id: u64, request: crate::model::CopyRequest) {
    let client = app.client.clone();
    app.generate_task = Some((
        id,
        tokio::spawn(async move { client.generate(&request).await }),
    ));
}

/// Join a finished generation task and apply its result.
async fn poll_generation(app: &mut App) {
    let finished = app
        .generate_task
        .as_ref()
        .is_some_and(|(_, handle)| handle.is_finished());
    if !finished {
        return;
    }

    if let Some((id, handle)) = app.generate_task.take() {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("Generation task failed: {}", e)),
        };
        app.complete(id, result);
    }
}

fn copy_to_clipboard(text: &str) -> bool {
    use std::io::Write;
    use std::process::{Command, Stdio};

    for cmd in [
        &["pbcopy"][..],
        &["wl-copy"][..],
        &["xclip", "-selection", "clipboard"][..],
    ] {
        if let Ok(mut child) = Command::new(cmd[0])
            .args(&cmd[1..])
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            if let Some(mut stdin) = child.stdin.take() {
                let _ = stdin.write_all(text.as_bytes());
            }
            return true;
        }
    }
    tracing::warn!("no clipboard helper found (pbcopy, wl-copy, xclip)");
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiClient;

    fn test_app() -> App {
        App::new(GeminiClient::new("test-key"))
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_enter_on_home_opens_the_form() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.screen, Screen::Input);
        assert_eq!(app.input_mode, InputMode::Editing);
        assert_eq!(app.focused_field, FormField::Description);
    }

    #[tokio::test]
    async fn test_typing_fills_the_description() {
        let mut app = test_app();
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        for c in "Save".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(app.form.description, "Save");
        assert_eq!(app.cursor, 4);

        handle_event(&mut app, key(KeyCode::Backspace)).await.unwrap();
        assert_eq!(app.form.description, "Sav");
    }

    #[tokio::test]
    async fn test_char_limit_accepts_digits_only() {
        let mut app = test_app();
        app.start();
        app.focus_field(FormField::CharLimit);
        for c in "8a0!".chars() {
            handle_event(&mut app, key(KeyCode::Char(c))).await.unwrap();
        }
        assert_eq!(app.form.char_limit, "80");
    }

    #[tokio::test]
    async fn test_tone_picker_selects_a_label() {
        let mut app = test_app();
        app.start();
        app.focus_field(FormField::Tone);
        app.input_mode = InputMode::Normal;

        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert!(app.show_tone_picker);

        handle_event(&mut app, key(KeyCode::Down)).await.unwrap();
        handle_event(&mut app, key(KeyCode::Enter)).await.unwrap();
        assert!(!app.show_tone_picker);
        assert_eq!(app.form.tone, "Friendly");
    }

    #[tokio::test]
    async fn test_esc_from_form_is_a_full_reset() {
        let mut app = test_app();
        app.start();
        app.form.description = "draft".to_string();
        app.error = Some("previous failure".to_string());
        app.input_mode = InputMode::Normal;

        handle_event(&mut app, key(KeyCode::Esc)).await.unwrap();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.form.description.is_empty());
        assert!(app.error.is_none());
    }
}
