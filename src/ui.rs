use ratatui::{
    Frame,
    layout::{Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, FormField, InputMode, Screen, CONTENT_TYPES, TONES};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(app, frame, body_area),
        Screen::Input => render_input(app, frame, body_area),
        Screen::Loading => render_loading(app, frame, body_area),
        Screen::Output => render_output(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Pickers sit above the form
    if app.show_content_type_picker {
        render_picker(app, frame, area, " Content type ", &CONTENT_TYPES, true);
    } else if app.show_tone_picker {
        render_picker(app, frame, area, " Tone ", &TONES, false);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;
    let title = Line::from(vec![
        Span::styled(" ✦ UX Writing Assistant ", Style::default().fg(theme.accent()).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(theme.dim()),
        ),
        Span::raw(" "),
        Span::styled(format!("[{}]", theme.as_str()), Style::default().fg(theme.dim())),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match (app.screen, app.input_mode) {
        (Screen::Input, InputMode::Editing) => Style::default().bg(Color::Yellow).fg(Color::Black),
        _ => Style::default().bg(Color::Blue).fg(Color::White),
    };

    let mode_text = match app.screen {
        Screen::Home => " HOME ",
        Screen::Input => " INPUT ",
        Screen::Loading => " WAIT ",
        Screen::Output => " RESULTS ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let disabled_style = Style::default().bg(Color::Black).fg(Color::DarkGray);

    let hints: Vec<Span> = if app.show_content_type_picker || app.show_tone_picker {
        vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" choose ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" select ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]
    } else {
        match (app.screen, app.input_mode) {
            (Screen::Home, _) => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" start ", label_style),
                Span::styled(" t ", key_style),
                Span::styled(" theme ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
            (Screen::Input, InputMode::Normal) => {
                let generate_style = if app.can_submit() { label_style } else { disabled_style };
                vec![
                    Span::styled(" Tab ", key_style),
                    Span::styled(" field ", label_style),
                    Span::styled(" Enter ", key_style),
                    Span::styled(" edit ", label_style),
                    Span::styled(" g ", key_style),
                    Span::styled(" generate ", generate_style),
                    Span::styled(" d ", key_style),
                    Span::styled(" remove image ", label_style),
                    Span::styled(" Esc ", key_style),
                    Span::styled(" start over ", label_style),
                ]
            }
            (Screen::Input, InputMode::Editing) => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(
                    if app.focused_field == FormField::Image { " attach " } else { " done " },
                    label_style,
                ),
                Span::styled(" Tab ", key_style),
                Span::styled(" next field ", label_style),
                Span::styled(" Ctrl+G ", key_style),
                Span::styled(" generate ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" done ", label_style),
            ],
            (Screen::Loading, _) => vec![
                Span::styled(" Esc ", key_style),
                Span::styled(" abandon and start over ", label_style),
            ],
            (Screen::Output, _) => vec![
                Span::styled(" j/k ", key_style),
                Span::styled(" option ", label_style),
                Span::styled(" c ", key_style),
                Span::styled(" copy ", label_style),
                Span::styled(" r ", key_style),
                Span::styled(" regenerate ", label_style),
                Span::styled(" s ", key_style),
                Span::styled(" start over ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    spans.extend(hints);
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_home(app: &App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;
    let [_, center, _] = Layout::vertical([
        Constraint::Percentage(35),
        Constraint::Length(5),
        Constraint::Min(0),
    ])
    .areas(area);

    let lines = vec![
        Line::from(Span::styled(
            "✍️  Need help writing product content?",
            Style::default().fg(theme.fg()).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Generate consistent, on-brand UX copy for buttons, tooltips, error messages, and more.",
            Style::default().fg(theme.dim()),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled("→ Press Enter", Style::default().fg(theme.accent()).bold()),
            Span::styled(" to start writing", Style::default().fg(theme.dim())),
        ]),
    ];

    let home = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(home, center);
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;
    let [_, center, _] = Layout::vertical([
        Constraint::Percentage(40),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let dots = ".".repeat((app.animation_frame as usize) + 1);
    let lines = vec![
        Line::from(Span::styled(
            format!("Generating copy suggestions{}", dots),
            Style::default().fg(theme.fg()).bold(),
        )),
        Line::default(),
        Line::from(Span::styled(
            "The AI is thinking, this might take a moment.",
            Style::default().fg(theme.dim()).add_modifier(Modifier::ITALIC),
        )),
    ];

    let loading = Paragraph::new(lines).alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(loading, center);
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let banner_height = if app.error.is_some() { 4 } else { 0 };
    let [banner_area, form_area] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(0),
    ])
    .areas(area);

    if let Some(error) = &app.error {
        let banner = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" An Error Occurred "),
            );
        frame.render_widget(banner, banner_area);
    }

    let [left, right] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(form_area);

    let [description_area, content_type_area, tone_area, char_limit_area, _] =
        Layout::vertical([
            Constraint::Length(7),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .areas(left);

    let [image_area, location_area, trigger_area, outcome_area, _] = Layout::vertical([
        Constraint::Length(6),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(right);

    render_text_field(
        app,
        frame,
        description_area,
        FormField::Description,
        " Describe what you want to say or explain * ",
        &app.form.description,
        "e.g., Tooltip explaining why the export button is disabled when no filters are selected.",
    );
    render_value_field(
        app,
        frame,
        content_type_area,
        FormField::ContentType,
        " Content type ",
        &app.form.content_type,
    );
    render_value_field(app, frame, tone_area, FormField::Tone, " Tone ", &app.form.tone);
    render_text_field(
        app,
        frame,
        char_limit_area,
        FormField::CharLimit,
        " Character limit ",
        &app.form.char_limit,
        "e.g., 100",
    );

    render_image_field(app, frame, image_area);

    render_text_field(
        app,
        frame,
        location_area,
        FormField::Location,
        " Component or location ",
        &app.form.location,
        "e.g., Settings panel",
    );
    render_text_field(
        app,
        frame,
        trigger_area,
        FormField::Trigger,
        " Trigger / User action ",
        &app.form.trigger,
        "e.g., User deletes project",
    );
    render_text_field(
        app,
        frame,
        outcome_area,
        FormField::Outcome,
        " Intended outcome ",
        &app.form.outcome,
        "e.g., Warn them but let them proceed",
    );
}

fn field_border(app: &App, field: FormField) -> Style {
    if app.focused_field == field {
        if app.input_mode == InputMode::Editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(app.theme.focus_border())
        }
    } else {
        Style::default().fg(app.theme.border())
    }
}

fn render_text_field(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    field: FormField,
    title: &str,
    value: &str,
    placeholder: &str,
) {
    let theme = app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border(app, field))
        .title(title);
    let inner = block.inner(area);

    let paragraph = if value.is_empty() {
        Paragraph::new(placeholder).style(Style::default().fg(theme.dim()))
    } else {
        Paragraph::new(value).style(Style::default().fg(theme.fg()))
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);

    // Cursor tracks the character index, wrapped to the field width
    if app.focused_field == field && app.input_mode == InputMode::Editing && inner.width > 0 {
        let width = inner.width as usize;
        let x = (app.cursor % width) as u16;
        let y = ((app.cursor / width) as u16).min(inner.height.saturating_sub(1));
        frame.set_cursor_position((inner.x + x, inner.y + y));
    }
}

fn render_value_field(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    field: FormField,
    title: &str,
    value: &str,
) {
    let theme = app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border(app, field))
        .title(title);

    let content = if value.is_empty() {
        Span::styled("Optional (Enter to choose)", Style::default().fg(theme.dim()))
    } else {
        Span::styled(value.to_string(), Style::default().fg(theme.fg()))
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);
}

fn render_image_field(app: &App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(field_border(app, FormField::Image))
        .title(" Screenshot or mockup (optional) ");
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();
    if app.form.image_path.is_empty() {
        lines.push(Line::from(Span::styled(
            "Path to a PNG, JPEG, GIF, or SVG file",
            Style::default().fg(theme.dim()),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            app.form.image_path.clone(),
            Style::default().fg(theme.fg()),
        )));
    }

    if let Some(error) = &app.attachment_error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(attached) = &app.attachment {
        lines.push(Line::from(vec![
            Span::styled("✓ ", Style::default().fg(Color::Green)),
            Span::styled(
                format!(
                    "{} · {} KB · {}",
                    attached.file_name,
                    (attached.bytes + 1023) / 1024,
                    attached.image.mime_type
                ),
                Style::default().fg(theme.fg()),
            ),
        ]));
    } else {
        lines.push(Line::from(Span::styled(
            "Helps AI understand where the message will appear.",
            Style::default().fg(theme.dim()),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if app.focused_field == FormField::Image
        && app.input_mode == InputMode::Editing
        && inner.width > 0
    {
        let x = (app.cursor as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((inner.x + x, inner.y));
    }
}

fn render_output(app: &App, frame: &mut Frame, area: Rect) {
    let theme = app.theme;

    let Some(response) = &app.response else {
        let [_, center, _] = Layout::vertical([
            Constraint::Percentage(35),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .areas(area);
        let fallback = Paragraph::new(vec![
            Line::from(Span::styled(
                "Something went wrong",
                Style::default().fg(theme.fg()).bold(),
            )),
            Line::from(Span::styled(
                "We couldn't generate any copy. Please try again.",
                Style::default().fg(theme.dim()),
            )),
            Line::default(),
            Line::from(Span::styled(
                "Press s to start over",
                Style::default().fg(theme.accent()),
            )),
        ])
        .alignment(ratatui::layout::Alignment::Center);
        frame.render_widget(fallback, center);
        return;
    };

    let [heading_area, cards_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let heading = Paragraph::new(vec![
        Line::from(Span::styled(
            "✅ Here are your copy suggestions",
            Style::default().fg(theme.fg()).bold(),
        )),
        Line::from(Span::styled(
            "Review the options below and copy your favorite.",
            Style::default().fg(theme.dim()),
        )),
    ])
    .alignment(ratatui::layout::Alignment::Center);
    frame.render_widget(heading, heading_area);

    let constraints: Vec<Constraint> = response
        .options
        .iter()
        .map(|_| Constraint::Length(7))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let card_areas = Layout::vertical(constraints).split(cards_area);

    for (index, option) in response.options.iter().enumerate() {
        let selected = index == app.selected_option;
        let border = if selected {
            Style::default().fg(theme.accent())
        } else {
            Style::default().fg(theme.border())
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" Option {} ", index + 1));
        let card_area = card_areas[index];
        let inner = block.inner(card_area);
        frame.render_widget(block, card_area);

        let [text_area, meta_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(inner.inner(Margin { vertical: 0, horizontal: 1 }));

        let text = Paragraph::new(option.text.as_str())
            .style(Style::default().fg(theme.fg()))
            .wrap(Wrap { trim: true });
        frame.render_widget(text, text_area);

        let mut meta = vec![
            Span::styled(
                format!(" {} ", option.tone),
                Style::default().fg(theme.accent()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {} chars", option.character_count),
                Style::default().fg(theme.dim()),
            ),
        ];
        if app.copied_option == Some(index) {
            meta.push(Span::styled(
                "  Copied!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ));
        } else if selected {
            meta.push(Span::styled("  c to copy", Style::default().fg(theme.dim())));
        }
        frame.render_widget(Paragraph::new(Line::from(meta)), meta_area);
    }
}

fn render_picker(
    app: &mut App,
    frame: &mut Frame,
    area: Rect,
    title: &str,
    labels: &[&str],
    content_type: bool,
) {
    let height = (labels.len() + 3) as u16;
    let width = 32u16.min(area.width);
    let popup = centered_rect(area, width, height);

    let items: Vec<ListItem> = std::iter::once(ListItem::new(" (none) "))
        .chain(labels.iter().map(|l| ListItem::new(format!(" {} ", l))))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.focus_border()))
                .title(title.to_string()),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_widget(Clear, popup);
    let state = if content_type {
        &mut app.content_type_state
    } else {
        &mut app.tone_state
    };
    frame.render_stateful_widget(list, popup, state);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiClient;
    use crate::model::{CopyOption, CopyResponse};
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(app: &mut App) -> String {
        let backend = TestBackend::new(100, 40);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_home_screen_invites_a_start() {
        let mut app = App::new(GeminiClient::new("test-key"));
        let screen = rendered(&mut app);
        assert!(screen.contains("Need help writing product content?"));
        assert!(screen.contains("UX Writing Assistant"));
    }

    #[test]
    fn test_output_screen_shows_card_with_tone_and_count() {
        let mut app = App::new(GeminiClient::new("test-key"));
        app.start();
        app.form.description = "Tooltip for disabled export button".to_string();
        let (id, _) = app.submit().unwrap();
        app.complete(
            id,
            Ok(CopyResponse {
                options: vec![CopyOption {
                    text: "Export is disabled until you pick at least one filter.".to_string(),
                    tone: "Friendly".to_string(),
                    character_count: 53,
                }],
            }),
        );

        let screen = rendered(&mut app);
        assert!(screen.contains("Option 1"));
        assert!(!screen.contains("Option 2"));
        assert!(screen.contains("Friendly"));
        assert!(screen.contains("53 chars"));
        assert!(screen.contains("Export is disabled until you pick at least one"));
    }

    #[test]
    fn test_input_screen_surfaces_error_banner() {
        let mut app = App::new(GeminiClient::new("test-key"));
        app.start();
        app.form.description = "Draft".to_string();
        let (id, _) = app.submit().unwrap();
        app.complete(id, Err(anyhow::anyhow!("Failed to get suggestions from AI: boom")));

        let screen = rendered(&mut app);
        assert!(screen.contains("An Error Occurred"));
        assert!(screen.contains("boom"));
        // The form keeps the user's draft
        assert!(screen.contains("Draft"));
    }
}
