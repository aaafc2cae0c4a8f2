use personal_ai_core::chat::{CounterLevel, MAX_INPUT_CHARS, SUGGESTIONS};
use personal_ai_core::wizard::{NotifyLevel, StepAction};
use personal_ai_core::{Feedback, FieldName, Sender, Style as CommStyle};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode, Screen};

/// Break text into fixed-width rows so the cursor can be placed exactly.
fn chunk_chars(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

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
        Screen::Train => render_train_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let profile_indicator = match app.chat.profile() {
        Some(profile) if profile.trained => format!(" [trained: {}]", profile.name),
        _ => " [untrained]".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(" My Personal AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(profile_indicator, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
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

    let mode_text = match app.screen {
        Screen::Train => " TRAIN ",
        Screen::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let pairs: Vec<(&str, &str)> = match (app.screen, app.input_mode) {
        (Screen::Train, InputMode::Normal) if app.train_view.success => {
            vec![(" c ", " chat "), (" r ", " retrain "), (" q ", " quit ")]
        }
        (Screen::Train, InputMode::Normal) => {
            let forward = match app.train_view.navigation.action {
                StepAction::Next => " next ",
                StepAction::Submit => " submit ",
            };
            let mut hints = Vec::new();
            if app.current_field() == Some(FieldName::Style) {
                hints.push((" j/k ", " choose "));
            } else {
                hints.push((" i ", " edit "));
            }
            hints.push((" n ", forward));
            if app.train_view.navigation.prev_enabled {
                hints.push((" p ", " previous "));
            }
            hints.extend([(" c ", " chat "), (" q ", " quit ")]);
            hints
        }
        (Screen::Train, InputMode::Editing) => {
            vec![(" Enter ", " done & next "), (" Esc ", " done ")]
        }
        (Screen::Chat, InputMode::Normal) => vec![
            (" i ", " type "),
            (" 1-4 ", " suggestion "),
            (" j/k ", " scroll "),
            (" t ", " train "),
            (" q ", " quit "),
        ],
        (Screen::Chat, InputMode::Editing) => {
            vec![(" Enter ", " send "), (" Esc ", " stop typing ")]
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in pairs {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    // Notification from the form, if any
    if app.screen == Screen::Train {
        if let Some((message, level)) = &app.train_view.status {
            let color = match level {
                NotifyLevel::Info => Color::Cyan,
                NotifyLevel::Success => Color::Green,
                NotifyLevel::Error => Color::Red,
            };
            spans.push(Span::raw("  "));
            spans.push(Span::styled(message.clone(), Style::default().fg(color).bold()));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_train_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    if app.train_view.success {
        render_success(app, frame, area);
        return;
    }

    let [progress_area, form_area, nav_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let view = &app.train_view;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Step {} of {} ", view.step, view.total)),
        )
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(view.percent.min(100))
        .label(format!("{} of {} complete", view.completed, view.total));
    frame.render_widget(gauge, progress_area);

    if let Some(field) = app.current_field() {
        if field == FieldName::Style {
            render_style_picker(app, frame, form_area);
        } else {
            render_field_input(app, field, frame, form_area);
        }
    }

    render_step_navigation(app, frame, nav_area);
}

fn feedback_color(feedback: &Feedback) -> Color {
    match feedback {
        Feedback::None => Color::DarkGray,
        Feedback::Valid => Color::Green,
        Feedback::Invalid(_) => Color::Red,
    }
}

fn render_field_input(app: &App, field: FieldName, frame: &mut Frame, area: Rect) {
    let feedback = app.train_view.feedback_for(field);
    let editing = app.input_mode == InputMode::Editing;

    // Long answers get a tall box
    let input_height = match field {
        FieldName::Approach | FieldName::Example => 8,
        _ => 3,
    };

    let [input_area, feedback_area, _] = Layout::vertical([
        Constraint::Length(input_height),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let border_color = if editing {
        Color::Yellow
    } else {
        feedback_color(feedback)
    };

    let value = app.current_value();
    let count = value.trim().chars().count();
    let counter = match field.rule().min_length {
        Some(min) => format!(" {}/{} ", count, min),
        None => String::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", field.label()))
        .title_bottom(Line::from(counter).right_aligned());

    let inner_width = input_area.width.saturating_sub(2) as usize;
    let inner_height = input_area.height.saturating_sub(2) as usize;
    let rows = chunk_chars(value, inner_width);

    // Keep the cursor row on screen
    let cursor_row = if inner_width == 0 { 0 } else { app.field_cursor / inner_width };
    let row_offset = (cursor_row + 1).saturating_sub(inner_height.max(1));

    let text: Vec<Line> = if value.is_empty() && !editing {
        vec![Line::from(Span::styled(
            "Press i to start typing...",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        rows.into_iter().skip(row_offset).map(Line::from).collect()
    };

    let input = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, input_area);

    if editing && inner_width > 0 {
        let cursor_col = (app.field_cursor % inner_width) as u16;
        let cursor_y = (cursor_row - row_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_col + 1, input_area.y + cursor_y + 1));
    }

    let feedback_line = Paragraph::new(Span::styled(
        feedback.text(),
        Style::default().fg(feedback_color(feedback)),
    ));
    frame.render_widget(feedback_line, feedback_area);
}

fn render_style_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let feedback = app.train_view.feedback_for(FieldName::Style).clone();

    let [list_area, feedback_area, _] = Layout::vertical([
        Constraint::Length(CommStyle::all().len() as u16 + 2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    let items: Vec<ListItem> = CommStyle::all()
        .iter()
        .map(|style| ListItem::new(format!(" {} ", style.display_name())))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(feedback_color(&feedback)))
                .title(format!(" {} ", FieldName::Style.label())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.style_state);

    let feedback_line = Paragraph::new(Span::styled(
        feedback.text(),
        Style::default().fg(feedback_color(&feedback)),
    ));
    frame.render_widget(feedback_line, feedback_area);
}

fn render_step_navigation(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.train_view;
    let enabled = Style::default().fg(Color::White).bold();
    let disabled = Style::default().fg(Color::DarkGray);

    let prev = Span::styled(
        "◀ Previous",
        if view.navigation.prev_enabled { enabled } else { disabled },
    );

    let forward = if view.submitting {
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Span::styled(format!("Processing{}", dots), Style::default().fg(Color::Yellow))
    } else {
        match view.navigation.action {
            StepAction::Next => Span::styled("Next ▶", enabled),
            StepAction::Submit => {
                Span::styled("Train my AI ✓", Style::default().fg(Color::Green).bold())
            }
        }
    };

    let line = Line::from(vec![Span::raw(" "), prev, Span::raw("   "), forward]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_success(app: &App, frame: &mut Frame, area: Rect) {
    let name = app
        .chat
        .profile()
        .map(|p| p.name.clone())
        .unwrap_or_default();

    let text = Text::from(vec![
        Line::default(),
        Line::from(Span::styled(
            "✓ Your AI has been trained!",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(format!(
            "Thanks, {}. Your answers are saved and your AI now thinks a little more like you.",
            name
        )),
        Line::default(),
        Line::from(Span::styled(
            "Press c to start chatting, or r to go through training again.",
            Style::default().fg(Color::DarkGray),
        )),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Training complete ");

    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, suggestions_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_view.height = chat_area.height.saturating_sub(2);
    app.chat_view.width = chat_area.width.saturating_sub(2);
    if app.chat_view.follow {
        app.scroll_chat_to_bottom();
    }

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    let chat_text = if app.chat.messages().is_empty() && !app.chat_view.typing {
        let hint = if app.chat.profile().is_some() {
            "Say hello, or pick a suggestion below..."
        } else {
            "Say hello! Train your AI first (press t) for personalized replies."
        };
        Text::from(Span::styled(hint, Style::default().fg(Color::DarkGray)))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in app.chat.messages() {
            let label_style = match msg.sender {
                Sender::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                Sender::Ai => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{}:", app.chat.label_for(msg.sender)), label_style),
                Span::styled(
                    format!(" {}", msg.time_label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]));
            for line in msg.text.lines() {
                lines.push(Line::from(line.to_string()));
            }
            lines.push(Line::default());
        }

        if app.chat_view.typing {
            lines.push(Line::from(Span::styled(
                "AI:",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_view.scroll, 0));
    frame.render_widget(chat, chat_area);

    // Suggestion prompts
    let mut suggestion_spans = Vec::new();
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        suggestion_spans.push(Span::styled(
            format!(" {} ", i + 1),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ));
        suggestion_spans.push(Span::styled(
            format!(" {} ", suggestion),
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(suggestion_spans)), suggestions_area);

    // Input box - greyed out while a reply is pending
    let editing = app.input_mode == InputMode::Editing;
    let input_border_color = if app.chat_view.typing {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let count = app.chat_input.trim().chars().count();
    let counter_color = match app.counter_level() {
        CounterLevel::Normal => Color::DarkGray,
        CounterLevel::Warning => Color::Yellow,
        CounterLevel::Error => Color::Red,
    };
    let send_hint = if app.chat_view.send_enabled { " Enter to send " } else { "" };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(input_border_color))
        .title(" Message ")
        .title_bottom(
            Line::from(vec![
                Span::styled(send_hint, Style::default().fg(Color::Green)),
                Span::styled(
                    format!(" {}/{} ", count, MAX_INPUT_CHARS),
                    Style::default().fg(counter_color),
                ),
            ])
            .right_aligned(),
        );

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = app.chat_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .chat_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(input, input_area);

    // Show cursor when editing
    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));
    }
}
