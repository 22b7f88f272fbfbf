use lugia_core::{format, ChatMessage, ChatModel, ChatRole, RenderBlock, TextSegment};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, BannerKind, FocusPane, InputMode};
use crate::highlight::highlight_code;
use crate::theme::{Palette, Theme};

const SIDEBAR_WIDTH: u16 = 32;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            // Consume the second *
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut current_text), base));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;

            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(bold_text, base.add_modifier(Modifier::BOLD)));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
                if found_close {
                    current_text.push_str("**");
                }
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, base));
    }

    spans
}

/// Display lines for one message: role label, formatted body, blank spacer
fn message_lines(msg: &ChatMessage, theme: Theme, palette: &Palette) -> Vec<Line<'static>> {
    let (label, label_color) = match msg.role {
        ChatRole::User => ("You:", palette.user),
        ChatRole::Assistant => ("AI:", palette.assistant),
    };

    let mut lines = vec![Line::from(Span::styled(
        label,
        Style::default().fg(label_color).add_modifier(Modifier::BOLD),
    ))];

    let text_style = Style::default().fg(palette.text);
    let code_style = Style::default().fg(palette.code);
    let gutter_style = Style::default().fg(palette.code_gutter);

    for block in format(&msg.content) {
        match block {
            RenderBlock::Text(text) => {
                for segment in &text.segments {
                    // Breaks only separate lines; every Line is its own row
                    if let TextSegment::Line(line) = segment {
                        let mut spans = vec![Span::raw("    ".repeat(line.indent))];
                        spans.extend(parse_markdown_line(&line.content, text_style));
                        lines.push(Line::from(spans));
                    }
                }
            }
            RenderBlock::Code(code) => {
                let highlighted = highlight_code(&code, theme, code_style);
                let header = match &highlighted.language {
                    Some(language) => format!("┌─ {} ", language),
                    None => "┌─".to_string(),
                };
                lines.push(Line::from(Span::styled(header, gutter_style)));
                for code_line in highlighted.lines {
                    let mut spans = vec![Span::styled("│ ", gutter_style)];
                    spans.extend(code_line);
                    lines.push(Line::from(spans));
                }
                lines.push(Line::from(Span::styled("└─", gutter_style)));
            }
        }
    }

    lines.push(Line::default());
    lines
}

/// Formatted lines for a message history. Appended messages are formatted
/// once; a new generation or theme starts over.
#[derive(Debug, Default)]
pub struct MessageCache {
    key: Option<(u64, Theme)>,
    formatted: usize,
    lines: Vec<Line<'static>>,
}

impl MessageCache {
    pub fn lines(&mut self, messages: &[ChatMessage], generation: u64, theme: Theme) -> &[Line<'static>] {
        if self.key != Some((generation, theme)) || self.formatted > messages.len() {
            self.key = Some((generation, theme));
            self.formatted = 0;
            self.lines.clear();
        }

        let palette = theme.palette();
        for msg in &messages[self.formatted..] {
            self.lines.extend(message_lines(msg, theme, &palette));
        }
        self.formatted = messages.len();
        &self.lines
    }
}

/// Rows the lines occupy once wrapped to `width`
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    total.min(u16::MAX as usize) as u16
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

    if app.sidebar_collapsed {
        app.list_area = None;
        render_main(app, frame, body_area);
    } else {
        let [sidebar_area, main_area] = Layout::horizontal([
            Constraint::Length(SIDEBAR_WIDTH.min(body_area.width / 2)),
            Constraint::Min(0),
        ])
        .areas(body_area);
        render_sidebar(app, frame, sidebar_area);
        render_main(app, frame, main_area);
    }

    render_footer(app, frame, footer_area);

    if app.show_model_picker {
        render_model_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let bar = Style::default().bg(palette.bar_bg).fg(palette.bar_fg);

    let status = if app.history_loading {
        " loading..."
    } else if app.list_loading {
        " refreshing..."
    } else {
        ""
    };

    let title = Line::from(vec![
        Span::styled(" Lugia ", bar.fg(palette.accent).bold()),
        Span::styled(format!("v{}", env!("CARGO_PKG_VERSION")), bar),
        Span::styled(status, bar),
    ]);

    let header = Paragraph::new(title).style(bar);
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(palette.info_bg).fg(palette.selection_fg),
        InputMode::Editing => Style::default().bg(palette.assistant).fg(palette.bar_fg),
    };
    let mode_text = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Search) => " SEARCH ",
        (InputMode::Editing, _) => " INSERT ",
        (InputMode::Normal, _) => " NORMAL ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(palette.bar_bg).fg(palette.bar_fg);
    let label_style = Style::default().fg(palette.text);

    let keys: &[(&str, &str)] = match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Search) => &[("Enter", "apply"), ("Esc", "done")],
        (InputMode::Editing, _) => &[("Enter", "send"), ("Esc", "done")],
        (InputMode::Normal, FocusPane::Conversations | FocusPane::Search) => &[
            ("j/k", "nav"),
            ("Enter", "open"),
            ("n", "new"),
            ("d", "delete"),
            ("[/]", "page"),
            ("/", "search"),
            ("Tab", "focus"),
            ("q", "quit"),
        ],
        (InputMode::Normal, _) => &[
            ("i", "write"),
            ("j/k", "scroll"),
            ("n", "new"),
            ("r", "reload"),
            ("m", "model"),
            ("t", "theme"),
            ("b", "panel"),
            ("x", "dismiss"),
            ("q", "quit"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let [search_area, list_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    app.list_area = Some(list_area);

    // Search box
    let searching = app.focus == FocusPane::Search && app.input_mode == InputMode::Editing;
    let search_border = if app.focus == FocusPane::Search { palette.accent } else { palette.muted };
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(search_border))
        .title(if app.search_debounce.is_pending() { " Search (/) ... " } else { " Search (/) " });

    let search_text = if app.search_input.is_empty() && !searching {
        Span::styled("filter conversations", Style::default().fg(palette.muted))
    } else {
        Span::styled(app.search_input.clone(), Style::default().fg(palette.text))
    };
    frame.render_widget(Paragraph::new(search_text).block(search_block), search_area);

    if searching {
        let inner_width = search_area.width.saturating_sub(2);
        let cursor_x = (app.search_input.chars().count() as u16).min(inner_width.saturating_sub(1));
        frame.set_cursor_position((search_area.x + cursor_x + 1, search_area.y + 1));
    }

    // Conversation list
    let list_focused = app.focus == FocusPane::Conversations;
    let list_border = if list_focused { palette.accent } else { palette.muted };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(list_border))
        .title(app.list_title());

    let visible = app.visible_conversations();
    let items: Vec<ListItem> = if visible.is_empty() {
        let message = if app.conversations.is_empty() {
            "No conversations"
        } else {
            "No matches"
        };
        vec![ListItem::new(Span::styled(message, Style::default().fg(palette.muted)))]
    } else {
        visible
            .iter()
            .map(|entry| {
                let marker = if entry.selected { "● " } else { "  " };
                let style = if entry.selected {
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.text)
                };
                ListItem::new(format!("{}{}", marker, entry.id.label())).style(style)
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(palette.selection_bg)
                .fg(palette.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, list_area, &mut app.conversation_state);
}

fn render_main(app: &mut App, frame: &mut Frame, area: Rect) {
    let banner_height = if app.banner.is_some() { 1 } else { 0 };
    let [banner_area, chat_area, input_area] = Layout::vertical([
        Constraint::Length(banner_height),
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    if banner_height > 0 {
        render_banner(app, frame, banner_area);
    }
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
}

fn render_banner(app: &App, frame: &mut Frame, area: Rect) {
    let Some(banner) = &app.banner else {
        return;
    };
    let palette = app.theme.palette();
    let bg = match banner.kind {
        BannerKind::Error => palette.error_bg,
        BannerKind::Info => palette.info_bg,
    };
    let line = Line::from(vec![
        Span::raw(format!(" {} ", banner.message)),
        Span::styled("(x to dismiss)", Style::default().add_modifier(Modifier::DIM)),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(bg).fg(palette.selection_fg)),
        area,
    );
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();

    // Store area for mouse hit-testing and inner size for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    let inner_width = area.width.saturating_sub(2);

    let border = if app.focus == FocusPane::Chat { palette.accent } else { palette.muted };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(app.chat_title());

    let lines: Vec<Line<'static>> = if app.messages().is_empty() && !app.sending && !app.history_loading {
        vec![Line::from(Span::styled(
            "Start typing to chat (i)...",
            Style::default().fg(palette.muted),
        ))]
    } else {
        let mut lines = app.message_lines().to_vec();

        if app.sending || app.history_loading {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            let label = if app.sending { "Thinking" } else { "Loading" };
            lines.push(Line::from(Span::styled(
                format!("{}{}", label, dots),
                Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    };

    app.chat_total_lines = wrapped_height(&lines, inner_width);
    let max_scroll = app.chat_total_lines.saturating_sub(app.chat_height);
    app.chat_scroll = if app.follow_bottom {
        max_scroll
    } else {
        app.chat_scroll.min(max_scroll)
    };

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let editing = app.input_mode == InputMode::Editing && app.focus == FocusPane::Input;
    let border = if editing || app.focus == FocusPane::Input {
        palette.assistant
    } else {
        palette.muted
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Message (i to write, Enter to send) ");

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(palette.user))
        .block(input_block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_model_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let palette = app.theme.palette();
    let models = ChatModel::all();

    // Centered popup
    let popup_width = 44.min(area.width.saturating_sub(4));
    let popup_height = (models.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent))
        .title(" Select Model (Enter to select, Esc to cancel) ");

    let items: Vec<ListItem> = models
        .iter()
        .map(|model| {
            let style = if model.as_str() == app.selected_model {
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text)
            };
            ListItem::new(format!(" {} ({}) ", model.display_name(), model.as_str())).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(palette.selection_bg)
                .fg(palette.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.model_picker_state);
}
