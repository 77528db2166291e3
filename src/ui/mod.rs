use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, Popup, Section};
use crate::theme::Theme;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme once at startup, before the first draw
pub fn init_theme(accent_override: Option<&str>) {
    let _ = THEME.set(Theme::load(accent_override));
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Responsive layout: the viewer gets the larger share unless the
    // terminal is too short for both boxes
    let (viewer_height, history_height) = if area.height < 20 {
        (Constraint::Min(5), Constraint::Min(4))
    } else {
        (Constraint::Ratio(2, 3), Constraint::Ratio(1, 3))
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Info line
            viewer_height,         // Viewer box
            history_height,        // History box
            Constraint::Length(1), // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_viewer_box(f, app, chunks[1]);
    draw_history_box(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::Help => draw_help_popup(f),
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: in-flight fetches > status message > ready
    let line = if app.in_flight > 0 {
        let label = if app.in_flight == 1 {
            "Fetching doggo…".to_string()
        } else {
            format!("Fetching doggos… ({} in flight)", app.in_flight)
        };
        Line::from(vec![Span::styled(label, Style::default().fg(accent()))])
    } else if let Some(ref status) = app.status_message {
        let color = if status.starts_with("Error") { danger() } else { text() };
        Line::from(vec![Span::styled(status, Style::default().fg(color))])
    } else if app.fetched_total > 0 {
        Line::from(vec![Span::styled(
            format!("Ready │ {} fetched", app.fetched_total),
            Style::default().fg(text_dim()),
        )])
    } else {
        Line::from(vec![Span::styled("Ready", Style::default().fg(text_dim()))])
    };

    let info = Paragraph::new(line).alignment(Alignment::Center);
    f.render_widget(info, area);
}

fn draw_viewer_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::Viewer;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let block = Block::default()
        .title(Span::styled(" Doggo ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let lines = match app.viewer.image() {
        Some(card) => vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("󰉏 ", Style::default().fg(accent())),
                Span::styled(card.src.clone(), Style::default().fg(text())),
            ]),
            Line::from(vec![Span::styled(
                card.alt.clone(),
                Style::default().fg(text_dim()).add_modifier(Modifier::ITALIC),
            )]),
        ],
        None => vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "No doggo yet",
                Style::default().fg(text_dim()),
            )]),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(text_dim())),
                Span::styled("Space", Style::default().fg(accent())),
                Span::styled(" to fetch one", Style::default().fg(text_dim())),
            ]),
        ],
    };

    let content = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(content, area);
}

fn draw_history_box(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.section == Section::History;
    let border_color = if is_active { accent() } else { inactive() };
    let title_style = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };

    let block = Block::default()
        .title(Span::styled(" History ", title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    if app.history.is_empty() {
        let empty = Paragraph::new(Line::from(vec![Span::styled(
            "  Fetched doggos show up here",
            Style::default().fg(text_dim()),
        )]))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header_row = Row::new(vec![
        Span::styled("#", Style::default().fg(header())),
        Span::styled("URL", Style::default().fg(header())),
    ]);

    // Newest last, like the fetch order
    let rows: Vec<Row> = app
        .history
        .iter()
        .enumerate()
        .map(|(idx, card)| {
            let selected = is_active && idx == app.selected_history;
            let style = if selected {
                Style::default().fg(text()).bg(bg_selected())
            } else {
                Style::default().fg(text())
            };
            Row::new(vec![
                Span::raw(format!("{}", idx + 1)),
                Span::raw(card.src.clone()),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(4), Constraint::Min(20)])
        .header(header_row)
        .block(block);

    f.render_widget(table, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.section {
        Section::Viewer => vec![
            ("Space", "Fetch"),
            ("Tab", "History"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
        Section::History => vec![
            ("↑↓", "Nav"),
            ("Enter", "Recall"),
            ("f", "Fetch"),
            ("Tab", "Viewer"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    let footer = Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "═══ Navigation ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Tab       ", Style::default().fg(accent())),
            Span::raw("Switch between Doggo and History"),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓ j/k   ", Style::default().fg(accent())),
            Span::raw("Move through the history list"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Actions ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  Space     ", Style::default().fg(accent())),
            Span::raw("Fetch a new random doggo"),
        ]),
        Line::from(vec![
            Span::styled("  f         ", Style::default().fg(accent())),
            Span::raw("Fetch from any section"),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", Style::default().fg(accent())),
            Span::raw("In History: show that doggo again"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "═══ Quick Start ═══",
            Style::default().fg(header()).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("  doggo             ", Style::default().fg(accent())),
            Span::raw("Launch this TUI"),
        ]),
        Line::from(vec![
            Span::styled("  doggo --fetch     ", Style::default().fg(accent())),
            Span::raw("Fetch once, print JSON"),
        ]),
        Line::from(vec![
            Span::styled("  doggo --endpoint  ", Style::default().fg(accent())),
            Span::raw("Point at a different API"),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or q to close",
            Style::default().fg(text_dim()),
        )),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(
                    " Help ",
                    Style::default().fg(accent()).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
