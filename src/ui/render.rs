use crate::ui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Draw one frame: filter field, item list, status line.
///
/// Takes `&mut App` because the draw feeds layout facts back into the
/// controller: the list rectangle (pointer hit-testing) and its height
/// (viewport sizing) are only known here.
pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter field
            Constraint::Min(0),    // Item list
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_filter(frame, app, chunks[0]);
    render_items(frame, app, chunks[1]);
    render_status(frame, app, chunks[2]);
}

fn render_filter(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.query.is_empty() {
        Line::from(Span::styled(
            "Filter by name...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(app.query.clone())
    };

    let field = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Filter")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(field, area);

    // The filter field is always focused; park the hardware cursor after
    // the query text.
    let cursor_x = area.x + 1 + app.query.width() as u16;
    frame.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
}

fn render_items(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Applications")
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    app.record_list_area(inner);

    let first = app.list.viewport_first();
    let items: Vec<ListItem> = app
        .list
        .visible()
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let style = if first + offset == app.list.selected_index() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(item.name.clone()).style(style)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let status = Paragraph::new(app.status.get()).style(Style::default().fg(Color::Gray));
    frame.render_widget(status, area);
}
