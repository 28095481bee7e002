//! Full-screen layout: story on top, draft field and status below, palette over everything.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use notepal_util::text_processing::truncate_to_width;

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();
    let regions = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    draw_story(frame, regions[0], app);
    draw_draft(frame, regions[1], app);
    frame.render_widget(
        Paragraph::new(Span::styled(app.status.clone(), app.theme.muted_style())),
        regions[2],
    );

    let density = app.density();
    let App {
        surface,
        palette_input,
        theme,
        ..
    } = app;
    surface.draw(frame, area, palette_input, theme, density);
}

fn draw_story(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(false))
        .style(theme.panel_style())
        .title(Span::styled(" Story ", theme.accent_style()));
    let inner_width = usize::from(area.width.saturating_sub(2));

    let story = app.story();
    let mut lines: Vec<Line> = Vec::new();
    match story.split_first() {
        None => lines.push(Line::from(Span::styled("Nothing open yet", theme.muted_style()))),
        Some((top, rest)) => {
            lines.push(Line::from(Span::styled(truncate_to_width(top, inner_width), theme.accent_style())));
            for text_line in app.top_item_text().unwrap_or_default().lines() {
                lines.push(Line::from(Span::styled(text_line.to_string(), theme.text_style())));
            }
            if !rest.is_empty() {
                lines.push(Line::default());
                for title in rest {
                    lines.push(Line::from(Span::styled(
                        truncate_to_width(title, inner_width),
                        theme.muted_style(),
                    )));
                }
            }
        }
    }
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_draft(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let focused = !app.is_palette_open();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(focused))
        .title(Span::styled(" Draft ", theme.muted_style()));
    let inner = block.inner(area);

    let draft = &app.draft;
    let (start, end) = draft.selection_range();
    let text = draft.input();
    let line = Line::from(vec![
        Span::styled(&text[..start], theme.text_style()),
        Span::styled(&text[start..end], theme.selection_style()),
        Span::styled(&text[end..], theme.text_style()),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);

    if focused {
        let column = text[..draft.cursor()].width() as u16;
        frame.set_cursor_position((inner.x.saturating_add(column), inner.y));
    }
}
