//! Palette overlay: a [`UiSink`] that keeps the latest view and draws it.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use notepal_engine::{PaletteView, UiSink, ViewRow};

use crate::ui::text_input::TextInputState;
use crate::ui::theme::{PaletteDensity, Theme};

const MIN_WIDTH: u16 = 40;
const HINT_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;

/// Latest palette snapshot plus the screen geometry it was drawn with.
#[derive(Debug, Default)]
pub struct PaletteSurface {
    view: PaletteView,
    layout: Option<PaletteLayout>,
}

/// Where the palette landed on screen, kept for mouse hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteLayout {
    pub outer: Rect,
    pub input: Rect,
    pub rows: Rect,
    pub density: PaletteDensity,
}

/// What a mouse click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteHit {
    /// A result row, by absolute index into the result list.
    Row(usize),
    /// Inside the palette but not on a row.
    Inside,
    Outside,
}

impl UiSink for PaletteSurface {
    fn render(&mut self, view: &PaletteView) {
        self.view = view.clone();
    }
}

impl PaletteSurface {
    pub fn view(&self) -> &PaletteView {
        &self.view
    }

    pub fn layout(&self) -> Option<PaletteLayout> {
        self.layout
    }

    /// Rows that fit below the input for the given screen.
    pub fn viewport_rows(screen: Rect, density: PaletteDensity) -> usize {
        let available = screen.height.saturating_sub(2 + INPUT_HEIGHT + HINT_HEIGHT + 2);
        usize::from(available / density.row_height())
    }

    /// Draw the overlay; nothing is drawn while the palette is hidden.
    pub fn draw(&mut self, frame: &mut Frame, screen: Rect, input: &TextInputState, theme: &Theme, density: PaletteDensity) {
        if !self.view.visible {
            self.layout = None;
            return;
        }
        let layout = overlay_layout(screen, self.view.rows.len(), density);
        frame.render_widget(Clear, layout.outer);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style(true))
            .style(theme.panel_style())
            .title(Span::styled(" Command Palette ", theme.accent_style()));
        frame.render_widget(block, layout.outer);

        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(self.view.selection == 0));
        let input_inner = input_block.inner(layout.input);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(input.input().to_string(), theme.text_style()))).block(input_block),
            layout.input,
        );
        let column = input.input()[..input.cursor()].width() as u16;
        frame.set_cursor_position((input_inner.x.saturating_add(column), input_inner.y));

        let hint_area = Rect::new(layout.input.x, layout.input.bottom(), layout.input.width, HINT_HEIGHT);
        frame.render_widget(
            Paragraph::new(Span::styled(self.view.hint.clone(), theme.muted_style())),
            hint_area,
        );

        let capacity = usize::from(layout.rows.height / density.row_height());
        let lines: Vec<Line> = self
            .view
            .rows
            .iter()
            .skip(self.view.scroll_offset)
            .take(capacity)
            .flat_map(|row| row_lines(row, theme, density, layout.rows.width))
            .collect();
        frame.render_widget(Paragraph::new(lines), layout.rows);

        self.layout = Some(layout);
    }

    /// Map a terminal cell to what it covers in the last drawn palette.
    pub fn hit_test(&self, column: u16, row: u16) -> PaletteHit {
        let Some(layout) = self.layout else {
            return PaletteHit::Outside;
        };
        let inside = |area: Rect| column >= area.x && column < area.right() && row >= area.y && row < area.bottom();
        if !inside(layout.outer) {
            return PaletteHit::Outside;
        }
        if !inside(layout.rows) {
            return PaletteHit::Inside;
        }
        let index = self.view.scroll_offset + usize::from((row - layout.rows.y) / layout.density.row_height());
        if index < self.view.rows.len() {
            PaletteHit::Row(index)
        } else {
            PaletteHit::Inside
        }
    }
}

fn overlay_layout(screen: Rect, row_count: usize, density: PaletteDensity) -> PaletteLayout {
    let width = (screen.width * 7 / 10).max(MIN_WIDTH).min(screen.width);
    let viewport = PaletteSurface::viewport_rows(screen, density).min(row_count);
    let rows_height = viewport as u16 * density.row_height();
    let height = (2 + INPUT_HEIGHT + HINT_HEIGHT + rows_height).min(screen.height);
    let outer = Rect::new(screen.x + (screen.width - width) / 2, screen.y + 1.min(screen.height - height), width, height);

    let padded = Block::default().borders(Borders::ALL).padding(Padding::horizontal(1)).inner(outer);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(HINT_HEIGHT),
            Constraint::Min(0),
        ])
        .split(padded);

    PaletteLayout {
        outer,
        input: sections[0],
        rows: sections[2],
        density,
    }
}

fn row_lines<'a>(row: &'a ViewRow, theme: &Theme, density: PaletteDensity, width: u16) -> Vec<Line<'a>> {
    let marker = if row.selected { "► " } else { "  " };
    let base = if row.selected { theme.selection_style() } else { theme.text_style() };
    let mut spans = vec![Span::styled(marker, base), Span::styled(row.display.as_str(), base)];
    if let Some(hint) = row.hint.as_deref() {
        let used = marker.width() + row.display.width();
        let gap = usize::from(width).saturating_sub(used + hint.width()).max(1);
        spans.push(Span::styled(" ".repeat(gap), base));
        spans.push(Span::styled(hint, theme.muted_style()));
    }
    let mut lines = vec![Line::from(spans)];
    if density == PaletteDensity::Spacious {
        lines.push(Line::default());
    }
    lines
}
