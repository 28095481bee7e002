//! Result rows and the capped, selectable result list.
//!
//! Selection `0` is the input field itself; rows are addressed from `1`.

use crate::settings::SettingKey;

/// What resolving a row does, for providers whose rows carry their own behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RowAction {
    #[default]
    Noop,
    /// Navigate to `title` and close; with `shift_keeps_open`, Shift keeps the palette open.
    Navigate { title: String, shift_keeps_open: bool },
    /// Re-enter the palette with this input.
    Prompt(String),
    /// Switch the explorer to this namespace.
    OpenFolder(String),
    EditSetting(SettingKey),
    PickTheme,
    SetTheme(String),
    RevertSetting(SettingKey),
}

/// One row of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    /// Canonical identifier (item title, command name, tag).
    pub name: String,
    /// Display text overriding `name`.
    pub caption: Option<String>,
    pub hint: Option<String>,
    pub action: RowAction,
}

impl ResultRow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            caption: None,
            hint: None,
            action: RowAction::Noop,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }

    pub fn with_action(mut self, action: RowAction) -> Self {
        self.action = action;
        self
    }

    /// Text shown for the row.
    pub fn display(&self) -> &str {
        self.caption.as_deref().unwrap_or(&self.name)
    }
}

/// The rendered rows plus selection and scroll state.
#[derive(Debug, Clone, Default)]
pub struct ResultList {
    rows: Vec<ResultRow>,
    selection: usize,
    scroll_offset: usize,
    /// Visible rows; `0` until the host reports a height, which disables scrolling.
    viewport: usize,
}

impl ResultList {
    /// Replace the list with at most `max_results` rows (never fewer than one) and clear the selection.
    pub fn show(&mut self, rows: Vec<ResultRow>, max_results: usize) {
        self.rows = rows;
        self.rows.truncate(max_results.max(1));
        self.selection = 0;
        self.scroll_offset = 0;
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// The selected row, `None` when the input field is selected.
    pub fn selected(&self) -> Option<&ResultRow> {
        self.selection.checked_sub(1).and_then(|index| self.rows.get(index))
    }

    pub fn set_viewport(&mut self, rows: usize) {
        self.viewport = rows;
        let selection = self.selection;
        self.select(selection);
    }

    /// Select the first row, or the input field when it is a resting state or nothing is listed.
    pub fn select_first(&mut self, allow_input_field: bool) {
        let selection = if allow_input_field || self.rows.is_empty() { 0 } else { 1 };
        self.select(selection);
    }

    pub fn move_down(&mut self, allow_input_field: bool) {
        let mut selection = (self.selection + 1) % (self.rows.len() + 1);
        if !allow_input_field && selection == 0 && !self.rows.is_empty() {
            selection = 1;
        }
        self.select(selection);
    }

    pub fn move_up(&mut self, allow_input_field: bool) {
        let selection = match self.selection.checked_sub(1) {
            Some(0) if !allow_input_field => self.rows.len(),
            Some(selection) => selection,
            None => self.rows.len(),
        };
        self.select(selection);
    }

    /// Select `selection` (clamped) and scroll it into view.
    pub fn select(&mut self, selection: usize) {
        self.selection = selection.min(self.rows.len());
        let Some(index) = self.selection.checked_sub(1) else {
            self.scroll_offset = 0;
            return;
        };
        if self.viewport == 0 {
            return;
        }

        let visible = self.scroll_offset..self.scroll_offset + self.viewport;
        if visible.contains(&index) {
            return;
        }
        let align_top = index;
        let align_bottom = (index + 1).saturating_sub(self.viewport);
        self.scroll_offset = if align_top.abs_diff(self.scroll_offset) < align_bottom.abs_diff(self.scroll_offset) {
            align_top
        } else {
            align_bottom
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(count: usize) -> ResultList {
        let mut list = ResultList::default();
        list.show((0..count).map(|index| ResultRow::new(format!("row {index}"))).collect(), 15);
        list
    }

    #[test]
    fn show_caps_rows_and_resets_selection() {
        let mut list = filled(3);
        list.select(2);
        list.show((0..40).map(|index| ResultRow::new(index.to_string())).collect(), 15);
        assert_eq!(list.len(), 15);
        assert_eq!(list.selection(), 0);
    }

    #[test]
    fn zero_cap_still_shows_one_row() {
        let mut list = ResultList::default();
        list.show(vec![ResultRow::new("Max results"), ResultRow::new("Never Basic")], 0);
        assert_eq!(list.len(), 1);
        list.show(Vec::new(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn down_cycles_without_landing_on_input_field() {
        let rows = 4;
        let mut list = filled(rows);
        list.select_first(false);
        assert_eq!(list.selection(), 1);
        for press in 1..=(rows + 1) {
            list.move_down(false);
            assert_ne!(list.selection(), 0, "press {press}");
            if press == rows {
                assert_eq!(list.selection(), 1);
            }
        }
        assert_eq!(list.selection(), 2);
    }

    #[test]
    fn down_visits_input_field_when_allowed() {
        let mut list = filled(2);
        list.select_first(true);
        assert_eq!(list.selection(), 0);
        list.move_down(true);
        list.move_down(true);
        list.move_down(true);
        assert_eq!(list.selection(), 0);
    }

    #[test]
    fn up_wraps_to_last_row() {
        let mut list = filled(3);
        list.select_first(false);
        list.move_up(false);
        assert_eq!(list.selection(), 3);
        list.move_up(false);
        assert_eq!(list.selection(), 2);

        let mut resting = filled(3);
        resting.select(1);
        resting.move_up(true);
        assert_eq!(resting.selection(), 0);
        resting.move_up(true);
        assert_eq!(resting.selection(), 3);
    }

    #[test]
    fn empty_list_keeps_input_field_selected() {
        let mut list = filled(0);
        list.select_first(false);
        list.move_down(false);
        assert_eq!(list.selection(), 0);
        list.move_up(false);
        assert_eq!(list.selection(), 0);
        assert!(list.selected().is_none());
    }

    #[test]
    fn scrolling_uses_the_closest_alignment() {
        let mut list = filled(10);
        list.set_viewport(3);
        list.select(1);
        assert_eq!(list.scroll_offset(), 0);
        list.select(4);
        assert_eq!(list.scroll_offset(), 1);
        list.select(10);
        assert_eq!(list.scroll_offset(), 7);
        list.select(2);
        assert_eq!(list.scroll_offset(), 1);
        list.select(0);
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn caption_overrides_display() {
        let row = ResultRow::new("Explorer").with_caption(Some("Browse".into()));
        assert_eq!(row.display(), "Browse");
        assert_eq!(ResultRow::new("Plain").display(), "Plain");
    }
}
