//! UTF-8 safe single-line text buffer with a cursor and an optional selection.
//!
//! Used for both the palette input line and the draft field the palette can
//! insert into. Offsets are byte indices and always sit on character boundaries.

use notepal_types::FocusedField;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    input: String,
    cursor: usize,
    /// Other end of the selection; `None` when nothing is selected.
    anchor: Option<usize>,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in characters, for terminal column math.
    pub fn cursor_chars(&self) -> usize {
        self.input[..self.cursor].chars().count()
    }

    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.anchor = None;
        self.cursor = self.clamp_to_boundary(self.cursor);
    }

    /// Place the cursor; out-of-range or mid-character offsets snap back to a boundary.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.anchor = None;
        self.cursor = self.clamp_to_boundary(cursor);
    }

    pub fn move_to_end(&mut self) {
        self.set_cursor(self.input.len());
    }

    pub fn move_home(&mut self, extend: bool) {
        self.begin_motion(extend);
        self.cursor = 0;
    }

    pub fn move_end(&mut self, extend: bool) {
        self.begin_motion(extend);
        self.cursor = self.input.len();
    }

    /// Move one character left; `extend` grows the selection instead of clearing it.
    pub fn move_left(&mut self, extend: bool) {
        self.begin_motion(extend);
        if let Some(previous) = self.input[..self.cursor].chars().last() {
            self.cursor -= previous.len_utf8();
        }
    }

    pub fn move_right(&mut self, extend: bool) {
        self.begin_motion(extend);
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    /// Insert a character, replacing the selection if there is one.
    pub fn insert_char(&mut self, c: char) {
        self.delete_selection();
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the selection, or the character before the cursor.
    pub fn backspace(&mut self) {
        if self.delete_selection() || self.cursor == 0 {
            return;
        }
        let previous = self.input[..self.cursor].chars().last().map(char::len_utf8).unwrap_or(1);
        let start = self.cursor - previous;
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        if let Some(next) = self.input[self.cursor..].chars().next() {
            let end = self.cursor + next.len_utf8();
            self.input.drain(self.cursor..end);
        }
    }

    /// Ordered `(start, end)` byte range of the selection, or the empty range at the cursor.
    pub fn selection_range(&self) -> (usize, usize) {
        match self.anchor {
            Some(anchor) => (anchor.min(self.cursor), anchor.max(self.cursor)),
            None => (self.cursor, self.cursor),
        }
    }

    pub fn selected_text(&self) -> &str {
        let (start, end) = self.selection_range();
        &self.input[start..end]
    }

    /// Snapshot handed to the palette when it opens over this field.
    pub fn to_focused_field(&self) -> FocusedField {
        FocusedField {
            value: self.input.clone(),
            selection_start: self.anchor.unwrap_or(self.cursor),
            selection_end: self.cursor,
        }
    }

    fn begin_motion(&mut self, extend: bool) {
        if extend {
            self.anchor.get_or_insert(self.cursor);
        } else {
            self.anchor = None;
        }
    }

    fn delete_selection(&mut self) -> bool {
        let (start, end) = self.selection_range();
        self.anchor = None;
        if start == end {
            return false;
        }
        self.input.drain(start..end);
        self.cursor = start;
        true
    }

    fn clamp_to_boundary(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.input.len());
        while !self.input.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_move_insert_backspace() {
        let mut st = TextInputState::new();
        st.set_input("h🙂llo");
        st.set_cursor(1);
        st.insert_char('e');
        assert_eq!(st.input(), "he🙂llo");
        st.move_right(false);
        st.backspace();
        assert_eq!(st.input(), "hello");
        st.move_left(false);
        st.backspace();
        assert_eq!(st.input(), "ello");
    }

    #[test]
    fn mid_character_cursor_snaps_back() {
        let mut st = TextInputState::new();
        st.set_input("é!");
        st.set_cursor(1);
        assert_eq!(st.cursor(), 0);
        st.set_cursor(99);
        assert_eq!(st.cursor(), 3);
        assert_eq!(st.cursor_chars(), 2);
    }

    #[test]
    fn shift_motion_selects_and_typing_replaces() {
        let mut st = TextInputState::new();
        st.set_input("see notes");
        st.move_to_end();
        for _ in 0..5 {
            st.move_left(true);
        }
        assert_eq!(st.selected_text(), "notes");

        let field = st.to_focused_field();
        assert_eq!((field.selection_start, field.selection_end), (9, 4));
        assert_eq!(field.selected_text(), "notes");

        st.insert_char('x');
        assert_eq!(st.input(), "see x");
        assert_eq!(st.selected_text(), "");
    }

    #[test]
    fn delete_removes_next_character() {
        let mut st = TextInputState::new();
        st.set_input("ab");
        st.move_home(false);
        st.delete();
        assert_eq!(st.input(), "b");
        assert_eq!(st.cursor(), 0);
    }
}
