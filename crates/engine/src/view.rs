//! Render snapshot handed to the host.

/// One visible row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow {
    pub display: String,
    pub hint: Option<String>,
    pub selected: bool,
}

/// Everything a host needs to draw the palette.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaletteView {
    pub visible: bool,
    pub input: String,
    /// Caret (in characters) requested by the last prompt; `None` leaves the caret at the end.
    pub caret: Option<usize>,
    pub hint: String,
    pub rows: Vec<ViewRow>,
    /// `0` is the input field, `n` the n-th row.
    pub selection: usize,
    pub scroll_offset: usize,
}

/// Drawing surface implemented by hosts.
pub trait UiSink {
    fn render(&mut self, view: &PaletteView);
}

impl UiSink for Vec<PaletteView> {
    fn render(&mut self, view: &PaletteView) {
        self.push(view.clone());
    }
}
