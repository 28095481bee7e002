use crate::engine::PaletteEngine;
use crate::results::{ResultRow, RowAction};

const HELP_ROWS: [(&str, &str); 9] = [
    ("... Search", ""),
    ("> Commands", ">"),
    ("+ Create tiddler with title", "+"),
    ("# Search tags", "#"),
    ("@ List tiddlers with tag", "@"),
    ("[ Filter operation", "["),
    ("| Command Palette Settings", "|"),
    ("\\ Escape first character", "\\"),
    ("? Help", "?"),
];

impl PaletteEngine {
    pub(crate) fn help_provider(&mut self) {
        self.set_hint("Help");
        let rows = HELP_ROWS
            .iter()
            .map(|(name, seed)| ResultRow::new(*name).with_action(RowAction::Prompt((*seed).to_string())))
            .collect();
        self.show(rows);
    }
}
