use crate::dispatch::{Provider, Resolver};
use crate::engine::PaletteEngine;
use crate::results::{ResultRow, RowAction};

/// Namespace the explorer starts in.
pub(crate) const EXPLORER_ROOT: &str = "$:/";

/// `$:/a/b/` becomes `$:/a/`.
fn parent_folder(url: &str) -> String {
    let mut segments: Vec<&str> = url.split('/').collect();
    segments.truncate(segments.len().saturating_sub(2));
    format!("{}/", segments.join("/"))
}

impl PaletteEngine {
    pub(crate) fn explorer(&mut self) {
        self.block_provider_change = true;
        self.set_hint("Explorer (⇧⏎ to add multiple)");
        self.provider = Provider::Explorer {
            url: EXPLORER_ROOT.to_string(),
        };
        self.resolver = Resolver::SelectedRow;
        self.input = EXPLORER_ROOT.to_string();
        self.last_explorer_input = EXPLORER_ROOT.to_string();
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn switch_folder(&mut self, url: &str) {
        self.input = url.to_string();
        self.last_explorer_input = url.to_string();
        self.provider = Provider::Explorer { url: url.to_string() };
        self.caret = None;
        self.dispatch_input();
    }

    /// Folders then files below `url`, filtered by what follows `url` in the input.
    pub(crate) fn explorer_provider(&mut self, url: &str) {
        self.set_hint("Explorer (⇧⏎ to add multiple)");
        if !self.input.starts_with(url) {
            self.input = self.last_explorer_input.clone();
        }
        self.last_explorer_input = self.input.clone();

        let search = self.input.get(url.len()..).unwrap_or_default();
        let entries = self.query(&format!("[all[tiddlers+shadows]removeprefix[{url}]splitbefore[/]sort[]search[{search}]]"));

        let mut folders = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let path = format!("{url}{entry}");
            if entry.ends_with('/') {
                folders.push(ResultRow::new(entry).with_action(RowAction::OpenFolder(path)));
            } else {
                files.push(ResultRow::new(entry).with_action(RowAction::Navigate {
                    title: path,
                    shift_keeps_open: true,
                }));
            }
        }

        let mut rows = Vec::with_capacity(folders.len() + files.len() + 1);
        if url != EXPLORER_ROOT {
            rows.push(ResultRow::new("..").with_action(RowAction::OpenFolder(parent_folder(url))));
        }
        rows.extend(folders);
        rows.extend(files);
        self.show(rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_of_nested_folder() {
        assert_eq!(parent_folder("$:/core/ui/"), "$:/core/");
        assert_eq!(parent_folder("$:/core/"), "$:/");
    }
}
