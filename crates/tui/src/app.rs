//! Host state: the palette engine, the draft field it edits and the story it navigates.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use notepal_engine::PaletteEngine;
use notepal_registry::ItemRegistry;
use notepal_types::{Effect, HostMessage, Key, OpenRequest, PaletteKey, Repository};
use notepal_util::DocumentStore;
use notepal_util::text_processing::char_to_byte;

use crate::effects;
use crate::ui::palette::{PaletteHit, PaletteSurface};
use crate::ui::text_input::TextInputState;
use crate::ui::theme::{PaletteDensity, Theme};

const STORY_QUERY: &str = "[list[$:/StoryList]]";

/// Everything the terminal host owns.
pub struct App {
    pub(crate) engine: PaletteEngine,
    pub(crate) registry: Arc<ItemRegistry>,
    pub(crate) store: Arc<dyn DocumentStore>,
    /// Text shown in the palette input line.
    pub(crate) palette_input: TextInputState,
    /// The editable field the palette was summoned over.
    pub(crate) draft: TextInputState,
    pub(crate) surface: PaletteSurface,
    pub(crate) theme: Theme,
    pub(crate) status: String,
    pub(crate) should_quit: bool,
}

impl App {
    pub fn new(registry: Arc<ItemRegistry>, store: Arc<dyn DocumentStore>, theme: Theme) -> Self {
        let engine = PaletteEngine::new(registry.clone(), store.clone());
        let mut app = Self {
            engine,
            registry,
            store,
            palette_input: TextInputState::new(),
            draft: TextInputState::new(),
            surface: PaletteSurface::default(),
            theme,
            status: "Ctrl+P opens the palette, Ctrl+O opens it with the selection, Ctrl+Q quits".to_string(),
            should_quit: false,
        };
        let effects = app.engine.refresh_palette();
        app.apply(effects);
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn draft(&self) -> &TextInputState {
        &self.draft
    }

    pub fn palette_input(&self) -> &str {
        self.palette_input.input()
    }

    pub fn is_palette_open(&self) -> bool {
        self.engine.is_opened()
    }

    pub fn surface(&self) -> &PaletteSurface {
        &self.surface
    }

    pub fn density(&self) -> PaletteDensity {
        PaletteDensity::from_palette_theme(&self.engine.settings().theme)
    }

    /// Titles currently open in the story, top first.
    pub fn story(&self) -> Vec<String> {
        self.registry.filter_query(STORY_QUERY).unwrap_or_default()
    }

    /// Text of the item at the top of the story.
    pub fn top_item_text(&self) -> Option<String> {
        let title = self.story().into_iter().next()?;
        self.registry.get_item(&title).map(|item| item.text().to_string())
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let rows = PaletteSurface::viewport_rows(Rect::new(0, 0, width, height), self.density());
        self.engine.set_viewport_height(rows);
        self.sync_palette();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_control_key(key.code);
            return;
        }
        if self.engine.is_opened() {
            self.handle_palette_key(key);
        } else {
            edit(&mut self.draft, key);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !self.engine.is_opened() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let effects = match self.surface.hit_test(mouse.column, mouse.row) {
            PaletteHit::Row(index) => {
                let shift = mouse.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
                self.engine.click_row(index, shift)
            }
            PaletteHit::Inside => return,
            PaletteHit::Outside => self.engine.click_outside(),
        };
        self.apply(effects);
    }

    fn handle_control_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('c') => self.should_quit = true,
            KeyCode::Char('p') => self.open_palette(false),
            KeyCode::Char('o') => self.open_palette(true),
            _ => {}
        }
    }

    fn open_palette(&mut self, with_selection: bool) {
        if self.engine.is_opened() {
            return;
        }
        let request = OpenRequest {
            param: None,
            focused: Some(self.draft.to_focused_field()),
            selection: self.draft.selected_text().to_string(),
        };
        let message = if with_selection {
            HostMessage::OpenPaletteWithSelection(request)
        } else {
            HostMessage::OpenPalette(request)
        };
        self.palette_input.set_input("");
        let effects = self.engine.handle_message(message);
        self.apply(effects);
    }

    fn handle_palette_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
        let effects = match key.code {
            KeyCode::Esc => self.engine.on_key_down(PaletteKey::new(Key::Escape)),
            KeyCode::Up => self.engine.on_key_down(PaletteKey::new(Key::ArrowUp)),
            KeyCode::Down => self.engine.on_key_down(PaletteKey::new(Key::ArrowDown)),
            KeyCode::Enter => self.engine.on_key_down(PaletteKey { key: Key::Enter, shift }),
            KeyCode::Tab => self.engine.handle_message(HostMessage::InsertSelectedResult),
            _ => {
                let before = self.palette_input.input().to_string();
                edit(&mut self.palette_input, key);
                if self.palette_input.input() == before {
                    return;
                }
                self.engine.on_input(self.palette_input.input())
            }
        };
        self.apply(effects);
    }

    /// Carry out engine effects, then refresh the palette snapshot.
    pub(crate) fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            effects::apply(self, effect);
        }
        self.sync_palette();
    }

    /// Pull the engine's view; text the engine rewrote replaces the input line.
    fn sync_palette(&mut self) {
        self.engine.render(&mut self.surface);
        let view = self.surface.view();
        if view.input != self.palette_input.input() {
            debug!(input = %view.input, "Palette input replaced by engine");
            let caret = view.caret.map(|caret| char_to_byte(&view.input, caret));
            self.palette_input.set_input(view.input.clone());
            match caret {
                Some(caret) => self.palette_input.set_cursor(caret),
                None => self.palette_input.move_to_end(),
            }
        }
    }
}

/// Plain line editing shared by the palette input and the draft.
fn edit(state: &mut TextInputState, key: KeyEvent) {
    let extend = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char(c) => state.insert_char(c),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Delete => state.delete(),
        KeyCode::Left => state.move_left(extend),
        KeyCode::Right => state.move_right(extend),
        KeyCode::Home => state.move_home(extend),
        KeyCode::End => state.move_end(extend),
        _ => {}
    }
}
