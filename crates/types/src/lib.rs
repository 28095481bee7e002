//! Shared types for the notepal palette engine and its hosts.
//!
//! The engine never touches the host directly: hosts send [`HostMessage`]s and
//! key presses in, and receive [`Effect`]s back which they apply against their
//! own repository, focus handling and message bus.

mod item;
mod repository;

pub use item::{Item, LIST_FIELD, TAGS_FIELD, TEXT_FIELD, parse_string_list, stringify_string_list};
pub use repository::{QueryError, Repository};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Keys the palette reacts to. Everything else is text editing owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowUp,
    ArrowDown,
    Enter,
    /// Any other key; ignored by the engine.
    Other,
}

/// A key press together with the modifier state resolvers care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteKey {
    pub key: Key,
    /// Shift held; keeps the palette open for multi-step resolvers.
    pub shift: bool,
}

impl PaletteKey {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn with_shift(key: Key) -> Self {
        Self { key, shift: true }
    }
}

/// Snapshot of the text field that had focus before the palette opened.
///
/// Offsets are byte indices into `value` and must sit on UTF-8 boundaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusedField {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl FocusedField {
    /// The currently selected text, regardless of selection direction.
    pub fn selected_text(&self) -> &str {
        let (start, end) = if self.selection_start <= self.selection_end {
            (self.selection_start, self.selection_end)
        } else {
            (self.selection_end, self.selection_start)
        };
        self.value.get(start..end).unwrap_or_default()
    }
}

/// Parameters carried by an open request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenRequest {
    /// Text to seed the palette input with.
    pub param: Option<String>,
    /// The field that had focus when the palette was summoned.
    pub focused: Option<FocusedField>,
    /// Text currently selected in the host document.
    pub selection: String,
}

/// Inbound events dispatched by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostMessage {
    /// Open the palette, optionally seeded with a parameter.
    OpenPalette(OpenRequest),
    /// Open the palette seeded with the current text selection.
    OpenPaletteWithSelection(OpenRequest),
    /// Splice the selected result into the previously focused field.
    InsertSelectedResult,
}

/// Tag mutations requested through [`Effect::FieldMutate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldOp {
    AddTag,
    RemoveTag,
}

/// Request to create a new item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewItem {
    pub title: String,
    /// Space joined tags, exactly as typed.
    pub tags: String,
    /// Additional fields (custom command metadata, body text).
    pub fields: IndexMap<String, String>,
}

/// Side effects produced by the palette for the host to carry out.
///
/// Effects are fire-and-forget from the engine's point of view; the engine
/// never waits for them to complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the item with the given title.
    Navigate { title: String },
    /// Create a new item.
    CreateItem(NewItem),
    /// Mutate a field of an existing item.
    FieldMutate { item: String, op: FieldOp, value: String },
    /// Dispatch a named message on the host bus.
    SendMessage {
        message: String,
        param: Option<String>,
        params: IndexMap<String, String>,
    },
    /// Run a host action string with the given substitution variables.
    InvokeActionString {
        action: String,
        variables: IndexMap<String, String>,
    },
    /// The palette closed; return focus to the captured field at `caret`.
    RestoreFocus { caret: Option<usize> },
    /// Replace the captured field's value and place its caret.
    ReplaceFocusedValue { value: String, caret: usize },
}
