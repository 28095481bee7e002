//! Multi-step flows that freeze dispatch while they collect input.
//!
//! Each flow sets `block_provider_change`, installs its own provider and
//! resolver, and either closes the palette or hands control back through
//! [`PaletteEngine::prompt`] when it finishes.

use indexmap::IndexMap;
use tracing::{debug, info};

use notepal_types::{FieldOp, NewItem, TEXT_FIELD};

use crate::commands::HistoryMode;
use crate::dispatch::{Provider, Resolver, WizardStep};
use crate::engine::PaletteEngine;
use crate::keys::{CUSTOM_COMMAND_TAG, HINT_FIELD, NAME_FIELD, TYPE_FIELD};
use crate::results::ResultRow;

const HISTORY_COMMAND_TYPE: &str = "history";

impl PaletteEngine {
    /// Install a blocking step with a hint and no rows.
    fn silent_step(&mut self, hint: &str, resolver: Resolver) {
        self.block_provider_change = true;
        self.provider = Provider::Silent { hint: hint.to_string() };
        self.resolver = resolver;
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn new_command_wizard(&mut self) {
        self.silent_step("Command Name", Resolver::Wizard(WizardStep::Name));
    }

    pub(crate) fn wizard_resolver(&mut self, step: WizardStep) {
        let typed = self.input.clone();
        match step {
            WizardStep::Name => {
                if typed.is_empty() {
                    return;
                }
                self.silent_step(
                    "Enter type (prompt, prompt-basic, message, actionString, history)",
                    Resolver::Wizard(WizardStep::Type { name: typed }),
                );
            }
            WizardStep::Type { name } => {
                if typed == HISTORY_COMMAND_TYPE {
                    self.silent_step("Enter hint", Resolver::Wizard(WizardStep::Hint { name, kind: typed }));
                } else {
                    self.message_step(name, typed, String::new());
                }
            }
            WizardStep::Hint { name, kind } => self.message_step(name, kind, typed),
            WizardStep::Message { name, kind, hint } => {
                let mut fields = IndexMap::new();
                fields.insert(TYPE_FIELD.to_string(), kind.clone());
                fields.insert(NAME_FIELD.to_string(), name.clone());
                if kind == HISTORY_COMMAND_TYPE || !hint.is_empty() {
                    fields.insert(HINT_FIELD.to_string(), hint);
                }
                fields.insert(TEXT_FIELD.to_string(), typed);
                info!(command = %name, command_type = %kind, "Custom command created");
                self.create_item(NewItem {
                    title: format!("$:/{name}"),
                    tags: CUSTOM_COMMAND_TAG.to_string(),
                    fields,
                });
                self.close();
            }
        }
    }

    fn message_step(&mut self, name: String, kind: String, hint: String) {
        self.silent_step("Enter Message", Resolver::Wizard(WizardStep::Message { name, kind, hint }));
    }

    /// Ask for free text, then run `action` with it.
    pub(crate) fn action_string_input(&mut self, action: &str, hint: &str) {
        self.allow_input_field_selection = true;
        self.silent_step(
            hint,
            Resolver::ActionStringInput {
                action: action.to_string(),
            },
        );
    }

    /// Pick an item from a history list, then send `message` with it.
    pub(crate) fn history_picker(&mut self, message: &str, hint: &str, mode: HistoryMode) {
        self.block_provider_change = true;
        self.allow_input_field_selection = true;
        self.provider = Provider::History {
            hint: hint.to_string(),
            mode,
        };
        self.resolver = Resolver::HistoryMessage {
            message: message.to_string(),
        };
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn show_history(&mut self) {
        self.block_provider_change = true;
        self.provider = Provider::SeeHistory;
        self.resolver = Resolver::SelectedRow;
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    /// Splice typed input into `text` at `caret` and dispatch the composed input.
    pub(crate) fn prompt_basic(&mut self, text: &str, caret: Option<usize>, hint: &str) {
        if self.settings.never_basic {
            self.prompt(text, caret);
            return;
        }
        let split = notepal_util::text_processing::char_to_byte(text, caret.unwrap_or(usize::MAX));
        self.block_provider_change = true;
        self.provider = Provider::Basic {
            start: text[..split].to_string(),
            end: text[split..].to_string(),
            hint: hint.to_string(),
        };
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    /// Two steps: pick an item from the navigation history, then pick tags.
    pub(crate) fn tag_operation(&mut self, op: FieldOp) {
        let hint = match op {
            FieldOp::AddTag => "Pick tiddler to tag",
            FieldOp::RemoveTag => "Pick tiddler to untag",
        };
        self.block_provider_change = true;
        if op == FieldOp::AddTag {
            self.allow_input_field_selection = true;
        }
        self.provider = Provider::History {
            hint: hint.to_string(),
            mode: HistoryMode::Navigation,
        };
        self.resolver = Resolver::TagPickItem { op };
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn tag_pick_item_resolver(&mut self, op: FieldOp) {
        let Some(item) = self.results.selected().map(|row| row.name.clone()) else {
            return;
        };
        self.provider = Provider::TagCandidates { item: item.clone(), op };
        self.resolver = Resolver::TagApply { item, op };
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn tag_candidates_provider(&mut self, item: &str, op: FieldOp, terms: &str) {
        let (hint, filter) = match op {
            FieldOp::AddTag => (
                "Pick tag to add (⇧⏎ to add multiple)",
                format!("[!is[system]tags[]] [is[system]tags[]] -[[{item}]tags[]] +[search[{terms}]]"),
            ),
            FieldOp::RemoveTag => (
                "Pick tag to remove (⇧⏎ to remove multiple)",
                format!("[[{item}]tags[]] +[search[{terms}]]"),
            ),
        };
        self.set_hint(hint);
        let rows = self.query(&filter).into_iter().map(ResultRow::new).collect();
        self.show(rows);
    }

    /// Mutate the picked item; adding accepts the typed text as a new tag.
    pub(crate) fn tag_apply_resolver(&mut self, item: &str, op: FieldOp, shift: bool) {
        let tag = match self.results.selected() {
            Some(row) => row.name.clone(),
            None if op == FieldOp::AddTag => self.input.clone(),
            None => return,
        };
        if tag.is_empty() {
            debug!(item, "Empty tag ignored");
            return;
        }
        self.field_mutate(item, op, &tag);
        if shift {
            self.dispatch_input();
        } else {
            self.close();
        }
    }
}
