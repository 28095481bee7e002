//! The palette state machine.
//!
//! [`PaletteEngine`] owns the palette state and reacts to input changes, key
//! presses, clicks and host messages. It never touches the host: every
//! public operation returns the [`Effect`]s produced while handling it.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use notepal_types::{Effect, FieldOp, FocusedField, HostMessage, Key, NewItem, OpenRequest, PaletteKey, Repository};
use notepal_util::DocumentStore;

use crate::commands::{Command, CommandKind, CommandSet};
use crate::dispatch::{Provider, Resolver, parse_command};
use crate::history::CommandHistory;
use crate::keys::{DEFAULT_THEME, STYLESHEET_TAG, THEME_TAG};
use crate::results::{ResultList, ResultRow, RowAction};
use crate::search_steps::{SearchStep, load_search_steps};
use crate::settings::Settings;
use crate::view::{PaletteView, UiSink, ViewRow};

/// The field that had focus when the palette opened.
#[derive(Debug, Clone)]
pub(crate) struct CapturedFocus {
    pub(crate) field: FocusedField,
    /// Byte offset the caret returns to on close.
    pub(crate) caret: usize,
}

/// The command palette engine.
pub struct PaletteEngine {
    pub(crate) repository: Arc<dyn Repository>,
    pub(crate) store: Arc<dyn DocumentStore>,

    pub(crate) settings: Settings,
    pub(crate) commands: CommandSet,
    pub(crate) themes: Vec<String>,
    pub(crate) search_steps: Vec<SearchStep>,
    pub(crate) history: CommandHistory,

    pub(crate) is_opened: bool,
    pub(crate) input: String,
    pub(crate) caret: Option<usize>,
    pub(crate) hint: String,
    pub(crate) results: ResultList,
    pub(crate) provider: Provider,
    pub(crate) resolver: Resolver,
    pub(crate) block_provider_change: bool,
    pub(crate) allow_input_field_selection: bool,
    /// Input restored by Escape; at most one continuation exists.
    pub(crate) go_back: Option<String>,
    pub(crate) previously_focused: Option<CapturedFocus>,
    pub(crate) last_explorer_input: String,

    pub(crate) effects: Vec<Effect>,
    resolving_immediate: bool,
}

impl PaletteEngine {
    /// Create a closed palette and load settings, commands, search steps and history.
    ///
    /// Theme stylesheet tags are only synchronised by [`PaletteEngine::refresh_palette`],
    /// which hosts call once after construction.
    pub fn new(repository: Arc<dyn Repository>, store: Arc<dyn DocumentStore>) -> Self {
        let history = CommandHistory::load(store.as_ref());
        let mut engine = Self {
            repository,
            store,
            settings: Settings::default(),
            commands: CommandSet::default(),
            themes: Vec::new(),
            search_steps: Vec::new(),
            history,
            is_opened: false,
            input: String::new(),
            caret: None,
            hint: String::new(),
            results: ResultList::default(),
            provider: Provider::Default,
            resolver: Resolver::Default,
            block_provider_change: false,
            allow_input_field_selection: false,
            go_back: None,
            previously_focused: None,
            last_explorer_input: String::new(),
            effects: Vec::new(),
            resolving_immediate: false,
        };
        engine.reload();
        engine
    }

    /// Reload settings, themes, commands and search steps.
    pub fn refresh_palette(&mut self) -> Vec<Effect> {
        self.reload();
        self.refresh_themes();
        self.take_effects()
    }

    pub fn handle_message(&mut self, message: HostMessage) -> Vec<Effect> {
        match message {
            HostMessage::OpenPalette(request) => self.open(request, false),
            HostMessage::OpenPaletteWithSelection(mut request) => {
                request.param = Some(request.selection.clone());
                self.open(request, true);
            }
            HostMessage::InsertSelectedResult => self.insert_selected_result(),
        }
        self.take_effects()
    }

    /// The input text changed.
    pub fn on_input(&mut self, text: impl Into<String>) -> Vec<Effect> {
        self.input = text.into();
        self.caret = None;
        self.dispatch_input();
        self.take_effects()
    }

    pub fn on_key_down(&mut self, key: PaletteKey) -> Vec<Effect> {
        if !self.is_opened {
            return Vec::new();
        }
        match key.key {
            Key::Escape => {
                if self.settings.escape_goes_back && self.go_back.is_some() {
                    self.invoke_go_back();
                } else {
                    self.close();
                }
            }
            Key::ArrowUp => self.results.move_up(self.allow_input_field_selection),
            Key::ArrowDown => self.results.move_down(self.allow_input_field_selection),
            Key::Enter => self.resolve(key.shift),
            Key::Other => {}
        }
        self.take_effects()
    }

    /// A row was clicked: select it, then resolve.
    pub fn click_row(&mut self, index: usize, shift: bool) -> Vec<Effect> {
        if self.is_opened && index < self.results.len() {
            self.results.select(index + 1);
            self.resolve(shift);
        }
        self.take_effects()
    }

    /// A click landed outside the palette.
    pub fn click_outside(&mut self) -> Vec<Effect> {
        if self.is_opened {
            self.close();
        }
        self.take_effects()
    }

    pub fn set_viewport_height(&mut self, rows: usize) {
        self.results.set_viewport(rows);
    }

    pub fn view(&self) -> PaletteView {
        let selection = self.results.selection();
        PaletteView {
            visible: self.is_opened,
            input: self.input.clone(),
            caret: self.caret,
            hint: self.hint.clone(),
            rows: self
                .results
                .rows()
                .iter()
                .enumerate()
                .map(|(index, row)| ViewRow {
                    display: row.display().to_string(),
                    hint: row.hint.clone(),
                    selected: selection == index + 1,
                })
                .collect(),
            selection,
            scroll_offset: self.results.scroll_offset(),
        }
    }

    pub fn render(&self, sink: &mut dyn UiSink) {
        sink.render(&self.view());
    }

    pub fn is_opened(&self) -> bool {
        self.is_opened
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn rows(&self) -> &[ResultRow] {
        self.results.rows()
    }

    pub fn selection(&self) -> usize {
        self.results.selection()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn go_back(&self) -> Option<&str> {
        self.go_back.as_deref()
    }

    pub fn is_provider_change_blocked(&self) -> bool {
        self.block_provider_change
    }

    fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    fn reload(&mut self) {
        self.settings = Settings::load(self.store.as_ref());
        self.themes = self.repository.items_by_tag(THEME_TAG);
        self.commands = CommandSet::load(self.repository.as_ref());
        self.search_steps = load_search_steps(self.store.as_ref());
        debug!(
            themes = self.themes.len(),
            search_steps = self.search_steps.len(),
            "Palette refreshed"
        );
    }

    /// Tag exactly the configured theme (or the default theme) as a stylesheet.
    pub(crate) fn refresh_themes(&mut self) {
        self.themes = self.repository.items_by_tag(THEME_TAG);
        let mut found = false;
        for theme in self.themes.clone() {
            if theme == self.settings.theme {
                found = true;
                self.add_tag_if_necessary(&theme, STYLESHEET_TAG);
            } else if self.has_tag(&theme, STYLESHEET_TAG) {
                self.field_mutate(&theme, FieldOp::RemoveTag, STYLESHEET_TAG);
            }
        }
        if !found {
            self.add_tag_if_necessary(DEFAULT_THEME, STYLESHEET_TAG);
        }
    }

    fn has_tag(&self, title: &str, tag: &str) -> bool {
        self.repository.get_item(title).is_some_and(|item| item.has_tag(tag))
    }

    fn add_tag_if_necessary(&mut self, title: &str, tag: &str) {
        if !self.repository.item_or_shadow_exists(title) {
            debug!(item = title, "Theme item missing; stylesheet tag not added");
            return;
        }
        if !self.has_tag(title, tag) {
            self.field_mutate(title, FieldOp::AddTag, tag);
        }
    }

    pub(crate) fn field_mutate(&mut self, item: &str, op: FieldOp, value: &str) {
        self.effects.push(Effect::FieldMutate {
            item: item.to_string(),
            op,
            value: value.to_string(),
        });
    }

    pub(crate) fn navigate(&mut self, title: &str) {
        self.effects.push(Effect::Navigate { title: title.to_string() });
    }

    pub(crate) fn send_message(&mut self, message: &str, param: Option<String>, params: IndexMap<String, String>) {
        self.effects.push(Effect::SendMessage {
            message: message.to_string(),
            param,
            params,
        });
    }

    pub(crate) fn invoke_action_string(&mut self, action: &str, variables: IndexMap<String, String>) {
        self.effects.push(Effect::InvokeActionString {
            action: action.to_string(),
            variables,
        });
    }

    pub(crate) fn create_item(&mut self, item: NewItem) {
        self.effects.push(Effect::CreateItem(item));
    }

    pub(crate) fn save_settings(&self) {
        if let Err(error) = self.settings.save(self.store.as_ref()) {
            warn!(error = %error, "Failed to persist palette settings");
        }
    }

    fn open(&mut self, request: OpenRequest, with_selection: bool) {
        self.is_opened = true;
        self.allow_input_field_selection = false;
        self.go_back = None;
        self.block_provider_change = false;
        self.previously_focused = request.focused.map(|field| CapturedFocus {
            caret: field.selection_end,
            field,
        });

        self.input = request.param.unwrap_or_default();
        if self.settings.always_pass_selection && !with_selection {
            self.input.push_str(&request.selection);
        }
        self.caret = None;
        self.results.select(0);
        debug!(input = %self.input, "Palette opened");
        self.dispatch_input();
    }

    pub(crate) fn close(&mut self) {
        self.is_opened = false;
        let caret = self.previously_focused.as_ref().map(|focus| focus.caret);
        self.effects.push(Effect::RestoreFocus { caret });
        debug!("Palette closed");
    }

    fn insert_selected_result(&mut self) {
        if !self.is_opened {
            return;
        }
        let Some(selection) = self.results.selected().map(|row| row.name.clone()) else {
            return;
        };
        let Some(focus) = self.previously_focused.as_mut() else {
            return;
        };

        let start = focus.field.selection_start.min(focus.field.selection_end);
        let end = focus.field.selection_start.max(focus.field.selection_end);
        let value = &focus.field.value;
        let (Some(before), Some(after)) = (value.get(..start), value.get(end..)) else {
            warn!(start, end, "Captured selection is not on character boundaries; nothing inserted");
            return;
        };

        let replaced = format!("{before}{selection}{after}");
        let caret = start + selection.len();
        focus.field.value = replaced.clone();
        focus.caret = caret;
        self.effects.push(Effect::ReplaceFocusedValue { value: replaced, caret });
        self.close();
    }

    /// Run the active provider against the current input and reset the selection.
    pub(crate) fn dispatch_input(&mut self) {
        if self.block_provider_change {
            let provider = self.provider.clone();
            let input = self.input.clone();
            self.run_provider(&provider, &input);
        } else {
            let dispatch = parse_command(&self.input, &self.commands);
            self.provider = dispatch.provider.clone();
            self.resolver = dispatch.resolver;
            self.run_provider(&dispatch.provider, &dispatch.terms);
        }
        self.results.select_first(self.allow_input_field_selection);
    }

    pub(crate) fn show(&mut self, rows: Vec<ResultRow>) {
        self.results.show(rows, self.settings.max_results);
    }

    pub(crate) fn set_hint(&mut self, hint: impl Into<String>) {
        self.hint = hint.into();
    }

    pub(crate) fn run_provider(&mut self, provider: &Provider, terms: &str) {
        match provider {
            Provider::Default => self.default_provider(terms),
            Provider::Action => self.action_provider(terms),
            Provider::TagList => self.tag_list_provider(terms),
            Provider::Tag => self.tag_provider(terms),
            Provider::Help => self.help_provider(),
            Provider::Filter { hint } => self.filter_provider(terms, hint.as_deref()),
            Provider::CreateItem => {
                self.set_hint("Create new tiddler with title @tag(s)");
                self.show(Vec::new());
            }
            Provider::Settings => self.settings_provider(),
            Provider::Trigger { hint } | Provider::Silent { hint } => {
                self.set_hint(hint.clone());
                self.show(Vec::new());
            }
            Provider::History { hint, mode } => self.history_provider(hint, *mode),
            Provider::SeeHistory => self.see_history_provider(terms),
            Provider::Explorer { url } => self.explorer_provider(url),
            Provider::SettingEditor { key } => self.setting_editor_provider(*key, terms),
            Provider::ThemePicker => self.theme_picker_provider(),
            Provider::TagCandidates { item, op } => self.tag_candidates_provider(item, *op, terms),
            Provider::Basic { start, end, hint } => {
                let composed = format!("{start}{terms}{end}");
                let dispatch = parse_command(&composed, &self.commands);
                let background = match dispatch.provider {
                    Provider::Filter { .. } => Provider::Filter { hint: Some(hint.clone()) },
                    other => other,
                };
                self.resolver = dispatch.resolver;
                self.run_provider(&background, &dispatch.terms);
            }
        }
    }

    /// Resolve the current selection (or the raw input) with the active resolver.
    pub(crate) fn resolve(&mut self, shift: bool) {
        match self.resolver.clone() {
            Resolver::Default => self.default_resolver(shift),
            Resolver::Action => self.action_resolver(shift),
            Resolver::TagList => self.tag_list_resolver(),
            Resolver::SelectedRow => {
                if let Some(action) = self.selected_action() {
                    self.run_row_action(action, shift);
                }
            }
            Resolver::CreateItem => self.create_item_resolver(),
            Resolver::Settings => self.settings_resolver(shift),
            Resolver::Trigger { trigger, action } => {
                let typed = self.input.strip_prefix(trigger.as_str()).unwrap_or(&self.input).to_string();
                self.invoke_action_string(&action, input_variables(typed));
                self.close();
            }
            Resolver::HistoryMessage { message } => self.history_message_resolver(&message),
            Resolver::SettingEditor { key } => self.setting_editor_resolver(key),
            Resolver::Wizard(step) => self.wizard_resolver(step),
            Resolver::ActionStringInput { action } => {
                let typed = self.input.clone();
                self.invoke_action_string(&action, input_variables(typed));
                self.close();
            }
            Resolver::TagPickItem { op } => self.tag_pick_item_resolver(op),
            Resolver::TagApply { item, op } => self.tag_apply_resolver(&item, op, shift),
            Resolver::Noop => {}
        }
    }

    pub(crate) fn selected_action(&self) -> Option<RowAction> {
        self.results.selected().map(|row| row.action.clone())
    }

    pub(crate) fn run_row_action(&mut self, action: RowAction, shift: bool) {
        match action {
            RowAction::Noop => {}
            RowAction::Navigate { title, shift_keeps_open } => {
                self.navigate(&title);
                if !(shift_keeps_open && shift) {
                    self.close();
                }
            }
            RowAction::Prompt(text) => self.prompt(&text, None),
            RowAction::OpenFolder(path) => self.switch_folder(&path),
            RowAction::EditSetting(key) => self.prompt_for_setting(key),
            RowAction::PickTheme => self.prompt_for_theme(),
            RowAction::SetTheme(theme) => self.set_theme(&theme),
            RowAction::RevertSetting(key) => {
                self.settings.revert(key);
                self.save_settings();
                self.return_to_settings();
            }
        }
    }

    /// Re-enter the palette with `value`, unblocking dispatch.
    pub(crate) fn prompt(&mut self, value: &str, caret: Option<usize>) {
        self.block_provider_change = false;
        self.input = value.to_string();
        self.caret = caret;
        self.dispatch_input();
    }

    pub(crate) fn invoke_go_back(&mut self) {
        let Some(input) = self.go_back.take() else {
            return;
        };
        self.block_provider_change = false;
        self.allow_input_field_selection = false;
        self.input = input;
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn action_resolver(&mut self, shift: bool) {
        let Some(name) = self.results.selected().map(|row| row.name.clone()) else {
            return;
        };
        let Some(command) = self.commands.find(&name).cloned() else {
            warn!(command = %name, "Selected command no longer exists");
            return;
        };

        if command.keep_palette {
            self.go_back = Some(self.input.clone());
        }
        self.history.record(&command.name);
        if let Err(error) = self.history.save(self.store.as_ref()) {
            warn!(error = %error, "Failed to persist command history");
        }

        debug!(command = %command.name, "Running palette command");
        self.run_command(&command);

        if command.immediate {
            if self.resolving_immediate {
                debug!(command = %command.name, "Nested immediate resolution skipped");
            } else {
                self.resolving_immediate = true;
                self.resolve(shift);
                self.resolving_immediate = false;
            }
            return;
        }
        if !command.keep_palette {
            self.close();
        }
    }

    fn run_command(&mut self, command: &Command) {
        match &command.kind {
            CommandKind::Refresh => {
                self.reload();
                self.refresh_themes();
                self.prompt("", None);
            }
            CommandKind::Explorer => self.explorer(),
            CommandKind::SeeHistory => self.show_history(),
            CommandKind::NewCommandWizard => self.new_command_wizard(),
            CommandKind::TagOperation(op) => self.tag_operation(*op),
            CommandKind::Prompt { text, caret } => self.prompt(text, *caret),
            CommandKind::PromptBasic { text, caret, hint } => self.prompt_basic(text, *caret, hint),
            CommandKind::Message { message } => self.send_message(message, None, IndexMap::new()),
            CommandKind::ActionString { text } => self.invoke_action_string(text, IndexMap::new()),
            CommandKind::ActionStringInput { text, hint } => self.action_string_input(text, hint),
            CommandKind::HistoryPicker { message, hint, mode } => self.history_picker(message, hint, *mode),
        }
    }
}

/// Substitution variables carrying the typed input.
pub(crate) fn input_variables(input: String) -> IndexMap<String, String> {
    let mut variables = IndexMap::new();
    variables.insert(crate::keys::INPUT_VARIABLE.to_string(), input);
    variables
}
