use tracing::info;

use notepal_util::last_path_segment;

use crate::dispatch::{Provider, Resolver};
use crate::engine::PaletteEngine;
use crate::keys::DEFAULT_THEME;
use crate::results::{ResultRow, RowAction};
use crate::settings::{SettingKey, Settings};

const SETTINGS_INPUT: &str = "|";

impl PaletteEngine {
    pub(crate) fn settings_provider(&mut self) {
        self.set_hint("Select the setting you want to change");
        let mut rows = vec![
            ResultRow::new(format!("Theme (currently {})", last_path_segment(&self.settings.theme))).with_action(RowAction::PickTheme),
        ];
        rows.extend(SettingKey::EDITABLE.iter().map(|key| {
            ResultRow::new(format!("{} (currently {})", key.label(), self.settings.display(*key)))
                .with_action(RowAction::EditSetting(*key))
        }));
        self.show(rows);
    }

    /// Remember the way back to the settings list, then open the selected editor.
    pub(crate) fn settings_resolver(&mut self, shift: bool) {
        let Some(action) = self.selected_action() else {
            return;
        };
        self.go_back = Some(SETTINGS_INPUT.to_string());
        self.run_row_action(action, shift);
    }

    pub(crate) fn prompt_for_setting(&mut self, key: SettingKey) {
        self.block_provider_change = true;
        self.allow_input_field_selection = true;
        self.provider = Provider::SettingEditor { key };
        self.resolver = Resolver::SettingEditor { key };
        self.input = self.settings.display(key);
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn setting_editor_provider(&mut self, key: SettingKey, typed: &str) {
        self.set_hint(key.prompt_hint());
        let mut rows = vec![
            ResultRow::new(format!("Revert to default value: {}", Settings::default_display(key)))
                .with_action(RowAction::RevertSetting(key)),
        ];
        if let Err(error) = key.validate(typed) {
            rows.push(ResultRow::new(error.to_string()));
        }
        self.show(rows);
    }

    /// Store the typed value, or run the selected row; both return to the settings list.
    pub(crate) fn setting_editor_resolver(&mut self, key: SettingKey) {
        match self.selected_action() {
            None => {
                let typed = self.input.clone();
                if self.settings.set_from_input(key, &typed).is_err() {
                    return;
                }
                info!(setting = key.json_key(), value = %typed, "Palette setting changed");
                self.save_settings();
                self.return_to_settings();
            }
            Some(RowAction::Noop) => {}
            Some(action) => self.run_row_action(action, false),
        }
    }

    pub(crate) fn prompt_for_theme(&mut self) {
        self.block_provider_change = true;
        self.allow_input_field_selection = false;
        self.provider = Provider::ThemePicker;
        self.resolver = Resolver::SelectedRow;
        self.input.clear();
        self.caret = None;
        self.dispatch_input();
    }

    pub(crate) fn theme_picker_provider(&mut self) {
        self.set_hint(SettingKey::Theme.prompt_hint());
        let mut rows = vec![
            ResultRow::new(format!("Revert to default value: {}", last_path_segment(DEFAULT_THEME)))
                .with_action(RowAction::SetTheme(DEFAULT_THEME.to_string())),
        ];
        rows.extend(self.themes.iter().map(|theme| {
            ResultRow::new(last_path_segment(theme)).with_action(RowAction::SetTheme(theme.clone()))
        }));
        self.show(rows);
    }

    pub(crate) fn set_theme(&mut self, theme: &str) {
        self.settings.theme = theme.to_string();
        info!(theme, "Palette theme changed");
        self.save_settings();
        self.refresh_themes();
        self.return_to_settings();
    }

    /// Follow the saved continuation back to the settings list.
    pub(crate) fn return_to_settings(&mut self) {
        let target = self.go_back.take().unwrap_or_else(|| SETTINGS_INPUT.to_string());
        self.allow_input_field_selection = false;
        self.prompt(&target, None);
    }
}
