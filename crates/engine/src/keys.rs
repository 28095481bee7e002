//! Well-known document keys, tags and field names.

/// Store key of the persisted palette settings.
pub const SETTINGS_KEY: &str = "$:/plugins/linonetwo/commandpalette/CommandPaletteSettings";
/// Store key of the command history (`{ "history": [...] }`).
pub const COMMAND_HISTORY_KEY: &str = "$:/plugins/linonetwo/commandpalette/CommandPaletteHistory";
/// Store key of the default provider's search steps (`{ "steps": [...] }`).
pub const SEARCH_STEPS_KEY: &str = "$:/plugins/linonetwo/commandpalette/CommandPaletteSearchSteps";
/// Store key of the navigation history (`[{ "title": ... }]`, oldest first).
pub const NAVIGATION_HISTORY_KEY: &str = "$:/HistoryList";

/// Items carrying this tag declare custom commands.
pub const CUSTOM_COMMAND_TAG: &str = "$:/tags/CommandPaletteCommand";
/// Items carrying this tag are selectable palette themes.
pub const THEME_TAG: &str = "$:/tags/CommandPaletteTheme";
/// Tag that activates a stylesheet item.
pub const STYLESHEET_TAG: &str = "$:/tags/Stylesheet";
/// Default theme item.
pub const DEFAULT_THEME: &str = "$:/plugins/linonetwo/commandpalette/Compact.css";

/// Filter listing the open story.
pub const STORY_FILTER: &str = "[list[$:/StoryList]]";
/// Filter listing draft items.
pub const DRAFTS_FILTER: &str = "[has:field[draft.of]]";

/// Variable receiving typed input when an action string runs.
pub const INPUT_VARIABLE: &str = "commandpaletteinput";

pub const TYPE_FIELD: &str = "command-palette-type";
pub const NAME_FIELD: &str = "command-palette-name";
pub const CAPTION_FIELD: &str = "command-palette-caption";
pub const HINT_FIELD: &str = "command-palette-hint";
pub const MODE_FIELD: &str = "command-palette-mode";
pub const USER_INPUT_FIELD: &str = "command-palette-user-input";
pub const CARET_FIELD: &str = "command-palette-caret";
pub const IMMEDIATE_FIELD: &str = "command-palette-immediate";
pub const TRIGGER_FIELD: &str = "command-palette-trigger";
