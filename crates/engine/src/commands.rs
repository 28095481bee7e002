//! The palette command set: built-in commands plus custom commands declared
//! by items tagged [`CUSTOM_COMMAND_TAG`].

use tracing::{debug, warn};

use notepal_types::{FieldOp, Item, Repository};
use notepal_util::first_line;

use crate::keys::{
    CAPTION_FIELD, CARET_FIELD, CUSTOM_COMMAND_TAG, HINT_FIELD, IMMEDIATE_FIELD, MODE_FIELD, NAME_FIELD, TRIGGER_FIELD, TYPE_FIELD,
    USER_INPUT_FIELD,
};

/// Source of the list shown by a history picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Recently visited items followed by the story.
    #[default]
    Navigation,
    /// Items with a `draft.of` field.
    Drafts,
    /// Items currently open in the story.
    Story,
}

impl HistoryMode {
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("drafts") => HistoryMode::Drafts,
            Some("story") => HistoryMode::Story,
            _ => HistoryMode::Navigation,
        }
    }
}

/// What running a command does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Refresh,
    Explorer,
    SeeHistory,
    NewCommandWizard,
    /// Two-step tag mutation: pick an item, then pick tags.
    TagOperation(FieldOp),
    /// Re-enter the palette with `text`.
    Prompt { text: String, caret: Option<usize> },
    /// Splice typed input into `text` at `caret` and run the result as a filter.
    PromptBasic { text: String, caret: Option<usize>, hint: String },
    /// Dispatch a host message.
    Message { message: String },
    /// Run an action string.
    ActionString { text: String },
    /// Ask for input, then run an action string with it.
    ActionStringInput { text: String, hint: String },
    /// Pick an item from a history list and send `message` with it.
    HistoryPicker { message: String, hint: String, mode: HistoryMode },
}

/// A palette command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub caption: Option<String>,
    pub hint: Option<String>,
    pub kind: CommandKind,
    /// The palette stays open after the command runs.
    pub keep_palette: bool,
    /// Resolve again right after the command runs.
    pub immediate: bool,
}

impl Command {
    fn builtin(name: &str, kind: CommandKind) -> Self {
        Self {
            name: name.to_string(),
            caption: None,
            hint: None,
            kind,
            keep_palette: true,
            immediate: false,
        }
    }
}

/// A literal input prefix bound to an action string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub name: Option<String>,
    pub caption: Option<String>,
    pub trigger: String,
    pub text: String,
    pub hint: String,
}

/// Commands and triggers available to the palette.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSet {
    pub commands: Vec<Command>,
    pub triggers: Vec<Trigger>,
}

impl CommandSet {
    /// Build the command set from the built-ins and the repository's custom commands.
    pub fn load(repository: &dyn Repository) -> Self {
        let mut set = CommandSet {
            commands: builtin_commands(),
            triggers: Vec::new(),
        };

        for title in repository.items_by_tag(CUSTOM_COMMAND_TAG) {
            let Some(item) = repository.get_item(&title) else {
                continue;
            };
            set.add_custom(&item);
        }
        debug!(
            commands = set.commands.len(),
            triggers = set.triggers.len(),
            "Loaded palette commands"
        );
        set
    }

    pub fn find(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|command| command.name == name)
    }

    /// The first trigger whose prefix starts `input`.
    pub fn trigger_for(&self, input: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|trigger| input.starts_with(&trigger.trigger))
    }

    fn add_custom(&mut self, item: &Item) {
        let Some(kind) = item.field(TYPE_FIELD) else {
            return;
        };
        let name = item.field(NAME_FIELD).map(str::to_string);
        let caption = item.field(CAPTION_FIELD).map(str::to_string);
        let text = item.text();
        let text_first_line = first_line(text).to_string();
        let hint = item
            .field(HINT_FIELD)
            .or_else(|| item.field(NAME_FIELD))
            .unwrap_or_default()
            .to_string();
        let caret = item.field(CARET_FIELD).and_then(|caret| caret.trim().parse::<usize>().ok());

        if kind == "shortcut" {
            let Some(trigger) = item.field(TRIGGER_FIELD).filter(|trigger| !trigger.is_empty()) else {
                warn!(item = %item.title, "Shortcut command without a trigger skipped");
                return;
            };
            self.triggers.push(Trigger {
                name,
                caption,
                trigger: trigger.to_string(),
                text: text.to_string(),
                hint,
            });
            return;
        }

        let Some(name) = name else {
            warn!(item = %item.title, "Custom command without a name skipped");
            return;
        };

        let (kind, keep_palette, immediate) = match kind {
            "prompt" => {
                let immediate = item
                    .field(IMMEDIATE_FIELD)
                    .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
                (
                    CommandKind::Prompt {
                        text: text_first_line,
                        caret,
                    },
                    !immediate,
                    immediate,
                )
            }
            "prompt-basic" => (
                CommandKind::PromptBasic {
                    text: text_first_line,
                    caret,
                    hint: hint.clone(),
                },
                true,
                false,
            ),
            "message" => (CommandKind::Message { message: text_first_line }, false, false),
            "actionString" => {
                if item.field(USER_INPUT_FIELD) == Some("true") {
                    (
                        CommandKind::ActionStringInput {
                            text: text.to_string(),
                            hint: hint.clone(),
                        },
                        true,
                        false,
                    )
                } else {
                    (CommandKind::ActionString { text: text.to_string() }, false, false)
                }
            }
            "history" => (
                CommandKind::HistoryPicker {
                    message: text_first_line,
                    hint: hint.clone(),
                    mode: HistoryMode::from_field(item.field(MODE_FIELD)),
                },
                true,
                false,
            ),
            other => {
                warn!(item = %item.title, command_type = other, "Unknown custom command type skipped");
                return;
            }
        };

        self.commands.push(Command {
            name,
            caption,
            hint: Some(hint),
            kind,
            keep_palette,
            immediate,
        });
    }
}

fn builtin_commands() -> Vec<Command> {
    vec![
        Command::builtin("Refresh Command Palette", CommandKind::Refresh),
        Command::builtin("Explorer", CommandKind::Explorer),
        Command::builtin("See History", CommandKind::SeeHistory),
        Command::builtin("New Command Wizard", CommandKind::NewCommandWizard),
        Command::builtin("Add tag to tiddler", CommandKind::TagOperation(FieldOp::AddTag)),
        Command::builtin("Remove tag", CommandKind::TagOperation(FieldOp::RemoveTag)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use notepal_registry::{ItemRegistry, RegistryFixture};

    fn command_item(title: &str, kind: &str) -> Item {
        Item::new(title)
            .with_field("tags", CUSTOM_COMMAND_TAG)
            .with_field(TYPE_FIELD, kind)
            .with_field(NAME_FIELD, title)
    }

    fn load(items: Vec<Item>) -> CommandSet {
        CommandSet::load(&ItemRegistry::from_fixture(RegistryFixture { items, shadows: vec![] }))
    }

    #[test]
    fn builtins_come_first_in_registration_order() {
        let set = load(vec![]);
        let names: Vec<_> = set.commands.iter().map(|command| command.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Refresh Command Palette",
                "Explorer",
                "See History",
                "New Command Wizard",
                "Add tag to tiddler",
                "Remove tag"
            ]
        );
        assert!(set.commands.iter().all(|command| command.keep_palette));
    }

    #[test]
    fn custom_command_types_are_decoded() {
        let set = load(vec![
            command_item("Go", "prompt")
                .with_field("text", "@work\nignored")
                .with_field(IMMEDIATE_FIELD, "true")
                .with_field(CARET_FIELD, "3"),
            command_item("Basic", "prompt-basic").with_field("text", "[tag[]]").with_field(HINT_FIELD, "Tagged"),
            command_item("Save", "message").with_field("text", "tm-save-wiki"),
            command_item("Ask", "actionString")
                .with_field("text", "<$action/>")
                .with_field(USER_INPUT_FIELD, "true"),
            command_item("Run", "actionString").with_field("text", "<$action/>"),
            command_item("Drafts", "history").with_field("text", "tm-edit").with_field(MODE_FIELD, "drafts"),
        ]);

        let go = set.find("Go").unwrap();
        assert_eq!(
            go.kind,
            CommandKind::Prompt {
                text: "@work".into(),
                caret: Some(3)
            }
        );
        assert!(go.immediate && !go.keep_palette);
        assert_eq!(go.hint.as_deref(), Some("Go"));

        assert!(matches!(&set.find("Basic").unwrap().kind, CommandKind::PromptBasic { hint, caret: None, .. } if hint == "Tagged"));
        let save = set.find("Save").unwrap();
        assert!(!save.keep_palette);
        assert!(matches!(&save.kind, CommandKind::Message { message } if message == "tm-save-wiki"));
        assert!(matches!(set.find("Ask").unwrap().kind, CommandKind::ActionStringInput { .. }));
        assert!(matches!(set.find("Run").unwrap().kind, CommandKind::ActionString { .. }));
        assert!(matches!(
            set.find("Drafts").unwrap().kind,
            CommandKind::HistoryPicker {
                mode: HistoryMode::Drafts,
                ..
            }
        ));
    }

    #[test]
    fn immediate_requires_literal_true() {
        let set = load(vec![command_item("Go", "prompt").with_field(IMMEDIATE_FIELD, "false")]);
        let go = set.find("Go").unwrap();
        assert!(!go.immediate);
        assert!(go.keep_palette);
    }

    #[test]
    fn shortcuts_become_triggers() {
        let set = load(vec![
            command_item("Quick", "shortcut")
                .with_field(TRIGGER_FIELD, "!!")
                .with_field("text", "<$create/>"),
            command_item("Broken", "shortcut"),
        ]);
        assert_eq!(set.triggers.len(), 1);
        assert_eq!(set.trigger_for("!!note").map(|trigger| trigger.text.as_str()), Some("<$create/>"));
        assert!(set.trigger_for("!note").is_none());
        assert!(set.find("Quick").is_none());
    }

    #[test]
    fn unknown_and_nameless_commands_are_skipped() {
        let nameless = Item::new("$:/x")
            .with_field("tags", CUSTOM_COMMAND_TAG)
            .with_field(TYPE_FIELD, "message");
        let set = load(vec![command_item("Weird", "teleport"), nameless]);
        assert_eq!(set.commands.len(), builtin_commands().len());
    }
}
