//! Prefix dispatch: maps raw palette input to a provider/resolver pair.

use notepal_types::FieldOp;

use crate::commands::{CommandSet, HistoryMode};
use crate::settings::SettingKey;

/// Leading characters that select a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// `>` commands
    Action,
    /// `#` tag list
    TagList,
    /// `@` items with tags
    Tag,
    /// `?` help
    Help,
    /// `[` filter expression
    Filter,
    /// `+` create item
    Create,
    /// `|` settings
    Settings,
}

impl Symbol {
    pub const ALL: [Symbol; 7] = [
        Symbol::Action,
        Symbol::TagList,
        Symbol::Tag,
        Symbol::Help,
        Symbol::Filter,
        Symbol::Create,
        Symbol::Settings,
    ];

    pub fn from_char(character: char) -> Option<Self> {
        match character {
            '>' => Some(Symbol::Action),
            '#' => Some(Symbol::TagList),
            '@' => Some(Symbol::Tag),
            '?' => Some(Symbol::Help),
            '[' => Some(Symbol::Filter),
            '+' => Some(Symbol::Create),
            '|' => Some(Symbol::Settings),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::Action => '>',
            Symbol::TagList => '#',
            Symbol::Tag => '@',
            Symbol::Help => '?',
            Symbol::Filter => '[',
            Symbol::Create => '+',
            Symbol::Settings => '|',
        }
    }

    pub fn provider(self) -> Provider {
        match self {
            Symbol::Action => Provider::Action,
            Symbol::TagList => Provider::TagList,
            Symbol::Tag => Provider::Tag,
            Symbol::Help => Provider::Help,
            Symbol::Filter => Provider::Filter { hint: None },
            Symbol::Create => Provider::CreateItem,
            Symbol::Settings => Provider::Settings,
        }
    }

    pub fn resolver(self) -> Resolver {
        match self {
            Symbol::Action => Resolver::Action,
            Symbol::TagList => Resolver::TagList,
            Symbol::Tag => Resolver::Default,
            Symbol::Help | Symbol::Filter => Resolver::SelectedRow,
            Symbol::Create => Resolver::CreateItem,
            Symbol::Settings => Resolver::Settings,
        }
    }
}

/// Produces the result rows for the current input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provider {
    /// Item search through the configured search steps, or history when empty.
    Default,
    Action,
    TagList,
    Tag,
    Help,
    /// Filter expression; `hint` overrides the default hint label.
    Filter { hint: Option<String> },
    CreateItem,
    Settings,
    /// A trigger matched; only its hint is shown.
    Trigger { hint: String },
    /// Shows a hint and no rows (wizard steps, free text prompts).
    Silent { hint: String },
    /// History list with a fixed hint.
    History { hint: String, mode: HistoryMode },
    /// Filterable navigation history.
    SeeHistory,
    /// Namespace browser rooted at `url`.
    Explorer { url: String },
    SettingEditor { key: SettingKey },
    ThemePicker,
    /// Tag candidates for a tag add/remove on `item`.
    TagCandidates { item: String, op: FieldOp },
    /// Input is spliced between `start` and `end` and dispatched as a whole.
    Basic { start: String, end: String, hint: String },
}

/// Steps of the new command wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardStep {
    Name,
    Type { name: String },
    Hint { name: String, kind: String },
    Message { name: String, kind: String, hint: String },
}

/// Acts on the selected row or the raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolver {
    /// Navigate to the selected item; Shift creates an item from the input.
    Default,
    /// Run the selected command.
    Action,
    /// Open the selected tag with `@`.
    TagList,
    /// Run the selected row's action.
    SelectedRow,
    CreateItem,
    /// Remember the way back to `|` and run the selected row's action.
    Settings,
    /// Run a trigger's action string with the input after the prefix.
    Trigger { trigger: String, action: String },
    /// Send `message` carrying the selected item.
    HistoryMessage { message: String },
    SettingEditor { key: SettingKey },
    Wizard(WizardStep),
    /// Run `action` with the raw input.
    ActionStringInput { action: String },
    /// Tag flow step one: pick the item.
    TagPickItem { op: FieldOp },
    /// Tag flow step two: mutate the picked item.
    TagApply { item: String, op: FieldOp },
    Noop,
}

/// Result of dispatching an input string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub provider: Provider,
    pub resolver: Resolver,
    pub terms: String,
}

/// Select the provider/resolver pair for `input`.
///
/// Triggers win over symbols; inputs without a recognised leading symbol go
/// to the default provider with the whole input as terms.
pub fn parse_command(input: &str, commands: &CommandSet) -> Dispatch {
    if let Some(trigger) = commands.trigger_for(input) {
        return Dispatch {
            provider: Provider::Trigger {
                hint: trigger.hint.clone(),
            },
            resolver: Resolver::Trigger {
                trigger: trigger.trigger.clone(),
                action: trigger.text.clone(),
            },
            terms: String::new(),
        };
    }

    let mut characters = input.chars();
    if let Some(symbol) = characters.next().and_then(Symbol::from_char) {
        return Dispatch {
            provider: symbol.provider(),
            resolver: symbol.resolver(),
            terms: characters.as_str().to_string(),
        };
    }

    Dispatch {
        provider: Provider::Default,
        resolver: Resolver::Default,
        terms: input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Trigger;

    fn commands_with_trigger(prefix: &str) -> CommandSet {
        CommandSet {
            commands: Vec::new(),
            triggers: vec![Trigger {
                name: Some("Quick".into()),
                caption: None,
                trigger: prefix.into(),
                text: "<$action/>".into(),
                hint: "Quick note".into(),
            }],
        }
    }

    #[test]
    fn every_symbol_round_trips_its_terms() {
        let commands = CommandSet::default();
        for symbol in Symbol::ALL {
            for terms in ["", "work", " spaced terms", "#@nested", "é"] {
                let input = format!("{}{}", symbol.as_char(), terms);
                let dispatch = parse_command(&input, &commands);
                assert_eq!(dispatch.terms, terms, "input {input:?}");
                assert_eq!(dispatch.provider, symbol.provider());
                assert_eq!(dispatch.resolver, symbol.resolver());
            }
        }
    }

    #[test]
    fn plain_input_goes_to_default_provider() {
        let dispatch = parse_command("meeting notes", &CommandSet::default());
        assert_eq!(dispatch.provider, Provider::Default);
        assert_eq!(dispatch.resolver, Resolver::Default);
        assert_eq!(dispatch.terms, "meeting notes");
        assert_eq!(parse_command("", &CommandSet::default()).terms, "");
    }

    #[test]
    fn triggers_take_priority_over_symbols() {
        let commands = commands_with_trigger(">>");
        let dispatch = parse_command(">>buy milk", &commands);
        assert_eq!(
            dispatch.provider,
            Provider::Trigger {
                hint: "Quick note".into()
            }
        );
        assert_eq!(
            dispatch.resolver,
            Resolver::Trigger {
                trigger: ">>".into(),
                action: "<$action/>".into()
            }
        );
        assert_eq!(parse_command(">x", &commands).provider, Provider::Action);
    }
}
