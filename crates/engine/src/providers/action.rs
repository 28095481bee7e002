use crate::commands::Command;
use crate::engine::PaletteEngine;
use crate::results::ResultRow;

fn command_row(command: &Command) -> ResultRow {
    let row = ResultRow::new(command.name.clone()).with_caption(command.caption.clone());
    match &command.hint {
        Some(hint) => row.with_hint(hint.clone()),
        None => row,
    }
}

impl PaletteEngine {
    pub(crate) fn action_provider(&mut self, terms: &str) {
        self.set_hint("Search commands");
        let commands: Vec<&Command> = if terms.is_empty() {
            self.command_history()
        } else {
            let needle = terms.to_lowercase();
            self.commands
                .commands
                .iter()
                .filter(|command| command.name.to_lowercase().contains(&needle))
                .collect()
        };
        let rows = commands.into_iter().map(command_row).collect();
        self.show(rows);
    }

    /// Recently used commands, padded with the rest in registration order.
    fn command_history(&mut self) -> Vec<&Command> {
        let commands = &self.commands;
        self.history.prune(|name| commands.find(name).is_some());

        let mut listed: Vec<&Command> = self
            .history
            .names()
            .iter()
            .filter_map(|name| self.commands.find(name))
            .collect();
        let max_results = self.settings.max_results;
        while listed.len() <= max_results {
            let Some(next) = self
                .commands
                .commands
                .iter()
                .find(|command| !listed.iter().any(|listed| listed.name == command.name))
            else {
                break;
            };
            listed.push(next);
        }
        listed
    }
}
