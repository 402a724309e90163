//! Static command table for the shell.

use std::iter;

use strsim::levenshtein;

use crate::cli::core::{CommandResult, ShellContext};

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

/// Section a command is listed under in `help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Entries,
    Summaries,
    Settings,
    Reports,
    Shell,
}

impl CommandGroup {
    pub const ALL: [CommandGroup; 5] = [
        CommandGroup::Entries,
        CommandGroup::Summaries,
        CommandGroup::Settings,
        CommandGroup::Reports,
        CommandGroup::Shell,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CommandGroup::Entries => "Entries",
            CommandGroup::Summaries => "Summaries",
            CommandGroup::Settings => "Settings",
            CommandGroup::Reports => "Reports",
            CommandGroup::Shell => "Shell",
        }
    }
}

/// What the first argument of a command names. Drives completion and help notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    None,
    Kind,
    TransactionRow,
    Month,
    Command,
    ReportAction,
    ConfigKey,
}

impl ArgKind {
    pub fn note(self) -> Option<&'static str> {
        match self {
            ArgKind::TransactionRow => Some("<row> is the number printed by `list` or `today`."),
            ArgKind::Month => Some("Months are written YYYY-MM. The default is this month."),
            ArgKind::Kind => Some("Without arguments an interactive form asks for each field."),
            ArgKind::ReportAction => Some("`report remove <row>` takes a `report list` number."),
            ArgKind::ConfigKey => Some("Changes are written to config.json right away."),
            ArgKind::None | ArgKind::Command => None,
        }
    }
}

pub struct CommandEntry {
    pub name: &'static str,
    pub group: CommandGroup,
    pub description: &'static str,
    pub usage: &'static str,
    pub aliases: &'static [&'static str],
    pub first_arg: ArgKind,
    pub handler: CommandHandler,
}

impl CommandEntry {
    pub const fn new(
        name: &'static str,
        group: CommandGroup,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            group,
            description,
            usage,
            aliases: &[],
            first_arg: ArgKind::None,
            handler,
        }
    }

    pub fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub fn completing(self, first_arg: ArgKind) -> Self {
        Self { first_arg, ..self }
    }

    pub fn answers_to(&self, word: &str) -> bool {
        self.name == word || self.aliases.contains(&word)
    }
}

/// Commands in registration order.
pub struct CommandRegistry {
    entries: Vec<CommandEntry>,
}

impl CommandRegistry {
    pub fn from_entries(entries: Vec<CommandEntry>) -> Self {
        Self { entries }
    }

    /// Looks a command up by name or alias, ignoring case.
    pub fn resolve(&self, word: &str) -> Option<&CommandEntry> {
        let word = word.to_lowercase();
        self.entries.iter().find(|entry| entry.answers_to(&word))
    }

    pub fn entries(&self) -> &[CommandEntry] {
        &self.entries
    }

    pub fn in_group(&self, group: CommandGroup) -> impl Iterator<Item = &CommandEntry> + '_ {
        self.entries.iter().filter(move |entry| entry.group == group)
    }

    /// Name of the command whose name or alias is nearest to `word`, if within
    /// `max_distance` edits. Ties go to the earlier registration.
    pub fn closest(&self, word: &str, max_distance: usize) -> Option<&'static str> {
        let word = word.to_lowercase();
        self.entries
            .iter()
            .filter_map(|entry| {
                let distance = iter::once(entry.name)
                    .chain(entry.aliases.iter().copied())
                    .map(|candidate| levenshtein(candidate, &word))
                    .min()?;
                (distance <= max_distance).then_some((distance, entry.name))
            })
            .min_by_key(|(distance, _)| *distance)
            .map(|(_, name)| name)
    }
}
