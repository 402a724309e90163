//! Shell context: construction, line execution, confirmations, and error reporting.

use std::{env, io};

use chrono::NaiveDate;
use dialoguer::theme::ColorfulTheme;
use rustyline::error::ReadlineError;
use shell_words::split;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    core::{
        ledger_manager::LedgerManager,
        time::{Clock, FixedClock, SystemClock},
    },
    errors::LedgerError,
    storage::JsonFileStore,
    utils::format::group_thousands,
};

use super::commands;
use super::io as cli_io;
use super::registry::CommandRegistry;

const TODAY_ENV: &str = "KAKEIBO_TODAY";
const ASSUME_YES_ENV: &str = "KAKEIBO_CLI_ASSUME_YES";
const SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub manager: LedgerManager,
    pub theme: ColorfulTheme,
    pub config_manager: ConfigManager,
    pub config: Config,
    /// Answer given to confirmations in script mode.
    pub assume_yes: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let store = JsonFileStore::open(config_manager.store_path(&config))?;
        let manager = LedgerManager::new(Box::new(store), clock_from_env());
        let assume_yes = env::var(ASSUME_YES_ENV)
            .map(|value| matches!(value.trim(), "1" | "true" | "yes" | "y"))
            .unwrap_or(false);
        let mut context = Self::with_parts(mode, config_manager, config, manager, assume_yes);
        context.start()?;
        Ok(context)
    }

    pub(crate) fn with_parts(
        mode: CliMode,
        config_manager: ConfigManager,
        config: Config,
        manager: LedgerManager,
        assume_yes: bool,
    ) -> Self {
        Self {
            mode,
            registry: CommandRegistry::from_entries(commands::all_definitions()),
            manager,
            theme: ColorfulTheme::default(),
            config_manager,
            config,
            assume_yes,
        }
    }

    /// Loads the store and fills in this month's recurring entries.
    fn start(&mut self) -> Result<(), CliError> {
        self.manager.load()?;
        let materialized = self.manager.activate()?;
        if !materialized.is_empty() {
            cli_io::print_info(format!(
                "Added {} recurring transaction(s) for {}.",
                materialized.len(),
                self.manager.current_month()
            ));
        }
        Ok(())
    }

    pub(crate) fn prompt(&self) -> String {
        format!(
            "kakeibo [{} | {}]> ",
            self.manager.current_month(),
            self.format_amount(self.manager.savings_balance())
        )
    }

    /// Tokenizes and runs one input line. Blank lines and `#` comments do nothing.
    pub(crate) fn execute_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(LoopControl::Continue);
        }
        let tokens = split(line)
            .map_err(|err| CommandError::InvalidArguments(format!("cannot read line: {err}")))?;
        let Some((word, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };
        let Some(handler) = self.registry.resolve(word).map(|entry| entry.handler) else {
            self.suggest_command(word);
            return Ok(LoopControl::Continue);
        };

        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        match handler(self, &args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));
        if let Some(best) = self.registry.closest(input, SUGGESTION_DISTANCE) {
            cli_io::print_hint(format!("Suggestion: `{best}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true).map_err(CliError::from)
    }

    /// Asks before a destructive step. Script mode answers from
    /// `KAKEIBO_CLI_ASSUME_YES` and echoes the answer.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if !self.config.confirm_destructive {
            return Ok(true);
        }
        match self.mode {
            CliMode::Interactive => cli_io::confirm_action(&self.theme, prompt, false),
            CliMode::Script => {
                let answer = if self.assume_yes { "yes" } else { "no" };
                cli_io::print_info(format!("{prompt} [{answer}]"));
                Ok(self.assume_yes)
            }
        }
    }

    /// Prints a failed command. The session carries on.
    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(LedgerError::Declined(what)) => {
                cli_io::print_warning(format!("Cancelled: {what}"));
            }
            CommandError::Core(LedgerError::NotFound(what)) => {
                cli_io::print_error(format!("Not found: {what}"));
                cli_io::print_hint("Use `list` to see row numbers.");
            }
            other => cli_io::print_error(other),
        }
    }

    pub(crate) fn format_amount(&self, amount: i64) -> String {
        format!("{}{}", group_thousands(amount), self.config.currency_suffix)
    }

    /// Resolves a 1-based row number as printed by `list`.
    pub(crate) fn transaction_id_from_arg(
        &self,
        arg: Option<&&str>,
        usage: &str,
    ) -> Result<Uuid, CommandError> {
        let raw = arg.ok_or_else(|| CommandError::InvalidArguments(format!("usage: {usage}")))?;
        let row = parse_row(raw)?;
        self.manager
            .transactions()
            .get(row - 1)
            .map(|txn| txn.id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction #{row}")).into())
    }
}

fn clock_from_env() -> Box<dyn Clock> {
    match env::var(TODAY_ENV) {
        Ok(raw) => match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Box::new(FixedClock(date)),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring unparsable {TODAY_ENV}");
                Box::new(SystemClock)
            }
        },
        Err(_) => Box::new(SystemClock),
    }
}

/// Parses a positive 1-based row number.
pub(crate) fn parse_row(raw: &str) -> Result<usize, CommandError> {
    match raw.trim().trim_start_matches('#').parse::<usize>() {
        Ok(row) if row > 0 => Ok(row),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{raw}` is not a row number"
        ))),
    }
}

/// Parses a whole amount, tolerating thousands separators.
pub(crate) fn parse_amount(raw: &str) -> Result<i64, CommandError> {
    let cleaned: String = raw
        .trim()
        .trim_end_matches('円')
        .chars()
        .filter(|ch| !matches!(ch, ',' | '_'))
        .collect();
    cleaned
        .parse::<i64>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a whole amount")))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a YYYY-MM-DD date")))
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

/// Errors that end the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] LedgerError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Readline(#[from] ReadlineError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}
