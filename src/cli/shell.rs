use std::{
    borrow::Cow,
    env,
    io::{self, BufRead},
};

use colored::Colorize;
use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::{Hint, Hinter},
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::commands::system::CONFIG_KEYS;
use crate::cli::core::{CliError, CliMode, LoopControl, ShellContext};
use crate::cli::output::info as output_info;
use crate::cli::registry::ArgKind;
use crate::ledger::TransactionKind;

const SCRIPT_ENV: &str = "KAKEIBO_CLI_SCRIPT";
const HISTORY_FILE: &str = "history.txt";
const REPORT_ACTIONS: [&str; 3] = ["add", "list", "remove"];

/// Runs the shell: line-edited when attached to a user, one command per stdin
/// line when `KAKEIBO_CLI_SCRIPT` is set.
pub fn run_cli() -> Result<(), CliError> {
    let mode = if env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    let mut context = ShellContext::new(mode)?;
    match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    }
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<LedgerHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(LedgerHelper::default()));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
    let history = context.config_manager.base_dir().join(HISTORY_FILE);
    if editor.load_history(&history).is_err() {
        tracing::debug!(path = %history.display(), "starting without shell history");
    }
    output_info("Type `help` to list commands. Tab completes commands and row numbers.");

    loop {
        if let Some(helper) = editor.helper_mut() {
            helper.refresh(context);
        }
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.trim()).ok();
                }
                if run_line(context, &line) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Exiting shell.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }

    if let Err(err) = editor.save_history(&history) {
        tracing::debug!(error = %err, "could not save shell history");
    }
    Ok(())
}

fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        if run_line(context, &line?) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

fn run_line(context: &mut ShellContext, line: &str) -> LoopControl {
    context.execute_line(line).unwrap_or_else(|err| {
        context.report_error(err);
        LoopControl::Continue
    })
}

struct CommandSketch {
    name: &'static str,
    aliases: &'static [&'static str],
    usage: &'static str,
    first_arg: ArgKind,
}

/// Completion data captured from the ledger before each prompt.
#[derive(Default)]
struct LedgerHelper {
    commands: Vec<CommandSketch>,
    /// `(row, label)` for every transaction in list order.
    rows: Vec<(String, String)>,
    reports: Vec<(String, String)>,
    months: Vec<String>,
}

impl LedgerHelper {
    fn refresh(&mut self, context: &ShellContext) {
        if self.commands.is_empty() {
            self.commands = context
                .registry
                .entries()
                .iter()
                .map(|entry| CommandSketch {
                    name: entry.name,
                    aliases: entry.aliases,
                    usage: entry.usage,
                    first_arg: entry.first_arg,
                })
                .collect();
        }
        self.rows = context
            .manager
            .transactions()
            .iter()
            .enumerate()
            .map(|(index, txn)| {
                let label = format!(
                    "{:>3}  {} {} {}",
                    index + 1,
                    txn.date,
                    txn.category,
                    context.format_amount(txn.amount)
                );
                ((index + 1).to_string(), label)
            })
            .collect();
        self.reports = context
            .manager
            .reports()
            .iter()
            .enumerate()
            .map(|(index, report)| {
                let label = format!("{:>3}  {} {}", index + 1, report.month, report.name);
                ((index + 1).to_string(), label)
            })
            .collect();
        self.months = context
            .manager
            .monthly_series()
            .months
            .iter()
            .rev()
            .map(ToString::to_string)
            .collect();
    }

    fn sketch(&self, word: &str) -> Option<&CommandSketch> {
        let word = word.to_lowercase();
        self.commands
            .iter()
            .find(|sketch| sketch.name == word || sketch.aliases.contains(&word.as_str()))
    }

    /// Start offset of the word under the cursor and the candidates for it.
    fn candidates(&self, prefix: &str) -> (usize, Vec<Pair>) {
        let start = prefix
            .char_indices()
            .rev()
            .find(|(_, ch)| ch.is_whitespace())
            .map_or(0, |(idx, ch)| idx + ch.len_utf8());
        let needle = &prefix[start..];
        let words: Vec<&str> = prefix[..start].split_whitespace().collect();

        let pairs = match words.as_slice() {
            [] => self
                .commands
                .iter()
                .filter(|sketch| sketch.name.starts_with(&needle.to_lowercase()))
                .map(|sketch| Pair {
                    display: format!("{:<15} {}", sketch.name, sketch.usage),
                    replacement: sketch.name.to_string(),
                })
                .collect(),
            [command] => self.argument_pairs(command, needle),
            [command, action]
                if action.eq_ignore_ascii_case("remove")
                    && self
                        .sketch(command)
                        .is_some_and(|sketch| sketch.first_arg == ArgKind::ReportAction) =>
            {
                labelled(&self.reports, needle)
            }
            _ => Vec::new(),
        };
        (start, pairs)
    }

    fn argument_pairs(&self, command: &str, needle: &str) -> Vec<Pair> {
        let Some(sketch) = self.sketch(command) else {
            return Vec::new();
        };
        match sketch.first_arg {
            ArgKind::None => Vec::new(),
            ArgKind::TransactionRow => labelled(&self.rows, needle),
            ArgKind::Kind => plain(
                [TransactionKind::Income, TransactionKind::Expense]
                    .iter()
                    .map(TransactionKind::label),
                needle,
            ),
            ArgKind::Month => plain(self.months.iter().map(String::as_str), needle),
            ArgKind::Command => plain(self.commands.iter().map(|sketch| sketch.name), needle),
            ArgKind::ReportAction => plain(REPORT_ACTIONS.into_iter(), needle),
            ArgKind::ConfigKey => plain(CONFIG_KEYS.into_iter(), needle),
        }
    }

    /// Argument part of a command's usage, once its name and a space are typed.
    fn usage_hint(&self, line: &str) -> Option<String> {
        let command = line.trim_start().strip_suffix(' ')?;
        if command.contains(char::is_whitespace) {
            return None;
        }
        let (_, arguments) = self.sketch(command)?.usage.split_once(' ')?;
        Some(arguments.to_string())
    }
}

fn plain<'a>(values: impl Iterator<Item = &'a str>, needle: &str) -> Vec<Pair> {
    values
        .filter(|value| value.starts_with(needle))
        .map(|value| Pair {
            display: value.to_string(),
            replacement: value.to_string(),
        })
        .collect()
}

fn labelled(rows: &[(String, String)], needle: &str) -> Vec<Pair> {
    rows.iter()
        .filter(|(row, _)| row.starts_with(needle))
        .map(|(row, label)| Pair {
            display: label.clone(),
            replacement: row.clone(),
        })
        .collect()
}

impl Helper for LedgerHelper {}

impl Completer for LedgerHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.candidates(&line[..pos]))
    }
}

/// Shown after the cursor; accepting it inserts nothing.
struct UsageHint(String);

impl Hint for UsageHint {
    fn display(&self) -> &str {
        &self.0
    }

    fn completion(&self) -> Option<&str> {
        None
    }
}

impl Hinter for LedgerHelper {
    type Hint = UsageHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<UsageHint> {
        if pos != line.len() {
            return None;
        }
        self.usage_hint(line).map(UsageHint)
    }
}

impl Highlighter for LedgerHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(hint.dimmed().to_string())
    }
}

impl Validator for LedgerHelper {}
