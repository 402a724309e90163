use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{ArgKind, CommandEntry, CommandGroup};
use crate::utils::build_info;

pub(crate) const CONFIG_KEYS: [&str; 2] = ["currency", "confirm"];
const CONFIG_USAGE: &str = "config [currency <suffix> | confirm <on|off>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "config",
            CommandGroup::Settings,
            "Show or change the currency suffix and confirmation prompts",
            CONFIG_USAGE,
            cmd_config,
        )
        .completing(ArgKind::ConfigKey),
        CommandEntry::new(
            "version",
            CommandGroup::Shell,
            "Show build metadata and where the ledger lives",
            "version",
            cmd_version,
        ),
        CommandEntry::new(
            "help",
            CommandGroup::Shell,
            "Show available commands",
            "help [command]",
            cmd_help,
        )
        .completing(ArgKind::Command),
        CommandEntry::new("exit", CommandGroup::Shell, "Exit the shell", "exit", cmd_exit)
            .with_aliases(&["quit"]),
    ]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let [key, value] = args else {
        if !args.is_empty() {
            return Err(CommandError::InvalidArguments(format!("usage: {CONFIG_USAGE}")));
        }
        let config = &context.config;
        output_section("Configuration");
        io::print_info(format!("  File     : {}", context.config_manager.path().display()));
        io::print_info(format!(
            "  Store    : {}",
            context.config_manager.store_path(config).display()
        ));
        io::print_info(format!("  currency : {}", config.currency_suffix));
        io::print_info(format!(
            "  confirm  : {}",
            if config.confirm_destructive { "on" } else { "off" }
        ));
        return Ok(());
    };

    let mut updated = context.config.clone();
    match key.to_ascii_lowercase().as_str() {
        "currency" => updated.currency_suffix = value.trim().to_string(),
        "confirm" => updated.confirm_destructive = parse_switch(value)?,
        other => {
            return Err(CommandError::InvalidArguments(format!(
                "unknown config key `{other}`; expected one of {}",
                CONFIG_KEYS.join(", ")
            )))
        }
    }
    context.config_manager.save(&updated)?;
    context.config = updated;
    io::print_success(format!("Saved {key} to {}.", context.config_manager.path().display()));
    Ok(())
}

fn parse_switch(raw: &str) -> Result<bool, CommandError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(CommandError::InvalidArguments(format!(
            "`{raw}` is not on or off"
        ))),
    }
}

fn cmd_version(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("Kakeibo {}", meta.version));
    io::print_info(format!("  Commit  : {} ({})", meta.git_hash, meta.git_status));
    io::print_info(format!("  Built   : {} {} for {}", meta.timestamp, meta.profile, meta.target));
    io::print_info(format!("  Rustc   : {}", meta.rustc));
    io::print_info(format!(
        "  Ledger  : {} transaction(s), {} report(s) in {}",
        context.manager.transactions().len(),
        context.manager.reports().len(),
        context.config_manager.store_path(&context.config).display()
    ));
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first() {
        Some(word) => match context.registry.resolve(word) {
            Some(entry) => help::print_command(entry),
            None => context.suggest_command(word),
        },
        None => help::print_overview(&context.registry),
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

#[cfg(test)]
mod tests {
    use crate::cli::core::tests::{run, script_context};

    #[test]
    fn config_changes_are_saved_and_applied() {
        let (mut context, _temp) = script_context(false);
        run(
            &mut context,
            &["config currency ¥", "config confirm off", "config confirm maybe"],
        );
        assert_eq!(context.config.currency_suffix, "¥");
        assert!(!context.config.confirm_destructive);
        assert_eq!(context.config_manager.load().unwrap(), context.config);
        assert_eq!(context.format_amount(1_200), "1,200¥");

        // Prompts are skipped even though script answers default to no.
        run(&mut context, &["add income bonus 3000", "reset-savings"]);
        assert_eq!(context.manager.savings_balance(), 0);
    }

    #[test]
    fn unknown_config_key_changes_nothing() {
        let (mut context, _temp) = script_context(true);
        run(&mut context, &["config colour red", "config currency"]);
        assert_eq!(context.config_manager.load().unwrap(), context.config);
        assert_eq!(context.config.currency_suffix, "円");
        assert!(!context.config_manager.path().exists());
    }
}
