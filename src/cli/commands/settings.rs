use crate::cli::core::{parse_amount, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::registry::{CommandEntry, CommandGroup};
use crate::errors::LedgerError;
use crate::ledger::SettingKey;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "budget",
            CommandGroup::Settings,
            "Show or set the monthly budget",
            "budget [amount]",
            cmd_budget,
        ),
        CommandEntry::new(
            "goal-year",
            CommandGroup::Settings,
            "Show or set the calendar-year savings goal",
            "goal-year [amount]",
            cmd_goal_year,
        ),
        CommandEntry::new(
            "goal-18",
            CommandGroup::Settings,
            "Show or set the 18-month savings goal",
            "goal-18 [amount]",
            cmd_goal_18,
        ),
        CommandEntry::new(
            "reset-savings",
            CommandGroup::Settings,
            "Set the savings balance back to zero",
            "reset-savings",
            cmd_reset_savings,
        ),
    ]
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    show_or_set(context, SettingKey::Budget, args)
}

fn cmd_goal_year(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    show_or_set(context, SettingKey::GoalYear, args)
}

fn cmd_goal_18(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    show_or_set(context, SettingKey::Goal18, args)
}

fn show_or_set(context: &mut ShellContext, key: SettingKey, args: &[&str]) -> CommandResult {
    match args.first() {
        None => {
            let value = context.manager.settings().get(key);
            io::print_info(format!("{}: {}", key.label(), context.format_amount(value)));
        }
        Some(raw) => {
            let value = parse_amount(raw)?;
            context.manager.set_setting(key, value)?;
            io::print_success(format!(
                "{} set to {}.",
                key.label(),
                context.format_amount(value)
            ));
        }
    }
    Ok(())
}

fn cmd_reset_savings(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let balance = context.manager.savings_balance();
    let prompt = format!(
        "Reset savings balance of {} to 0? Transactions are kept.",
        context.format_amount(balance)
    );
    if !context.confirm(&prompt)? {
        return Err(LedgerError::Declined("savings reset".into()).into());
    }
    let previous = context.manager.reset_savings()?;
    io::print_success(format!(
        "Savings reset (was {}).",
        context.format_amount(previous)
    ));
    Ok(())
}
