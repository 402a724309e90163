use crate::cli::core::{parse_row, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::{ArgKind, CommandEntry, CommandGroup};
use crate::errors::LedgerError;
use crate::ledger::YearMonth;
use crate::reports::ReportRecord;

const USAGE: &str = "report <add <YYYY-MM> [field=value ...]|list|remove <row>>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "report",
        CommandGroup::Reports,
        "Keep the monthly report journal",
        USAGE,
        cmd_report,
    )
    .completing(ArgKind::ReportAction)]
}

fn cmd_report(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some((subcommand, rest)) = args.split_first() else {
        return Err(CommandError::InvalidArguments(format!("usage: {USAGE}")));
    };
    match subcommand.to_ascii_lowercase().as_str() {
        "add" => handle_add(context, rest),
        "list" => handle_list(context),
        "remove" => handle_remove(context, rest),
        other => Err(CommandError::InvalidArguments(format!(
            "unknown report subcommand `{other}`"
        ))),
    }
}

fn handle_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let month = match args.first() {
        Some(raw) => raw.parse::<YearMonth>()?,
        None => context.manager.current_month(),
    };
    let mut record = ReportRecord::new(month);
    for pair in args.iter().skip(1) {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            CommandError::InvalidArguments(format!("expected field=value, got `{pair}`"))
        })?;
        record.set_field(key, value)?;
    }
    let count = context.manager.add_report(record)?;
    io::print_success(format!("Report #{count} saved for {month}."));
    Ok(())
}

fn handle_list(context: &mut ShellContext) -> CommandResult {
    output_section("Reports");
    let reports = context.manager.reports();
    if reports.is_empty() {
        io::print_info("No reports.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = reports
        .iter()
        .enumerate()
        .map(|(idx, report)| {
            vec![
                (idx + 1).to_string(),
                report.month.clone(),
                report.name.clone(),
                report.applications.to_string(),
                report.condition.to_string(),
                report.goal.clone(),
            ]
        })
        .collect();
    for line in render_table(
        &["#", "Month", "Name", "Apps", "Cond", "Goal"],
        &rows,
        &[0, 3, 4],
    ) {
        io::print_info(line);
    }
    Ok(())
}

fn handle_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments("usage: report remove <row>".into()))?;
    let row = parse_row(raw)?;
    let Some(report) = context.manager.reports().get(row - 1) else {
        return Err(LedgerError::NotFound(format!("report #{row}")).into());
    };
    let prompt = format!("Delete report #{row} ({})?", report.month);
    if !context.confirm(&prompt)? {
        return Err(LedgerError::Declined("report deletion".into()).into());
    }
    let removed = context.manager.remove_report(row - 1)?;
    io::print_success(format!("Removed report for {}.", removed.month));
    Ok(())
}
