use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{band_label, render_table, section as output_section};
use crate::cli::registry::{ArgKind, CommandEntry, CommandGroup};
use crate::ledger::{WindowProgress, YearMonth};

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "status",
            CommandGroup::Summaries,
            "Show a month's balance and budget status",
            "status [YYYY-MM]",
            cmd_status,
        )
        .completing(ArgKind::Month),
        CommandEntry::new(
            "categories",
            CommandGroup::Summaries,
            "Show expense totals per category",
            "categories",
            cmd_categories,
        ),
        CommandEntry::new(
            "series",
            CommandGroup::Summaries,
            "Show income, expense, and budget per month",
            "series",
            cmd_series,
        ),
        CommandEntry::new(
            "progress",
            CommandGroup::Summaries,
            "Show savings goal progress",
            "progress",
            cmd_progress,
        ),
    ]
}

fn cmd_status(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let (month, balance, budget, today_count) = match args.first() {
        Some(raw) => {
            let month = raw
                .parse::<YearMonth>()
                .map_err(|err| CommandError::InvalidArguments(err.to_string()))?;
            (
                month,
                context.manager.monthly_balance(month),
                context.manager.budget_status(month),
                None,
            )
        }
        None => {
            let dashboard = context.manager.dashboard();
            (
                dashboard.month,
                dashboard.balance,
                dashboard.budget,
                Some(dashboard.today.len()),
            )
        }
    };

    output_section(format!("Status {month}"));
    io::print_info(format!("  Income  : {}", context.format_amount(balance.income)));
    io::print_info(format!("  Expense : {}", context.format_amount(balance.expense)));
    let net = format!("  Balance : {}", context.format_amount(balance.balance));
    if balance.is_surplus() {
        io::print_info(net);
    } else {
        io::print_warning(net.trim_start());
    }
    if budget.is_over() {
        io::print_warning(format!(
            "Over budget by {} (budget {})",
            context.format_amount(budget.over_by()),
            context.format_amount(budget.budget)
        ));
    } else {
        io::print_success(format!(
            "Within budget: {} left of {}",
            context.format_amount(budget.remaining()),
            context.format_amount(budget.budget)
        ));
    }
    io::print_info(format!(
        "  Savings : {}",
        context.format_amount(context.manager.savings_balance())
    ));
    if let Some(count) = today_count {
        io::print_info(format!("  Today   : {count} transaction(s)"));
    }
    Ok(())
}

fn cmd_categories(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Expenses by category");
    let totals = context.manager.category_totals();
    if totals.is_empty() {
        io::print_info("No expenses recorded.");
        return Ok(());
    }
    let sum = totals
        .iter()
        .fold(0_i64, |sum, entry| sum.saturating_add(entry.total));
    let rows: Vec<Vec<String>> = totals
        .iter()
        .map(|entry| {
            let name = if entry.category.is_empty() {
                "(none)".to_string()
            } else {
                entry.category.clone()
            };
            vec![name, context.format_amount(entry.total)]
        })
        .collect();
    for line in render_table(&["Category", "Total"], &rows, &[1]) {
        io::print_info(line);
    }
    io::print_info(format!("Total expense: {}", context.format_amount(sum)));
    Ok(())
}

fn cmd_series(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    output_section("Monthly series");
    let series = context.manager.monthly_series();
    if series.is_empty() {
        io::print_info("No transactions recorded.");
        return Ok(());
    }
    let budget = context.manager.budget_series();
    let rows: Vec<Vec<String>> = series
        .months
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            let over = budget.get(idx).map(|point| point.over).unwrap_or(false);
            vec![
                month.to_string(),
                context.format_amount(series.income[idx]),
                context.format_amount(series.expense[idx]),
                context.format_amount(series.net[idx]),
                if over { "over".into() } else { "ok".into() },
            ]
        })
        .collect();
    for line in render_table(
        &["Month", "Income", "Expense", "Net", "Budget"],
        &rows,
        &[1, 2, 3],
    ) {
        io::print_info(line);
    }
    Ok(())
}

fn cmd_progress(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let goals = context.manager.goal_progress();
    output_section("Goal progress");
    let windows: [(&str, &WindowProgress); 3] = [
        ("Year", &goals.year),
        ("18 months", &goals.trailing_18),
        ("Month", &goals.month),
    ];
    for (label, progress) in windows {
        let percent = format!("{:>3}% {}", progress.percent(), progress.band());
        io::print_info(format!(
            "  {:<10} {} .. {}  {} / {}  {}",
            label,
            progress.window.start,
            progress.window.end,
            context.format_amount(progress.net),
            context.format_amount(progress.target),
            band_label(progress.band(), percent)
        ));
    }
    io::print_info(format!(
        "  Savings balance: {}",
        context.format_amount(context.manager.savings_balance())
    ));
    Ok(())
}
