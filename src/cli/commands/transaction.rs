use crate::cli::core::{
    parse_amount, parse_date, CliMode, CommandError, CommandResult, ShellContext,
};
use crate::cli::io;
use crate::cli::output::{render_table, section as output_section};
use crate::cli::registry::{ArgKind, CommandEntry, CommandGroup};
use crate::ledger::{ReversalDecision, Transaction, TransactionDraft, TransactionKind};

const ADD_USAGE: &str =
    "add <income|expense> <category> <amount> [--date YYYY-MM-DD] [--memo TEXT] [--repeat]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "add",
            CommandGroup::Entries,
            "Record an income or expense",
            ADD_USAGE,
            cmd_add,
        )
        .completing(ArgKind::Kind),
        CommandEntry::new(
            "remove",
            CommandGroup::Entries,
            "Delete a transaction, optionally taking it back out of savings",
            "remove <row>",
            cmd_remove,
        )
        .with_aliases(&["rm"])
        .completing(ArgKind::TransactionRow),
        CommandEntry::new(
            "clear-category",
            CommandGroup::Entries,
            "Blank the category of a transaction",
            "clear-category <row>",
            cmd_clear_category,
        )
        .completing(ArgKind::TransactionRow),
        CommandEntry::new(
            "bank",
            CommandGroup::Entries,
            "Add an income that is not reflected yet to savings",
            "bank <row>",
            cmd_bank,
        )
        .completing(ArgKind::TransactionRow),
        CommandEntry::new(
            "list",
            CommandGroup::Entries,
            "List every transaction",
            "list",
            cmd_list,
        )
        .with_aliases(&["ls"]),
        CommandEntry::new(
            "today",
            CommandGroup::Entries,
            "List today's transactions",
            "today",
            cmd_today,
        ),
    ]
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let draft = if args.is_empty() && context.mode == CliMode::Interactive {
        prompt_draft(context)?
    } else {
        parse_add_args(args)?
    };
    let txn = context.manager.add_transaction(draft)?;
    io::print_success(format!(
        "Added {} `{}` {} on {}.",
        txn.kind,
        txn.category,
        context.format_amount(txn.amount),
        txn.date
    ));
    if txn.is_income() {
        io::print_info(format!(
            "Savings balance: {}",
            context.format_amount(context.manager.savings_balance())
        ));
    }
    Ok(())
}

fn parse_add_args(args: &[&str]) -> Result<TransactionDraft, CommandError> {
    let usage = || CommandError::InvalidArguments(format!("usage: {ADD_USAGE}"));
    let [kind, category, amount, rest @ ..] = args else {
        return Err(usage());
    };
    let kind: TransactionKind = kind.parse()?;
    let mut draft = TransactionDraft::new(kind, *category, parse_amount(amount)?);

    let mut flags = rest.iter();
    while let Some(flag) = flags.next() {
        match *flag {
            "--date" => {
                let value = flags.next().ok_or_else(usage)?;
                draft = draft.on(parse_date(value)?);
            }
            "--memo" => {
                let value = flags.next().ok_or_else(usage)?;
                draft = draft.memo(*value);
            }
            "--repeat" => draft = draft.repeating(true),
            other => {
                return Err(CommandError::InvalidArguments(format!(
                    "unknown option `{other}`"
                )))
            }
        }
    }
    Ok(draft)
}

fn prompt_draft(context: &ShellContext) -> Result<TransactionDraft, CommandError> {
    let kinds = [TransactionKind::Expense, TransactionKind::Income];
    let labels: Vec<&str> = kinds.iter().map(TransactionKind::label).collect();
    let kind = kinds[io::prompt_select(&context.theme, "Type", &labels)?];
    let category = io::prompt_text(&context.theme, "Category")?;
    let amount = parse_amount(&io::prompt_text(&context.theme, "Amount")?)?;
    let date = io::prompt_text(&context.theme, "Date (blank for today)")?;
    let memo = io::prompt_text(&context.theme, "Memo")?;
    let repeat = io::confirm_action(&context.theme, "Repeat every month?", false)?;

    let mut draft = TransactionDraft::new(kind, category, amount)
        .memo(memo)
        .repeating(repeat);
    if !date.trim().is_empty() {
        draft = draft.on(parse_date(&date)?);
    }
    Ok(draft)
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.transaction_id_from_arg(args.first(), "remove <row>")?;
    let preview = context.manager.preview_removal(id)?;
    let decision = match &preview.reversal {
        Some(reversal) => {
            let prompt = format!(
                "Also reduce savings by {}? (balance {} -> {})",
                context.format_amount(reversal.amount),
                context.format_amount(reversal.balance_before),
                context.format_amount(reversal.balance_after)
            );
            if context.confirm(&prompt)? {
                ReversalDecision::Reverse
            } else {
                ReversalDecision::Keep
            }
        }
        None => ReversalDecision::Reverse,
    };

    let removal = context.manager.remove_transaction(id, decision)?;
    io::print_success(format!(
        "Removed {} `{}` {} from {}.",
        removal.transaction.kind,
        removal.transaction.category,
        context.format_amount(removal.transaction.amount),
        removal.transaction.date
    ));
    let balance = context.format_amount(context.manager.savings_balance());
    match (removal.adjustment, preview.reversal) {
        (Some(adjustment), _) if adjustment.was_clamped() => io::print_warning(format!(
            "Savings only held {}; balance is now {balance}.",
            context.format_amount(-adjustment.applied)
        )),
        (Some(_), _) => io::print_info(format!("Savings balance: {balance}")),
        (None, Some(_)) => io::print_info(format!("Savings balance kept at {balance}")),
        (None, None) => {}
    }
    Ok(())
}

fn cmd_clear_category(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.transaction_id_from_arg(args.first(), "clear-category <row>")?;
    let previous = context.manager.clear_category(id)?;
    io::print_success(format!("Cleared category `{previous}`."));
    Ok(())
}

fn cmd_bank(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = context.transaction_id_from_arg(args.first(), "bank <row>")?;
    let adjustment = context.manager.bank_transaction(id)?;
    io::print_success(format!(
        "Added {} to savings; balance is now {}.",
        context.format_amount(adjustment.applied),
        context.format_amount(adjustment.balance)
    ));
    Ok(())
}

fn cmd_list(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let rows: Vec<(usize, &Transaction)> = context
        .manager
        .transactions()
        .into_iter()
        .enumerate()
        .collect();
    print_transactions(context, "Transactions", &rows);
    Ok(())
}

fn cmd_today(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let today = context.manager.today();
    // Row numbers stay those of the full list so `remove` keeps working.
    let rows: Vec<(usize, &Transaction)> = context
        .manager
        .transactions()
        .into_iter()
        .enumerate()
        .filter(|(_, txn)| txn.date == today)
        .collect();
    print_transactions(context, &format!("Today ({today})"), &rows);
    Ok(())
}

fn print_transactions(context: &ShellContext, title: &str, rows: &[(usize, &Transaction)]) {
    output_section(title);
    if rows.is_empty() {
        io::print_info("No transactions.");
        return;
    }
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|(index, txn)| {
            let mut flags = String::new();
            if txn.repeat {
                flags.push('R');
            }
            if txn.saved {
                flags.push('S');
            }
            vec![
                (index + 1).to_string(),
                txn.date.to_string(),
                txn.kind.label().to_string(),
                txn.category.clone(),
                context.format_amount(txn.amount),
                txn.memo.clone().unwrap_or_default(),
                flags,
            ]
        })
        .collect();
    for line in render_table(
        &["#", "Date", "Type", "Category", "Amount", "Memo", "Flags"],
        &cells,
        &[0, 4],
    ) {
        io::print_info(line);
    }
}
