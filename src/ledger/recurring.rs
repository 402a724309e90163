use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use super::{period::YearMonth, Transaction};

/// Recurring category and the template chosen to represent it.
#[derive(Debug, Clone)]
pub struct RecurringSeries<'a> {
    pub category: &'a str,
    pub template: &'a Transaction,
    pub materialized_in: Option<&'a Transaction>,
}

/// Groups `repeat = true` transactions by category in first-seen order.
///
/// Each series carries the most recent repeating entry (later list position wins
/// on equal dates) and the entry already present in `month`, if any. Entries whose
/// category was cleared are ignored.
pub fn recurring_series(
    transactions: &[Transaction],
    month: YearMonth,
) -> Vec<RecurringSeries<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<RecurringSeries<'_>> = Vec::new();

    for txn in transactions.iter().filter(|txn| txn.repeat) {
        let category = txn.category.as_str();
        if category.is_empty() {
            continue;
        }
        let slot = *index.entry(category).or_insert_with(|| {
            series.push(RecurringSeries {
                category,
                template: txn,
                materialized_in: None,
            });
            series.len() - 1
        });
        let entry = &mut series[slot];
        if txn.date >= entry.template.date {
            entry.template = txn;
        }
        if entry.materialized_in.is_none() && month.contains(txn.date) {
            entry.materialized_in = Some(txn);
        }
    }

    series
}

/// Builds the instances needed so every recurring category has one entry dated in
/// `reference`'s month. Categories that already have one are skipped, which makes
/// repeated calls within a month return nothing after the first insert.
///
/// Clones keep the template's `repeat` flag, start on the first of the month, get a
/// new id, and are not yet reflected in savings.
pub fn materialize_month(reference: NaiveDate, transactions: &[Transaction]) -> Vec<Transaction> {
    let month = YearMonth::of(reference);
    let first_day = month.first_day();

    recurring_series(transactions, month)
        .into_iter()
        .filter_map(|series| {
            if let Some(existing) = series.materialized_in {
                tracing::debug!(
                    category = series.category,
                    existing = %existing.id,
                    %month,
                    "recurring entry already present"
                );
                return None;
            }
            let mut txn = series.template.clone();
            txn.id = Uuid::new_v4();
            txn.date = first_day;
            txn.saved = false;
            Some(txn)
        })
        .collect()
}
