//! Monthly report journal: an append/delete list kept next to the ledger.

use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::ledger::YearMonth;

/// One monthly report entry. Field names in storage follow the short keys used since
/// the first journal revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportRecord {
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "app", default)]
    pub applications: u32,
    #[serde(rename = "cond", default)]
    pub condition: u8,
    #[serde(rename = "med", default)]
    pub medical: String,
    #[serde(default)]
    pub health: String,
    #[serde(rename = "meet", default)]
    pub meeting: String,
    #[serde(rename = "out", default)]
    pub outing: String,
    #[serde(default)]
    pub goal: String,
    #[serde(rename = "staff", default)]
    pub staff_comment: String,
    #[serde(rename = "parent", default)]
    pub parent_comment: String,
    #[serde(rename = "signStaff", default)]
    pub staff_signature: String,
    #[serde(rename = "signParent", default)]
    pub parent_signature: String,
}

impl ReportRecord {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month: month.to_string(),
            ..Self::default()
        }
    }

    /// Assigns a field by its storage key. Numeric fields must parse.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        let text = value.trim().to_string();
        match key {
            "month" => self.month = text.parse::<YearMonth>()?.to_string(),
            "name" => self.name = text,
            "app" | "applications" => {
                self.applications = text.parse().map_err(|_| {
                    LedgerError::Validation(format!("`{value}` is not an application count"))
                })?
            }
            "cond" | "condition" => {
                let score: u8 = text.parse().map_err(|_| {
                    LedgerError::Validation(format!("`{value}` is not a condition score"))
                })?;
                if score > 10 {
                    return Err(LedgerError::Validation(
                        "condition score must be between 0 and 10".into(),
                    ));
                }
                self.condition = score;
            }
            "med" | "medical" => self.medical = text,
            "health" => self.health = text,
            "meet" | "meeting" => self.meeting = text,
            "out" | "outing" => self.outing = text,
            "goal" => self.goal = text,
            "staff" => self.staff_comment = text,
            "parent" => self.parent_comment = text,
            "signStaff" | "sign-staff" => self.staff_signature = text,
            "signParent" | "sign-parent" => self.parent_signature = text,
            other => {
                return Err(LedgerError::Validation(format!(
                    "unknown report field `{other}`"
                )))
            }
        }
        Ok(())
    }
}

/// Ordered list of report records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportJournal {
    records: Vec<ReportRecord>,
}

impl ReportJournal {
    pub fn new(records: Vec<ReportRecord>) -> Self {
        Self { records }
    }

    pub fn append(&mut self, record: ReportRecord) {
        self.records.push(record);
    }

    pub fn remove(&mut self, index: usize) -> Result<ReportRecord, LedgerError> {
        if index >= self.records.len() {
            return Err(LedgerError::NotFound(format!("report #{}", index + 1)));
        }
        Ok(self.records.remove(index))
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
