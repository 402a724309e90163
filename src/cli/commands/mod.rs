pub mod report;
pub mod settings;
pub mod summary;
pub mod system;
pub mod transaction;

use crate::cli::registry::CommandEntry;

pub(crate) fn all_definitions() -> Vec<CommandEntry> {
    let mut commands = Vec::new();
    commands.extend(transaction::definitions());
    commands.extend(summary::definitions());
    commands.extend(settings::definitions());
    commands.extend(report::definitions());
    commands.extend(system::definitions());
    commands
}
