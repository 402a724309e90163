use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    for group in CommandGroup::ALL {
        output_section(group.title());
        for entry in registry.in_group(group) {
            io::print_info(format!("  {:<16} {}", entry.name, entry.description));
        }
    }
    io::print_hint("`help <command>` shows usage. Amounts may carry commas or a trailing 円.");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("{} ({})", entry.name, entry.group.title()));
    io::print_info(format!("  {}", entry.description));
    io::print_info(format!("  Usage: {}", entry.usage));
    if !entry.aliases.is_empty() {
        io::print_info(format!("  Aliases: {}", entry.aliases.join(", ")));
    }
    if let Some(note) = entry.first_arg.note() {
        io::print_info(format!("  {note}"));
    }
}
