use colored::{ColoredString, Colorize};
use std::fmt;

use crate::ledger::ProgressBand;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[✓]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Hint => ("HINT", ">"),
        MessageKind::Section => ("INFO", ""),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        // Table rows and detail lines print as-is.
        MessageKind::Info => text,
        _ => {
            let (label, icon) = build_label(kind);
            format!("{label}: {icon} {text}")
        }
    };

    match kind {
        MessageKind::Success => formatted.bright_green().to_string(),
        MessageKind::Warning => formatted.bright_yellow().to_string(),
        MessageKind::Error => formatted.bright_red().to_string(),
        MessageKind::Hint => formatted.bright_cyan().to_string(),
        MessageKind::Section => formatted.bold().to_string(),
        MessageKind::Info => formatted,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        MessageKind::Error | MessageKind::Warning => eprintln!("{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Colors a progress label by its band: green, yellow, or red.
pub fn band_label(band: ProgressBand, text: impl fmt::Display) -> ColoredString {
    let text = text.to_string();
    match band {
        ProgressBand::Good => text.green(),
        ProgressBand::Warn => text.yellow(),
        ProgressBand::Bad => text.red(),
    }
}

/// Terminal columns taken by `text`. ANSI escape sequences take none; East Asian
/// wide and fullwidth characters take two.
pub fn visible_width(text: &str) -> usize {
    let mut chars = text.chars().peekable();
    let mut width = 0;
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            if chars.next_if_eq(&'[').is_some() {
                for next in chars.by_ref() {
                    if ('\u{40}'..='\u{7e}').contains(&next) {
                        break;
                    }
                }
            }
            continue;
        }
        width += char_width(ch);
    }
    width
}

fn char_width(ch: char) -> usize {
    match u32::from(ch) {
        0x0300..=0x036F | 0x200B..=0x200F | 0xFE00..=0xFE0F => 0,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x3FFFD => 2,
        _ => 1,
    }
}

fn pad(cell: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(visible_width(cell)));
    if right {
        format!("{fill}{cell}")
    } else {
        format!("{cell}{fill}")
    }
}

/// Renders rows as space-padded columns. Columns listed in `right` align right.
pub fn render_table(headers: &[&str], rows: &[Vec<String>], right: &[usize]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| visible_width(h)).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(visible_width(cell));
            }
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let width = widths.get(idx).copied().unwrap_or(0);
                pad(cell, width, right.contains(&idx))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render(headers.to_vec()));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns_and_aligns_numbers() {
        let rows = vec![
            vec!["1".to_string(), "food".to_string(), "1,200".to_string()],
            vec!["2".to_string(), "rent".to_string(), "70,000".to_string()],
        ];
        let lines = render_table(&["#", "Category", "Amount"], &rows, &[2]);
        assert_eq!(lines[0], "#  Category  Amount");
        assert_eq!(lines[2], "1  food       1,200");
        assert_eq!(lines[3], "2  rent      70,000");
    }

    #[test]
    fn wide_characters_take_two_columns() {
        assert_eq!(visible_width("食費"), 4);
        assert_eq!(visible_width("1,200円"), 7);
        assert_eq!(visible_width("\u{1b}[32mgood\u{1b}[0m"), 4);

        let rows = vec![
            vec!["食費".to_string(), "1,200円".to_string()],
            vec!["rent".to_string(), "70,000円".to_string()],
        ];
        let lines = render_table(&["Category", "Total"], &rows, &[1]);
        assert_eq!(lines[0], "Category     Total");
        assert_eq!(lines[2], "食費       1,200円");
        assert_eq!(lines[3], "rent      70,000円");
        let columns: Vec<usize> = lines.iter().map(|line| visible_width(line)).collect();
        assert!(columns.iter().all(|width| *width == columns[0]));
    }
}
