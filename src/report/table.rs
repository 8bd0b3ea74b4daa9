use std::fmt::Write;

use crate::rank::RankedEntry;
use crate::report::HEADER;
use crate::stats::ExtractionReport;

/// Keys longer than this are cut in terminal output.
pub const MAX_KEY_WIDTH: usize = 150;

/// Render entries as a bordered ASCII table with a header row.
pub fn render(entries: &[RankedEntry]) -> String {
    let mut rows: Vec<[String; 3]> = Vec::with_capacity(entries.len() + 1);
    rows.push(HEADER.map(str::to_string));
    rows.extend(entries.iter().map(|entry| {
        [
            entry.key.chars().take(MAX_KEY_WIDTH).collect(),
            entry.total_count.to_string(),
            entry.last_visited.clone(),
        ]
    }));

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&border);
    out.push('\n');
    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for (cell, width) in row.iter().zip(widths) {
            let _ = write!(out, " {cell:<width$} |");
        }
        out.push('\n');
        if i == 0 {
            out.push_str(&border);
            out.push('\n');
        }
    }
    out.push_str(&border);
    out
}

/// Print the domain, mail and top URL tables to stdout.
pub fn print_report(report: &ExtractionReport) {
    println!("{}", render(&report.domains));
    println!("{}", render(&report.mail));
    println!("{}", render(&report.top_urls));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, count: u64) -> RankedEntry {
        RankedEntry {
            key: key.to_string(),
            total_count: count,
            last_visited: "2024-03-14".to_string(),
        }
    }

    #[test]
    fn renders_bordered_table() {
        let table = render(&[entry("domain2.com", 10), entry("domain1.com", 5)]);
        let expected = "\
+-------------+-------+--------------+
| URL         | Count | Last Visited |
+-------------+-------+--------------+
| domain2.com | 10    | 2024-03-14   |
| domain1.com | 5     | 2024-03-14   |
+-------------+-------+--------------+";
        assert_eq!(table, expected);
    }

    #[test]
    fn empty_table_has_header_only() {
        let table = render(&[]);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("| URL | Count | Last Visited |"));
    }

    #[test]
    fn long_keys_are_truncated() {
        let long = format!("https://example.com/{}", "a".repeat(300));
        let table = render(&[entry(&long, 1)]);
        let prefix: String = long.chars().take(MAX_KEY_WIDTH).collect();
        assert!(table.contains(&prefix));
        assert!(!table.contains(&long.chars().take(MAX_KEY_WIDTH + 1).collect::<String>()));
    }
}
