//! Terminal rendering of conversation turns
//!
//! Text blocks are printed verbatim, suggestions as a numbered list that the
//! chat loop can refer back to (`/suggest <n>`), SQL statements as a fenced
//! listing. Rows of an executed statement are shown as a table.

use crate::analyst::{ContentBlock, Message, Role};
use crate::warehouse::ResultSet;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};
use std::fmt::Write;

/// Render the blocks of one reply
pub fn render_content(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            ContentBlock::Text { text } => {
                let _ = writeln!(out, "{}", text);
            }
            ContentBlock::Suggestions { suggestions } => {
                let _ = writeln!(out, "{}", "Suggestions:".bold());
                out.push_str(&render_numbered(suggestions));
            }
            ContentBlock::Sql { statement } => {
                let _ = writeln!(out, "{}", "```sql".dimmed());
                let _ = writeln!(out, "{}", statement.trim_end().cyan());
                let _ = writeln!(out, "{}", "```".dimmed());
            }
        }
    }
    out
}

/// Numbered list, starting at 1
pub fn render_numbered<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(out, "  {} {}", format!("[{}]", idx + 1).yellow(), item.as_ref());
    }
    out
}

/// Render a whole history, one labelled turn after the other
pub fn render_history(history: &[Message]) -> String {
    let mut out = String::new();
    for message in history {
        let label = match message.role {
            Role::User => "you".green().bold(),
            Role::Assistant => "analyst".blue().bold(),
        };
        let _ = writeln!(out, "{}:", label);
        out.push_str(&render_content(&message.content));
    }
    out
}

/// Table of query results with one header row
pub fn results_table(results: &ResultSet) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.set_titles(Row::new(
        results
            .columns
            .iter()
            .map(|c| Cell::new(&c.name).style_spec("b"))
            .collect(),
    ));
    for row in &results.rows {
        table.add_row(Row::new(
            row.iter()
                .map(|value| Cell::new(value.as_deref().unwrap_or("NULL")))
                .collect(),
        ));
    }
    table
}

/// Results of a statement, or a notice when nothing came back
pub fn render_results(results: &ResultSet) -> String {
    if results.is_empty() {
        return format!("{}\n", "No rows returned.".yellow());
    }

    let mut out = results_table(results).to_string();
    let summary = if results.is_truncated() {
        format!("{} of {} row(s)", results.rows.len(), results.total_rows)
    } else {
        format!("{} row(s)", results.rows.len())
    };
    let _ = writeln!(out, "{}", summary.dimmed());
    out
}

/// Suggestion number `n` (1-based) of the latest assistant turn
pub fn suggestion_at(history: &[Message], n: usize) -> Option<&str> {
    let latest = history.iter().rev().find(|m| m.role == Role::Assistant)?;
    n.checked_sub(1).and_then(|idx| latest.suggestions().nth(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warehouse::Column;

    fn plain() {
        colored::control::set_override(false);
    }

    fn answer() -> Message {
        Message::assistant(vec![
            ContentBlock::text("This is our interpretation of your question."),
            ContentBlock::Sql {
                statement: "SELECT COUNT(*) FROM medals WHERE country = 'France'\n".into(),
            },
            ContentBlock::Suggestions {
                suggestions: vec!["Medals in 2022?".into(), "Medals in 2018?".into()],
            },
        ])
    }

    #[test]
    fn test_render_content_layout() {
        plain();
        let rendered = render_content(&answer().content);
        assert_eq!(
            rendered,
            "This is our interpretation of your question.\n\
             ```sql\n\
             SELECT COUNT(*) FROM medals WHERE country = 'France'\n\
             ```\n\
             Suggestions:\n  [1] Medals in 2022?\n  [2] Medals in 2018?\n"
        );
    }

    #[test]
    fn test_render_history_labels_turns() {
        plain();
        let rendered = render_history(&[
            Message::user("How many medals did France win?"),
            Message::assistant(vec![ContentBlock::text("France won 15 medals.")]),
        ]);
        assert_eq!(
            rendered,
            "you:\nHow many medals did France win?\nanalyst:\nFrance won 15 medals.\n"
        );
    }

    fn medals(rows: Vec<Vec<Option<String>>>, total_rows: u64) -> ResultSet {
        ResultSet {
            columns: vec![
                Column {
                    name: "COUNTRY".into(),
                    data_type: "text".into(),
                },
                Column {
                    name: "MEDALS".into(),
                    data_type: "fixed".into(),
                },
            ],
            rows,
            total_rows,
            statement_handle: None,
        }
    }

    #[test]
    fn test_results_table_has_one_row_per_record() {
        let results = medals(
            vec![
                vec![Some("Norway".into()), Some("37".into())],
                vec![Some("France".into()), None],
            ],
            2,
        );
        let table = results_table(&results);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get_row(1).unwrap().get_cell(1).unwrap().get_content(), "NULL");
    }

    #[test]
    fn test_render_results_summary() {
        plain();
        let rendered = render_results(&medals(vec![vec![Some("Norway".into()), Some("37".into())]], 1));
        assert!(rendered.contains("COUNTRY"));
        assert!(rendered.contains("Norway"));
        assert!(rendered.ends_with("1 row(s)\n"));

        let rendered = render_results(&medals(vec![vec![Some("Norway".into()), Some("37".into())]], 40));
        assert!(rendered.ends_with("1 of 40 row(s)\n"));
    }

    #[test]
    fn test_render_empty_results() {
        plain();
        assert_eq!(render_results(&medals(Vec::new(), 0)), "No rows returned.\n");
    }

    #[test]
    fn test_suggestion_at_uses_latest_answer() {
        let older = Message::assistant(vec![ContentBlock::Suggestions {
            suggestions: vec!["old".into()],
        }]);
        let history = vec![older, Message::user("q"), answer(), Message::user("q2")];

        assert_eq!(suggestion_at(&history, 1), Some("Medals in 2022?"));
        assert_eq!(suggestion_at(&history, 2), Some("Medals in 2018?"));
        assert_eq!(suggestion_at(&history, 3), None);
        assert_eq!(suggestion_at(&history, 0), None);
        assert_eq!(suggestion_at(&[], 1), None);
    }
}
