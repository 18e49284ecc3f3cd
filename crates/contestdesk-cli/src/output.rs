//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use contestdesk_client::Contest;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

pub(crate) fn render_contest_list(list: &[Contest], format: OutputFormat) -> CliResult<()> {
    println!("{}", format_contest_list(list, format)?);
    Ok(())
}

pub(crate) fn render_contest(contest: &Contest, format: OutputFormat) -> CliResult<()> {
    println!("{}", format_contest(contest, format)?);
    Ok(())
}

pub(crate) fn format_contest_list(list: &[Contest], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(list),
        OutputFormat::Table => {
            let mut out = format!("{:>6} {:<6} {:>4} NAME", "ID", "CLASS", "YEAR");
            for contest in list {
                let _ = write!(
                    out,
                    "\n{:>6} {:<6} {:>4} {}",
                    contest.id, contest.class_level, contest.year, contest.contest_name
                );
            }
            if list.is_empty() {
                out.push_str("\n(no contests)");
            }
            Ok(out)
        }
    }
}

pub(crate) fn format_contest(contest: &Contest, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(contest),
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(out, "id: {}", contest.id);
            let _ = writeln!(out, "name: {}", contest.contest_name);
            let _ = writeln!(out, "class: {}", contest.class_level);
            let _ = writeln!(out, "year: {}", contest.year);
            let _ = write!(out, "url: {}", contest.contest_url);
            if contest.solutions.is_empty() {
                out.push_str("\nsolutions: none");
            } else {
                out.push_str("\nsolutions:");
                for solution in &contest.solutions {
                    let _ = write!(
                        out,
                        "\n  - {}: {}",
                        solution.problem_name, solution.solution_url
                    );
                }
            }
            Ok(out)
        }
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contestdesk_client::{ClassLevel, Solution};

    fn sample() -> Contest {
        Contest {
            id: 12,
            class_level: ClassLevel::Other,
            year: 2022,
            contest_name: "Autumn cup".to_string(),
            contest_url: "https://example.org/autumn".to_string(),
            solutions: vec![Solution {
                problem_name: "Tiles".to_string(),
                solution_url: "https://example.org/tiles".to_string(),
            }],
        }
    }

    #[test]
    fn table_list_has_header_and_rows() -> CliResult<()> {
        let text = format_contest_list(&[sample()], OutputFormat::Table)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("CLASS"));
        assert!(lines[1].contains("other"));
        assert!(lines[1].ends_with("Autumn cup"));
        Ok(())
    }

    #[test]
    fn empty_table_says_so() -> CliResult<()> {
        let text = format_contest_list(&[], OutputFormat::Table)?;
        assert!(text.ends_with("(no contests)"));
        Ok(())
    }

    #[test]
    fn json_output_keeps_wire_class_level() -> CliResult<()> {
        let text = format_contest_list(&[sample()], OutputFormat::Json)?;
        assert!(text.starts_with('['));
        assert!(text.contains("\"class_level\": \"other\""));
        Ok(())
    }

    #[test]
    fn detail_lists_solutions() -> CliResult<()> {
        let text = format_contest(&sample(), OutputFormat::Table)?;
        assert!(text.contains("class: other"));
        assert!(text.contains("  - Tiles: https://example.org/tiles"));
        Ok(())
    }
}
