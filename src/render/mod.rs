pub mod export;
pub mod humanize;
pub mod table;

use crate::domain::model::{RunStats, Summary};
use crate::domain::ports::{ColorChoice, OutputFormat};
use crate::utils::error::Result;
use crossterm::style::Color;
use humanize::{group_thousands, human_time_offset, time_per};
use table::{KeyValueTable, Span};

pub const DEFAULT_WIDTH: usize = 80;

/// auto 時只在終端機且未設定 NO_COLOR 才上色
pub fn use_color(choice: ColorChoice, is_terminal: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => is_terminal && std::env::var_os("NO_COLOR").is_none(),
    }
}

pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(columns, _)| columns as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

pub fn run_table(run: &RunStats, show_group: bool) -> KeyValueTable {
    let runs = run.num_runs.max(1);
    let megabytes = run.megabytes();

    let mut table = KeyValueTable::new();
    if show_group {
        table.add_text_row("Group:", &run.group);
    }

    if run.params.is_empty() {
        table.add_text_row("Params:", "None");
    } else {
        table.add_text_row("Params:", &run.params_text());
    }

    match run.start {
        Some(start) => table.add_text_row("Run:", &start.format("%x %X").to_string()),
        None => table.add_text_row("Run:", &format!("{} runs, averaged", run.num_runs)),
    }

    table.add_text_row(
        "Count:",
        &format!(
            "{} ({}MB)",
            group_thousands(run.count / runs),
            group_thousands((megabytes / runs as f64) as u64)
        ),
    );

    if run.patient_count > 0 {
        let average_patients = run.patient_count / runs;
        table.add_spans_row(
            "Time/Patient:",
            vec![
                human_time_offset(run.duration_ms / run.patient_count as f64),
                Span::plain(format!(" ({} patients)", group_thousands(average_patients))),
            ],
        );
    }

    table.add_spans_row(
        "Time/Resource:",
        vec![time_per(run.duration_ms, run.count as f64)],
    );
    table.add_spans_row("Time/Megabyte:", vec![time_per(run.duration_ms, megabytes)]);
    table.add_spans_row(
        "Total Time:",
        vec![human_time_offset(run.duration_ms / runs as f64)],
    );

    if run.errors > 0 {
        table.add_spans_row(
            "Errors:",
            vec![Span::colored(run.errors.to_string(), Color::Red)],
        );
    }

    table
}

/// 表格輸出：先列出無法理解的匯出，再逐一輸出每個統計表格
pub fn render_tables(summary: &Summary, max_width: Option<usize>, color_enabled: bool) -> String {
    let mut out = String::new();
    for rejected in &summary.rejected {
        out.push_str(&format!(
            "Could not understand export {}: {}\n",
            rejected.export_id, rejected.reason
        ));
    }
    for run in &summary.stats {
        out.push_str(&run_table(run, summary.show_group).render(max_width, color_enabled));
    }
    out
}

pub fn render_summary(
    summary: &Summary,
    format: OutputFormat,
    max_width: Option<usize>,
    color_enabled: bool,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_tables(summary, max_width, color_enabled)),
        OutputFormat::Csv => export::to_csv(summary),
        OutputFormat::Json => export::to_json(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::RejectedExport;
    use chrono::DateTime;

    fn stats() -> RunStats {
        let mut stats = RunStats {
            group: "g-1".to_string(),
            start: DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z").ok(),
            count: 12_000,
            bytes: 10 * 1024 * 1024,
            duration_ms: 600_000.0,
            patient_count: 100,
            ..RunStats::default()
        };
        stats.params.insert("_type".to_string(), "Patient".to_string());
        stats
    }

    fn render(run: &RunStats, show_group: bool) -> String {
        run_table(run, show_group).render(None, false)
    }

    #[test]
    fn test_single_run_rows() {
        let out = render(&stats(), false);
        assert!(!out.contains("Group:"));
        assert!(out.contains("│ _type: Patient"));
        assert!(out.contains("03/01/24 10:00:00"));
        assert!(out.contains("12,000 (10MB)"));
        assert!(out.contains("6s (100 patients)"));
        assert!(out.contains("50ms"));
        assert!(out.contains("1m"));
        assert!(out.contains("10m"));
        assert!(!out.contains("Errors:"));
    }

    #[test]
    fn test_merged_run_is_averaged() {
        let mut run = stats();
        run.start = None;
        run.num_runs = 2;
        let out = render(&run, true);
        assert!(out.contains("Group:"));
        assert!(out.contains("2 runs, averaged"));
        assert!(out.contains("6,000 (5MB)"));
        assert!(out.contains("(50 patients)"));
        // Total Time 為平均值
        assert!(out.contains("│ Total Time:    │ 5m"));
    }

    #[test]
    fn test_no_params_and_errors() {
        let mut run = stats();
        run.params.clear();
        run.patient_count = 0;
        run.errors = 7;
        let out = render(&run, false);
        assert!(out.contains("None"));
        assert!(!out.contains("Time/Patient:"));
        assert!(out.contains("Errors:"));
        assert!(out.contains(" 7 "));
    }

    #[test]
    fn test_zero_counts_render_dash() {
        let mut run = stats();
        run.count = 0;
        run.bytes = 0;
        run.patient_count = 0;
        let out = render(&run, false);
        assert!(out.contains("│ Time/Resource: │ -"));
    }

    #[test]
    fn test_render_tables_lists_rejected_first() {
        let summary = Summary {
            stats: vec![stats()],
            show_group: false,
            rejected: vec![RejectedExport {
                export_id: "e9".to_string(),
                reason: "Two kickoff events".to_string(),
            }],
        };
        let out = render_tables(&summary, None, false);
        assert!(out.starts_with("Could not understand export e9: Two kickoff events\n┌"));
    }

    #[test]
    fn test_use_color() {
        assert!(use_color(ColorChoice::Always, false));
        assert!(!use_color(ColorChoice::Never, true));
        assert!(!use_color(ColorChoice::Auto, false));
    }
}
