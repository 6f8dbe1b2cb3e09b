use std::fmt::Write;

use surge_model::Report;

const HEADERS: [&str; 5] = ["Execution", "Task ID", "Status", "Time Taken", "Reason"];
const RULE_WIDTH: usize = 50;

/// Render `report` as a plain-text grid followed by a one-line summary.
pub fn render(report: &Report) -> String {
    let rows: Vec<[String; 5]> = report
        .rows
        .iter()
        .map(|r| {
            [
                r.execution_id.clone(),
                r.task_id.to_string(),
                r.status.to_string(),
                format!("{:.2}s", r.elapsed.as_secs_f64()),
                r.reason.clone(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "CONCURRENT RUN RESULTS ({} executions)", report.total());
    let _ = writeln!(out, "Total Duration: {:.2}s", report.duration.as_secs_f64());
    let _ = writeln!(out, "{rule}");

    separator(&mut out, &widths);
    line(&mut out, &widths, HEADERS.iter().copied());
    separator(&mut out, &widths);
    for row in &rows {
        line(&mut out, &widths, row.iter().map(String::as_str));
        separator(&mut out, &widths);
    }

    let _ = writeln!(
        out,
        "\nSummary: {}/{} executions passed ({:.1}%)",
        report.passed,
        report.total(),
        report.success_rate()
    );
    out
}

fn separator(out: &mut String, widths: &[usize; 5]) {
    out.push('+');
    for w in widths {
        out.push_str(&"-".repeat(w + 2));
        out.push('+');
    }
    out.push('\n');
}

fn line<'a>(out: &mut String, widths: &[usize; 5], cells: impl Iterator<Item = &'a str>) {
    out.push('|');
    for (cell, w) in cells.zip(widths.iter().copied()) {
        let _ = write!(out, " {cell:<w$} |");
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use surge_model::{TaskId, WorkflowResult};

    fn sample() -> Report {
        Report::new(
            vec![
                (1, WorkflowResult::failed(TaskId::placeholder(), "polling cancelled", Duration::from_millis(1500))),
                (0, WorkflowResult::passed(TaskId::from("t-0"), Duration::from_secs(63))),
            ],
            Duration::from_secs(64),
        )
    }

    #[test]
    fn renders_header_rows_and_summary() {
        let text = render(&sample());

        assert!(text.contains("CONCURRENT RUN RESULTS (2 executions)"));
        assert!(text.contains("Total Duration: 64.00s"));
        assert!(text.contains("Summary: 1/2 executions passed (50.0%)"));

        let exec0 = text.find("exec-0").unwrap();
        let exec1 = text.find("exec-1").unwrap();
        assert!(exec0 < exec1);
        assert!(text.contains("| t-0 "));
        assert!(text.contains("| N/A "));
        assert!(text.contains("polling cancelled"));
    }

    #[test]
    fn grid_lines_have_equal_width() {
        let text = render(&sample());
        let widths: Vec<usize> = text
            .lines()
            .filter(|l| l.starts_with('+') || l.starts_with('|'))
            .map(|l| l.chars().count())
            .collect();
        assert!(!widths.is_empty());
        assert!(widths.iter().all(|w| *w == widths[0]));
    }
}
