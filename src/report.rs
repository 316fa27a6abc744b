use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{Category, Status};
use crate::pipeline::TrainingReport;

const BAR_WIDTH: usize = 20;

/// Text bar for a percentage in `[0, 100]`.
pub fn percent_bar(pct: f64) -> String {
    let filled = ((pct.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Text bar for `count` scaled against the largest count in the chart.
pub fn count_bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "#".repeat((count * BAR_WIDTH + max / 2) / max)
}

fn write_chart(output: &mut String, report: &TrainingReport) {
    let max = Category::ALL
        .into_iter()
        .flat_map(|category| {
            [Status::Approved, Status::Failed]
                .map(|status| report.summary.count(category, status))
        })
        .max()
        .unwrap_or(0);

    for category in Category::ALL {
        for status in [Status::Approved, Status::Failed] {
            let count = report.summary.count(category, status);
            let _ = writeln!(
                output,
                "{:<8} {:<8} |{} {}",
                category.label(),
                status.label(),
                count_bar(count, max),
                count
            );
        }
    }
}

fn write_metrics(output: &mut String, report: &TrainingReport) {
    for category in Category::ALL {
        let _ = writeln!(
            output,
            "- {}: Approved {:.2}% / Failed {:.2}% ({} employees)",
            category,
            report.summary.approved_pct(category),
            report.summary.failed_pct(category),
            report
                .summary
                .counts
                .get(&category)
                .map_or(0, |counts| counts.total())
        );
    }
}

pub fn build_report(source: &str, generated_on: NaiveDate, report: &TrainingReport) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Training Compliance Report");
    let _ = writeln!(
        output,
        "Generated {} from {} ({} training records, {} employees)",
        generated_on,
        source,
        report.record_count,
        report.employees.len()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Completion by Category");
    write_metrics(&mut output, report);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Employees by Category");
    let _ = writeln!(output, "| Category | Approved | Failed |");
    let _ = writeln!(output, "|---|---:|---:|");
    for category in Category::ALL {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            category,
            report.summary.count(category, Status::Approved),
            report.summary.count(category, Status::Failed)
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "```text");
    write_chart(&mut output, report);
    let _ = writeln!(output, "```");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Results by Manager");

    if report.managers.is_empty() {
        let _ = writeln!(output, "No managers match the selected categories.");
    } else {
        let _ = writeln!(
            output,
            "| Manager | Approved (Internal) | Failed (Internal) | Approved (External) | Failed (External) | Approved % |"
        );
        let _ = writeln!(output, "|---|---:|---:|---:|---:|---|");
        for row in &report.managers {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | `{}` {:.2}% |",
                row.manager_name,
                row.approved_internal,
                row.failed_internal,
                row.approved_external,
                row.failed_external,
                percent_bar(row.pass_percentage),
                row.pass_percentage
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Employees Below 80%");

    if report.failing.is_empty() {
        let _ = writeln!(output, "No failing employees for the selected filters.");
    } else {
        for employee in &report.failing {
            let _ = writeln!(
                output,
                "- {} ({}, {}, {}) {}: {}/{} trainings, {:.2}%",
                employee.employee_name,
                employee.email,
                employee.manager_name,
                employee.department,
                employee.category,
                employee.completed_count,
                employee.total_trainings,
                employee.pass_rate
            );
        }
    }

    let conflicted: Vec<_> = report
        .employees
        .iter()
        .filter(|employee| !employee.conflicts.is_empty())
        .collect();
    if !conflicted.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Inconsistent Employee Records");
        for employee in conflicted {
            for conflict in &employee.conflicts {
                let _ = writeln!(
                    output,
                    "- {}: {} varies ({})",
                    employee.email,
                    conflict.field,
                    conflict.values.join(", ")
                );
            }
        }
    }

    output
}

/// Compact plain-text summary for the terminal.
pub fn build_summary(report: &TrainingReport, limit: usize) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Completion by category ({} employees):",
        report.summary.total()
    );
    write_metrics(&mut output, report);

    let _ = writeln!(output);
    let _ = writeln!(output, "Employees by category:");
    write_chart(&mut output, report);

    let _ = writeln!(output);
    if report.managers.is_empty() {
        let _ = writeln!(output, "No managers match the selected categories.");
    } else {
        let _ = writeln!(output, "Approval by manager:");
        for row in &report.managers {
            let _ = writeln!(
                output,
                "- {} {} {:.2}% ({} of {} employees approved)",
                row.manager_name,
                percent_bar(row.pass_percentage),
                row.pass_percentage,
                row.approved_internal + row.approved_external,
                row.employee_count()
            );
        }
    }

    let _ = writeln!(output);
    if report.failing.is_empty() {
        let _ = writeln!(output, "No failing employees for the selected filters.");
    } else {
        let _ = writeln!(output, "Lowest completion:");
        for employee in report.failing.iter().take(limit) {
            let _ = writeln!(
                output,
                "- {} ({}, {}) {:.2}% across {} trainings",
                employee.employee_name,
                employee.email,
                employee.manager_name,
                employee.pass_rate,
                employee.total_trainings
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{load_dataset, DEFAULT_DELIMITER};
    use crate::pipeline::{run, Filters};

    const SAMPLE_CSV: &str = "\
email;first_name;last_name;manager_name;department;training_status
ana@corp.com;ana;souza;bob;sales;Completed
ana@corp.com;ana;souza;bob;sales;Not Started
externo.leo@corp.com;leo;reis;carol;it;Completed
";

    fn sample_report() -> TrainingReport {
        let dataset = load_dataset(SAMPLE_CSV.as_bytes(), DEFAULT_DELIMITER).unwrap();
        run(&dataset, &Filters::default())
    }

    #[test]
    fn bars_scale_with_percentage() {
        assert_eq!(percent_bar(0.0), ".".repeat(BAR_WIDTH));
        assert_eq!(percent_bar(100.0), "#".repeat(BAR_WIDTH));
        assert_eq!(percent_bar(50.0).matches('#').count(), BAR_WIDTH / 2);
        assert_eq!(percent_bar(150.0), "#".repeat(BAR_WIDTH));
    }

    #[test]
    fn count_bars_scale_to_the_largest_count() {
        assert_eq!(count_bar(0, 0), "");
        assert_eq!(count_bar(4, 4), "#".repeat(BAR_WIDTH));
        assert_eq!(count_bar(2, 4), "#".repeat(BAR_WIDTH / 2));
        assert_eq!(count_bar(0, 4), "");
    }

    #[test]
    fn chart_lists_every_category_and_status() {
        let summary = build_summary(&sample_report(), 10);
        assert!(summary.contains("Employees by category:"));
        assert!(summary.contains(&format!("Internal Failed   |{} 1", "#".repeat(BAR_WIDTH))));
        assert!(summary.contains(&format!("External Approved |{} 1", "#".repeat(BAR_WIDTH))));
        assert!(summary.contains("Internal Approved | 0"));
        assert!(summary.contains("External Failed   | 0"));

        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report("input/sample.csv", date, &sample_report());
        assert!(report.contains("```text\nInternal Approved | 0\n"));
    }

    #[test]
    fn report_includes_each_section() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report("input/sample.csv", date, &sample_report());

        assert!(report.starts_with("# Training Compliance Report"));
        assert!(report.contains("Generated 2026-02-02 from input/sample.csv (3 training records, 2 employees)"));
        assert!(report.contains("- Internal: Approved 0.00% / Failed 100.00% (1 employees)"));
        assert!(report.contains("| External | 1 | 0 |"));
        assert!(report.contains("| Bob | 0 | 1 | 0 | 0 |"));
        assert!(report.contains("- Ana Souza (ana@corp.com, Bob, Sales) Internal: 1/2 trainings, 50.00%"));
        assert!(!report.contains("Inconsistent Employee Records"));
    }

    #[test]
    fn empty_report_says_so() {
        let dataset = load_dataset("email\n".as_bytes(), DEFAULT_DELIMITER).unwrap();
        let empty = run(&dataset, &Filters::default());
        let date = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();
        let report = build_report("empty.csv", date, &empty);

        assert!(report.contains("No managers match the selected categories."));
        assert!(report.contains("No failing employees for the selected filters."));
        assert!(report.contains("| Internal | 0 | 0 |"));
    }

    #[test]
    fn summary_limits_failing_list() {
        let summary = build_summary(&sample_report(), 0);
        assert!(summary.contains("Approval by manager:"));
        assert!(summary.contains("- Carol"));
        assert!(!summary.contains("ana@corp.com"));
    }
}
