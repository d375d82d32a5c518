//! Plain-text rendering for the CLI

use std::fmt::Write;

use chrono::Local;
use portwatch::{MonitorStatus, Resource, SweepReport};

const HEADERS: [&str; 7] = ["#", "STATUS", "URL", "PORT", "TYPE", "LAST CHECKED", "UPTIME"];

fn row(index: usize, resource: &Resource) -> [String; 7] {
    let last_checked = resource
        .last_checked
        .map(|at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());
    let uptime = resource
        .uptime_percentage()
        .map(|pct| format!("{pct:.1}%"))
        .unwrap_or_else(|| "-".to_string());

    [
        index.to_string(),
        MonitorStatus::from(resource.status).to_string(),
        resource.url.clone(),
        resource.port.to_string(),
        resource.kind.clone(),
        last_checked,
        uptime,
    ]
}

/// Resource table with column widths fitted to the content
pub fn resource_table(resources: &[Resource]) -> String {
    if resources.is_empty() {
        return "No resources registered. Add one with `portwatch add <url> --port <port>`.\n"
            .to_string();
    }

    let rows: Vec<_> = resources.iter().enumerate().map(|(i, r)| row(i, r)).collect();
    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, HEADERS, &widths);
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: impl IntoIterator<Item = S>, widths: &[usize]) {
    let line: Vec<_> = cells
        .into_iter()
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref()))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

pub fn sweep_summary(report: &SweepReport) -> String {
    let mut summary = format!(
        "Checked {} resource(s): {} up, {} down",
        report.checked, report.up, report.down
    );
    if report.failed > 0 {
        let _ = write!(summary, ", {} failed", report.failed);
    }
    let _ = write!(summary, " in {}ms", report.duration_ms);
    summary
}
