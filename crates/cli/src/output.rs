//! Human-readable rendering of processes, records and events.

use cf_core::engine::{BatchReport, RunReport};
use cf_core::manager::ProcessStats;
use cf_protocol::{ExecutionEvent, ExecutionRecord, ExecutionStatus, Process, ProcessStep};
use chrono::{DateTime, Local, Utc};
use colored::Colorize;

const MASK: &str = "••••••";

fn when(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

fn status_label(status: ExecutionStatus) -> colored::ColoredString {
    match status {
        ExecutionStatus::Completed => status.as_str().green(),
        ExecutionStatus::Failed => status.as_str().red(),
        ExecutionStatus::Cancelled => status.as_str().yellow(),
        ExecutionStatus::Running => status.as_str().cyan(),
    }
}

/// One line per process.
pub fn process_line(process: &Process) -> String {
    let id = process
        .id
        .map(|id| format!("{id:>4}"))
        .unwrap_or_else(|| "   -".to_string());
    let pin = if process.is_pinned { "📌" } else { "  " };
    let mut line = format!(
        "{} {} {} {}  {}",
        id.dimmed(),
        pin,
        process.icon,
        process.name.bold(),
        format!(
            "{} steps, used {}x, last {}",
            process.step_count(),
            process.use_count,
            when(process.last_used)
        )
        .dimmed()
    );
    if process.is_archived {
        line.push_str(&format!(" {}", "[archived]".yellow()));
    }
    if !process.is_active {
        line.push_str(&format!(" {}", "[inactive]".yellow()));
    }
    line
}

/// Step content as shown on screen. Sensitive content is masked.
pub fn step_preview(step: &ProcessStep) -> String {
    if step.item_is_sensitive {
        return MASK.to_string();
    }
    let first_line = step.item_content.lines().next().unwrap_or_default();
    let mut preview: String = first_line.chars().take(60).collect();
    if preview.len() < step.item_content.len() {
        preview.push('…');
    }
    preview
}

pub fn process_details(process: &Process) -> String {
    let mut out = process_line(process);
    if let Some(description) = &process.description {
        out.push_str(&format!("\n     {description}"));
    }
    out.push_str(&format!(
        "\n     mode {}, delay {}ms",
        process.execution_mode.as_str(),
        process.delay_between_steps
    ));
    if !process.tags.is_empty() {
        out.push_str(&format!(", tags {}", process.tags.join(", ")));
    }

    for step in &process.steps {
        let mut flags = Vec::new();
        if step.is_optional {
            flags.push("optional");
        }
        if !step.is_enabled {
            flags.push("disabled");
        }
        if step.wait_for_confirmation {
            flags.push("confirm");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        let label = if step.is_enabled {
            step.display_label().normal()
        } else {
            step.display_label().dimmed()
        };
        out.push_str(&format!(
            "\n  {:>2}. {}{}  {}",
            step.step_order,
            label,
            flags.dimmed(),
            step_preview(step).dimmed()
        ));
        if let Some(notes) = &step.notes {
            out.push_str(&format!("\n      {}", notes.italic()));
        }
    }
    out
}

pub fn stats(stats: &ProcessStats) -> String {
    format!(
        "{}\n  steps        {} ({} enabled, {} optional)\n  used         {}x, last {}\n  recent runs  {} ({} ok, {} failed)\n  success      {:.1}%\n  avg duration {:.0}ms",
        stats.name.bold(),
        stats.total_steps,
        stats.enabled_steps,
        stats.optional_steps,
        stats.use_count,
        when(stats.last_used),
        stats.total_executions,
        stats.successful_executions,
        stats.failed_executions,
        stats.success_rate,
        stats.avg_duration_ms
    )
}

pub fn record_line(record: &ExecutionRecord) -> String {
    let duration = record
        .duration_ms
        .map(|ms| format!("{ms}ms"))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "{:>5}  {}  {:<9}  {}/{} steps  {}",
        record.id.to_string().dimmed(),
        when(Some(record.started_at)),
        status_label(record.status),
        record.completed_steps,
        record.total_steps,
        duration
    );
    if let Some(error) = &record.error_message {
        line.push_str(&format!("  {}", error.red()));
    }
    line
}

/// Progress line for a lifecycle event, or `None` for events not shown.
pub fn event_line(event: &ExecutionEvent) -> Option<String> {
    match event {
        ExecutionEvent::ExecutionStarted { name, .. } => {
            Some(format!("{} {}", "▶".cyan(), name.bold()))
        }
        ExecutionEvent::StepStarted {
            step_order, label, ..
        } => Some(format!("  {:>2}. {}", step_order, label)),
        ExecutionEvent::StepCompleted {
            success: false,
            message,
            ..
        } => Some(format!("      {} {}", "✗".red(), message.red())),
        ExecutionEvent::StepCompleted { .. } | ExecutionEvent::ExecutionProgress { .. } => None,
        ExecutionEvent::ExecutionCompleted {
            success, message, ..
        } => Some(if *success {
            format!("{} {}", "✓".green(), message.green())
        } else {
            format!("{} {}", "✗".red(), message.red())
        }),
    }
}

pub fn run_summary(report: &RunReport) -> String {
    format!(
        "{} {}/{} steps in {}ms",
        status_label(report.status),
        report.completed_steps,
        report.total_steps,
        report.duration_ms
    )
}

pub fn batch_summary(report: &BatchReport) -> String {
    let mut line = format!("{}/{} processes succeeded", report.succeeded, report.attempted);
    if !report.failed.is_empty() {
        line.push_str(&format!(", failed: {}", report.failed.join(", ")));
    }
    if report.cancelled {
        line.push_str(" (cancelled)");
    }
    line
}
