//! Command handlers.

use crate::output;
use cf_core::engine::ProcessExecutor;
use cf_core::init::{generate_clipflow_structure, InitOptions};
use cf_core::runtime::Runtime;
use cf_core::sink::{ContentSink, StdoutSink};
use cf_protocol::{ExecutionEvent, Process, ProcessId};
use color_eyre::eyre::{bail, eyre, Result};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub async fn init(root: &Path, force: bool, minimal: bool) -> Result<()> {
    let written = generate_clipflow_structure(InitOptions {
        target_dir: root.to_path_buf(),
        force,
        minimal,
    })
    .await?;

    println!(
        "{} Initialized {}",
        "✓".green(),
        root.join(cf_core::config::CONFIG_DIR).display()
    );
    for path in written {
        let shown = path.strip_prefix(root).unwrap_or(&path);
        println!("  {}", shown.display());
    }
    println!("Run `clipflow import` to store the sample processes.");
    Ok(())
}

pub async fn import(root: &Path) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    let summary = runtime.import_definitions().await?;

    for (id, name) in &summary.created {
        println!("{} {} (ID: {})", "+".green(), name, id);
    }
    for name in &summary.skipped {
        println!("{} {} (already exists)", "=".dimmed(), name.dimmed());
    }
    println!(
        "Imported {} processes, skipped {}",
        summary.created.len(),
        summary.skipped.len()
    );
    Ok(())
}

pub async fn list(root: &Path, archived: bool, inactive: bool, json: bool) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    let processes = runtime
        .manager()
        .get_all_processes(archived, inactive)
        .await?;
    print_processes(&processes, json)
}

pub async fn search(root: &Path, query: &str) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    let processes = runtime.manager().search_processes(query).await?;
    if processes.is_empty() {
        println!("No processes match '{query}'");
        return Ok(());
    }
    print_processes(&processes, false)
}

fn print_processes(processes: &[Process], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(processes)?);
        return Ok(());
    }
    if processes.is_empty() {
        println!("No processes. Run `clipflow import` to add some.");
    }
    for process in processes {
        println!("{}", output::process_line(process));
    }
    Ok(())
}

async fn require_process(runtime: &Runtime, id: ProcessId) -> Result<Process> {
    runtime
        .manager()
        .get_process(id)
        .await?
        .ok_or_else(|| eyre!("Process {id} not found"))
}

pub async fn show(root: &Path, id: ProcessId, json: bool) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    let process = require_process(&runtime, id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&process.to_json()?)?);
    } else {
        println!("{}", output::process_details(&process));
    }
    Ok(())
}

pub async fn stats(root: &Path, id: ProcessId) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    let stats = runtime
        .manager()
        .get_process_stats(id)
        .await?
        .ok_or_else(|| eyre!("Process {id} not found"))?;
    println!("{}", output::stats(&stats));
    Ok(())
}

pub async fn history(root: &Path, id: ProcessId, limit: usize) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    require_process(&runtime, id).await?;
    let records = runtime.executor(None).get_execution_history(id, limit).await;
    if records.is_empty() {
        println!("Process {id} has not been run yet");
    }
    for record in &records {
        println!("{}", output::record_line(record));
    }
    Ok(())
}

pub async fn delete(root: &Path, id: ProcessId) -> Result<()> {
    let runtime = Runtime::load(root).await?;
    runtime.manager().delete_process(id).await?;
    println!("{} Deleted process {}", "✓".green(), id);
    Ok(())
}

fn content_sink(stdout: bool) -> Result<Arc<dyn ContentSink>> {
    if stdout {
        return Ok(Arc::new(StdoutSink::new()));
    }

    #[cfg(feature = "clipboard")]
    {
        use color_eyre::eyre::WrapErr;
        let sink = cf_core::sink::ClipboardSink::new()
            .wrap_err("Clipboard not available; use --stdout")?;
        Ok(Arc::new(sink))
    }

    #[cfg(not(feature = "clipboard"))]
    {
        warn!("Built without clipboard support; writing content to stdout");
        Ok(Arc::new(StdoutSink::new()))
    }
}

/// Print events to stderr until the channel closes.
async fn print_events(mut events: broadcast::Receiver<ExecutionEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(line) = output::event_line(&event) {
                    eprintln!("{line}");
                }
            }
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!("Progress output skipped {} events", missed);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Cancel the active run on every Ctrl-C.
async fn cancel_on_interrupt(executor: Arc<ProcessExecutor>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if executor.cancel_execution() {
            eprintln!("{}", "Cancelling after the current step...".yellow());
        }
    }
}

pub async fn run(root: &Path, ids: &[ProcessId], stdout: bool) -> Result<()> {
    let runtime = Runtime::load(root).await?;

    let mut processes = Vec::with_capacity(ids.len());
    for id in ids {
        processes.push(require_process(&runtime, *id).await?);
    }

    let executor = Arc::new(runtime.executor(Some(content_sink(stdout)?)));
    let printer = tokio::spawn(print_events(executor.subscribe()));
    let interrupt = tokio::spawn(cancel_on_interrupt(executor.clone()));

    let (success, summary) = if let [process] = processes.as_slice() {
        match executor.execute_process(process).await {
            Ok(report) => (report.success(), output::run_summary(&report)),
            Err(e) => (false, format!("{} {}", "✗".red(), e)),
        }
    } else {
        let report = executor
            .execute_multiple_processes(&processes, |process, success, index, total| {
                debug!("[{}/{}] {} success={}", index, total, process.name, success);
            })
            .await;
        (report.success(), output::batch_summary(&report))
    };

    // Dropping the last executor handle closes the event channel, which lets
    // the printer drain and exit.
    interrupt.abort();
    let _ = interrupt.await;
    drop(executor);
    let _ = printer.await;
    eprintln!("{summary}");

    if !success {
        bail!("Run did not complete successfully");
    }
    Ok(())
}
