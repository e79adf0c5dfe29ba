//! SQLite-backed [`ProcessStore`].
//!
//! Schema:
//! - `processes`: one row per process
//! - `process_items`: steps, with the item snapshot denormalized into each row
//! - `process_execution_history`: one row per run
//!
//! Steps and history cascade on process deletion. Queries run on tokio's
//! blocking pool.

use super::{is_permutation, listing_order, matches_query, ProcessStore, StoreError, StoreResult};
use async_trait::async_trait;
use cf_protocol::{
    ExecutionId, ExecutionRecord, ExecutionStatus, ExecutionUpdate, Process, ProcessId,
    ProcessStep, ProcessUpdate, StepCondition, StepId, StepUpdate,
};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS processes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        icon TEXT NOT NULL DEFAULT '⚙️',
        color TEXT,
        execution_mode TEXT NOT NULL DEFAULT 'sequential',
        delay_between_steps INTEGER NOT NULL DEFAULT 500,
        auto_copy_results INTEGER NOT NULL DEFAULT 0,
        is_pinned INTEGER NOT NULL DEFAULT 0,
        pinned_order INTEGER NOT NULL DEFAULT 0,
        order_index INTEGER NOT NULL DEFAULT 0,
        use_count INTEGER NOT NULL DEFAULT 0,
        last_used TEXT,
        access_count INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        is_archived INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        tags TEXT,
        category TEXT
    );

    CREATE TABLE IF NOT EXISTS process_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        process_id INTEGER NOT NULL REFERENCES processes(id) ON DELETE CASCADE,
        item_id INTEGER NOT NULL,
        step_order INTEGER NOT NULL,
        item_label TEXT NOT NULL DEFAULT '',
        item_content TEXT NOT NULL DEFAULT '',
        item_type TEXT NOT NULL DEFAULT 'TEXT',
        item_icon TEXT,
        item_is_sensitive INTEGER NOT NULL DEFAULT 0,
        custom_label TEXT,
        notes TEXT,
        is_optional INTEGER NOT NULL DEFAULT 0,
        is_enabled INTEGER NOT NULL DEFAULT 1,
        wait_for_confirmation INTEGER NOT NULL DEFAULT 0,
        group_name TEXT,
        group_order INTEGER NOT NULL DEFAULT 0,
        condition_type TEXT NOT NULL DEFAULT 'always',
        added_at TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_process_items_order
        ON process_items(process_id, step_order);

    CREATE TABLE IF NOT EXISTS process_execution_history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        process_id INTEGER NOT NULL REFERENCES processes(id) ON DELETE CASCADE,
        status TEXT NOT NULL DEFAULT 'running',
        total_steps INTEGER NOT NULL,
        completed_steps INTEGER NOT NULL DEFAULT 0,
        failed_steps INTEGER NOT NULL DEFAULT 0,
        started_at TEXT NOT NULL,
        completed_at TEXT,
        duration_ms INTEGER,
        error_message TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_execution_history_process
        ON process_execution_history(process_id, started_at);
";

/// A [`ProcessStore`] persisted in a SQLite database.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    /// A private in-memory database, mostly useful for tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            f(&mut conn)
        })
        .await?
    }
}

fn join_tags(tags: &[String]) -> Option<String> {
    if tags.is_empty() {
        None
    } else {
        Some(tags.join(","))
    }
}

fn split_tags(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn process_from_row(row: &Row<'_>) -> rusqlite::Result<Process> {
    Ok(Process {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        description: row.get("description")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        steps: Vec::new(),
        execution_mode: row.get::<_, String>("execution_mode")?.into(),
        delay_between_steps: row.get("delay_between_steps")?,
        auto_copy_results: row.get("auto_copy_results")?,
        is_pinned: row.get("is_pinned")?,
        pinned_order: row.get("pinned_order")?,
        order_index: row.get("order_index")?,
        use_count: row.get("use_count")?,
        last_used: row.get("last_used")?,
        access_count: row.get("access_count")?,
        is_active: row.get("is_active")?,
        is_archived: row.get("is_archived")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        tags: split_tags(row.get("tags")?),
        category: row.get("category")?,
    })
}

fn step_from_row(row: &Row<'_>) -> rusqlite::Result<ProcessStep> {
    Ok(ProcessStep {
        id: Some(row.get("id")?),
        process_id: Some(row.get("process_id")?),
        item_id: row.get("item_id")?,
        step_order: row.get("step_order")?,
        item_label: row.get("item_label")?,
        item_content: row.get("item_content")?,
        item_type: row.get("item_type")?,
        item_icon: row.get("item_icon")?,
        item_is_sensitive: row.get("item_is_sensitive")?,
        custom_label: row.get("custom_label")?,
        notes: row.get("notes")?,
        is_optional: row.get("is_optional")?,
        is_enabled: row.get("is_enabled")?,
        wait_for_confirmation: row.get("wait_for_confirmation")?,
        group_name: row.get("group_name")?,
        group_order: row.get("group_order")?,
        condition_type: StepCondition::Always,
        added_at: row.get("added_at")?,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<(ExecutionRecord, String)> {
    // Status is parsed by the caller so a bad value surfaces as StoreError::Corrupt.
    let status: String = row.get("status")?;
    Ok((
        ExecutionRecord {
            id: row.get("id")?,
            process_id: row.get("process_id")?,
            status: ExecutionStatus::Running,
            total_steps: row.get("total_steps")?,
            completed_steps: row.get("completed_steps")?,
            failed_steps: row.get("failed_steps")?,
            started_at: row.get("started_at")?,
            completed_at: row.get("completed_at")?,
            duration_ms: row.get("duration_ms")?,
            error_message: row.get("error_message")?,
        },
        status,
    ))
}

fn insert_step(
    conn: &Connection,
    process_id: ProcessId,
    step: &ProcessStep,
    now: DateTime<Utc>,
) -> rusqlite::Result<StepId> {
    conn.execute(
        "INSERT INTO process_items (
            process_id, item_id, step_order, item_label, item_content, item_type,
            item_icon, item_is_sensitive, custom_label, notes, is_optional, is_enabled,
            wait_for_confirmation, group_name, group_order, condition_type, added_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
        params![
            process_id,
            step.item_id,
            step.step_order,
            step.item_label,
            step.item_content,
            step.item_type,
            step.item_icon,
            step.item_is_sensitive,
            step.custom_label,
            step.notes,
            step.is_optional,
            step.is_enabled,
            step.wait_for_confirmation,
            step.group_name,
            step.group_order,
            step.condition_type.as_str(),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn load_steps(conn: &Connection, process_id: ProcessId) -> rusqlite::Result<Vec<ProcessStep>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM process_items WHERE process_id = ?1 ORDER BY step_order ASC, id ASC",
    )?;
    let steps = stmt
        .query_map(params![process_id], step_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(steps)
}

/// Run a `SELECT * FROM processes ...` query and attach each process's steps.
fn load_processes(
    conn: &Connection,
    sql: &str,
    args: &[Value],
) -> rusqlite::Result<Vec<Process>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(args.iter()), process_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    rows.into_iter()
        .map(|mut process| {
            if let Some(id) = process.id {
                process.steps = load_steps(conn, id)?;
            }
            Ok(process)
        })
        .collect()
}

fn opt_text(value: &Option<String>) -> Value {
    value.clone().map(Value::Text).unwrap_or(Value::Null)
}

fn process_assignments(update: &ProcessUpdate) -> Vec<(&'static str, Value)> {
    let mut sets: Vec<(&'static str, Value)> = Vec::new();
    if let Some(name) = &update.name {
        sets.push(("name", Value::Text(name.clone())));
    }
    if let Some(description) = &update.description {
        sets.push(("description", opt_text(description)));
    }
    if let Some(icon) = &update.icon {
        sets.push(("icon", Value::Text(icon.clone())));
    }
    if let Some(color) = &update.color {
        sets.push(("color", opt_text(color)));
    }
    if let Some(mode) = &update.execution_mode {
        sets.push(("execution_mode", Value::Text(mode.as_str().to_string())));
    }
    if let Some(delay) = update.delay_between_steps {
        sets.push(("delay_between_steps", Value::Integer(delay)));
    }
    if let Some(auto_copy) = update.auto_copy_results {
        sets.push(("auto_copy_results", Value::Integer(i64::from(auto_copy))));
    }
    if let Some(pinned) = update.is_pinned {
        sets.push(("is_pinned", Value::Integer(i64::from(pinned))));
    }
    if let Some(order) = update.pinned_order {
        sets.push(("pinned_order", Value::Integer(order)));
    }
    if let Some(active) = update.is_active {
        sets.push(("is_active", Value::Integer(i64::from(active))));
    }
    if let Some(archived) = update.is_archived {
        sets.push(("is_archived", Value::Integer(i64::from(archived))));
    }
    if let Some(tags) = &update.tags {
        sets.push(("tags", opt_text(&join_tags(tags))));
    }
    if let Some(category) = &update.category {
        sets.push(("category", opt_text(category)));
    }
    if let Some(count) = update.use_count {
        sets.push(("use_count", Value::Integer(i64::from(count))));
    }
    if let Some(at) = update.last_used {
        sets.push(("last_used", Value::Text(at.to_rfc3339())));
    }
    sets
}

fn step_assignments(update: &StepUpdate) -> Vec<(&'static str, Value)> {
    let mut sets: Vec<(&'static str, Value)> = Vec::new();
    if let Some(order) = update.step_order {
        sets.push(("step_order", Value::Integer(i64::from(order))));
    }
    if let Some(label) = &update.custom_label {
        sets.push(("custom_label", opt_text(label)));
    }
    if let Some(notes) = &update.notes {
        sets.push(("notes", opt_text(notes)));
    }
    if let Some(optional) = update.is_optional {
        sets.push(("is_optional", Value::Integer(i64::from(optional))));
    }
    if let Some(enabled) = update.is_enabled {
        sets.push(("is_enabled", Value::Integer(i64::from(enabled))));
    }
    if let Some(confirm) = update.wait_for_confirmation {
        sets.push(("wait_for_confirmation", Value::Integer(i64::from(confirm))));
    }
    if let Some(group) = &update.group_name {
        sets.push(("group_name", opt_text(group)));
    }
    if let Some(order) = update.group_order {
        sets.push(("group_order", Value::Integer(order)));
    }
    sets
}

/// `UPDATE {table} SET a = ?1, b = ?2 WHERE id = ?3`; returns the number of rows touched.
fn update_by_id(
    conn: &Connection,
    table: &str,
    id: i64,
    sets: Vec<(&'static str, Value)>,
) -> rusqlite::Result<usize> {
    let clause = sets
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {table} SET {clause} WHERE id = ?{}", sets.len() + 1);

    let mut args: Vec<Value> = sets.into_iter().map(|(_, value)| value).collect();
    args.push(Value::Integer(id));
    conn.execute(&sql, params_from_iter(args.iter()))
}

#[async_trait]
impl ProcessStore for SqliteStore {
    async fn add_process(&self, process: &Process) -> StoreResult<ProcessId> {
        let process = process.clone();
        self.with_conn(move |conn| {
            let now = Utc::now();
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO processes (
                    name, description, icon, color, execution_mode, delay_between_steps,
                    auto_copy_results, is_pinned, pinned_order, order_index, use_count,
                    last_used, access_count, is_active, is_archived, created_at, updated_at,
                    tags, category
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?16, ?17, ?18)",
                params![
                    process.name,
                    process.description,
                    process.icon,
                    process.color,
                    process.execution_mode.as_str(),
                    process.delay_between_steps,
                    process.auto_copy_results,
                    process.is_pinned,
                    process.pinned_order,
                    process.order_index,
                    process.use_count,
                    process.last_used,
                    process.access_count,
                    process.is_active,
                    process.is_archived,
                    now,
                    join_tags(&process.tags),
                    process.category,
                ],
            )?;
            let id = tx.last_insert_rowid();

            for step in &process.steps {
                insert_step(&tx, id, step, now)?;
            }
            tx.commit()?;
            Ok(id)
        })
        .await
    }

    async fn get_process(&self, id: ProcessId) -> StoreResult<Option<Process>> {
        self.with_conn(move |conn| {
            let process = conn
                .query_row(
                    "SELECT * FROM processes WHERE id = ?1",
                    params![id],
                    process_from_row,
                )
                .optional()?;
            match process {
                Some(mut process) => {
                    process.steps = load_steps(conn, id)?;
                    Ok(Some(process))
                }
                None => Ok(None),
            }
        })
        .await
    }

    async fn get_all_processes(
        &self,
        include_archived: bool,
        include_inactive: bool,
    ) -> StoreResult<Vec<Process>> {
        self.with_conn(move |conn| {
            let mut sql = String::from("SELECT * FROM processes WHERE 1=1");
            if !include_archived {
                sql.push_str(" AND is_archived = 0");
            }
            if !include_inactive {
                sql.push_str(" AND is_active = 1");
            }
            let mut processes = load_processes(conn, &sql, &[])?;
            // SQLite's default collation sorts names by bytes, like `str::cmp`.
            processes.sort_by(listing_order);
            Ok(processes)
        })
        .await
    }

    async fn update_process(&self, id: ProcessId, update: &ProcessUpdate) -> StoreResult<()> {
        let mut sets = process_assignments(update);
        sets.push(("updated_at", Value::Text(Utc::now().to_rfc3339())));
        self.with_conn(move |conn| match update_by_id(conn, "processes", id, sets)? {
            0 => Err(StoreError::ProcessNotFound(id)),
            _ => Ok(()),
        })
        .await
    }

    async fn delete_process(&self, id: ProcessId) -> StoreResult<()> {
        self.with_conn(move |conn| {
            match conn.execute("DELETE FROM processes WHERE id = ?1", params![id])? {
                0 => Err(StoreError::ProcessNotFound(id)),
                _ => Ok(()),
            }
        })
        .await
    }

    async fn search_processes(&self, query: &str) -> StoreResult<Vec<Process>> {
        let query = query.to_string();
        self.with_conn(move |conn| {
            let candidates = load_processes(
                conn,
                "SELECT * FROM processes WHERE is_active = 1 AND is_archived = 0
                 ORDER BY use_count DESC, name ASC",
                &[],
            )?;
            Ok(candidates
                .into_iter()
                .filter(|p| matches_query(p, &query))
                .collect())
        })
        .await
    }

    async fn get_pinned_processes(&self) -> StoreResult<Vec<Process>> {
        self.with_conn(|conn| {
            Ok(load_processes(
                conn,
                "SELECT * FROM processes
                 WHERE is_pinned = 1 AND is_active = 1 AND is_archived = 0
                 ORDER BY pinned_order ASC",
                &[],
            )?)
        })
        .await
    }

    async fn add_step(&self, process_id: ProcessId, step: &ProcessStep) -> StoreResult<StepId> {
        let step = step.clone();
        self.with_conn(move |conn| {
            let exists = conn
                .query_row(
                    "SELECT 1 FROM processes WHERE id = ?1",
                    params![process_id],
                    |_| Ok(()),
                )
                .optional()?;
            if exists.is_none() {
                return Err(StoreError::ProcessNotFound(process_id));
            }
            Ok(insert_step(conn, process_id, &step, Utc::now())?)
        })
        .await
    }

    async fn get_steps(&self, process_id: ProcessId) -> StoreResult<Vec<ProcessStep>> {
        self.with_conn(move |conn| Ok(load_steps(conn, process_id)?))
            .await
    }

    async fn update_step(&self, step_id: StepId, update: &StepUpdate) -> StoreResult<()> {
        let sets = step_assignments(update);
        if sets.is_empty() {
            return Ok(());
        }
        self.with_conn(move |conn| match update_by_id(conn, "process_items", step_id, sets)? {
            0 => Err(StoreError::StepNotFound(step_id)),
            _ => Ok(()),
        })
        .await
    }

    async fn delete_step(&self, step_id: StepId) -> StoreResult<()> {
        self.with_conn(move |conn| {
            match conn.execute("DELETE FROM process_items WHERE id = ?1", params![step_id])? {
                0 => Err(StoreError::StepNotFound(step_id)),
                _ => Ok(()),
            }
        })
        .await
    }

    async fn reorder_steps(&self, process_id: ProcessId, step_ids: &[StepId]) -> StoreResult<()> {
        let step_ids = step_ids.to_vec();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let current = tx
                .prepare("SELECT id FROM process_items WHERE process_id = ?1")?
                .query_map(params![process_id], |row| row.get::<_, StepId>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            if !is_permutation(&current, &step_ids) {
                return Err(StoreError::InvalidStepOrder(process_id));
            }
            for (position, step_id) in step_ids.iter().enumerate() {
                tx.execute(
                    "UPDATE process_items SET step_order = ?1 WHERE id = ?2",
                    params![position as i64 + 1, step_id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn add_execution_history(
        &self,
        process_id: ProcessId,
        total_steps: u32,
    ) -> StoreResult<ExecutionId> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO process_execution_history (process_id, total_steps, status, started_at)
                 VALUES (?1, ?2, 'running', ?3)",
                params![process_id, total_steps, Utc::now()],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    StoreError::ProcessNotFound(process_id)
                }
                other => StoreError::Database(other),
            })?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn update_execution_history(
        &self,
        id: ExecutionId,
        update: &ExecutionUpdate,
    ) -> StoreResult<()> {
        let update = update.clone();
        self.with_conn(move |conn| {
            let completed_at = update.status.is_terminal().then(Utc::now);
            let touched = conn.execute(
                "UPDATE process_execution_history
                 SET status = ?1, completed_steps = ?2, failed_steps = ?3,
                     duration_ms = ?4, error_message = ?5, completed_at = ?6
                 WHERE id = ?7 AND status = 'running'",
                params![
                    update.status.as_str(),
                    update.completed_steps,
                    update.failed_steps,
                    update.duration_ms,
                    update.error_message,
                    completed_at,
                    id,
                ],
            )?;
            if touched > 0 {
                return Ok(());
            }
            let exists = conn
                .query_row(
                    "SELECT 1 FROM process_execution_history WHERE id = ?1",
                    params![id],
                    |_| Ok(()),
                )
                .optional()?;
            match exists {
                Some(()) => Err(StoreError::ExecutionFinalized(id)),
                None => Err(StoreError::ExecutionNotFound(id)),
            }
        })
        .await
    }

    async fn get_process_execution_history(
        &self,
        process_id: ProcessId,
        limit: usize,
    ) -> StoreResult<Vec<ExecutionRecord>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM process_execution_history
                 WHERE process_id = ?1
                 ORDER BY started_at DESC, id DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(params![process_id, limit as i64], record_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(mut record, status)| {
                    record.status = status.parse().map_err(|reason| StoreError::Corrupt {
                        table: "process_execution_history",
                        reason,
                    })?;
                    Ok(record)
                })
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_protocol::ExecutionMode;

    fn sample_process(name: &str) -> Process {
        let mut process = Process::new(name);
        process.description = Some("sample".to_string());
        process.tags = vec!["alpha".to_string(), "beta".to_string()];
        process.execution_mode = ExecutionMode::Manual;
        for i in 1..=3 {
            process.add_step(ProcessStep {
                item_label: format!("item {i}"),
                item_content: format!("content {i}"),
                is_optional: i == 2,
                ..ProcessStep::new(i64::from(i) * 10)
            });
        }
        process
    }

    #[tokio::test]
    async fn test_round_trip_process_and_steps() {
        let store = SqliteStore::open_in_memory().unwrap();
        let original = sample_process("Round trip");
        let id = store.add_process(&original).await.unwrap();

        let loaded = store.get_process(id).await.unwrap().unwrap();
        assert_eq!(loaded.name, original.name);
        assert_eq!(loaded.tags, original.tags);
        assert_eq!(loaded.execution_mode, ExecutionMode::Manual);
        assert_eq!(loaded.steps.len(), 3);
        assert_eq!(loaded.steps[1].item_content, "content 2");
        assert!(loaded.steps[1].is_optional);
        assert!(loaded.steps.iter().all(|s| s.added_at.is_some()));
    }

    #[tokio::test]
    async fn test_update_process_partial() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.add_process(&sample_process("Before")).await.unwrap();

        let update = ProcessUpdate {
            name: Some("After".to_string()),
            description: Some(None),
            tags: Some(Vec::new()),
            ..ProcessUpdate::default()
        };
        store.update_process(id, &update).await.unwrap();

        let loaded = store.get_process(id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "After");
        assert_eq!(loaded.description, None);
        assert!(loaded.tags.is_empty());
        assert_eq!(loaded.delay_between_steps, 500);

        assert!(matches!(
            store.update_process(404, &update).await,
            Err(StoreError::ProcessNotFound(404))
        ));
    }

    #[tokio::test]
    async fn test_delete_cascades_steps_and_history() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.add_process(&sample_process("Doomed")).await.unwrap();
        store.add_execution_history(id, 3).await.unwrap();

        store.delete_process(id).await.unwrap();
        assert!(store.get_process(id).await.unwrap().is_none());
        assert!(store.get_steps(id).await.unwrap().is_empty());
        assert!(store
            .get_process_execution_history(id, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_step_update_and_reorder() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.add_process(&sample_process("Steps")).await.unwrap();
        let steps = store.get_steps(id).await.unwrap();

        let update = StepUpdate {
            custom_label: Some(Some("renamed".to_string())),
            is_enabled: Some(false),
            ..StepUpdate::default()
        };
        store.update_step(steps[0].id.unwrap(), &update).await.unwrap();

        let reversed: Vec<StepId> = steps.iter().rev().filter_map(|s| s.id).collect();
        store.reorder_steps(id, &reversed).await.unwrap();

        let after = store.get_steps(id).await.unwrap();
        assert_eq!(after[0].id, steps[2].id);
        assert_eq!(after[2].custom_label.as_deref(), Some("renamed"));
        assert!(!after[2].is_enabled);
        let orders: Vec<u32> = after.iter().map(|s| s.step_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_reorder_must_name_every_step_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.add_process(&sample_process("Strict")).await.unwrap();
        let other = store.add_process(&sample_process("Other")).await.unwrap();
        let ids: Vec<StepId> = store
            .get_steps(id)
            .await
            .unwrap()
            .iter()
            .filter_map(|s| s.id)
            .collect();
        let foreign = store.get_steps(other).await.unwrap()[0].id.unwrap();

        for bad in [
            vec![ids[2], ids[2], ids[0]],
            vec![ids[1], ids[0]],
            vec![ids[0], ids[1], foreign],
        ] {
            assert!(matches!(
                store.reorder_steps(id, &bad).await,
                Err(StoreError::InvalidStepOrder(p)) if p == id
            ));
        }

        let orders: Vec<u32> = store
            .get_steps(id)
            .await
            .unwrap()
            .iter()
            .map(|s| s.step_order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_execution_history_lifecycle() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.add_process(&sample_process("History")).await.unwrap();
        let exec = store.add_execution_history(id, 3).await.unwrap();

        let running = store.get_process_execution_history(id, 10).await.unwrap();
        assert_eq!(running[0].status, ExecutionStatus::Running);
        assert!(running[0].completed_at.is_none());

        let update = ExecutionUpdate {
            status: ExecutionStatus::Failed,
            completed_steps: 1,
            failed_steps: 1,
            duration_ms: 40,
            error_message: Some("Failed at step 2: nope".to_string()),
        };
        store.update_execution_history(exec, &update).await.unwrap();
        assert!(matches!(
            store.update_execution_history(exec, &update).await,
            Err(StoreError::ExecutionFinalized(_))
        ));
        assert!(matches!(
            store.update_execution_history(exec + 100, &update).await,
            Err(StoreError::ExecutionNotFound(_))
        ));

        let finished = store.get_process_execution_history(id, 10).await.unwrap();
        assert_eq!(finished[0].status, ExecutionStatus::Failed);
        assert_eq!(finished[0].duration_ms, Some(40));
        assert!(finished[0].completed_at.is_some());
    }

    #[tokio::test]
    async fn test_history_for_missing_process_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.add_execution_history(77, 1).await,
            Err(StoreError::ProcessNotFound(77))
        ));
    }

    #[tokio::test]
    async fn test_search_matches_memory_semantics() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.add_process(&sample_process("Deploy")).await.unwrap();
        let mut archived = sample_process("Deploy archived");
        archived.is_archived = true;
        store.add_process(&archived).await.unwrap();

        let found = store.search_processes("BETA").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Deploy");
        assert_eq!(found[0].steps.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_writers_share_one_connection() {
        let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());
        let writers: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    let id = store.add_process(&sample_process(&format!("p{i}"))).await?;
                    store.add_execution_history(id, 3).await?;
                    Ok::<_, StoreError>(id)
                })
            })
            .collect();

        let mut ids = Vec::new();
        for writer in writers {
            ids.push(writer.await.unwrap().unwrap());
        }
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert_eq!(store.get_all_processes(true, true).await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clipflow.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store.add_process(&sample_process("Durable")).await.unwrap();
        }
        let reopened = SqliteStore::open(&path).unwrap();
        let all = reopened.get_all_processes(false, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Durable");
    }
}
