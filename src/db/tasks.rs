//! Task operations: append, direct edits, moves, and removal.

use super::projects::require_project;
use super::{now_ms, Database};
use crate::error::ApiError;
use crate::ordering;
use crate::types::{Project, Stage, Task, TaskPatch};
use anyhow::Result;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

pub(crate) fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let stage: String = row.get("stage")?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        stage: Stage::from_str(&stage).unwrap_or_default(),
        order: row.get("order_index")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// All tasks of a project in insertion order. The board sequence comes from
/// each task's `order` field, not from this ordering.
pub(crate) fn load_tasks(conn: &Connection, project_id: &str) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE project_id = ?1 ORDER BY rowid")?;
    let tasks = stmt
        .query_map(params![project_id], parse_task_row)?
        .collect::<rusqlite::Result<_>>()?;
    Ok(tasks)
}

fn touch_project(conn: &Connection, project_id: &str, now: i64) -> Result<()> {
    conn.execute(
        "UPDATE projects SET updated_at = ?1 WHERE id = ?2",
        params![now, project_id],
    )?;
    Ok(())
}

impl Database {
    /// Append a task to a project.
    ///
    /// New tasks start in Requested with `order` equal to the project's
    /// current task count, which places them at the end of the column.
    pub fn add_task(
        &self,
        owner: &str,
        project_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::missing_field("title").into());
        }
        let description = description.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

        let id = Uuid::new_v4().to_string();
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            require_project(&tx, owner, project_id)?;

            let count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM tasks WHERE project_id = ?1",
                params![project_id],
                |row| row.get(0),
            )?;

            tx.execute(
                "INSERT INTO tasks (id, project_id, title, description, stage, order_index, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    id,
                    project_id,
                    title,
                    description,
                    Stage::Requested.as_str(),
                    count,
                    now,
                    now,
                ],
            )?;
            touch_project(&tx, project_id, now)?;

            let project = require_project(&tx, owner, project_id)?;
            tx.commit()?;
            Ok(project)
        })
    }

    /// Move a task to `stage` at `index` within that column.
    ///
    /// Runs the ordering engine over the project's task list and persists
    /// the resulting placements in one transaction, so both affected
    /// partitions come out contiguously numbered or nothing changes at all.
    pub fn move_task(
        &self,
        owner: &str,
        project_id: &str,
        task_id: &str,
        stage: Stage,
        index: usize,
    ) -> Result<Project> {
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let project = require_project(&tx, owner, project_id)?;

            let plan = ordering::plan_move(&project.tasks, task_id, stage, index)
                .ok_or_else(|| ApiError::task_not_found(task_id))?;

            for placement in &plan {
                tx.execute(
                    "UPDATE tasks SET stage = ?1, order_index = ?2, updated_at = ?3
                     WHERE id = ?4 AND project_id = ?5",
                    params![
                        placement.stage.as_str(),
                        placement.order,
                        now,
                        placement.task_id,
                        project_id,
                    ],
                )?;
            }
            if !plan.is_empty() {
                touch_project(&tx, project_id, now)?;
            }

            let project = require_project(&tx, owner, project_id)?;
            tx.commit()?;
            Ok(project)
        })
    }

    /// Direct partial update of a task's fields.
    ///
    /// Stage and order writes land as-is without renumbering siblings; the
    /// ordering engine only runs for move operations. Columns touched this
    /// way may end up with gaps or ties until the next move through them.
    pub fn update_task(
        &self,
        owner: &str,
        project_id: &str,
        task_id: &str,
        patch: &TaskPatch,
    ) -> Result<Project> {
        // Reject a bad stage string before touching the store
        let stage = match patch.stage.as_deref() {
            Some(value) => {
                Some(Stage::from_str(value).ok_or_else(|| ApiError::invalid_stage(value))?)
            }
            None => None,
        };
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            require_project(&tx, owner, project_id)?;

            let exists: bool = tx
                .query_row(
                    "SELECT 1 FROM tasks WHERE id = ?1 AND project_id = ?2",
                    params![task_id, project_id],
                    |_| Ok(true),
                )
                .unwrap_or(false);
            if !exists {
                return Err(ApiError::task_not_found(task_id).into());
            }

            if let Some(title) = patch.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                tx.execute(
                    "UPDATE tasks SET title = ?1, updated_at = ?2 WHERE id = ?3",
                    params![title, now, task_id],
                )?;
            }
            if let Some(description) =
                patch.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
            {
                tx.execute(
                    "UPDATE tasks SET description = ?1, updated_at = ?2 WHERE id = ?3",
                    params![description, now, task_id],
                )?;
            }
            if let Some(stage) = stage {
                tx.execute(
                    "UPDATE tasks SET stage = ?1, updated_at = ?2 WHERE id = ?3",
                    params![stage.as_str(), now, task_id],
                )?;
            }
            if let Some(order) = patch.order {
                tx.execute(
                    "UPDATE tasks SET order_index = ?1, updated_at = ?2 WHERE id = ?3",
                    params![order, now, task_id],
                )?;
            }
            touch_project(&tx, project_id, now)?;

            let project = require_project(&tx, owner, project_id)?;
            tx.commit()?;
            Ok(project)
        })
    }

    /// Remove a task. Former siblings keep their `order` values; the gap
    /// persists until a move renumbers the column.
    pub fn delete_task(&self, owner: &str, project_id: &str, task_id: &str) -> Result<Project> {
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            require_project(&tx, owner, project_id)?;

            let deleted = tx.execute(
                "DELETE FROM tasks WHERE id = ?1 AND project_id = ?2",
                params![task_id, project_id],
            )?;
            if deleted == 0 {
                return Err(ApiError::task_not_found(task_id).into());
            }
            touch_project(&tx, project_id, now)?;

            let project = require_project(&tx, owner, project_id)?;
            tx.commit()?;
            Ok(project)
        })
    }
}
