//! Project CRUD operations.
//!
//! Every operation takes the caller's owner id explicitly and scopes its
//! queries to it. A project that exists but belongs to someone else is
//! reported exactly like a project that does not exist.

use super::tasks::load_tasks;
use super::{is_constraint_violation, now_ms, Database};
use crate::error::ApiError;
use crate::types::{Project, ProjectPatch};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

fn parse_project_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        owner_id: row.get("owner_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        tasks: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Load a project with its tasks, scoped to the owner.
pub(crate) fn load_project(
    conn: &Connection,
    owner: &str,
    project_id: &str,
) -> Result<Option<Project>> {
    let mut stmt = conn.prepare("SELECT * FROM projects WHERE id = ?1 AND owner_id = ?2")?;
    let project = stmt
        .query_row(params![project_id, owner], parse_project_row)
        .optional()?;

    match project {
        Some(mut project) => {
            project.tasks = load_tasks(conn, project_id)?;
            Ok(Some(project))
        }
        None => Ok(None),
    }
}

/// Load a project or fail with ProjectNotFound.
pub(crate) fn require_project(
    conn: &Connection,
    owner: &str,
    project_id: &str,
) -> Result<Project> {
    load_project(conn, owner, project_id)?
        .ok_or_else(|| ApiError::project_not_found(project_id).into())
}

impl Database {
    /// Create a project with an empty task list.
    pub fn create_project(
        &self,
        owner: &str,
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

        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO projects (id, owner_id, title, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, owner, title, description, now, now],
            );

            match result {
                Ok(_) => require_project(conn, owner, &id),
                Err(e) if is_constraint_violation(&e) => {
                    Err(ApiError::duplicate_title(title).into())
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// All projects owned by the caller, tasks embedded.
    pub fn get_projects(&self, owner: &str) -> Result<Vec<Project>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM projects WHERE owner_id = ?1 ORDER BY created_at, id")?;
            let mut projects: Vec<Project> = stmt
                .query_map(params![owner], parse_project_row)?
                .collect::<rusqlite::Result<_>>()?;

            for project in &mut projects {
                project.tasks = load_tasks(conn, &project.id)?;
            }
            Ok(projects)
        })
    }

    /// A single project with its tasks.
    pub fn get_project(&self, owner: &str, project_id: &str) -> Result<Project> {
        self.with_conn(|conn| require_project(conn, owner, project_id))
    }

    /// Partial update of title/description.
    ///
    /// Empty strings are ignored rather than applied, so a client sending
    /// an untouched blank field does not wipe the existing value.
    pub fn update_project(
        &self,
        owner: &str,
        project_id: &str,
        patch: &ProjectPatch,
    ) -> Result<Project> {
        let now = now_ms();

        self.with_conn(|conn| {
            // Existence check first so ownership mismatch reads as NotFound
            require_project(conn, owner, project_id)?;

            if let Some(title) = patch.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                let result = conn.execute(
                    "UPDATE projects SET title = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
                    params![title, now, project_id, owner],
                );
                if let Err(e) = result {
                    if is_constraint_violation(&e) {
                        return Err(ApiError::duplicate_title(title).into());
                    }
                    return Err(e.into());
                }
            }

            if let Some(description) =
                patch.description.as_deref().map(str::trim).filter(|d| !d.is_empty())
            {
                conn.execute(
                    "UPDATE projects SET description = ?1, updated_at = ?2
                     WHERE id = ?3 AND owner_id = ?4",
                    params![description, now, project_id, owner],
                )?;
            }

            require_project(conn, owner, project_id)
        })
    }

    /// Delete a project and, via the FK cascade, all of its tasks.
    pub fn delete_project(&self, owner: &str, project_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM projects WHERE id = ?1 AND owner_id = ?2",
                params![project_id, owner],
            )?;
            if deleted == 0 {
                return Err(ApiError::project_not_found(project_id).into());
            }
            Ok(())
        })
    }
}
