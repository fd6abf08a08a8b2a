//! Board projection: the four-column view derived from a flat task list.

use crate::types::{Stage, Task, STAGES};
use serde::Serialize;

/// The kanban board for one project.
///
/// A pure projection of the task list: each column holds the tasks of one
/// stage sorted ascending by `order` (stable for ties). The board carries
/// no state of its own and can be recomputed from the task list at any
/// time, which is how clients reconcile after a failed optimistic update.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    #[serde(rename = "Requested")]
    pub requested: Vec<Task>,
    #[serde(rename = "To do")]
    pub todo: Vec<Task>,
    #[serde(rename = "In Progress")]
    pub in_progress: Vec<Task>,
    #[serde(rename = "Done")]
    pub done: Vec<Task>,
}

impl Board {
    /// Build the board from a project's tasks.
    pub fn project(tasks: &[Task]) -> Self {
        Self {
            requested: column(tasks, Stage::Requested),
            todo: column(tasks, Stage::ToDo),
            in_progress: column(tasks, Stage::InProgress),
            done: column(tasks, Stage::Done),
        }
    }

    /// The column for one stage.
    pub fn column(&self, stage: Stage) -> &[Task] {
        match stage {
            Stage::Requested => &self.requested,
            Stage::ToDo => &self.todo,
            Stage::InProgress => &self.in_progress,
            Stage::Done => &self.done,
        }
    }

    /// Flatten the board back into a single task list, column by column.
    pub fn flatten(&self) -> Vec<Task> {
        STAGES
            .iter()
            .flat_map(|stage| self.column(*stage).iter().cloned())
            .collect()
    }

    /// Total number of tasks on the board.
    pub fn len(&self) -> usize {
        STAGES.iter().map(|stage| self.column(*stage).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn column(tasks: &[Task], stage: Stage) -> Vec<Task> {
    let mut items: Vec<Task> = tasks.iter().filter(|t| t.stage == stage).cloned().collect();
    items.sort_by_key(|t| t.order);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn task(id: &str, stage: Stage, order: i64) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: None,
            stage,
            order,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn columns_sort_ascending_by_order() {
        let tasks = vec![
            task("b", Stage::Requested, 1),
            task("a", Stage::Requested, 0),
            task("c", Stage::Done, 0),
        ];
        let board = Board::project(&tasks);

        let ids: Vec<&str> = board.requested.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(board.done.len(), 1);
        assert!(board.todo.is_empty());
        assert!(board.in_progress.is_empty());
    }

    #[test]
    fn ties_keep_insertion_order() {
        // Orders can collide after direct field writes; the projection must
        // still be deterministic.
        let tasks = vec![
            task("first", Stage::ToDo, 0),
            task("second", Stage::ToDo, 0),
        ];
        let board = Board::project(&tasks);
        let ids: Vec<&str> = board.todo.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn flatten_round_trip_preserves_the_task_set() {
        let tasks = vec![
            task("a", Stage::Requested, 1),
            task("b", Stage::ToDo, 0),
            task("c", Stage::InProgress, 2),
            task("d", Stage::Done, 0),
            task("e", Stage::Requested, 0),
        ];
        let board = Board::project(&tasks);
        let flattened = board.flatten();

        assert_eq!(flattened.len(), tasks.len());
        let before: BTreeSet<String> = tasks.iter().map(|t| t.id.clone()).collect();
        let after: BTreeSet<String> = flattened.iter().map(|t| t.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn empty_task_list_projects_an_empty_board() {
        let board = Board::project(&[]);
        assert!(board.is_empty());
        assert_eq!(board.len(), 0);
    }

    #[test]
    fn serializes_with_column_labels() {
        let board = Board::project(&[task("a", Stage::InProgress, 0)]);
        let json = serde_json::to_value(&board).unwrap();
        assert_eq!(json["In Progress"][0]["id"], "a");
        assert_eq!(json["To do"].as_array().unwrap().len(), 0);
    }
}
