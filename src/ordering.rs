//! Ordering engine for board moves.
//!
//! Pure logic: given a project's task list and a move request (task id,
//! destination stage, destination index), compute the minimal set of
//! `(stage, order)` placements that realize the move. Persistence is the
//! caller's responsibility.

use crate::types::{Stage, Task};

/// New `(stage, order)` values for one task affected by a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub task_id: String,
    pub stage: Stage,
    pub order: i64,
}

/// Plan a move of `task_id` to `dest_stage` at `dest_index`.
///
/// Returns `None` when the task id is not in the list. Otherwise returns
/// only the placements whose stage or order differs from the current task
/// fields, so re-applying an already-applied move yields an empty plan.
///
/// A destination index beyond the column length clamps to append-at-end.
/// Both the source and destination partitions come out contiguously
/// numbered `0..n`; the relative order of unmoved tasks is preserved
/// (ties on `order` keep insertion order, the sort is stable).
pub fn plan_move(
    tasks: &[Task],
    task_id: &str,
    dest_stage: Stage,
    dest_index: usize,
) -> Option<Vec<Placement>> {
    let moved = tasks.iter().find(|t| t.id == task_id)?;
    let source_stage = moved.stage;

    if source_stage == dest_stage {
        let mut column = stage_sequence(tasks, dest_stage);
        column.retain(|t| t.id != task_id);
        let index = dest_index.min(column.len());
        column.insert(index, moved);
        Some(renumber(&column, dest_stage))
    } else {
        let mut source = stage_sequence(tasks, source_stage);
        source.retain(|t| t.id != task_id);

        let mut dest = stage_sequence(tasks, dest_stage);
        let index = dest_index.min(dest.len());
        dest.insert(index, moved);

        let mut placements = renumber(&source, source_stage);
        placements.extend(renumber(&dest, dest_stage));
        Some(placements)
    }
}

/// Tasks of one stage in canonical column order.
fn stage_sequence(tasks: &[Task], stage: Stage) -> Vec<&Task> {
    let mut column: Vec<&Task> = tasks.iter().filter(|t| t.stage == stage).collect();
    column.sort_by_key(|t| t.order);
    column
}

/// Assign positional `order` values to a column sequence, keeping only the
/// tasks whose stored `(stage, order)` differs.
fn renumber(column: &[&Task], stage: Stage) -> Vec<Placement> {
    column
        .iter()
        .enumerate()
        .filter(|(index, task)| task.stage != stage || task.order != *index as i64)
        .map(|(index, task)| Placement {
            task_id: task.id.clone(),
            stage,
            order: index as i64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

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

    /// Apply a plan to a task list, mirroring what the service persists.
    fn apply(tasks: &mut [Task], plan: &[Placement]) {
        for p in plan {
            let t = tasks.iter_mut().find(|t| t.id == p.task_id).unwrap();
            t.stage = p.stage;
            t.order = p.order;
        }
    }

    fn column_ids(tasks: &[Task], stage: Stage) -> Vec<String> {
        let mut column: Vec<&Task> = tasks.iter().filter(|t| t.stage == stage).collect();
        column.sort_by_key(|t| t.order);
        column.iter().map(|t| t.id.clone()).collect()
    }

    fn assert_contiguous(tasks: &[Task], stage: Stage) {
        let mut orders: Vec<i64> = tasks
            .iter()
            .filter(|t| t.stage == stage)
            .map(|t| t.order)
            .collect();
        orders.sort_unstable();
        let expected: Vec<i64> = (0..orders.len() as i64).collect();
        assert_eq!(orders, expected, "orders not contiguous in {:?}", stage);
    }

    #[test]
    fn unknown_task_id_yields_no_plan() {
        let tasks = vec![task("a", Stage::Requested, 0)];
        assert!(plan_move(&tasks, "missing", Stage::Done, 0).is_none());
    }

    #[test]
    fn same_stage_move_front_renumbers_whole_column() {
        let mut tasks = vec![
            task("a", Stage::Requested, 0),
            task("b", Stage::Requested, 1),
            task("c", Stage::Requested, 2),
        ];
        let plan = plan_move(&tasks, "c", Stage::Requested, 0).unwrap();
        apply(&mut tasks, &plan);

        assert_eq!(column_ids(&tasks, Stage::Requested), vec!["c", "a", "b"]);
        assert_contiguous(&tasks, Stage::Requested);
    }

    #[test]
    fn same_stage_move_to_current_position_is_empty() {
        let tasks = vec![
            task("a", Stage::ToDo, 0),
            task("b", Stage::ToDo, 1),
        ];
        let plan = plan_move(&tasks, "b", Stage::ToDo, 1).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn cross_stage_move_renumbers_both_partitions() {
        // Scenario from the board: A(order 0) and B(order 1) in Requested,
        // A dragged to the top of To do.
        let mut tasks = vec![
            task("a", Stage::Requested, 0),
            task("b", Stage::Requested, 1),
        ];
        let plan = plan_move(&tasks, "a", Stage::ToDo, 0).unwrap();
        apply(&mut tasks, &plan);

        let a = tasks.iter().find(|t| t.id == "a").unwrap();
        let b = tasks.iter().find(|t| t.id == "b").unwrap();
        assert_eq!(a.stage, Stage::ToDo);
        assert_eq!(a.order, 0);
        assert_eq!(b.stage, Stage::Requested);
        assert_eq!(b.order, 0);
    }

    #[test]
    fn cross_stage_insert_in_middle_shifts_destination() {
        let mut tasks = vec![
            task("a", Stage::Requested, 0),
            task("x", Stage::InProgress, 0),
            task("y", Stage::InProgress, 1),
            task("z", Stage::InProgress, 2),
        ];
        let plan = plan_move(&tasks, "a", Stage::InProgress, 1).unwrap();
        apply(&mut tasks, &plan);

        assert_eq!(
            column_ids(&tasks, Stage::InProgress),
            vec!["x", "a", "y", "z"]
        );
        assert_contiguous(&tasks, Stage::InProgress);
        assert_contiguous(&tasks, Stage::Requested);
    }

    #[test]
    fn destination_index_clamps_to_append() {
        let mut tasks = vec![
            task("a", Stage::Requested, 0),
            task("x", Stage::Done, 0),
        ];
        let plan = plan_move(&tasks, "a", Stage::Done, 99).unwrap();
        apply(&mut tasks, &plan);

        assert_eq!(column_ids(&tasks, Stage::Done), vec!["x", "a"]);
    }

    #[test]
    fn move_into_empty_column() {
        let mut tasks = vec![task("a", Stage::Requested, 0)];
        let plan = plan_move(&tasks, "a", Stage::Done, 0).unwrap();
        apply(&mut tasks, &plan);

        let a = &tasks[0];
        assert_eq!(a.stage, Stage::Done);
        assert_eq!(a.order, 0);
    }

    #[test]
    fn applying_the_same_move_twice_is_idempotent() {
        let mut tasks = vec![
            task("a", Stage::Requested, 0),
            task("b", Stage::Requested, 1),
            task("c", Stage::ToDo, 0),
        ];
        let plan = plan_move(&tasks, "b", Stage::ToDo, 0).unwrap();
        apply(&mut tasks, &plan);
        let after_first: Vec<(String, Stage, i64)> = tasks
            .iter()
            .map(|t| (t.id.clone(), t.stage, t.order))
            .collect();

        let replay = plan_move(&tasks, "b", Stage::ToDo, 0).unwrap();
        assert!(replay.is_empty());
        apply(&mut tasks, &replay);
        let after_second: Vec<(String, Stage, i64)> = tasks
            .iter()
            .map(|t| (t.id.clone(), t.stage, t.order))
            .collect();
        assert_eq!(after_first, after_second);
    }

    #[test]
    fn gapped_orders_are_repaired_by_a_same_stage_move() {
        // Deletions leave gaps behind; the next move through the column
        // restores contiguous numbering.
        let mut tasks = vec![
            task("a", Stage::Requested, 0),
            task("b", Stage::Requested, 3),
            task("c", Stage::Requested, 7),
        ];
        let plan = plan_move(&tasks, "a", Stage::Requested, 2).unwrap();
        apply(&mut tasks, &plan);

        assert_eq!(column_ids(&tasks, Stage::Requested), vec!["b", "c", "a"]);
        assert_contiguous(&tasks, Stage::Requested);
    }

    #[test]
    fn plan_only_contains_changed_tasks() {
        let tasks = vec![
            task("a", Stage::Requested, 0),
            task("b", Stage::Requested, 1),
            task("c", Stage::Requested, 2),
            task("d", Stage::ToDo, 0),
        ];
        // Moving c before b leaves a and d untouched.
        let plan = plan_move(&tasks, "c", Stage::Requested, 1).unwrap();
        let ids: Vec<&str> = plan.iter().map(|p| p.task_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
