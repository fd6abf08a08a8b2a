//! Core types for the task board.

use serde::{Deserialize, Serialize};

/// Kanban stage a task can occupy.
///
/// The wire representation matches the board column labels exactly,
/// including the spaces in "To do" and "In Progress".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Requested,
    #[serde(rename = "To do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

/// All stages in board column order.
pub const STAGES: [Stage; 4] = [Stage::Requested, Stage::ToDo, Stage::InProgress, Stage::Done];

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Requested => "Requested",
            Stage::ToDo => "To do",
            Stage::InProgress => "In Progress",
            Stage::Done => "Done",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Requested" => Some(Stage::Requested),
            "To do" => Some(Stage::ToDo),
            "In Progress" => Some(Stage::InProgress),
            "Done" => Some(Stage::Done),
            _ => None,
        }
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Requested
    }
}

/// A task embedded in a project.
///
/// `order` positions the task among siblings sharing the same stage;
/// ascending sort by `order` is the canonical column sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub stage: Stage,
    pub order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A project owned by a single user, with its embedded tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub tasks: Vec<Task>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Partial field update for a project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Partial field update for a task.
///
/// Stage arrives as a raw string so an unrecognized value can be reported
/// as InvalidStage rather than a deserialization failure. Writing `stage`
/// or `order` here bypasses the ordering engine; use a move operation to
/// keep column ordering contiguous.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub stage: Option<String>,
    pub order: Option<i64>,
}
