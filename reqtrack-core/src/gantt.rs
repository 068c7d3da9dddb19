//! Hierarchical schedule ("Gantt") tasks and their flat persisted form.
//!
//! Clients submit a nested task forest; the database stores flat rows with a
//! parent reference. `flatten` emits rows parent-before-child so a row-by-row
//! insert never trips the self-referencing foreign key, and `rebuild` reverses
//! the mapping for rows read back in that same order.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// One schedule activity, possibly with nested subtasks.
///
/// Field names on the wire keep the legacy Gantt component spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttTask {
    #[serde(rename = "TaskID")]
    pub task_id: i64,
    #[serde(rename = "TaskName")]
    pub task_name: String,
    #[serde(rename = "StartDate")]
    pub start_date: DateTime<Utc>,
    #[serde(rename = "EndDate")]
    pub end_date: DateTime<Utc>,
    #[serde(rename = "Duration")]
    pub duration: f64,
    #[serde(rename = "Progress")]
    pub progress: f64,
    #[serde(rename = "Predecessor", default)]
    pub predecessor: Option<String>,
    #[serde(rename = "subtasks", default)]
    pub subtasks: Vec<GanttTask>,
}

/// Flat persisted form of one task: its own fields plus its parent's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GanttRow {
    pub task_id: i64,
    pub task_name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub duration: f64,
    pub progress: f64,
    pub predecessor: Option<String>,
    /// None for roots.
    pub parent_task_id: Option<i64>,
}

/// Round to two decimals, the precision the schedule columns store.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Flatten a task forest into insert-ordered rows.
///
/// Depth-first pre-order, so every parent row precedes its children's rows.
/// Duration and progress are rounded to two decimals here, at the point of
/// persistence; ids must be unique across the batch.
pub fn flatten(tasks: &[GanttTask]) -> Result<Vec<GanttRow>> {
    let mut rows = Vec::new();
    let mut seen = HashSet::new();
    flatten_into(tasks, None, &mut rows, &mut seen)?;
    Ok(rows)
}

fn flatten_into(
    tasks: &[GanttTask],
    parent: Option<i64>,
    rows: &mut Vec<GanttRow>,
    seen: &mut HashSet<i64>,
) -> Result<()> {
    for task in tasks {
        if !seen.insert(task.task_id) {
            return Err(CoreError::duplicate_task_id(task.task_id));
        }
        rows.push(GanttRow {
            task_id: task.task_id,
            task_name: task.task_name.clone(),
            start_date: task.start_date,
            end_date: task.end_date,
            duration: round2(task.duration),
            progress: round2(task.progress),
            predecessor: task.predecessor.clone(),
            parent_task_id: parent,
        });
        flatten_into(&task.subtasks, Some(task.task_id), rows, seen)?;
    }
    Ok(())
}

/// Rebuild a task forest from persisted rows.
///
/// Single left-to-right pass. Rows must arrive parent-before-child, which is
/// how `flatten` emits them and how retrieval returns them; a row whose
/// parent has not been seen yet is dropped, not an error. Stored precision
/// is trusted as-is.
pub fn rebuild(rows: &[GanttRow]) -> Vec<GanttTask> {
    let mut nodes: Vec<GanttTask> = Vec::with_capacity(rows.len());
    let mut children: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
    let mut index: HashMap<i64, usize> = HashMap::with_capacity(rows.len());
    let mut roots: Vec<usize> = Vec::new();

    for row in rows {
        let idx = nodes.len();
        nodes.push(GanttTask {
            task_id: row.task_id,
            task_name: row.task_name.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            duration: row.duration,
            progress: row.progress,
            predecessor: row.predecessor.clone(),
            subtasks: Vec::new(),
        });
        children.push(Vec::new());
        match row.parent_task_id {
            None => roots.push(idx),
            Some(parent_id) => {
                if let Some(&parent_idx) = index.get(&parent_id) {
                    children[parent_idx].push(idx);
                }
                // unknown parent: the row is dropped from the forest
            }
        }
        index.insert(row.task_id, idx);
    }

    roots.iter().map(|&idx| attach(idx, &nodes, &children)).collect()
}

fn attach(idx: usize, nodes: &[GanttTask], children: &[Vec<usize>]) -> GanttTask {
    let mut node = nodes[idx].clone();
    node.subtasks = children[idx]
        .iter()
        .map(|&child| attach(child, nodes, children))
        .collect();
    node
}
