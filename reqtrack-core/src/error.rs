/// Structured error types for reqtrack-core.
///
/// Uses `thiserror` so library consumers get composable errors; the
/// data-access crate wraps these into its own taxonomy at the boundary.
use thiserror::Error;

/// Main error type for reqtrack-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// A task batch reused an id; the flattened form keys parents by id
    #[error("Duplicate task id {task_id} in batch")]
    DuplicateTaskId { task_id: i64 },
}

/// Result type alias for reqtrack-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create a duplicate task id error
    pub fn duplicate_task_id(task_id: i64) -> Self {
        Self::DuplicateTaskId { task_id }
    }
}
