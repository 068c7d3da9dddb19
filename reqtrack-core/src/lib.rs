pub mod error;
pub mod gantt;
pub mod transitions;

pub use error::{CoreError, Result};
pub use gantt::{flatten, rebuild, GanttRow, GanttTask};
pub use transitions::{
    ReviewCondition, ReviewRule, StatusTransition, TransitionRule, TransitionRules,
    TransitionTable,
};
