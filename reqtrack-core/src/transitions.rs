//! Role-gated status transitions for project-request phases.
//!
//! The allowed (action, current status, role) -> (next status, next action)
//! table lives outside this crate; callers inject the rows and lookup stays a
//! pure function of them.

use serde::{Deserialize, Serialize};

/// Transition domain for project-request phases.
pub const PROJECT_DOMAIN: &str = "project";

/// Role id substituted when the acting user is the request's creator.
pub const REQUESTER_ROLE: i32 = 1;

/// Statuses from which the requester may amend and resubmit.
pub const RESUBMITTABLE_STATUSES: [i32; 2] = [4, 7];

/// Action codes the lifecycle operations request from the rules table.
pub mod actions {
    pub const ASSIGN_MEMBERS: i32 = 2;
    pub const ASSIGN_PRIORITY: i32 = 8;
    pub const SUBMIT_GANTT: i32 = 9;
    pub const RESUBMIT_PROJECT: i32 = 23;
}

/// The (next status, next action) pair a successful lookup yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub status: i32,
    pub action: i32,
}

/// Outcome of a review decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewCondition {
    Approved,
    Rejected,
}

/// Pure lookup over the externally owned transition rules.
pub trait TransitionRules: Send + Sync {
    /// Next transition for a requested action, or None when the action is
    /// not allowed from `current_status` for `role`.
    fn next_transition(
        &self,
        domain: &str,
        action: i32,
        current_status: i32,
        role: i32,
    ) -> Option<StatusTransition>;

    /// Action code a review decision maps to for the reviewing role.
    fn review_type(&self, condition: ReviewCondition, role: i32) -> i32;
}

/// One row of the injected transition table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRule {
    pub domain: String,
    pub action: i32,
    pub current_status: i32,
    pub role: i32,
    pub next: StatusTransition,
}

/// One row of the injected review-type table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRule {
    pub condition: ReviewCondition,
    pub role: i32,
    pub action: i32,
}

/// Table-driven [`TransitionRules`] over injected rows.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
    reviews: Vec<ReviewRule>,
}

impl TransitionTable {
    pub fn new(rules: Vec<TransitionRule>, reviews: Vec<ReviewRule>) -> Self {
        Self { rules, reviews }
    }
}

impl TransitionRules for TransitionTable {
    fn next_transition(
        &self,
        domain: &str,
        action: i32,
        current_status: i32,
        role: i32,
    ) -> Option<StatusTransition> {
        self.rules
            .iter()
            .find(|rule| {
                rule.domain == domain
                    && rule.action == action
                    && rule.current_status == current_status
                    && rule.role == role
            })
            .map(|rule| rule.next)
    }

    fn review_type(&self, condition: ReviewCondition, role: i32) -> i32 {
        // No matching review row degrades to action 0, which no transition
        // rule matches, so the caller sees "no transition available".
        self.reviews
            .iter()
            .find(|rule| rule.condition == condition && rule.role == role)
            .map(|rule| rule.action)
            .unwrap_or(0)
    }
}
