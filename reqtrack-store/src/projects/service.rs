//! Project lifecycle orchestration.
//!
//! Every state-changing operation resolves its transition first and writes
//! nothing when the rules refuse. The domain write lands before the status
//! row is recorded, as two separate calls; a failure between the two leaves
//! the domain write persisted without a status row, which is the accepted
//! current behavior.

use reqtrack_core::gantt::{flatten, rebuild};
use reqtrack_core::transitions::{
    actions, StatusTransition, TransitionRules, PROJECT_DOMAIN, REQUESTER_ROLE,
    RESUBMITTABLE_STATUSES,
};
use tracing::{error, info};

use crate::error::{StoreError, StoreResult};

use super::dao::ProjectsDao;
use super::models::{
    AssignMembersRequest, AssignPriorityRequest, CreateGanttRequest, CreateProjectRequest,
    GanttChart, PhaseStatus, ProjectDetails, ProjectSummary, ReviewProjectRequest,
    UpdateProjectRequest,
};

/// Sequences data access per business operation and gates state changes
/// through the transition rules.
pub struct ProjectsService<D, R> {
    dao: D,
    rules: R,
}

impl<D, R> ProjectsService<D, R>
where
    D: ProjectsDao,
    R: TransitionRules,
{
    pub fn new(dao: D, rules: R) -> Self {
        Self { dao, rules }
    }

    pub async fn get_projects(&self) -> StoreResult<Vec<ProjectSummary>> {
        self.dao.get_projects().await
    }

    pub async fn get_project_by_id(
        &self,
        phase_id: i64,
        project_id: i64,
        review_history_id: i64,
    ) -> StoreResult<ProjectDetails> {
        self.dao.get_project_by_id(phase_id, project_id, review_history_id).await
    }

    /// Create the request, then attach its stakeholders and objectives to
    /// the returned phase. A new request starts the workflow; there is no
    /// transition to resolve.
    pub async fn create_project(&self, req: &CreateProjectRequest) -> StoreResult<i64> {
        let phase_id = self.dao.create_project(req).await?;
        self.dao.insert_stakeholders(phase_id, &req.stakeholders).await?;
        self.dao.insert_objectives(phase_id, &req.objectives).await?;
        info!(phase_id, "project request created");
        Ok(phase_id)
    }

    /// Amend a request. From a resubmittable status the amendment is itself
    /// a workflow step: the resubmit transition is recorded first, with the
    /// requester role substituted when the actor created the request.
    /// Provided stakeholder/objective sets replace the stored ones.
    pub async fn update_project(&self, req: &UpdateProjectRequest) -> StoreResult<()> {
        if RESUBMITTABLE_STATUSES.contains(&req.status_id) {
            let role = if req.created_by == req.user_id { REQUESTER_ROLE } else { req.role_id };
            let transition =
                self.require_transition(actions::RESUBMIT_PROJECT, req.status_id, role)?;
            self.dao
                .add_status(req.phase_id, transition.status, transition.action, None, req.user_id)
                .await?;
        }

        self.dao.update_project(req).await?;

        if let Some(stakeholders) = &req.stakeholders {
            self.dao.delete_stakeholders_by_phase(req.phase_id).await?;
            self.dao.insert_stakeholders(req.phase_id, stakeholders).await?;
        }
        if let Some(objectives) = &req.objectives {
            self.dao.delete_objectives_by_phase(req.phase_id).await?;
            self.dao.insert_objectives(req.phase_id, objectives).await?;
        }
        Ok(())
    }

    pub async fn assign_members(&self, req: &AssignMembersRequest) -> StoreResult<()> {
        let transition = self.require_transition(
            actions::ASSIGN_MEMBERS,
            req.current_status_id,
            req.user_role_id,
        )?;
        self.dao.assign_members(req.phase_id, &req.members).await?;
        self.dao
            .add_status(req.phase_id, transition.status, transition.action, None, req.user_id)
            .await
    }

    pub async fn assign_priority(&self, req: &AssignPriorityRequest) -> StoreResult<()> {
        let transition =
            self.require_transition(actions::ASSIGN_PRIORITY, req.current_status_id, req.role_id)?;
        self.dao.assign_priority(req.phase_id, req.priority_id).await?;
        self.dao
            .add_status(req.phase_id, transition.status, transition.action, None, req.user_id)
            .await
    }

    /// Record a review decision. The decision maps to an action code per
    /// role, and the review only ever writes a status row; comments travel
    /// as the rejection reason.
    pub async fn review_project(&self, req: &ReviewProjectRequest) -> StoreResult<()> {
        let action = self.rules.review_type(req.condition, req.role_id);
        let transition = self.require_transition(action, req.current_status_id, req.role_id)?;
        self.dao
            .add_status(
                req.phase_id,
                transition.status,
                transition.action,
                req.comments.as_deref(),
                req.user_id,
            )
            .await
    }

    pub async fn create_gantt(&self, req: &CreateGanttRequest) -> StoreResult<()> {
        let transition =
            self.require_transition(actions::SUBMIT_GANTT, req.current_status_id, req.role_id)?;
        let rows = flatten(&req.tasks)?;
        self.dao.create_gantt(req.phase_id, &rows).await?;
        self.dao
            .add_status(req.phase_id, transition.status, transition.action, None, req.user_id)
            .await
    }

    pub async fn get_gantt(
        &self,
        phase_id: i64,
        project_id: i64,
        review_history_id: i64,
    ) -> StoreResult<GanttChart> {
        let record = self.dao.get_gantt(phase_id, project_id, review_history_id).await?;
        Ok(GanttChart {
            project_info: record.project_info,
            gantt_info: record.gantt_info,
            activities: rebuild(&record.activities),
        })
    }

    pub async fn current_phase_status(&self, phase_id: i64) -> StoreResult<PhaseStatus> {
        self.dao.current_phase_status(phase_id).await
    }

    fn require_transition(
        &self,
        action: i32,
        current_status: i32,
        role: i32,
    ) -> StoreResult<StatusTransition> {
        self.rules
            .next_transition(PROJECT_DOMAIN, action, current_status, role)
            .ok_or_else(|| {
                error!(action, current_status, role, "no transition available");
                StoreError::NoTransitionAvailable { action, status: current_status, role }
            })
    }
}
