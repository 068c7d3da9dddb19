//! One method per stored procedure.
//!
//! Multi-set output is decoded positionally into typed structs here, at a
//! single boundary; callers never see raw rows. The positional contracts
//! are fixed per procedure: project-by-id returns [header, objectives,
//! team members, stakeholders], the Gantt read returns [project info,
//! gantt header, flat activities].

use async_trait::async_trait;
use reqtrack_core::gantt::GanttRow;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use tracing::debug;

use crate::catalog::Procedure;
use crate::config::PROJECT_REQUEST_POOL;
use crate::engine::{Executor, ProcedureOutput};
use crate::error::{StoreError, StoreResult};
use crate::params::{ProcParam, SqlValue};

use super::models::{
    CreateProjectRequest, GanttInfo, GanttRecord, PhaseStatus, ProjectDetails, ProjectHeader,
    ProjectInfo, ProjectSummary, StakeholderAssignment, UpdateProjectRequest,
};

/// Data access for project-request phases.
#[async_trait]
pub trait ProjectsDao: Send + Sync {
    async fn get_projects(&self) -> StoreResult<Vec<ProjectSummary>>;

    async fn get_project_by_id(
        &self,
        phase_id: i64,
        project_id: i64,
        review_history_id: i64,
    ) -> StoreResult<ProjectDetails>;

    /// Creates the project and its first phase, returning the new phase id.
    async fn create_project(&self, req: &CreateProjectRequest) -> StoreResult<i64>;

    async fn update_project(&self, req: &UpdateProjectRequest) -> StoreResult<()>;

    async fn insert_stakeholders(
        &self,
        phase_id: i64,
        stakeholders: &[StakeholderAssignment],
    ) -> StoreResult<()>;

    async fn insert_objectives(&self, phase_id: i64, objectives: &[String]) -> StoreResult<()>;

    async fn delete_stakeholders_by_phase(&self, phase_id: i64) -> StoreResult<()>;

    async fn delete_objectives_by_phase(&self, phase_id: i64) -> StoreResult<()>;

    /// Replaces the member set: deletes every member row for the phase,
    /// then inserts the new set transactionally. An empty set is a no-op.
    async fn assign_members(&self, phase_id: i64, members: &[i64]) -> StoreResult<()>;

    async fn assign_priority(&self, phase_id: i64, priority_id: i64) -> StoreResult<()>;

    async fn current_phase_status(&self, phase_id: i64) -> StoreResult<PhaseStatus>;

    async fn add_status(
        &self,
        phase_id: i64,
        status_id: i32,
        action_id: i32,
        reason_for_rejection: Option<&str>,
        reviewed_by: i64,
    ) -> StoreResult<()>;

    /// Creates a gantt header for the phase and inserts the activity rows
    /// under the returned gantt id. An empty row list is a no-op.
    async fn create_gantt(&self, phase_id: i64, rows: &[GanttRow]) -> StoreResult<()>;

    async fn get_gantt(
        &self,
        phase_id: i64,
        project_id: i64,
        review_history_id: i64,
    ) -> StoreResult<GanttRecord>;
}

/// Stored-procedure backed [`ProjectsDao`] over the project-request pool.
#[derive(Clone)]
pub struct PgProjectsDao {
    executor: Executor,
}

impl PgProjectsDao {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ProjectsDao for PgProjectsDao {
    async fn get_projects(&self) -> StoreResult<Vec<ProjectSummary>> {
        let output = self
            .executor
            .call(PROJECT_REQUEST_POOL, Procedure::GetProjects, &[])
            .await?;
        decode_set(Procedure::GetProjects, &output, 0)
    }

    async fn get_project_by_id(
        &self,
        phase_id: i64,
        project_id: i64,
        review_history_id: i64,
    ) -> StoreResult<ProjectDetails> {
        let procedure = Procedure::GetProjectById;
        let output = self
            .executor
            .call(
                PROJECT_REQUEST_POOL,
                procedure,
                &[
                    ProcParam::input("phaseId", phase_id),
                    ProcParam::input("projectId", project_id),
                    ProcParam::input("reviewHistoryId", review_history_id),
                ],
            )
            .await?;

        let project: ProjectHeader = decode_first(procedure, &output)?;
        Ok(ProjectDetails {
            project,
            objectives: decode_set(procedure, &output, 1)?,
            team_members: decode_set(procedure, &output, 2)?,
            stakeholders: decode_set(procedure, &output, 3)?,
        })
    }

    async fn create_project(&self, req: &CreateProjectRequest) -> StoreResult<i64> {
        let procedure = Procedure::CreateNewProject;
        let output = self
            .executor
            .call(
                PROJECT_REQUEST_POOL,
                procedure,
                &[
                    ProcParam::input("Project_Name", req.project_name.as_str()),
                    ProcParam::input("Client_Id", req.user_id),
                    ProcParam::input("Area_Id", req.area_id),
                    ProcParam::input("Baseline", req.baseline.as_str()),
                    ProcParam::input("Problem_Statement", req.problem_statement.as_str()),
                    ProcParam::input("Scope", req.scope.as_str()),
                    ProcParam::input("Out_Of_Scope", req.out_of_scope.as_str()),
                    ProcParam::input("Impact", req.impact.as_str()),
                    ProcParam::input(
                        "File_Path",
                        SqlValue::opt_text(req.current_process_file.as_deref()),
                    ),
                ],
            )
            .await?;

        let phase_id: i64 = get_column(procedure, &output, "Phase_Id")?;
        debug!(phase_id, "project request row created");
        Ok(phase_id)
    }

    async fn update_project(&self, req: &UpdateProjectRequest) -> StoreResult<()> {
        self.executor
            .call(
                PROJECT_REQUEST_POOL,
                Procedure::UpdateProject,
                &[
                    ProcParam::input("Phase_Id", req.phase_id),
                    ProcParam::input("Project_Id", req.project_id),
                    ProcParam::input("Project_Name", req.project_name.as_str()),
                    ProcParam::input("Baseline", req.baseline.as_str()),
                    ProcParam::input("Problem_Statement", req.problem_statement.as_str()),
                    ProcParam::input("Scope", req.scope.as_str()),
                    ProcParam::input("Out_Of_Scope", req.out_of_scope.as_str()),
                    ProcParam::input("Impact", req.impact.as_str()),
                    ProcParam::input(
                        "File_Path",
                        SqlValue::opt_text(req.current_process_file.as_deref()),
                    ),
                ],
            )
            .await?;
        Ok(())
    }

    async fn insert_stakeholders(
        &self,
        phase_id: i64,
        stakeholders: &[StakeholderAssignment],
    ) -> StoreResult<()> {
        if stakeholders.is_empty() {
            return Ok(());
        }
        let batches: Vec<Vec<ProcParam>> = stakeholders
            .iter()
            .map(|stakeholder| {
                vec![
                    ProcParam::input("User_Id", stakeholder.user_id),
                    ProcParam::input("Phase_Id", phase_id),
                ]
            })
            .collect();
        self.executor
            .transact(PROJECT_REQUEST_POOL, Procedure::AssignPhaseStakeholders, &batches)
            .await
    }

    async fn insert_objectives(&self, phase_id: i64, objectives: &[String]) -> StoreResult<()> {
        if objectives.is_empty() {
            return Ok(());
        }
        let batches: Vec<Vec<ProcParam>> = objectives
            .iter()
            .map(|objective| {
                vec![
                    ProcParam::input("Phase_Id", phase_id),
                    ProcParam::input("Objective", objective.as_str()),
                ]
            })
            .collect();
        self.executor
            .transact(PROJECT_REQUEST_POOL, Procedure::AssignPhaseObjective, &batches)
            .await
    }

    async fn delete_stakeholders_by_phase(&self, phase_id: i64) -> StoreResult<()> {
        self.executor
            .call(
                PROJECT_REQUEST_POOL,
                Procedure::DeleteStakeholdersByPhaseId,
                &[ProcParam::input("Phase_Id", phase_id)],
            )
            .await?;
        Ok(())
    }

    async fn delete_objectives_by_phase(&self, phase_id: i64) -> StoreResult<()> {
        self.executor
            .call(
                PROJECT_REQUEST_POOL,
                Procedure::DeleteObjectivesByPhaseId,
                &[ProcParam::input("Phase_Id", phase_id)],
            )
            .await?;
        Ok(())
    }

    async fn assign_members(&self, phase_id: i64, members: &[i64]) -> StoreResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        self.executor
            .call(
                PROJECT_REQUEST_POOL,
                Procedure::DeletePhaseMembers,
                &[ProcParam::input("Phase_Id", phase_id)],
            )
            .await?;

        let batches: Vec<Vec<ProcParam>> = members
            .iter()
            .map(|member| {
                vec![
                    ProcParam::input("User_Id", *member),
                    ProcParam::input("Phase_Id", phase_id),
                ]
            })
            .collect();
        self.executor
            .transact(PROJECT_REQUEST_POOL, Procedure::AssignPhaseMembers, &batches)
            .await
    }

    async fn assign_priority(&self, phase_id: i64, priority_id: i64) -> StoreResult<()> {
        self.executor
            .call(
                PROJECT_REQUEST_POOL,
                Procedure::AssignPriority,
                &[
                    ProcParam::input("Phase_Id", phase_id),
                    ProcParam::input("Priority_Id", priority_id),
                ],
            )
            .await?;
        Ok(())
    }

    async fn current_phase_status(&self, phase_id: i64) -> StoreResult<PhaseStatus> {
        let procedure = Procedure::GetProjectStatus;
        let output = self
            .executor
            .call(
                PROJECT_REQUEST_POOL,
                procedure,
                &[ProcParam::input("Phase_Id", phase_id)],
            )
            .await?;
        decode_first(procedure, &output)
    }

    async fn add_status(
        &self,
        phase_id: i64,
        status_id: i32,
        action_id: i32,
        reason_for_rejection: Option<&str>,
        reviewed_by: i64,
    ) -> StoreResult<()> {
        self.executor
            .call(
                PROJECT_REQUEST_POOL,
                Procedure::AddNewStatus,
                &[
                    ProcParam::input("Phase_Id", phase_id),
                    ProcParam::input("New_Status_Id", status_id),
                    ProcParam::input("New_Action_Id", action_id),
                    ProcParam::input(
                        "Reason_For_Rejection",
                        SqlValue::opt_text(reason_for_rejection),
                    ),
                    ProcParam::input("Reviewed_By", reviewed_by),
                ],
            )
            .await?;
        Ok(())
    }

    async fn create_gantt(&self, phase_id: i64, rows: &[GanttRow]) -> StoreResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let procedure = Procedure::CreateGantt;
        let output = self
            .executor
            .call(
                PROJECT_REQUEST_POOL,
                procedure,
                &[ProcParam::input("Phase_Id", phase_id)],
            )
            .await?;
        let gantt_id: i64 = get_column(procedure, &output, "Phase_Gantt_Id")?;
        debug!(phase_id, gantt_id, "gantt header created");

        let batches: Vec<Vec<ProcParam>> = rows
            .iter()
            .map(|row| {
                vec![
                    ProcParam::input("TaskID", row.task_id),
                    ProcParam::input("TaskName", row.task_name.as_str()),
                    ProcParam::input("StartDate", row.start_date),
                    ProcParam::input("EndDate", row.end_date),
                    ProcParam::input("Duration", row.duration),
                    ProcParam::input("Progress", row.progress),
                    ProcParam::input("Predecessor", SqlValue::opt_text(row.predecessor.as_deref())),
                    ProcParam::input("ParentTaskId", SqlValue::opt_bigint(row.parent_task_id)),
                    ProcParam::input("Phase_Gantt_Id", gantt_id),
                ]
            })
            .collect();
        self.executor
            .transact(PROJECT_REQUEST_POOL, Procedure::InsertGanttActivities, &batches)
            .await
    }

    async fn get_gantt(
        &self,
        phase_id: i64,
        project_id: i64,
        review_history_id: i64,
    ) -> StoreResult<GanttRecord> {
        let procedure = Procedure::GetGanttByPhase;
        let output = self
            .executor
            .call(
                PROJECT_REQUEST_POOL,
                procedure,
                &[
                    ProcParam::input("Phase_Id", phase_id),
                    ProcParam::input("Project_Id", project_id),
                    ProcParam::input("Review_History_Id", review_history_id),
                ],
            )
            .await?;

        let project_info: Option<ProjectInfo> = decode_first_opt(procedure, &output, 0)?;
        let gantt_info: Option<GanttInfo> = decode_first_opt(procedure, &output, 1)?;
        let activities = match output.set(2) {
            Some(rows) => rows
                .iter()
                .map(|row| activity_from_row(procedure, row))
                .collect::<StoreResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(GanttRecord { project_info, gantt_info, activities })
    }
}

fn decode_err(procedure: Procedure, source: sqlx::Error) -> StoreError {
    StoreError::Decode { procedure: procedure.name(), source }
}

fn decode_rows<T>(procedure: Procedure, rows: &[PgRow]) -> StoreResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    rows.iter()
        .map(|row| T::from_row(row).map_err(|source| decode_err(procedure, source)))
        .collect()
}

/// Decode one positional result set; a trailing set the routine omitted
/// decodes as empty.
fn decode_set<T>(procedure: Procedure, output: &ProcedureOutput, index: usize) -> StoreResult<Vec<T>>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    match output.set(index) {
        Some(rows) => decode_rows(procedure, rows),
        None => Ok(Vec::new()),
    }
}

fn decode_first<T>(procedure: Procedure, output: &ProcedureOutput) -> StoreResult<T>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let row = output
        .first_row()
        .ok_or(StoreError::EmptyResult { procedure: procedure.name() })?;
    T::from_row(row).map_err(|source| decode_err(procedure, source))
}

fn decode_first_opt<T>(
    procedure: Procedure,
    output: &ProcedureOutput,
    index: usize,
) -> StoreResult<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    match output.set(index).and_then(|rows| rows.first()) {
        Some(row) => T::from_row(row).map(Some).map_err(|source| decode_err(procedure, source)),
        None => Ok(None),
    }
}

fn get_column<T>(procedure: Procedure, output: &ProcedureOutput, column: &str) -> StoreResult<T>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    let row = output
        .first_row()
        .ok_or(StoreError::EmptyResult { procedure: procedure.name() })?;
    row.try_get(column).map_err(|source| decode_err(procedure, source))
}

fn activity_from_row(procedure: Procedure, row: &PgRow) -> StoreResult<GanttRow> {
    let decode = |source| decode_err(procedure, source);
    Ok(GanttRow {
        task_id: row.try_get("TaskID").map_err(decode)?,
        task_name: row.try_get("TaskName").map_err(decode)?,
        start_date: row.try_get("StartDate").map_err(decode)?,
        end_date: row.try_get("EndDate").map_err(decode)?,
        duration: row.try_get("Duration").map_err(decode)?,
        progress: row.try_get("Progress").map_err(decode)?,
        predecessor: row.try_get("Predecessor").map_err(decode)?,
        parent_task_id: row.try_get("ParentTaskId").map_err(decode)?,
    })
}
